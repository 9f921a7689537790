use leftovers_core::sweep::{FailureKind, Outcome, ReportEntry, SkipReason};

/// Box-drawn table of per-resource sweep outcomes.
pub struct ReportTable {
    type_width: usize,
    resource_width: usize,
    outcome_width: usize,
    detail_width: usize,
}

impl ReportTable {
    pub fn new(entries: &[ReportEntry]) -> Self {
        let type_width = entries
            .iter()
            .map(|e| e.resource_type.chars().count())
            .max()
            .unwrap_or(4)
            .clamp(4, 24); // "Type" header min

        let resource_width = entries
            .iter()
            .map(|e| e.identifier.chars().count())
            .max()
            .unwrap_or(8)
            .clamp(8, 60);

        Self {
            type_width,
            resource_width,
            outcome_width: 13,
            detail_width: 50,
        }
    }

    pub fn print_table(&self, entries: &[ReportEntry]) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!(
            "{}",
            self.row("Type", "Resource", "Outcome", "Detail")
        );
        println!("{}", self.border('├', '┼', '┤'));
        for entry in entries {
            let (outcome, detail) = describe_outcome(&entry.outcome);
            println!(
                "{}",
                self.row(&entry.resource_type, &entry.identifier, outcome, &detail)
            );
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn row(&self, resource_type: &str, resource: &str, outcome: &str, detail: &str) -> String {
        format!(
            "│ {} │ {} │ {} │ {} │",
            truncate(resource_type, self.type_width),
            truncate(resource, self.resource_width),
            truncate(outcome, self.outcome_width),
            truncate(detail, self.detail_width),
        )
    }

    fn border(&self, left: char, middle: char, right: char) -> String {
        let widths = [
            self.type_width,
            self.resource_width,
            self.outcome_width,
            self.detail_width,
        ];
        let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, cells.join(&middle.to_string()), right)
    }
}

/// Short outcome label plus a human-readable detail.
pub fn describe_outcome(outcome: &Outcome) -> (&'static str, String) {
    match outcome {
        Outcome::Deleted => ("deleted", String::new()),
        Outcome::Skipped { reason } => (
            "skipped",
            match reason {
                SkipReason::UserDeclined => "declined at prompt".to_string(),
                SkipReason::Cancelled => "sweep cancelled".to_string(),
            },
        ),
        Outcome::Failed { failure, message } => (
            match failure {
                FailureKind::OperationFailed => "failed",
                FailureKind::OperationTimedOut => "timed out",
                FailureKind::NoProgress => "still in use",
                FailureKind::Provider => "error",
            },
            message.clone(),
        ),
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
