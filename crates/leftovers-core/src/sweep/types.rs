use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::DEFAULT_MAX_PASSES;
use crate::errors::LeftoversError;
use crate::resources::{DeleteError, ListError};

/// Knobs for one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Upper bound on deletion passes; always at least one pass runs.
    pub max_passes: u32,
    /// Run every resource kind on its own worker lane.
    /// Ignored when the confirmation gate is interactive.
    pub concurrent_kinds: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            concurrent_kinds: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UserDeclined,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider finished the operation with an error.
    OperationFailed,
    /// The operation did not finish before the waiter's ceiling.
    OperationTimedOut,
    /// Still dependency-blocked when the sweep stopped making progress.
    NoProgress,
    /// Any other provider failure.
    Provider,
}

/// Final state of one resource in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Deleted,
    Skipped { reason: SkipReason },
    Failed { failure: FailureKind, message: String },
}

impl Outcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Outcome::Skipped { reason }
    }

    pub fn no_progress(passes: u32, last_error: Option<&DeleteError>) -> Self {
        let mut message = format!("no progress after {} pass(es)", passes);
        if let Some(error) = last_error {
            message.push_str(": ");
            message.push_str(&error.to_string());
        }
        Outcome::Failed {
            failure: FailureKind::NoProgress,
            message,
        }
    }

    /// Outcome of a delete attempt that will not be retried.
    pub fn from_delete_result(result: &Result<(), DeleteError>) -> Self {
        let error = match result {
            Ok(()) => return Outcome::Deleted,
            Err(error) => error,
        };

        let failure = match error {
            DeleteError::NotFound { .. } => return Outcome::Deleted,
            DeleteError::Cancelled => return Outcome::skipped(SkipReason::Cancelled),
            DeleteError::OperationFailed { .. } => FailureKind::OperationFailed,
            DeleteError::OperationTimedOut { .. } => FailureKind::OperationTimedOut,
            DeleteError::DependencyBlocked { .. } => FailureKind::NoProgress,
            DeleteError::Provider { .. } => FailureKind::Provider,
        };

        Outcome::Failed {
            failure,
            message: error.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Report identity of a resource. Unique per run, so concurrent lanes never
/// write the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub resource_type: String,
    pub identifier: String,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub resource_type: String,
    pub identifier: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListFailure {
    pub resource_type: String,
    pub code: &'static str,
    pub message: String,
}

/// Per-resource outcomes of a sweep, built up across passes.
///
/// Each `(resource_type, identifier)` appears at most once, holding its
/// last recorded outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub passes: u32,
    entries: Vec<ReportEntry>,
    list_errors: Vec<ListFailure>,
    #[serde(skip)]
    index: HashMap<ResourceKey, usize>,
}

impl SweepReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            passes: 0,
            entries: Vec::new(),
            list_errors: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or replace the outcome for one resource.
    pub fn record(&mut self, key: ResourceKey, outcome: Outcome) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].outcome = outcome,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(ReportEntry {
                    resource_type: key.resource_type,
                    identifier: key.identifier,
                    outcome,
                });
            }
        }
    }

    pub fn record_list_error(&mut self, resource_type: &str, error: &ListError) {
        self.list_errors.push(ListFailure {
            resource_type: resource_type.to_string(),
            code: error.error_code(),
            message: error.to_string(),
        });
    }

    pub fn outcome(&self, resource_type: &str, identifier: &str) -> Option<&Outcome> {
        self.index
            .get(&ResourceKey::new(resource_type, identifier))
            .map(|&position| &self.entries[position].outcome)
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn list_errors(&self) -> &[ListFailure] {
        &self.list_errors
    }

    pub fn deleted_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == Outcome::Deleted)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_failure())
            .count()
    }

    /// Success iff no resource ended `Failed`. Listing errors are reported
    /// but do not fail the run.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for SweepReport {
    fn default() -> Self {
        Self::new()
    }
}
