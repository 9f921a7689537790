//! User-interaction collaborators consumed by the sweep engine.

/// Asks the user whether a single resource may be deleted.
pub trait Prompter: Send + Sync {
    /// Returns true only on an explicit affirmative answer.
    fn prompt_with_details(&self, resource_type: &str, resource_name: &str) -> bool;
}

/// Receives non-fatal advisory messages, e.g. manual cleanup hints.
pub trait Advisor: Send + Sync {
    fn advise(&self, message: &str);
}
