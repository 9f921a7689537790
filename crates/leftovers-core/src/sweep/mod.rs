pub mod handler;
mod operations;
pub mod types;

// Public API exports
pub use handler::Sweeper;
pub use types::{
    FailureKind, ListFailure, Outcome, ReportEntry, ResourceKey, SkipReason, SweepOptions,
    SweepReport,
};
