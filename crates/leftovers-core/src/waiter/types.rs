use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS};

/// Provider-reported status of an asynchronous operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
    Error,
}

/// Which status endpoint owns an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationScope {
    Global,
    Region(String),
    Zone(String),
}

/// Terminal failure attached to an operation in `OperationStatus::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub code: String,
    pub message: String,
    /// The provider reports the target as still referenced by another resource.
    pub dependency_blocked: bool,
}

/// Transient token for an in-flight provider operation.
///
/// Owned by the waiter call consuming it; never stored or shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub id: String,
    pub self_link: String,
    pub target_link: String,
    pub status: OperationStatus,
    pub scope: OperationScope,
    pub error: Option<OperationFailure>,
}

impl OperationHandle {
    pub fn new(id: impl Into<String>, status: OperationStatus) -> Self {
        let id = id.into();
        Self {
            self_link: id.clone(),
            target_link: id.clone(),
            id,
            status,
            scope: OperationScope::Global,
            error: None,
        }
    }

    pub fn with_scope(mut self, scope: OperationScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_links(mut self, self_link: impl Into<String>, target_link: impl Into<String>) -> Self {
        self.self_link = self_link.into();
        self.target_link = target_link.into();
        self
    }

    pub fn with_error(mut self, error: OperationFailure) -> Self {
        self.status = OperationStatus::Error;
        self.error = Some(error);
        self
    }

    /// A nested operation spawned on behalf of another resource, e.g. a zone
    /// operation created while deleting a global resource.
    pub fn is_derivative(&self) -> bool {
        !self.target_link.is_empty() && self.target_link != self.self_link
    }
}

/// States of the waiter state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Pending,
    Running,
    Done,
    Error,
    TimedOut,
}

impl WaitState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WaitState::Done | WaitState::Error | WaitState::TimedOut)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WaitState::Pending => "pending",
            WaitState::Running => "running",
            WaitState::Done => "done",
            WaitState::Error => "error",
            WaitState::TimedOut => "timed_out",
        }
    }
}

impl From<OperationStatus> for WaitState {
    fn from(status: OperationStatus) -> Self {
        match status {
            OperationStatus::Pending => WaitState::Pending,
            OperationStatus::Running => WaitState::Running,
            OperationStatus::Done => WaitState::Done,
            OperationStatus::Error => WaitState::Error,
        }
    }
}

/// Polling cadence and ceiling for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
        }
    }
}
