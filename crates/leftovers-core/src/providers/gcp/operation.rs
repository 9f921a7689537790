use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::client::GcpClient;
use crate::resources::DeleteError;
use crate::waiter::{
    OperationFailure, OperationHandle, OperationPoller, OperationScope, OperationStatus,
};

const IN_USE_REASON: &str = "resourceInUseByAnotherResource";
const NOT_READY_REASON: &str = "resourceNotReady";
const IN_USE_CODE: &str = "RESOURCE_IN_USE_BY_ANOTHER_RESOURCE";

/// `Operation` resource as returned by delete and operations.get. Compute
/// and Cloud SQL admin operations share the fields read here.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub self_link: String,
    #[serde(default)]
    pub target_link: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub error: Option<OperationErrors>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OperationErrors {
    #[serde(default)]
    pub errors: Vec<OperationErrorItem>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OperationErrorItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Last path segment of a compute URL (`.../zones/us-central1-a` -> `us-central1-a`).
pub fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

impl From<Operation> for OperationHandle {
    fn from(operation: Operation) -> Self {
        let scope = match (&operation.zone, &operation.region) {
            (Some(zone), _) => OperationScope::Zone(last_segment(zone).to_string()),
            (None, Some(region)) => OperationScope::Region(last_segment(region).to_string()),
            (None, None) => OperationScope::Global,
        };

        let status = match operation.status.as_str() {
            "DONE" => OperationStatus::Done,
            "RUNNING" => OperationStatus::Running,
            // PENDING, plus SQL_OPERATION_STATUS_UNSPECIFIED
            _ => OperationStatus::Pending,
        };

        let handle = OperationHandle::new(operation.name, status)
            .with_scope(scope)
            .with_links(operation.self_link, operation.target_link);

        match operation.error.filter(|e| !e.errors.is_empty()) {
            Some(errors) => {
                let dependency_blocked = errors.errors.iter().any(|e| e.code == IN_USE_CODE);
                let code = errors.errors[0].code.clone();
                let message = errors
                    .errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                handle.with_error(OperationFailure {
                    code,
                    message,
                    dependency_blocked,
                })
            }
            None => handle,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

/// Map a failed API response onto the sweep's error taxonomy.
pub fn classify_api_error(status: u16, body: &str) -> DeleteError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.error.message.is_empty() {
        body.trim().to_string()
    } else {
        parsed.error.message.clone()
    };

    if status == 404 {
        return DeleteError::NotFound { message };
    }

    let blocked = parsed
        .error
        .errors
        .iter()
        .any(|e| e.reason == IN_USE_REASON || e.reason == NOT_READY_REASON);
    if blocked {
        return DeleteError::DependencyBlocked { message };
    }

    DeleteError::Provider {
        message: format!("HTTP {}: {}", status, message),
    }
}

/// Polls compute operations through zone, region or global endpoints.
pub struct ComputePoller {
    client: Arc<GcpClient>,
    project: String,
}

impl ComputePoller {
    pub fn new(client: Arc<GcpClient>, project: impl Into<String>) -> Self {
        Self {
            client,
            project: project.into(),
        }
    }

    /// Status endpoint for `handle`: its own link when the provider gave
    /// one, otherwise derived from the operation's scope.
    pub fn status_url(&self, handle: &OperationHandle) -> String {
        if handle.self_link.starts_with("https://") {
            return handle.self_link.clone();
        }

        let base = self.client.project_url(&self.project);
        match &handle.scope {
            OperationScope::Global => format!("{}/global/operations/{}", base, handle.id),
            OperationScope::Region(region) => {
                format!("{}/regions/{}/operations/{}", base, region, handle.id)
            }
            OperationScope::Zone(zone) => {
                format!("{}/zones/{}/operations/{}", base, zone, handle.id)
            }
        }
    }
}

#[async_trait]
impl OperationPoller for ComputePoller {
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationHandle, DeleteError> {
        let operation = self.client.get_operation(&self.status_url(handle)).await?;
        Ok(operation.into())
    }
}
