//! Google Cloud adapter: Compute Engine kinds plus Cloud SQL instances.
//!
//! Authenticates with a bearer access token and talks to the compute and
//! SQL admin REST APIs directly.

pub mod client;
pub mod errors;
pub mod kinds;
pub mod operation;
pub mod resources;
pub mod sql;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::resources::Lister;
use crate::waiter::{OperationWaiter, WaitConfig};

pub use client::GcpClient;
pub use errors::GcpError;
pub use kinds::{KINDS, KindScope, ResourceKind, Service, find_kind};
pub use operation::{ComputePoller, classify_api_error};
pub use resources::{ComputeLister, ComputeResource};
pub use sql::{SqlInstance, SqlInstanceLister, SqlPoller};

pub struct GcpProvider {
    project: String,
    client: Arc<GcpClient>,
    compute_waiter: OperationWaiter,
    sql_waiter: OperationWaiter,
}

impl GcpProvider {
    pub fn new(
        project: Option<String>,
        token: Option<String>,
        wait_config: WaitConfig,
        cancel: CancellationToken,
    ) -> Result<Self, GcpError> {
        let project = project
            .filter(|p| !p.trim().is_empty())
            .ok_or(GcpError::MissingProject)?;
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(GcpError::MissingToken)?;
        Ok(Self::with_client(
            project,
            Arc::new(GcpClient::new(token)?),
            wait_config,
            cancel,
        ))
    }

    pub fn with_client(
        project: String,
        client: Arc<GcpClient>,
        wait_config: WaitConfig,
        cancel: CancellationToken,
    ) -> Self {
        let compute_waiter = OperationWaiter::new(
            Arc::new(ComputePoller::new(client.clone(), project.clone())),
            wait_config,
            cancel.clone(),
        );
        let sql_waiter = OperationWaiter::new(
            Arc::new(SqlPoller::new(client.clone(), project.clone())),
            wait_config,
            cancel,
        );
        Self {
            project,
            client,
            compute_waiter,
            sql_waiter,
        }
    }

    /// The project listers run against.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// One lister per kind, in deletion order.
    pub fn listers(&self) -> Vec<Arc<dyn Lister>> {
        KINDS.iter().map(|kind| self.lister(kind)).collect()
    }

    pub fn lister_for(&self, name: &str) -> Result<Arc<dyn Lister>, GcpError> {
        find_kind(name)
            .map(|kind| self.lister(kind))
            .ok_or_else(|| GcpError::UnknownKind {
                name: name.to_string(),
            })
    }

    fn lister(&self, kind: &'static ResourceKind) -> Arc<dyn Lister> {
        match kind.service {
            Service::Compute => Arc::new(ComputeLister::new(
                kind,
                self.client.clone(),
                self.compute_waiter.clone(),
            )),
            Service::Sql => Arc::new(SqlInstanceLister::new(
                kind,
                self.client.clone(),
                self.sql_waiter.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GcpProvider {
        GcpProvider::new(
            Some("ci-project".to_string()),
            Some("token".to_string()),
            WaitConfig::default(),
            CancellationToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_project() {
        let result = GcpProvider::new(
            Some("  ".to_string()),
            Some("token".to_string()),
            WaitConfig::default(),
            CancellationToken::new(),
        );
        assert!(matches!(result, Err(GcpError::MissingProject)));
    }

    #[test]
    fn test_missing_token() {
        let result = GcpProvider::new(
            Some("ci-project".to_string()),
            None,
            WaitConfig::default(),
            CancellationToken::new(),
        );
        assert!(matches!(result, Err(GcpError::MissingToken)));
    }

    #[test]
    fn test_listers_follow_kind_order() {
        let provider = provider();
        let types: Vec<String> = provider
            .listers()
            .iter()
            .map(|l| l.resource_type().to_string())
            .collect();
        assert_eq!(types.len(), KINDS.len());
        assert_eq!(types.first().map(String::as_str), Some("SQL Instance"));
        assert_eq!(types.get(1).map(String::as_str), Some("Compute Instance"));
        assert_eq!(types.last().map(String::as_str), Some("Network"));
        assert_eq!(provider.project(), "ci-project");
    }

    #[test]
    fn test_lister_for_unknown_kind() {
        let result = provider().lister_for("bucket");
        assert!(matches!(result, Err(GcpError::UnknownKind { .. })));
        assert!(provider().lister_for("target-pool").is_ok());
        let sql = provider().lister_for("sql-instance").unwrap();
        assert_eq!(sql.resource_type(), "SQL Instance");
    }
}
