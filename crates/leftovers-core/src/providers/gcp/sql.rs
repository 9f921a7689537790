//! Cloud SQL instances, swept through the SQL admin API.
//!
//! Deletes return SQL admin operations, which live under the project rather
//! than a zone or region, so they get their own poller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::client::{ApiItem, GcpClient};
use super::kinds::ResourceKind;
use crate::resources::{Deletable, DeleteError, ListError, Lister};
use crate::waiter::{OperationHandle, OperationPoller, OperationWaiter};

/// Polls SQL admin operations (`PENDING`, `RUNNING`, `DONE`).
pub struct SqlPoller {
    client: Arc<GcpClient>,
    project: String,
}

impl SqlPoller {
    pub fn new(client: Arc<GcpClient>, project: impl Into<String>) -> Self {
        Self {
            client,
            project: project.into(),
        }
    }

    pub fn status_url(&self, handle: &OperationHandle) -> String {
        format!(
            "{}/operations/{}",
            self.client.sql_project_url(&self.project),
            handle.id
        )
    }
}

#[async_trait]
impl OperationPoller for SqlPoller {
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationHandle, DeleteError> {
        let operation = self.client.get_operation(&self.status_url(handle)).await?;
        Ok(operation.into())
    }
}

pub struct SqlInstance {
    name: String,
    label: &'static str,
    url: String,
    client: Arc<GcpClient>,
    waiter: OperationWaiter,
}

impl SqlInstance {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Deletable for SqlInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &str {
        self.label
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        let operation = self.client.delete(&self.url).await?;
        let handle = self.waiter.wait(operation.into()).await?;

        debug!(
            event = "core.gcp.sql_delete_completed",
            instance = self.name,
            operation = handle.id
        );
        Ok(())
    }
}

/// Lists every Cloud SQL instance in a project.
pub struct SqlInstanceLister {
    kind: &'static ResourceKind,
    client: Arc<GcpClient>,
    waiter: OperationWaiter,
}

impl SqlInstanceLister {
    pub fn new(kind: &'static ResourceKind, client: Arc<GcpClient>, waiter: OperationWaiter) -> Self {
        Self {
            kind,
            client,
            waiter,
        }
    }

    fn instance(&self, project: &str, item: ApiItem) -> SqlInstance {
        // Built from the configured endpoint rather than the API's selfLink.
        let url = format!(
            "{}/{}/{}",
            self.client.sql_project_url(project),
            self.kind.collection,
            item.name
        );
        SqlInstance {
            name: item.name,
            label: self.kind.label,
            url,
            client: self.client.clone(),
            waiter: self.waiter.clone(),
        }
    }
}

#[async_trait]
impl Lister for SqlInstanceLister {
    fn resource_type(&self) -> &str {
        self.kind.label
    }

    async fn list(&self, scope: &str) -> Result<Vec<Arc<dyn Deletable>>, ListError> {
        let url = format!("{}/{}", self.client.sql_project_url(scope), self.kind.collection);
        let items = self
            .client
            .list_all(&url)
            .await
            .map_err(|e| e.into_list_error(self.kind.label))?;

        let instances: Vec<Arc<dyn Deletable>> = items
            .into_iter()
            .map(|item| Arc::new(self.instance(scope, item)) as Arc<dyn Deletable>)
            .collect();

        info!(
            event = "core.gcp.kind_listed",
            resource_type = self.kind.label,
            project = scope,
            count = instances.len()
        );
        Ok(instances)
    }
}
