use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::client::{ApiItem, GcpClient};
use super::errors::GcpError;
use super::kinds::{KindScope, ResourceKind};
use crate::resources::{Deletable, DeleteError, ListError, Lister};
use crate::waiter::OperationWaiter;

/// A listed compute resource. Deleting it issues the DELETE call and then
/// waits for the returned operation.
pub struct ComputeResource {
    name: String,
    label: &'static str,
    identifier: String,
    self_link: String,
    client: Arc<GcpClient>,
    waiter: OperationWaiter,
}

impl ComputeResource {
    pub fn new(
        kind: &ResourceKind,
        item: ApiItem,
        location: Option<&str>,
        client: Arc<GcpClient>,
        waiter: OperationWaiter,
    ) -> Self {
        let identifier = describe(kind.scope, &item.name, location);
        Self {
            name: item.name,
            label: kind.label,
            identifier,
            self_link: item.self_link,
            client,
            waiter,
        }
    }

    pub fn self_link(&self) -> &str {
        &self.self_link
    }
}

/// `name (zone: us-central1-a)`, `name (region: us-central1)` or just `name`.
pub fn describe(scope: KindScope, name: &str, location: Option<&str>) -> String {
    match (scope, location) {
        (KindScope::Zonal, Some(zone)) => format!("{} (zone: {})", name, zone),
        (KindScope::Regional, Some(region)) => format!("{} (region: {})", name, region),
        _ => name.to_string(),
    }
}

#[async_trait]
impl Deletable for ComputeResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &str {
        self.label
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        let operation = self.client.delete(&self.self_link).await?;
        let handle = self.waiter.wait(operation.into()).await?;

        debug!(
            event = "core.gcp.delete_completed",
            resource_type = self.label,
            identifier = self.identifier,
            operation = handle.id
        );
        Ok(())
    }
}

/// Lists one compute kind across every location its scope covers.
pub struct ComputeLister {
    kind: &'static ResourceKind,
    client: Arc<GcpClient>,
    waiter: OperationWaiter,
}

impl ComputeLister {
    pub fn new(kind: &'static ResourceKind, client: Arc<GcpClient>, waiter: OperationWaiter) -> Self {
        Self {
            kind,
            client,
            waiter,
        }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    async fn list_items(&self, project: &str) -> Result<Vec<(ApiItem, Option<String>)>, GcpError> {
        let base = self.client.project_url(project);
        let collection = self.kind.collection;

        let items = match self.kind.scope {
            KindScope::Global => self
                .client
                .list_all(&format!("{}/global/{}", base, collection))
                .await?
                .into_iter()
                .map(|item| (item, None))
                .collect(),
            KindScope::Regional => {
                let mut items = Vec::new();
                for region in self.client.regions(project).await? {
                    let url = format!("{}/regions/{}/{}", base, region, collection);
                    for item in self.client.list_all(&url).await? {
                        items.push((item, Some(region.clone())));
                    }
                }
                items
            }
            KindScope::Zonal => {
                let mut items = Vec::new();
                for zone in self.client.zones(project).await? {
                    let url = format!("{}/zones/{}/{}", base, zone, collection);
                    for item in self.client.list_all(&url).await? {
                        items.push((item, Some(zone.clone())));
                    }
                }
                items
            }
        };

        Ok(items)
    }
}

#[async_trait]
impl Lister for ComputeLister {
    fn resource_type(&self) -> &str {
        self.kind.label
    }

    async fn list(&self, scope: &str) -> Result<Vec<Arc<dyn Deletable>>, ListError> {
        let items = self
            .list_items(scope)
            .await
            .map_err(|e| e.into_list_error(self.kind.label))?;

        let resources: Vec<Arc<dyn Deletable>> = items
            .into_iter()
            .filter(|(item, _)| !self.kind.is_protected(&item.name))
            .map(|(item, location)| {
                Arc::new(ComputeResource::new(
                    self.kind,
                    item,
                    location.as_deref(),
                    self.client.clone(),
                    self.waiter.clone(),
                )) as Arc<dyn Deletable>
            })
            .collect();

        info!(
            event = "core.gcp.kind_listed",
            resource_type = self.kind.label,
            project = scope,
            count = resources.len()
        );
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::gcp::kinds::find_kind;
    use crate::providers::gcp::operation::ComputePoller;
    use crate::waiter::{OperationHandle, OperationPoller, WaitConfig};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct NeverPolled;

    #[async_trait]
    impl OperationPoller for NeverPolled {
        async fn poll(&self, handle: &OperationHandle) -> Result<OperationHandle, DeleteError> {
            Ok(handle.clone())
        }
    }

    fn resource(kind: &str, name: &str, location: Option<&str>) -> ComputeResource {
        let waiter = OperationWaiter::new(
            Arc::new(NeverPolled),
            WaitConfig::default(),
            CancellationToken::new(),
        );
        ComputeResource::new(
            find_kind(kind).unwrap(),
            ApiItem {
                name: name.to_string(),
                self_link: format!("https://x/{}", name),
            },
            location,
            Arc::new(GcpClient::new("token").unwrap()),
            waiter,
        )
    }

    #[test]
    fn test_zonal_identifier() {
        let disk = resource("disk", "ci-disk", Some("us-central1-a"));
        assert_eq!(disk.name(), "ci-disk");
        assert_eq!(disk.identifier(), "ci-disk (zone: us-central1-a)");
        assert_eq!(disk.resource_type(), "Disk");
        assert_eq!(disk.self_link(), "https://x/ci-disk");
    }

    #[test]
    fn test_regional_identifier() {
        let address = resource("address", "ci-ip", Some("us-east1"));
        assert_eq!(address.identifier(), "ci-ip (region: us-east1)");
    }

    #[test]
    fn test_global_identifier_is_name() {
        let network = resource("network", "ci-net", None);
        assert_eq!(network.identifier(), "ci-net");
    }

    const DISK_PATH: &str = "/compute/v1/projects/ci-project/zones/us-east1-b/disks/ci-disk";

    /// A zonal disk whose client and poller both talk to `server`.
    fn served_disk(server: &mockito::Server) -> ComputeResource {
        let client = Arc::new(
            GcpClient::with_endpoints(
                "test-token",
                format!("{}/compute/v1", server.url()),
                format!("{}/sql/v1beta4", server.url()),
            )
            .unwrap(),
        );
        let poller = Arc::new(ComputePoller::new(client.clone(), "ci-project"));
        let waiter = OperationWaiter::new(
            poller,
            WaitConfig {
                poll_interval: Duration::from_millis(10),
                timeout: Duration::from_secs(10),
            },
            CancellationToken::new(),
        );
        ComputeResource::new(
            find_kind("disk").unwrap(),
            ApiItem {
                name: "ci-disk".to_string(),
                self_link: format!("{}{}", server.url(), DISK_PATH),
            },
            Some("us-east1-b"),
            client,
            waiter,
        )
    }

    #[tokio::test]
    async fn test_delete_waits_for_running_operation_to_finish() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", DISK_PATH)
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(
                r#"{"name": "op-1", "status": "RUNNING",
                    "zone": "https://compute.googleapis.com/compute/v1/projects/ci-project/zones/us-east1-b"}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let status = server
            .mock(
                "GET",
                "/compute/v1/projects/ci-project/zones/us-east1-b/operations/op-1",
            )
            .with_status(200)
            .with_body(r#"{"name": "op-1", "status": "DONE"}"#)
            .expect(1)
            .create_async()
            .await;

        served_disk(&server).delete().await.unwrap();

        delete.assert_async().await;
        status.assert_async().await;
    }

    #[tokio::test]
    async fn test_in_use_rejection_is_dependency_blocked() {
        let mut server = mockito::Server::new_async().await;
        let _delete = server
            .mock("DELETE", DISK_PATH)
            .with_status(400)
            .with_body(
                r#"{"error": {"code": 400,
                    "message": "The disk resource 'ci-disk' is already being used by 'ci-vm'",
                    "errors": [{"reason": "resourceInUseByAnotherResource"}]}}"#,
            )
            .create_async()
            .await;

        let error = served_disk(&server).delete().await.unwrap_err();
        assert_eq!(
            error,
            DeleteError::DependencyBlocked {
                message: "The disk resource 'ci-disk' is already being used by 'ci-vm'"
                    .to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_resource_is_already_gone() {
        let mut server = mockito::Server::new_async().await;
        let _delete = server
            .mock("DELETE", DISK_PATH)
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "message": "The resource 'ci-disk' was not found"}}"#)
            .create_async()
            .await;

        let error = served_disk(&server).delete().await.unwrap_err();
        assert!(error.is_already_gone());
    }

    #[tokio::test]
    async fn test_zonal_lister_walks_every_zone() {
        let mut server = mockito::Server::new_async().await;
        let _zones = server
            .mock("GET", "/compute/v1/projects/ci-project/zones")
            .with_status(200)
            .with_body(r#"{"items": [{"name": "us-east1-b"}, {"name": "us-east1-c"}]}"#)
            .create_async()
            .await;
        let _east_b = server
            .mock("GET", "/compute/v1/projects/ci-project/zones/us-east1-b/disks")
            .with_status(200)
            .with_body(r#"{"items": [{"name": "ci-disk"}]}"#)
            .create_async()
            .await;
        let _east_c = server
            .mock("GET", "/compute/v1/projects/ci-project/zones/us-east1-c/disks")
            .with_status(200)
            .with_body(r#"{"items": [{"name": "ci-disk"}]}"#)
            .create_async()
            .await;

        let disk = served_disk(&server);
        let lister = ComputeLister::new(
            find_kind("disk").unwrap(),
            disk.client.clone(),
            disk.waiter.clone(),
        );
        let identifiers: Vec<String> = lister
            .list("ci-project")
            .await
            .unwrap()
            .iter()
            .map(|item| item.identifier().to_string())
            .collect();

        assert_eq!(
            identifiers,
            vec!["ci-disk (zone: us-east1-b)", "ci-disk (zone: us-east1-c)"]
        );
    }
}
