//! Capability contracts implemented by every provider adapter.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::{DeleteError, ListError};

/// A single provider resource that can be removed.
///
/// Instances are built fresh from a live listing call for every run and are
/// never persisted. `delete` must be safe to call again after a failure; an
/// already-removed resource reports `DeleteError::NotFound`. Implementations
/// never prompt.
#[async_trait]
pub trait Deletable: Send + Sync {
    /// Provider name of the resource, used for filtering.
    fn name(&self) -> &str;

    /// Resource-kind label (e.g. "Compute Instance").
    fn resource_type(&self) -> &str;

    /// Human-readable identity used in prompts and the report.
    ///
    /// Defaults to `name()`. Adapters decorate it when the bare name is
    /// ambiguous, e.g. with the zone or attached roles.
    fn identifier(&self) -> &str {
        self.name()
    }

    /// Remove the resource, blocking until any provider operation finishes.
    async fn delete(&self) -> Result<(), DeleteError>;
}

/// Produces the live resources of one kind within a provider scope.
#[async_trait]
pub trait Lister: Send + Sync {
    /// Resource-kind label shared by every item this lister returns.
    fn resource_type(&self) -> &str;

    /// List every resource of this kind in `scope` (project, region, ...).
    async fn list(&self, scope: &str) -> Result<Vec<Arc<dyn Deletable>>, ListError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bucket {
        name: String,
    }

    #[async_trait]
    impl Deletable for Bucket {
        fn name(&self) -> &str {
            &self.name
        }

        fn resource_type(&self) -> &str {
            "Storage Bucket"
        }

        async fn delete(&self) -> Result<(), DeleteError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_identifier_defaults_to_name() {
        let bucket = Bucket {
            name: "ci-bucket".to_string(),
        };
        assert_eq!(bucket.identifier(), "ci-bucket");
        assert_eq!(bucket.resource_type(), "Storage Bucket");
        assert!(bucket.delete().await.is_ok());
    }
}
