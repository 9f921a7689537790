use async_trait::async_trait;

use super::types::OperationHandle;
use crate::resources::DeleteError;

/// Status endpoint for one family of provider operations.
///
/// The waiter's state machine is identical for every provider; only the
/// query differs (compute zone, region or global operations, or SQL admin
/// operations).
#[async_trait]
pub trait OperationPoller: Send + Sync {
    /// Fetch the current state of `handle`.
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationHandle, DeleteError>;
}
