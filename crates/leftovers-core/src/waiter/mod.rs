pub mod handler;
pub mod traits;
pub mod types;

// Public API exports
pub use handler::OperationWaiter;
pub use traits::OperationPoller;
pub use types::{
    OperationFailure, OperationHandle, OperationScope, OperationStatus, WaitConfig, WaitState,
};
