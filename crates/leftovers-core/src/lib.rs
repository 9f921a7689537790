//! leftovers-core: Core library for sweeping leftover cloud resources
//!
//! This library lists provider resources, filters them by name, asks for
//! confirmation and deletes them over repeated passes until nothing more
//! can be removed. It is used by the `leftovers` CLI.
//!
//! # Main Entry Points
//!
//! - [`sweep`] - Multi-pass deletion and the sweep report
//! - [`resources`] - `Deletable` and `Lister` contracts, filtered resource sets
//! - [`waiter`] - Bounded polling of asynchronous provider operations
//! - [`interaction`] - Confirmation gate and terminal prompts
//! - [`providers`] - Provider adapters
//! - [`config`] - Configuration management

pub mod config;
pub mod errors;
pub mod events;
pub mod interaction;
pub mod logging;
pub mod providers;
pub mod resources;
pub mod sweep;
pub mod waiter;

// Re-export commonly used types at crate root for convenience
pub use config::LeftoversConfig;
pub use errors::{LeftoversError, LeftoversResult};
pub use interaction::{Advisor, ConfirmationGate, Prompter, TerminalAdvisor, TerminalPrompter};
pub use resources::{
    Deletable, DeleteError, ListError, Lister, NameFilter, ResourceSet, list_resource_sets,
};
pub use sweep::{Outcome, SweepOptions, SweepReport, Sweeper};
pub use waiter::{OperationHandle, OperationPoller, OperationWaiter, WaitConfig};

// Re-export handler modules as the primary API
pub use sweep::handler as sweep_ops;
pub use waiter::handler as waiter_ops;

// Re-export logging initialization
pub use logging::init_logging;
