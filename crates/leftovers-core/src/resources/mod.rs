pub mod errors;
pub mod filter;
pub mod set;
pub mod traits;

// Public API exports
pub use errors::{DeleteError, ListError};
pub use filter::NameFilter;
pub use set::{ListOutcome, ResourceSet, list_resource_sets};
pub use traits::{Deletable, Lister};
