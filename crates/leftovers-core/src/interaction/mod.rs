pub mod gate;
pub mod terminal;
pub mod traits;

// Public API exports
pub use gate::ConfirmationGate;
pub use terminal::{TerminalAdvisor, TerminalPrompter, is_confirmation_accepted};
pub use traits::{Advisor, Prompter};
