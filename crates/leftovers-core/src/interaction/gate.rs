use std::sync::Arc;

use tracing::info;

use super::traits::Prompter;

/// Yes/no decision wrapped around every delete attempt.
#[derive(Clone)]
pub enum ConfirmationGate {
    /// Approve everything without asking (non-interactive or forced runs).
    AutoApprove,
    /// Ask the prompter once per outstanding item per pass.
    Interactive(Arc<dyn Prompter>),
}

impl ConfirmationGate {
    pub fn interactive(prompter: Arc<dyn Prompter>) -> Self {
        ConfirmationGate::Interactive(prompter)
    }

    pub fn from_no_confirm(no_confirm: bool, prompter: Arc<dyn Prompter>) -> Self {
        if no_confirm {
            ConfirmationGate::AutoApprove
        } else {
            ConfirmationGate::Interactive(prompter)
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, ConfirmationGate::Interactive(_))
    }

    pub fn confirm(&self, resource_type: &str, resource_name: &str) -> bool {
        match self {
            ConfirmationGate::AutoApprove => true,
            ConfirmationGate::Interactive(prompter) => {
                let approved = prompter.prompt_with_details(resource_type, resource_name);
                info!(
                    event = "core.interaction.confirm_answered",
                    resource_type = resource_type,
                    resource = resource_name,
                    approved = approved
                );
                approved
            }
        }
    }
}

impl std::fmt::Debug for ConfirmationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationGate::AutoApprove => f.write_str("AutoApprove"),
            ConfirmationGate::Interactive(_) => f.write_str("Interactive"),
        }
    }
}
