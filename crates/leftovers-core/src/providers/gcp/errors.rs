use crate::errors::LeftoversError;
use crate::resources::{DeleteError, ListError};

use super::operation::classify_api_error;

#[derive(Debug, thiserror::Error)]
pub enum GcpError {
    #[error("No GCP project configured. Pass --gcp-project or set GOOGLE_CLOUD_PROJECT")]
    MissingProject,

    #[error("No GCP access token. Pass --gcp-token or set GOOGLE_OAUTH_ACCESS_TOKEN")]
    MissingToken,

    #[error("Unknown GCP resource type '{name}'")]
    UnknownKind { name: String },

    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("GCP API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode GCP API response: {source}")]
    Decode {
        #[from]
        source: serde_json::Error,
    },
}

impl GcpError {
    pub fn into_list_error(self, resource_type: &str) -> ListError {
        ListError::ListFailed {
            resource_type: resource_type.to_string(),
            message: self.to_string(),
        }
    }
}

impl From<GcpError> for DeleteError {
    fn from(error: GcpError) -> Self {
        match error {
            GcpError::Api { status, body } => classify_api_error(status, &body),
            other => DeleteError::Provider {
                message: other.to_string(),
            },
        }
    }
}

impl LeftoversError for GcpError {
    fn error_code(&self) -> &'static str {
        match self {
            GcpError::MissingProject => "GCP_MISSING_PROJECT",
            GcpError::MissingToken => "GCP_MISSING_TOKEN",
            GcpError::UnknownKind { .. } => "GCP_UNKNOWN_KIND",
            GcpError::Http { .. } => "GCP_HTTP_ERROR",
            GcpError::Api { .. } => "GCP_API_ERROR",
            GcpError::Decode { .. } => "GCP_DECODE_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            GcpError::MissingProject | GcpError::MissingToken | GcpError::UnknownKind { .. }
        )
    }
}
