//! Error types for backend communication

use musabaha_core::{ApprovalStatus, RecordId};
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the backend or driving a panel
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or protocol failure before a response was read
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the response body, or the status reason
        message: String,
    },

    /// The backend answered with `success: false`
    #[error("Request rejected by server: {message}")]
    Rejected {
        /// Explanation from the response body
        message: String,
    },

    /// Response body was not the expected JSON
    #[error("Failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded
        context: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// An authenticated endpoint was called without a token
    #[error("Missing credentials: {resource} endpoints require a bearer token")]
    MissingCredentials {
        /// Resource whose endpoint needs the token
        resource: &'static str,
    },

    /// The record is not in the loaded list
    #[error("No {resource} with id {id}")]
    NotFound {
        /// Resource name
        resource: &'static str,
        /// Requested identifier
        id: RecordId,
    },

    /// The requested status change is not allowed
    #[error("Cannot change {resource} {id} from {from} to {to}")]
    InvalidTransition {
        /// Resource name
        resource: &'static str,
        /// Record identifier
        id: RecordId,
        /// Current status
        from: ApprovalStatus,
        /// Requested status
        to: ApprovalStatus,
    },

    /// Client could not be configured
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Error from the core crate
    #[error(transparent)]
    Core(#[from] musabaha_core::Error),
}

impl ClientError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Whether the backend received the request and refused it
    ///
    /// False for failures where the outcome on the server is unknown.
    #[must_use]
    pub const fn is_server_refusal(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Rejected { .. })
    }

    /// Whether the request never left the client
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials { .. }
                | Self::NotFound { .. }
                | Self::InvalidTransition { .. }
                | Self::Configuration { .. }
                | Self::Core(_)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_error_display() {
        let error = ClientError::Status {
            status: 401,
            message: "Unauthorized".to_string(),
        };

        assert_eq!(error.to_string(), "Server returned 401: Unauthorized");
        assert!(error.is_server_refusal());
        assert!(!error.is_local());
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = ClientError::InvalidTransition {
            resource: "payment",
            id: RecordId::from("12"),
            from: ApprovalStatus::Approved,
            to: ApprovalStatus::Rejected,
        };

        assert_eq!(
            error.to_string(),
            "Cannot change payment 12 from approved to rejected"
        );
        assert!(error.is_local());
    }

    #[test]
    fn test_decode_keeps_source() {
        use std::error::Error as _;

        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let error = ClientError::decode("payment list", source);

        assert!(error.to_string().starts_with("Failed to decode payment list"));
        assert!(error.source().is_some());
        assert!(!error.is_server_refusal());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error = ClientError::from(musabaha_core::Error::validation("id", "empty"));

        assert_eq!(error.to_string(), "Validation error: id - empty");
    }
}
