//! Error types for the Chronos and Marathon clients.
//!
//! # Design
//! Validation failures are raised before anything touches the network and
//! always name the operation plus the offending field(s). Everything that
//! happens after a request leaves the client lands in `TransportError`; the
//! raw status and body of non-2xx responses are kept so callers can decide
//! what a 404 or 409 means for them.

use thiserror::Error;

use crate::config::ConfigError;

/// A precondition on an operation's arguments did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{operation}: {field} required")]
    Missing {
        operation: &'static str,
        field: &'static str,
    },

    #[error("{operation}: {} invalid with {}", .fields[1], .fields[0])]
    Conflict {
        operation: &'static str,
        fields: [&'static str; 2],
    },

    #[error("{operation}: one of {} required", .fields.join(", "))]
    MissingOneOf {
        operation: &'static str,
        fields: &'static [&'static str],
    },
}

impl ValidationError {
    pub fn operation(&self) -> &'static str {
        match self {
            ValidationError::Missing { operation, .. }
            | ValidationError::Conflict { operation, .. }
            | ValidationError::MissingOneOf { operation, .. } => *operation,
        }
    }
}

/// Failures from the round-trip itself or from decoding its result.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response was received (connection refused, DNS, TLS, ...).
    #[error("transport failed: {0}")]
    Io(String),

    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON shape the operation expects.
    #[error("decoding response failed: {0}")]
    Decode(String),
}

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A path template referenced a parameter that was not supplied.
    #[error("missing path parameter `{name}` for {template}")]
    MissingParameter { template: String, name: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    /// HTTP status of a non-2xx response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_operation_and_fields() {
        let err = ValidationError::Missing {
            operation: "jobs.create",
            field: "owner",
        };
        assert_eq!(err.to_string(), "jobs.create: owner required");

        let err = ValidationError::Conflict {
            operation: "apps.kill",
            fields: ["task", "host"],
        };
        assert_eq!(err.to_string(), "apps.kill: host invalid with task");

        let err = ValidationError::MissingOneOf {
            operation: "jobs.stats",
            fields: &["name", "percentile"],
        };
        assert_eq!(err.to_string(), "jobs.stats: one of name, percentile required");
        assert_eq!(err.operation(), "jobs.stats");
    }

    #[test]
    fn status_helpers() {
        let err = ApiError::from(TransportError::Status {
            status: 404,
            body: String::new(),
        });
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(!err.is_validation());

        let err = ApiError::from(TransportError::Timeout);
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
