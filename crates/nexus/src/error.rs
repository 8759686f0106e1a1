//! Error types for endpoint operations.
//!
//! Every failure a command can end with is one of these variants. The
//! messages of [`Error::NotFound`], [`Error::NoUpdate`] and [`Error::Remote`]
//! are user-facing and must stay exactly as written: remote messages are
//! surfaced verbatim, without extra wrapping.

use std::fmt;
use std::io;

/// Result type alias for endpoint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of endpoint errors.
///
/// Categories drive the process exit code and the advice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input rejected locally, never reached the network.
    Validation,
    /// The endpoint name did not resolve.
    NotFound,
    /// The requested change is already in effect.
    NoUpdate,
    /// The remote service call failed.
    Remote,
    /// The user declined the confirmation prompt.
    Cancelled,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid input",
            Self::NotFound => "Endpoint not found",
            Self::NoUpdate => "Nothing to change",
            Self::Remote => "Remote service error",
            Self::Cancelled => "Cancelled",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Validation => "Check the command flags and try again",
            Self::NotFound => "Run 'cloudctl endpoint list' to see available endpoints",
            Self::NoUpdate => "The endpoint already matches the requested state",
            Self::Remote => "Check your API key and server address, then try again",
            Self::Cancelled => "Pass --auto-confirm to skip the prompt",
            Self::Other => "Check the error details for more information",
        }
    }

    /// Process exit code for this category.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Other => 1,
            Self::Validation => 2,
            Self::NotFound => 3,
            Self::NoUpdate => 4,
            Self::Remote => 5,
            Self::Cancelled => 6,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during endpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required value is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// No endpoint carries the requested name.
    #[error("endpoint not found")]
    NotFound {
        /// Name that was looked up.
        name: String,
    },

    /// More than one endpoint carries the requested name.
    #[error("found {count} endpoints named '{name}'")]
    Ambiguous {
        /// Name that was looked up.
        name: String,
        /// Number of matches.
        count: usize,
    },

    /// The computed delta is empty.
    #[error("no updates to be made")]
    NoUpdate,

    /// The remote service rejected the call or could not be reached.
    #[error("{message}")]
    Remote {
        /// Message as reported by the service or transport.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The user declined the confirmation prompt.
    #[error("operation cancelled")]
    Cancelled,

    /// The confirmation prompt could not be shown.
    #[error("confirmation failed: {0}")]
    Confirm(String),

    /// The service answered with a payload we could not decode.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a remote error.
    pub fn remote(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Remote {
            message: message.into(),
            status,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) | Error::Ambiguous { .. } => ErrorCategory::Validation,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::NoUpdate => ErrorCategory::NoUpdate,
            Error::Remote { .. } | Error::InvalidResponse(_) => ErrorCategory::Remote,
            Error::Cancelled => ErrorCategory::Cancelled,
            Error::Confirm(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error means the command had nothing to do.
    #[must_use]
    pub fn is_no_update(&self) -> bool {
        matches!(self, Self::NoUpdate)
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Remote {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Remote {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Remote {
            message: err.to_string(),
            status: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        let not_found = Error::NotFound {
            name: "test_name".to_string(),
        };
        assert_eq!(not_found.to_string(), "endpoint not found");
        assert_eq!(Error::NoUpdate.to_string(), "no updates to be made");
    }

    #[test]
    fn test_remote_message_is_verbatim() {
        let err = Error::remote("update error", None);
        assert_eq!(err.to_string(), "update error");

        let err = Error::remote("resource version mismatch", Some(409));
        assert_eq!(err.to_string(), "resource version mismatch");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            Error::validation("missing name").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            Error::NotFound {
                name: "x".to_string()
            }
            .category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            Error::Ambiguous {
                name: "x".to_string(),
                count: 2
            }
            .category(),
            ErrorCategory::Validation
        );
        assert_eq!(Error::NoUpdate.category(), ErrorCategory::NoUpdate);
        assert_eq!(
            Error::remote("boom", None).category(),
            ErrorCategory::Remote
        );
        assert_eq!(
            Error::InvalidResponse("eof".to_string()).category(),
            ErrorCategory::Remote
        );
        assert_eq!(Error::Cancelled.category(), ErrorCategory::Cancelled);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::NotFound,
            ErrorCategory::NoUpdate,
            ErrorCategory::Remote,
            ErrorCategory::Cancelled,
            ErrorCategory::Other,
        ];
        let mut codes: Vec<i32> = categories.iter().map(ErrorCategory::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), categories.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn test_category_advice() {
        assert!(!ErrorCategory::NotFound.advice().is_empty());
        assert!(!ErrorCategory::Remote.advice().is_empty());
        assert!(format!("{}", ErrorCategory::NoUpdate).contains("Nothing"));
    }

    #[test]
    fn test_is_no_update() {
        assert!(Error::NoUpdate.is_no_update());
        assert!(!Error::Cancelled.is_no_update());
    }

    #[test]
    fn test_from_status_code() {
        let err: Error = ureq::Error::StatusCode(503).into();
        match err {
            Error::Remote { message, status } => {
                assert_eq!(message, "HTTP 503");
                assert_eq!(status, Some(503));
            }
            _ => panic!("Expected Error::Remote"),
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.category(), ErrorCategory::Remote);
        assert!(err.to_string().starts_with("invalid API response"));
    }
}
