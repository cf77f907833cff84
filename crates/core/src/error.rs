//! Error types for mku-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for mku-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// A failed call against the remote API
///
/// `status` is `None` when the request never produced an HTTP response
/// (connection refused, timeout, TLS failure). `code` and `message` are
/// taken verbatim from the server's error envelope when one was returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub message: String,
}

impl ApiFailure {
    /// A failure that happened before any HTTP response arrived
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// A failure reported by the server with a non-success status
    pub fn http(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code,
            message: message.into(),
        }
    }

    /// Whether the server rejected the request because the name is taken
    pub fn is_duplicate_name(&self) -> bool {
        self.code.as_deref() == Some("DUPLICATE_NAME")
    }

    fn exit_code(&self) -> i32 {
        if self.is_duplicate_name() {
            return 6; // Conflict
        }
        match self.status {
            None => 3,            // NetworkError
            Some(401 | 403) => 4, // AuthError
            Some(404) => 5,       // NotFound
            Some(409) => 6,       // Conflict
            Some(_) => 1,         // GeneralError
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.code) {
            (Some(status), Some(code)) => write!(f, "HTTP {status} {code}: {}", self.message),
            (Some(status), None) => write!(f, "HTTP {status}: {}", self.message),
            (None, _) => write!(f, "{}", self.message),
        }
    }
}

/// Error types for mku-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// File name normalizes to an empty emoji name
    #[error("Invalid emoji name: {0}")]
    InvalidName(String),

    /// Malformed include pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    /// Input path or files not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Drive upload failed
    #[error("Upload failed: {0}")]
    Upload(ApiFailure),

    /// Emoji registration failed
    #[error("Registration failed: {0}")]
    Registration(ApiFailure),

    /// Any other remote call failed
    #[error("API error: {0}")]
    Api(ApiFailure),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::InvalidName(_) | Error::InvalidPattern(_) => 2, // UsageError
            Error::InvalidUrl(_) => 2,                                                // UsageError
            Error::NotFound(_) => 5,                                                  // NotFound
            Error::Upload(f) | Error::Registration(f) | Error::Api(f) => f.exit_code(),
            Error::Io(_) | Error::Json(_) => 1, // GeneralError
        }
    }

    /// The remote failure behind this error, if any
    pub fn api_failure(&self) -> Option<&ApiFailure> {
        match self {
            Error::Upload(f) | Error::Registration(f) | Error::Api(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::InvalidName("test".into()).exit_code(), 2);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(
            Error::Upload(ApiFailure::transport("timed out")).exit_code(),
            3
        );
        assert_eq!(
            Error::Registration(ApiFailure::http(403, None, "forbidden")).exit_code(),
            4
        );
        assert_eq!(
            Error::Api(ApiFailure::http(404, None, "no such endpoint")).exit_code(),
            5
        );
        assert_eq!(
            Error::Registration(ApiFailure::http(409, None, "taken")).exit_code(),
            6
        );
        assert_eq!(
            Error::Upload(ApiFailure::http(500, None, "boom")).exit_code(),
            1
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidName(".hidden".into());
        assert_eq!(err.to_string(), "Invalid emoji name: .hidden");

        let err = Error::Registration(ApiFailure::http(
            400,
            Some("DUPLICATE_NAME".into()),
            "The name is already used.",
        ));
        assert_eq!(
            err.to_string(),
            "Registration failed: HTTP 400 DUPLICATE_NAME: The name is already used."
        );

        let err = Error::Upload(ApiFailure::transport("connection refused"));
        assert_eq!(err.to_string(), "Upload failed: connection refused");
    }

    #[test]
    fn test_duplicate_name_detection() {
        let failure = ApiFailure::http(400, Some("DUPLICATE_NAME".into()), "dup");
        assert!(failure.is_duplicate_name());
        assert_eq!(Error::Registration(failure).exit_code(), 6);
        assert!(!ApiFailure::transport("x").is_duplicate_name());
    }

    #[test]
    fn test_api_failure_accessor() {
        let err = Error::Api(ApiFailure::http(500, None, "oops"));
        assert_eq!(err.api_failure().and_then(|f| f.status), Some(500));
        assert!(Error::Config("x".into()).api_failure().is_none());
    }
}
