//! Error types for pvemcp.
//!
//! One unified error type with an explicit variant per failure kind.
//! Configuration and authentication failures are fatal at startup; every
//! other variant is reported per call through the failure envelope.

use std::fmt;
use thiserror::Error;

/// The unified error type for pvemcp operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or contradictory process configuration.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The authentication handshake was rejected or unreadable.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The caller used an operation name that is not in the catalog.
    #[error("Unknown tool: {name}")]
    UnknownOperation { name: String },

    /// Arguments did not match the operation's schema.
    #[error("invalid arguments: {0}")]
    Validation(#[from] ValidationError),

    /// The management API answered with a non-2xx status.
    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A success response that could not be interpreted.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Error {
    /// Returns true for errors that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Auth(_))
    }

    /// Returns true if the upstream rejected the request's credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Upstream(e) if e.is_auth_error())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was absent or empty.
    #[error("{name} must be set")]
    Missing { name: &'static str },

    /// Neither a token pair nor a password was supplied.
    #[error(
        "either token (PROXMOX_TOKEN_NAME + PROXMOX_TOKEN_VALUE) or PROXMOX_PASSWORD must be set"
    )]
    NoCredentials,

    /// The API base URL could not be built.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A setting had a value outside its accepted range.
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The ticket endpoint answered with a non-2xx status.
    #[error("ticket request rejected with HTTP {status}")]
    Rejected { status: u16, body: String },

    /// The ticket endpoint answered 2xx but without usable session fields.
    #[error("malformed ticket response: {reason}")]
    MalformedResponse { reason: String },

    /// Token material contains characters that cannot go into a header.
    #[error("invalid token material: {reason}")]
    InvalidToken { reason: String },
}

/// Argument validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required argument was not supplied.
    #[error("missing required argument '{field}'")]
    Missing { field: String },

    /// An argument had the wrong JSON type.
    #[error("argument '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    /// An argument cannot be placed into a URL path segment.
    #[error("argument '{field}' is not a valid path segment: {value:?}")]
    BadSegment { field: String, value: String },

    /// The arguments were not a JSON object.
    #[error("arguments must be a JSON object")]
    NotAnObject,
}

/// A non-2xx response from the management API.
#[derive(Debug)]
pub struct UpstreamError {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body, relayed verbatim.
    pub body: String,
}

impl UpstreamError {
    /// Create a new upstream error.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if this is an authentication failure.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        let body = self.body.trim();
        if !body.is_empty() {
            write!(f, ": {}", body)?;
        }
        Ok(())
    }
}

impl std::error::Error for UpstreamError {}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// TLS/SSL error.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Protocol-level errors: the upstream said 2xx but the body is unusable.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body was not valid JSON.
    #[error("response body is not JSON: {message}")]
    NotJson { message: String },

    /// Body was JSON but lacked an expected shape.
    #[error("unexpected response shape: {message}")]
    Shape { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status_and_body() {
        let err = Error::from(UpstreamError::new(500, "{\"data\":null}\n"));
        assert_eq!(err.to_string(), "HTTP 500: {\"data\":null}");
    }

    #[test]
    fn upstream_display_without_body() {
        let err = UpstreamError::new(503, "");
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[test]
    fn fatal_classification() {
        assert!(Error::from(ConfigError::NoCredentials).is_fatal());
        assert!(
            Error::from(AuthError::MalformedResponse {
                reason: "x".into()
            })
            .is_fatal()
        );
        assert!(!Error::from(UpstreamError::new(404, "")).is_fatal());
    }

    #[test]
    fn only_401_is_an_auth_failure() {
        assert!(Error::from(UpstreamError::new(401, "")).is_auth_failure());
        assert!(!Error::from(UpstreamError::new(403, "")).is_auth_failure());
        assert!(
            !Error::from(TransportError::Timeout { duration_ms: 1 }).is_auth_failure()
        );
    }

    #[test]
    fn unknown_operation_message() {
        let err = Error::UnknownOperation {
            name: "format_disk".into(),
        };
        assert_eq!(err.to_string(), "Unknown tool: format_disk");
    }
}
