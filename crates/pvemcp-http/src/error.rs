//! Mapping of reqwest failures onto the shared error taxonomy.

use std::error::Error as _;
use std::time::Duration;

use pvemcp_core::error::TransportError;

/// Classify a reqwest failure.
///
/// `timeout` is the configured per-request limit, reported back when the
/// request timed out.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }

    let message = describe(&err);
    if err.is_connect() {
        if looks_like_tls(&message) {
            TransportError::Tls { message }
        } else {
            TransportError::Connection { message }
        }
    } else {
        TransportError::Http { message }
    }
}

// reqwest's Display drops the underlying cause, which is where the useful
// detail (refused, certificate, dns) lives.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn looks_like_tls(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["certificate", "tls", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_detection() {
        assert!(looks_like_tls(
            "error sending request: invalid peer certificate: UnknownIssuer"
        ));
        assert!(!looks_like_tls("tcp connect error: Connection refused"));
    }
}
