//! Session secret types.

use std::fmt;

/// A precomputed `Authorization` header value for API token mode.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Build the header value from its parts.
    ///
    /// ```
    /// use pvemcp_core::ApiToken;
    ///
    /// let token = ApiToken::from_parts("root@pam", "automation", "abc");
    /// assert_eq!(token.as_str(), "PVEAPIToken=root@pam!automation=abc");
    /// ```
    pub fn from_parts(user: &str, token_name: &str, token_value: &str) -> Self {
        Self(format!("PVEAPIToken={}!{}={}", user, token_name, token_value))
    }

    /// Returns the header value.
    ///
    /// Use only when constructing HTTP authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&"[REDACTED]").finish()
    }
}

/// An authentication ticket, sent as the `PVEAuthCookie` cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct Ticket(String);

impl Ticket {
    pub fn new(ticket: impl Into<String>) -> Self {
        Self(ticket.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Cookie` header value carrying this ticket.
    pub fn cookie(&self) -> String {
        format!("PVEAuthCookie={}", self.0)
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ticket").field(&"[REDACTED]").finish()
    }
}

/// Anti-forgery token required on mutating requests in ticket mode.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"[REDACTED]").finish()
    }
}
