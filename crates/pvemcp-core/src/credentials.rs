//! Credential resolution.

use std::fmt;

use tracing::warn;

use crate::error::ConfigError;

/// Which authentication mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Stateless API token sent on every request.
    Token,
    /// Ticket obtained from `/access/ticket` with a password.
    Password,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Token => f.write_str("API Token"),
            AuthMode::Password => f.write_str("Password"),
        }
    }
}

/// Login credentials for the management API.
///
/// Exactly one mode is populated. The value is immutable once resolved.
///
/// # Security
///
/// Token values and passwords are never exposed in Debug output.
///
/// # Example
///
/// ```
/// use pvemcp_core::{AuthMode, Credentials};
///
/// let creds = Credentials::resolve("root@pam", Some("automation"), Some("secret"), None).unwrap();
/// assert_eq!(creds.mode(), AuthMode::Token);
/// assert_eq!(creds.user(), "root@pam");
/// ```
#[derive(Clone)]
pub enum Credentials {
    Token {
        user: String,
        token_name: String,
        token_value: String,
    },
    Password {
        user: String,
        password: String,
    },
}

impl Credentials {
    /// Create API token credentials.
    pub fn token(
        user: impl Into<String>,
        token_name: impl Into<String>,
        token_value: impl Into<String>,
    ) -> Self {
        Credentials::Token {
            user: user.into(),
            token_name: token_name.into(),
            token_value: token_value.into(),
        }
    }

    /// Create password credentials.
    pub fn password(user: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Pick a single credential mode from the optional settings.
    ///
    /// A complete token pair wins over a password. Empty strings count as
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the user is missing or neither a complete
    /// token pair nor a password is present.
    pub fn resolve(
        user: &str,
        token_name: Option<&str>,
        token_value: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let user = present(Some(user)).ok_or(ConfigError::Missing {
            name: "PROXMOX_USER",
        })?;

        match (present(token_name), present(token_value), present(password)) {
            (Some(name), Some(value), password) => {
                if password.is_some() {
                    warn!("both token and password are set, using API token authentication");
                }
                Ok(Self::token(user, name, value))
            }
            (_, _, Some(password)) => Ok(Self::password(user, password)),
            _ => Err(ConfigError::NoCredentials),
        }
    }

    /// Returns the active authentication mode.
    pub fn mode(&self) -> AuthMode {
        match self {
            Credentials::Token { .. } => AuthMode::Token,
            Credentials::Password { .. } => AuthMode::Password,
        }
    }

    /// Returns the user identity, including the realm (e.g. `root@pam`).
    pub fn user(&self) -> &str {
        match self {
            Credentials::Token { user, .. } | Credentials::Password { user, .. } => user,
        }
    }
}

/// Blank values count as absent; anything else is kept byte for byte.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

// Intentionally hide secrets in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token {
                user, token_name, ..
            } => f
                .debug_struct("Token")
                .field("user", user)
                .field("token_name", token_name)
                .field("token_value", &"[REDACTED]")
                .finish(),
            Credentials::Password { user, .. } => f
                .debug_struct("Password")
                .field("user", user)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_selects_token_mode() {
        let creds = Credentials::resolve("root@pam", Some("auto"), Some("uuid"), None).unwrap();
        assert_eq!(creds.mode(), AuthMode::Token);
    }

    #[test]
    fn token_wins_over_password() {
        let creds =
            Credentials::resolve("root@pam", Some("auto"), Some("uuid"), Some("pw")).unwrap();
        assert_eq!(creds.mode(), AuthMode::Token);
    }

    #[test]
    fn half_token_falls_back_to_password() {
        let creds = Credentials::resolve("root@pam", Some("auto"), None, Some("pw")).unwrap();
        assert_eq!(creds.mode(), AuthMode::Password);
    }

    #[test]
    fn empty_strings_are_absent() {
        let err = Credentials::resolve("root@pam", Some(""), Some("uuid"), Some("  ")).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials));
    }

    #[test]
    fn secrets_are_kept_verbatim() {
        let creds = Credentials::resolve("root@pam", None, None, Some(" pass word ")).unwrap();
        match creds {
            Credentials::Password { password, .. } => assert_eq!(password, " pass word "),
            other => panic!("expected password credentials, got {other:?}"),
        }

        let creds =
            Credentials::resolve("root@pam", Some("auto"), Some(" uuid\t"), None).unwrap();
        match creds {
            Credentials::Token { token_value, .. } => assert_eq!(token_value, " uuid\t"),
            other => panic!("expected token credentials, got {other:?}"),
        }
    }

    #[test]
    fn missing_user_is_rejected() {
        let err = Credentials::resolve("", Some("a"), Some("b"), None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                name: "PROXMOX_USER"
            }
        ));
    }

    #[test]
    fn credentials_hide_secrets_in_debug() {
        let token = Credentials::token("root@pam", "auto", "0000-secret");
        let debug = format!("{:?}", token);
        assert!(debug.contains("root@pam"));
        assert!(!debug.contains("0000-secret"));

        let password = Credentials::password("root@pam", "hunter2");
        let debug = format!("{:?}", password);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
