//! API base URL type.

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::ConfigError;

/// Path prefix of the JSON API.
pub const API_PREFIX: &str = "/api2/json";

/// A validated management API base URL (scheme, host, port and API prefix).
///
/// HTTPS is required, except for plain HTTP against loopback hosts.
///
/// # Example
///
/// ```
/// use pvemcp_core::ApiUrl;
///
/// let api = ApiUrl::new("https", "192.168.1.100", 8006).unwrap();
/// assert_eq!(api.endpoint("/nodes"), "https://192.168.1.100:8006/api2/json/nodes");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Build the base URL from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty or the result is not a valid URL.
    pub fn new(scheme: &str, host: &str, port: u16) -> Result<Self, ConfigError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ConfigError::Missing {
                name: "PROXMOX_HOST",
            });
        }

        // Bare IPv6 literals need brackets inside a URL
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };

        Self::parse(&format!("{}://{}:{}{}", scheme, host, port, API_PREFIX))
    }

    /// Parse a full base URL such as `https://pve:8006/api2/json`.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, ConfigError> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| ConfigError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash
        let mut url = url;
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);

        Ok(Self(url))
    }

    /// Returns the full URL for an API path such as `/nodes/pve1/status`.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the port, including the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.0.port_or_known_default()
    }

    /// Returns the URL scheme.
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    fn validate(url: &Url, original: &str) -> Result<(), ConfigError> {
        if url.cannot_be_a_base() {
            return Err(ConfigError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            });
        }

        let Some(host) = url.host_str() else {
            return Err(ConfigError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            });
        };

        let is_loopback =
            matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1");
        let scheme = url.scheme();

        if scheme != "https" && !(scheme == "http" && is_loopback) {
            return Err(ConfigError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_parts() {
        let api = ApiUrl::new("https", "pve.example.com", 8006).unwrap();
        assert_eq!(api.as_str(), "https://pve.example.com:8006/api2/json");
        assert_eq!(api.host(), Some("pve.example.com"));
        assert_eq!(api.port(), Some(8006));
    }

    #[test]
    fn endpoint_construction() {
        let api = ApiUrl::new("https", "10.0.0.5", 8006).unwrap();
        assert_eq!(
            api.endpoint("/nodes/pve1/qemu"),
            "https://10.0.0.5:8006/api2/json/nodes/pve1/qemu"
        );
        assert_eq!(
            api.endpoint("cluster/resources"),
            "https://10.0.0.5:8006/api2/json/cluster/resources"
        );
    }

    #[test]
    fn normalizes_trailing_slash() {
        let api = ApiUrl::parse("https://pve:8006/api2/json/").unwrap();
        assert_eq!(api.endpoint("/nodes"), "https://pve:8006/api2/json/nodes");
    }

    #[test]
    fn brackets_ipv6_hosts() {
        let api = ApiUrl::new("https", "fd00::10", 8006).unwrap();
        assert_eq!(api.endpoint("/nodes"), "https://[fd00::10]:8006/api2/json/nodes");
    }

    #[test]
    fn http_allowed_for_loopback_only() {
        assert!(ApiUrl::new("http", "127.0.0.1", 8006).is_ok());
        assert!(ApiUrl::new("http", "localhost", 8006).is_ok());
        assert!(ApiUrl::new("http", "pve.example.com", 8006).is_err());
    }

    #[test]
    fn empty_host_is_missing() {
        assert!(matches!(
            ApiUrl::new("https", " ", 8006),
            Err(ConfigError::Missing {
                name: "PROXMOX_HOST"
            })
        ));
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::parse("/api2/json").is_err());
    }
}
