//! Server configuration resolved from CLI flags and environment.

use std::time::Duration;

use pvemcp_core::error::ConfigError;
use pvemcp_core::router::DEFAULT_FANOUT_WIDTH;
use pvemcp_core::{ApiUrl, Credentials, FanOutMode, FanOutPolicy};
use pvemcp_http::{ClientOptions, DEFAULT_TIMEOUT};

use crate::cli::Cli;

/// Everything needed to start serving.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api: ApiUrl,
    pub credentials: Credentials,
    pub client: ClientOptions,
    pub fan_out: FanOutPolicy,
}

impl ServerConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let host = cli.host.as_deref().unwrap_or_default();
        let user = cli.user.as_deref().unwrap_or_default();

        // Host is checked before user so the first missing setting is reported
        let scheme = parse_scheme(cli.scheme.as_deref())?;
        let api = ApiUrl::new(scheme, host, cli.port)?;

        let credentials = Credentials::resolve(
            user,
            cli.token_name.as_deref(),
            cli.token_value.as_deref(),
            cli.password.as_deref(),
        )?;

        let timeout = match cli.timeout_secs {
            None => DEFAULT_TIMEOUT,
            Some(0) => {
                return Err(ConfigError::Invalid {
                    name: "PROXMOX_TIMEOUT_SECS",
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
        };

        let client = ClientOptions {
            verify_ssl: is_true(cli.verify_ssl.as_deref()),
            timeout,
            retry_on_auth_failure: is_true(cli.retry_on_auth_failure.as_deref()),
        };

        let fan_out = FanOutPolicy {
            mode: parse_fanout_mode(cli.fanout_policy.as_deref())?,
            width: cli.fanout_width.unwrap_or(DEFAULT_FANOUT_WIDTH).max(1),
        };

        Ok(Self {
            api,
            credentials,
            client,
            fan_out,
        })
    }

    /// `host:port` as shown in the startup banner.
    pub fn address(&self) -> String {
        match (self.api.host(), self.api.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            _ => self.api.to_string(),
        }
    }
}

/// Only a case-insensitive "true" enables a boolean setting.
fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn parse_scheme(value: Option<&str>) -> Result<&'static str, ConfigError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok("https"),
        Some(s) if s.eq_ignore_ascii_case("https") => Ok("https"),
        Some(s) if s.eq_ignore_ascii_case("http") => Ok("http"),
        Some(other) => Err(ConfigError::Invalid {
            name: "PROXMOX_SCHEME",
            reason: format!("expected http or https, got {:?}", other),
        }),
    }
}

fn parse_fanout_mode(value: Option<&str>) -> Result<FanOutMode, ConfigError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(FanOutMode::default()),
        Some(s) if s.eq_ignore_ascii_case("fail-fast") => Ok(FanOutMode::FailFast),
        Some(s) if s.eq_ignore_ascii_case("partial") => Ok(FanOutMode::Partial),
        Some(other) => Err(ConfigError::Invalid {
            name: "PROXMOX_FANOUT_POLICY",
            reason: format!("expected fail-fast or partial, got {:?}", other),
        }),
    }
}
