//! HTTP executor for the management API.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use pvemcp_core::error::{ProtocolError, TransportError, UpstreamError};
use pvemcp_core::{ApiUrl, AuthMode, Credentials, Executor, Method, Params, Result};

use crate::error::transport_error;
use crate::session::{SessionManager, SessionState};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport options for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Verify the server certificate. Off by default, since management
    /// hosts commonly run self-signed certificates.
    pub verify_ssl: bool,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Re-authenticate and retry once when a ticket-mode request gets 401.
    pub retry_on_auth_failure: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verify_ssl: false,
            timeout: DEFAULT_TIMEOUT,
            retry_on_auth_failure: false,
        }
    }
}

/// Authenticated client for the management API.
///
/// Cheap to clone; clones share the connection pool and session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api: ApiUrl,
    session: Arc<SessionManager>,
    options: ClientOptions,
}

impl ApiClient {
    /// Build a client without contacting the server.
    pub fn new(api: ApiUrl, credentials: Credentials, options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pvemcp/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_ssl)
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let session = SessionManager::new(http.clone(), api.clone(), credentials, options.timeout);

        Ok(Self {
            http,
            api,
            session: Arc::new(session),
            options,
        })
    }

    /// Build a client and establish its session.
    ///
    /// In password mode this performs the ticket handshake, so bad
    /// credentials fail here instead of on the first call.
    pub async fn connect(
        api: ApiUrl,
        credentials: Credentials,
        options: ClientOptions,
    ) -> Result<Self> {
        let client = Self::new(api, credentials, options)?;
        client.session.authenticate().await?;
        Ok(client)
    }

    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    async fn send(
        &self,
        state: &SessionState,
        method: Method,
        path: &str,
        params: &Params,
    ) -> Result<Value> {
        let url = self.api.endpoint(path);
        debug!(%method, %url, "API request");
        trace!(?params, "request parameters");

        let builder = match method {
            Method::Get if params.is_empty() => self.http.get(&url),
            Method::Get => self.http.get(&url).query(params),
            Method::Post => self.http.post(&url).form(params),
            Method::Put => self.http.put(&url).form(params),
            Method::Delete => self.http.delete(&url),
        };

        let response = builder
            .headers(state.headers(method)?)
            .send()
            .await
            .map_err(|e| transport_error(e, self.options.timeout))?;

        let status = response.status();
        trace!(%status, "API response");

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.options.timeout))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body);
            return Err(UpstreamError::new(status.as_u16(), body).into());
        }

        serde_json::from_slice(&body).map_err(|e| {
            ProtocolError::NotJson {
                message: e.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl Executor for ApiClient {
    #[instrument(skip(self, params), fields(api = %self.api))]
    async fn execute(&self, method: Method, path: &str, params: &Params) -> Result<Value> {
        let state = self.session.current().await?;

        match self.send(&state, method, path, params).await {
            Err(err)
                if err.is_auth_failure()
                    && self.options.retry_on_auth_failure
                    && state.mode() == AuthMode::Password =>
            {
                warn!("Ticket rejected, re-authenticating once");
                let fresh = self.session.reauthenticate(&state).await?;
                self.send(&fresh, method, path, params).await
            }
            other => other,
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("api", &self.api)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
