//! Authentication session state.
//!
//! Token mode needs no handshake: the `Authorization` value is derived from
//! the credentials once. Password mode posts to the ticket endpoint and keeps
//! the returned ticket and CSRF token until a refresh replaces them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap, HeaderName, HeaderValue};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use pvemcp_core::error::{AuthError, Error};
use pvemcp_core::{ApiToken, ApiUrl, AuthMode, Credentials, CsrfToken, Method, Result, Ticket};

use crate::endpoints::{ACCESS_TICKET, TicketRequest, TicketResponse};
use crate::error::transport_error;

/// Header carrying the anti-forgery token on mutating requests.
pub const CSRF_HEADER: HeaderName = HeaderName::from_static("csrfpreventiontoken");

/// One generation of authentication material.
///
/// Requests take an `Arc` snapshot, so a refresh never changes the headers
/// of a request already in flight.
pub enum SessionState {
    Token(ApiToken),
    Ticket {
        ticket: Ticket,
        csrf: CsrfToken,
        obtained_at: DateTime<Utc>,
    },
}

impl SessionState {
    /// Headers that authenticate a request with the given method.
    pub fn headers(&self, method: Method) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        match self {
            SessionState::Token(token) => {
                headers.insert(AUTHORIZATION, header_value(token.as_str())?);
            }
            SessionState::Ticket { ticket, csrf, .. } => {
                headers.insert(COOKIE, header_value(&ticket.cookie())?);
                if method.is_mutating() {
                    headers.insert(CSRF_HEADER, header_value(csrf.as_str())?);
                }
            }
        }
        Ok(headers)
    }

    pub fn mode(&self) -> AuthMode {
        match self {
            SessionState::Token(_) => AuthMode::Token,
            SessionState::Ticket { .. } => AuthMode::Password,
        }
    }

    /// When the ticket was issued. `None` in token mode.
    pub fn obtained_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionState::Token(_) => None,
            SessionState::Ticket { obtained_at, .. } => Some(*obtained_at),
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Token(token) => f.debug_tuple("Token").field(token).finish(),
            SessionState::Ticket {
                ticket,
                csrf,
                obtained_at,
            } => f
                .debug_struct("Ticket")
                .field("ticket", ticket)
                .field("csrf", csrf)
                .field("obtained_at", obtained_at)
                .finish(),
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value).map_err(|e| AuthError::InvalidToken {
        reason: e.to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Owns the credentials and the current [`SessionState`].
///
/// Refreshes are serialized: callers pass the snapshot that failed, and only
/// the first caller holding a stale snapshot performs the handshake.
pub struct SessionManager {
    http: reqwest::Client,
    api: ApiUrl,
    credentials: Credentials,
    timeout: Duration,
    state: RwLock<Option<Arc<SessionState>>>,
    refresh: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        http: reqwest::Client,
        api: ApiUrl,
        credentials: Credentials,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            api,
            credentials,
            timeout,
            state: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.credentials.mode()
    }

    pub fn user(&self) -> &str {
        self.credentials.user()
    }

    /// Establish a session if none exists yet.
    pub async fn authenticate(&self) -> Result<Arc<SessionState>> {
        self.refresh(None).await
    }

    /// The current session, authenticating first if there is none.
    pub async fn current(&self) -> Result<Arc<SessionState>> {
        if let Some(state) = self.state.read().await.as_ref() {
            return Ok(Arc::clone(state));
        }
        self.refresh(None).await
    }

    /// Replace `stale` with a fresh session.
    ///
    /// If another caller already replaced it, the newer session is returned
    /// without a second handshake.
    pub async fn reauthenticate(&self, stale: &Arc<SessionState>) -> Result<Arc<SessionState>> {
        self.refresh(Some(stale)).await
    }

    async fn refresh(&self, stale: Option<&Arc<SessionState>>) -> Result<Arc<SessionState>> {
        let _gate = self.refresh.lock().await;

        if let Some(current) = self.state.read().await.as_ref() {
            let replaced = stale.is_none_or(|stale| !Arc::ptr_eq(current, stale));
            if replaced {
                debug!("Session already refreshed by another request");
                return Ok(Arc::clone(current));
            }
        }

        let fresh = Arc::new(self.handshake().await?);
        *self.state.write().await = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    #[instrument(
        skip(self),
        fields(user = %self.credentials.user(), mode = %self.credentials.mode())
    )]
    async fn handshake(&self) -> Result<SessionState> {
        match &self.credentials {
            Credentials::Token {
                user,
                token_name,
                token_value,
            } => {
                let token = ApiToken::from_parts(user, token_name, token_value);
                // Surface bad header characters now rather than on the first call
                header_value(token.as_str())?;
                info!("Using API token authentication");
                Ok(SessionState::Token(token))
            }
            Credentials::Password { user, password } => {
                let url = self.api.endpoint(ACCESS_TICKET);
                debug!(%url, "Requesting authentication ticket");

                let response = self
                    .http
                    .post(&url)
                    .form(&TicketRequest {
                        username: user,
                        password,
                    })
                    .send()
                    .await
                    .map_err(|e| transport_error(e, self.timeout))?;

                let status = response.status();
                let body = response
                    .text()
                    .await
                    .map_err(|e| transport_error(e, self.timeout))?;

                if !status.is_success() {
                    return Err(Error::Auth(AuthError::Rejected {
                        status: status.as_u16(),
                        body,
                    }));
                }

                let parsed: TicketResponse =
                    serde_json::from_str(&body).map_err(|e| AuthError::MalformedResponse {
                        reason: e.to_string(),
                    })?;

                info!("Authenticated with password ticket");
                Ok(SessionState::Ticket {
                    ticket: Ticket::new(parsed.data.ticket),
                    csrf: CsrfToken::new(parsed.data.csrf_prevention_token),
                    obtained_at: Utc::now(),
                })
            }
        }
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.api)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_state() -> SessionState {
        SessionState::Ticket {
            ticket: Ticket::new("PVE:root@pam:ABC"),
            csrf: CsrfToken::new("ABC:csrf"),
            obtained_at: Utc::now(),
        }
    }

    #[test]
    fn token_headers_are_identical_for_every_method() {
        let state = SessionState::Token(ApiToken::from_parts("root@pam", "auto", "uuid"));
        for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
            let headers = state.headers(method).unwrap();
            assert_eq!(headers.len(), 1);
            assert_eq!(
                headers.get(AUTHORIZATION).unwrap(),
                "PVEAPIToken=root@pam!auto=uuid"
            );
        }
    }

    #[test]
    fn ticket_get_omits_csrf() {
        let headers = ticket_state().headers(Method::Get).unwrap();
        assert_eq!(headers.get(COOKIE).unwrap(), "PVEAuthCookie=PVE:root@pam:ABC");
        assert!(headers.get(&CSRF_HEADER).is_none());
    }

    #[test]
    fn ticket_mutations_carry_csrf() {
        for method in [Method::Post, Method::Put, Method::Delete] {
            let headers = ticket_state().headers(method).unwrap();
            assert_eq!(headers.get(&CSRF_HEADER).unwrap(), "ABC:csrf");
            assert!(headers.get(COOKIE).is_some());
        }
    }

    #[test]
    fn newline_in_token_is_rejected() {
        let state = SessionState::Token(ApiToken::from_parts("root@pam", "auto", "bad\nvalue"));
        let err = state.headers(Method::Get).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn debug_output_is_redacted() {
        let debug = format!("{:?}", ticket_state());
        assert!(!debug.contains("PVE:root@pam:ABC"));
        assert!(!debug.contains("ABC:csrf"));
    }

    #[tokio::test]
    async fn token_mode_needs_no_network() {
        let api = ApiUrl::new("https", "pve.invalid", 8006).unwrap();
        let manager = SessionManager::new(
            reqwest::Client::new(),
            api,
            Credentials::token("root@pam", "auto", "uuid"),
            Duration::from_secs(1),
        );

        let first = manager.current().await.unwrap();
        let second = manager.current().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.mode(), AuthMode::Token);
        assert!(first.obtained_at().is_none());
    }
}
