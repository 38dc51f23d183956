//! pvemcp-http - reqwest-backed executor for the Proxmox VE API.
//!
//! Provides [`ApiClient`], which implements [`pvemcp_core::Executor`] over
//! HTTPS with either API-token or password-ticket authentication.

mod client;
mod endpoints;
mod error;
mod session;

pub use client::{ApiClient, ClientOptions, DEFAULT_TIMEOUT};
pub use endpoints::ACCESS_TICKET;
pub use session::{CSRF_HEADER, SessionManager, SessionState};
