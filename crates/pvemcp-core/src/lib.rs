//! pvemcp-core - Proxmox VE operation catalog, credentials and routing.
//!
//! This crate has no network dependency. The HTTP side plugs in through the
//! [`Executor`] trait, so routing and fan-out can be exercised in memory.
//!
//! # Example
//!
//! ```no_run
//! use pvemcp_core::{Executor, Router};
//! use serde_json::json;
//!
//! # async fn example(executor: impl Executor) {
//! let router = Router::new(executor);
//! let envelope = router.call("list_vms", &json!({"node": "pve1"})).await;
//! println!("{}", envelope.to_pretty_json());
//! # }
//! ```

pub mod credentials;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod router;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{AuthMode, Credentials};
pub use envelope::Envelope;
pub use error::Error;
pub use registry::{OperationDescriptor, Registry};
pub use router::{FanOutMode, FanOutPolicy, Plan, RouteSpec, Router};
pub use tokens::{ApiToken, CsrfToken, Ticket};
pub use traits::Executor;
pub use types::{ApiUrl, Method, Params};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
