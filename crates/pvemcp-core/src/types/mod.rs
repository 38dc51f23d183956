//! Core request and endpoint types.
//!
//! These types enforce their invariants at construction time.

mod api_url;
mod request;

pub use api_url::{API_PREFIX, ApiUrl};
pub use request::{Method, Params};
