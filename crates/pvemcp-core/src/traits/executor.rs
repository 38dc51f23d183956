//! Request executor trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::types::{Method, Params};

/// Performs one authenticated request against the management API.
///
/// `path` is relative to the API base (e.g. `/nodes/pve1/qemu`). For GET the
/// params travel as the query string, for POST/PUT as the form body, and
/// DELETE sends neither. Implementations return the decoded JSON body
/// unchanged.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, method: Method, path: &str, params: &Params) -> Result<Value>;
}

#[async_trait]
impl<E> Executor for Arc<E>
where
    E: Executor + ?Sized,
{
    async fn execute(&self, method: Method, path: &str, params: &Params) -> Result<Value> {
        (**self).execute(method, path, params).await
    }
}
