//! Operation router.
//!
//! Maps an operation name and its arguments onto one or more executor calls.
//! Almost every operation is a single templated request; the exception is a
//! cluster-wide list backed by [`ClusterRoute::FanOut`], which enumerates the
//! nodes and merges one sub-request per node.

use std::pin::pin;

use futures_util::stream::{self, StreamExt};
use serde_json::{Map, Value, json};
use tracing::{debug, error, instrument, warn};

use crate::Result;
use crate::envelope::Envelope;
use crate::error::{Error, ProtocolError};
use crate::registry::{ClusterRoute, Registry, Route, SCOPE_FIELD, ValidArgs};
use crate::traits::Executor;
use crate::types::{Method, Params};

/// Default number of per-node sub-requests in flight during a fan-out.
pub const DEFAULT_FANOUT_WIDTH: usize = 4;

/// What to do when a per-node sub-request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOutMode {
    /// Fail the whole operation on the first failing node.
    #[default]
    FailFast,
    /// Skip failing nodes and report them under `"errors"`.
    Partial,
}

/// Fan-out settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutPolicy {
    pub mode: FanOutMode,
    pub width: usize,
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self {
            mode: FanOutMode::FailFast,
            width: DEFAULT_FANOUT_WIDTH,
        }
    }
}

/// A single concrete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub method: Method,
    pub path: String,
    pub params: Params,
}

/// The requests an operation resolves to.
#[derive(Debug, Clone)]
pub enum Plan {
    Single(RouteSpec),
    FanOut {
        /// Request that enumerates the nodes.
        nodes: RouteSpec,
        /// Per-node path template, bound with each node name.
        per_node: &'static str,
        args: ValidArgs,
    },
}

/// Dispatches operations to an [`Executor`].
#[derive(Debug)]
pub struct Router<E> {
    executor: E,
    registry: Registry,
    fan_out: FanOutPolicy,
}

impl<E: Executor> Router<E> {
    /// Create a router over the builtin catalog with the default fan-out policy.
    pub fn new(executor: E) -> Self {
        Self::with_registry(executor, Registry::builtin())
    }

    pub fn with_registry(executor: E, registry: Registry) -> Self {
        Self {
            executor,
            registry,
            fan_out: FanOutPolicy::default(),
        }
    }

    pub fn with_fan_out(mut self, policy: FanOutPolicy) -> Self {
        self.fan_out = FanOutPolicy {
            width: policy.width.max(1),
            ..policy
        };
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Resolve an operation to its concrete request plan without any I/O.
    pub fn resolve(&self, name: &str, arguments: &Value) -> Result<Plan> {
        let args = self.registry.validate(name, arguments)?;
        let params = args.params();

        let plan = match args.descriptor().route {
            Route::Fixed { method, path } => Plan::Single(RouteSpec {
                method,
                path: args.render_path(path, &[])?,
                params,
            }),
            Route::Scoped {
                method,
                node_path,
                cluster,
            } => match (args.scope(), cluster) {
                (Some(_), _) => Plan::Single(RouteSpec {
                    method,
                    path: args.render_path(node_path, &[])?,
                    params,
                }),
                (None, ClusterRoute::Path(path)) => Plan::Single(RouteSpec {
                    method,
                    path: path.to_string(),
                    params,
                }),
                (None, ClusterRoute::FanOut { nodes }) => Plan::FanOut {
                    nodes: RouteSpec {
                        method: Method::Get,
                        path: nodes.to_string(),
                        params: Params::new(),
                    },
                    per_node: node_path,
                    args,
                },
            },
        };

        Ok(plan)
    }

    /// Run an operation and return the upstream body.
    #[instrument(skip_all, fields(operation = name))]
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Result<Value> {
        match self.resolve(name, arguments)? {
            Plan::Single(spec) => {
                debug!(method = %spec.method, path = %spec.path, "dispatching");
                self.executor
                    .execute(spec.method, &spec.path, &spec.params)
                    .await
            }
            Plan::FanOut {
                nodes,
                per_node,
                args,
            } => self.fan_out(&nodes, per_node, &args).await,
        }
    }

    /// Run an operation and convert the outcome into an [`Envelope`].
    ///
    /// This is the error boundary: no failure escapes as anything other than
    /// a failure envelope.
    pub async fn call(&self, name: &str, arguments: &Value) -> Envelope {
        let result = self.dispatch(name, arguments).await;
        if let Err(ref err) = result {
            error!(operation = name, error = %err, "Error executing {}", name);
        }
        Envelope::from(result)
    }

    async fn fan_out(
        &self,
        nodes: &RouteSpec,
        per_node: &'static str,
        args: &ValidArgs,
    ) -> Result<Value> {
        let listing = self
            .executor
            .execute(nodes.method, &nodes.path, &nodes.params)
            .await?;
        let names = node_names(&listing)?;
        debug!(nodes = names.len(), width = self.fan_out.width, "fanning out");

        let method = args.descriptor().route.method();
        let params = args.params();
        let executor = &self.executor;
        let params = &params;

        // Ordered buffering keeps node-list order regardless of completion order.
        let responses = stream::iter(names)
            .map(|node| async move {
                let result = match args.render_path(per_node, &[(SCOPE_FIELD, node.as_str())]) {
                    Ok(path) => executor.execute(method, &path, params).await,
                    Err(e) => Err(e.into()),
                };
                (node, result)
            })
            .buffered(self.fan_out.width.max(1));
        let mut responses = pin!(responses);

        let mut merged = Vec::new();
        let mut failures = Vec::new();

        while let Some((node, result)) = responses.next().await {
            match result.and_then(|body| tag_records(body, &node)) {
                Ok(records) => merged.extend(records),
                Err(err) => match self.fan_out.mode {
                    FanOutMode::FailFast => {
                        warn!(node = %node, error = %err, "sub-request failed, aborting fan-out");
                        return Err(err);
                    }
                    FanOutMode::Partial => {
                        warn!(node = %node, error = %err, "sub-request failed, skipping node");
                        failures.push(json!({"node": node, "error": err.to_string()}));
                    }
                },
            }
        }

        let mut body = Map::new();
        body.insert("data".to_string(), Value::Array(merged));
        if !failures.is_empty() {
            body.insert("errors".to_string(), Value::Array(failures));
        }
        Ok(Value::Object(body))
    }
}

/// Node names from a `GET /nodes` body, in listing order.
fn node_names(listing: &Value) -> Result<Vec<String>> {
    let entries = listing["data"]
        .as_array()
        .ok_or_else(|| shape("node listing has no data array"))?;

    entries
        .iter()
        .map(|entry| {
            entry[SCOPE_FIELD]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| shape("node entry without a node name"))
        })
        .collect()
}

/// Extract the `data` records of a per-node body and tag each with its node.
fn tag_records(body: Value, node: &str) -> Result<Vec<Value>> {
    let Value::Object(mut map) = body else {
        return Err(shape("per-node response is not an object"));
    };
    let Some(Value::Array(mut records)) = map.remove("data") else {
        return Err(shape("per-node response has no data array"));
    };

    for record in &mut records {
        if let Value::Object(fields) = record {
            fields.insert(SCOPE_FIELD.to_string(), Value::String(node.to_string()));
        }
    }
    Ok(records)
}

fn shape(message: &str) -> Error {
    ProtocolError::Shape {
        message: message.to_string(),
    }
    .into()
}
