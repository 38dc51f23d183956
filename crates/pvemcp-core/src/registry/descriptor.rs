//! Operation descriptors and argument schemas.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::ValidationError;
use crate::types::{Method, Params};

/// Name of the argument that selects per-node versus cluster-wide routes.
pub const SCOPE_FIELD: &str = "node";

/// JSON type of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
}

impl ArgKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ArgKind::String => "string",
            ArgKind::Integer => "integer",
        }
    }
}

/// Where a validated argument ends up in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Substituted into the path template.
    Path,
    /// Sent as a query (GET) or form (POST/PUT) field.
    Field,
}

/// Schema for a single argument.
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub binding: Binding,
    pub description: &'static str,
}

/// Cluster-wide counterpart of a per-node route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterRoute {
    /// A dedicated cluster-level endpoint.
    Path(&'static str),
    /// Enumerate nodes at `nodes`, then query the per-node route for each.
    FanOut { nodes: &'static str },
}

/// How an operation maps onto the REST surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// One endpoint, always.
    Fixed {
        method: Method,
        path: &'static str,
    },
    /// Per-node endpoint when a node is given, cluster route otherwise.
    Scoped {
        method: Method,
        node_path: &'static str,
        cluster: ClusterRoute,
    },
}

impl Route {
    pub fn method(&self) -> Method {
        match self {
            Route::Fixed { method, .. } | Route::Scoped { method, .. } => *method,
        }
    }
}

/// A named, schema-described operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgSpec],
    pub route: Route,
}

impl OperationDescriptor {
    /// JSON Schema advertised to callers for this operation's arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for arg in self.args {
            properties.insert(
                arg.name.to_string(),
                json!({
                    "type": arg.kind.json_type(),
                    "description": arg.description,
                }),
            );
        }

        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Check `arguments` against the schema and render every supplied value.
    ///
    /// Absent, null and empty-string optional arguments are all treated as
    /// not supplied.
    pub fn validate(&self, arguments: &Value) -> Result<ValidArgs, ValidationError> {
        let empty = Map::new();
        let object = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err(ValidationError::NotAnObject),
        };

        let mut values = BTreeMap::new();
        for arg in self.args {
            match render_value(arg, object.get(arg.name))? {
                Some(value) => {
                    if arg.binding == Binding::Path && !is_path_safe(&value) {
                        return Err(ValidationError::BadSegment {
                            field: arg.name.to_string(),
                            value,
                        });
                    }
                    values.insert(arg.name, value);
                }
                None if arg.required => {
                    return Err(ValidationError::Missing {
                        field: arg.name.to_string(),
                    });
                }
                None => {}
            }
        }

        Ok(ValidArgs {
            descriptor: *self,
            values,
        })
    }
}

fn render_value(arg: &ArgSpec, value: Option<&Value>) -> Result<Option<String>, ValidationError> {
    let wrong_type = || ValidationError::WrongType {
        field: arg.name.to_string(),
        expected: match arg.kind {
            ArgKind::String => "a string",
            ArgKind::Integer => "an integer",
        },
    };

    match (arg.kind, value) {
        (_, None | Some(Value::Null)) => Ok(None),
        (ArgKind::String, Some(Value::String(s))) if s.is_empty() => Ok(None),
        (ArgKind::String, Some(Value::String(s))) => Ok(Some(s.clone())),
        (ArgKind::Integer, Some(Value::Number(n))) => {
            n.as_i64().map(|i| Some(i.to_string())).ok_or_else(wrong_type)
        }
        // Some callers send numeric ids as strings
        (ArgKind::Integer, Some(Value::String(s))) if s.trim().is_empty() => Ok(None),
        (ArgKind::Integer, Some(Value::String(s))) => s
            .trim()
            .parse::<i64>()
            .map(|i| Some(i.to_string()))
            .map_err(|_| wrong_type()),
        _ => Err(wrong_type()),
    }
}

fn is_path_safe(value: &str) -> bool {
    !value.contains(['/', '?', '#'])
}

/// Arguments that passed validation, rendered as strings.
#[derive(Debug, Clone)]
pub struct ValidArgs {
    descriptor: OperationDescriptor,
    values: BTreeMap<&'static str, String>,
}

impl ValidArgs {
    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The node scope, if one was supplied.
    pub fn scope(&self) -> Option<&str> {
        self.get(SCOPE_FIELD)
    }

    /// Fields forwarded as query or body, in schema order.
    pub fn params(&self) -> Params {
        self.descriptor
            .args
            .iter()
            .filter(|a| a.binding == Binding::Field)
            .filter_map(|a| self.values.get(a.name).map(|v| (a.name, v.as_str())))
            .collect()
    }

    /// Substitute `{name}` placeholders with path-bound values.
    ///
    /// `extra` supplies bindings that do not come from the caller, such as
    /// node names discovered during a fan-out.
    pub fn render_path(
        &self,
        template: &str,
        extra: &[(&str, &str)],
    ) -> Result<String, ValidationError> {
        let mut out = String::with_capacity(template.len() + 16);
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return Ok(out);
            };
            let name = &after[..end];
            let value = extra
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
                .or_else(|| self.get(name))
                .ok_or_else(|| ValidationError::Missing {
                    field: name.to_string(),
                })?;
            out.push_str(value);
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT_ARGS: &[ArgSpec] = &[
        ArgSpec {
            name: "node",
            kind: ArgKind::String,
            required: true,
            binding: Binding::Path,
            description: "Node name",
        },
        ArgSpec {
            name: "vmid",
            kind: ArgKind::Integer,
            required: true,
            binding: Binding::Path,
            description: "VM ID",
        },
        ArgSpec {
            name: "snapname",
            kind: ArgKind::String,
            required: true,
            binding: Binding::Field,
            description: "Snapshot name",
        },
        ArgSpec {
            name: "description",
            kind: ArgKind::String,
            required: false,
            binding: Binding::Field,
            description: "Snapshot description (optional)",
        },
    ];

    const SNAPSHOT: OperationDescriptor = OperationDescriptor {
        name: "snap",
        description: "test",
        args: SNAPSHOT_ARGS,
        route: Route::Fixed {
            method: Method::Post,
            path: "/nodes/{node}/qemu/{vmid}/snapshot",
        },
    };

    #[test]
    fn schema_lists_required_fields() {
        let schema = SNAPSHOT.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["vmid"]["type"], "integer");
        assert_eq!(schema["required"], json!(["node", "vmid", "snapname"]));
    }

    #[test]
    fn schema_omits_empty_required() {
        let op = OperationDescriptor {
            args: &[],
            ..SNAPSHOT
        };
        assert!(op.input_schema().get("required").is_none());
    }

    #[test]
    fn renders_path_and_fields() {
        let args = SNAPSHOT
            .validate(&json!({"node": "n1", "vmid": 100, "snapname": "s1"}))
            .unwrap();
        assert_eq!(
            args.render_path("/nodes/{node}/qemu/{vmid}/snapshot", &[])
                .unwrap(),
            "/nodes/n1/qemu/100/snapshot"
        );
        let params = args.params();
        assert_eq!(params.get("snapname"), Some("s1"));
        assert_eq!(params.get("description"), None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn missing_required_argument() {
        let err = SNAPSHOT
            .validate(&json!({"node": "n1", "vmid": 100}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Missing { field } if field == "snapname"));
    }

    #[test]
    fn empty_required_string_is_missing() {
        let err = SNAPSHOT
            .validate(&json!({"node": "", "vmid": 100, "snapname": "s"}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Missing { field } if field == "node"));
    }

    #[test]
    fn integer_accepts_numeric_string() {
        let args = SNAPSHOT
            .validate(&json!({"node": "n1", "vmid": "101", "snapname": "s"}))
            .unwrap();
        assert_eq!(args.get("vmid"), Some("101"));
    }

    #[test]
    fn integer_rejects_float_and_text() {
        for bad in [json!(1.5), json!("abc"), json!(true)] {
            let err = SNAPSHOT
                .validate(&json!({"node": "n1", "vmid": bad, "snapname": "s"}))
                .unwrap_err();
            assert!(matches!(err, ValidationError::WrongType { .. }));
        }
    }

    #[test]
    fn string_rejects_number() {
        let err = SNAPSHOT
            .validate(&json!({"node": 5, "vmid": 1, "snapname": "s"}))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::WrongType {
                expected: "a string",
                ..
            }
        ));
    }

    #[test]
    fn path_values_cannot_escape_their_segment() {
        let err = SNAPSHOT
            .validate(&json!({"node": "../access", "vmid": 1, "snapname": "s"}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::BadSegment { .. }));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(matches!(
            SNAPSHOT.validate(&json!([1, 2])),
            Err(ValidationError::NotAnObject)
        ));
    }

    #[test]
    fn extra_bindings_take_precedence() {
        let op = OperationDescriptor {
            args: &[],
            ..SNAPSHOT
        };
        let args = op.validate(&Value::Null).unwrap();
        assert_eq!(
            args.render_path("/nodes/{node}/qemu", &[("node", "pve2")])
                .unwrap(),
            "/nodes/pve2/qemu"
        );
        assert!(args.render_path("/nodes/{node}/qemu", &[]).is_err());
    }
}
