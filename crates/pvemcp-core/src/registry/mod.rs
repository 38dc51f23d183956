//! Operation registry.
//!
//! The registry is the fixed catalog of operations: names, argument schemas
//! and the route each one maps to. It is built once at startup and only read
//! afterwards.

mod catalog;
mod descriptor;

use std::collections::HashMap;

pub use catalog::CATALOG;
pub use descriptor::{
    ArgKind, ArgSpec, Binding, ClusterRoute, OperationDescriptor, Route, SCOPE_FIELD, ValidArgs,
};

use serde_json::Value;

use crate::error::Error;

/// Name-indexed view over a catalog of operations.
#[derive(Debug, Clone)]
pub struct Registry {
    operations: &'static [OperationDescriptor],
    index: HashMap<&'static str, usize>,
}

impl Registry {
    /// Build a registry over the builtin catalog.
    pub fn builtin() -> Self {
        Self::new(CATALOG)
    }

    /// Build a registry over an arbitrary catalog.
    ///
    /// Later duplicates of a name are ignored.
    pub fn new(operations: &'static [OperationDescriptor]) -> Self {
        let mut index = HashMap::with_capacity(operations.len());
        for (i, op) in operations.iter().enumerate() {
            index.entry(op.name).or_insert(i);
        }
        Self { operations, index }
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<&'static OperationDescriptor> {
        let operations = self.operations;
        self.index.get(name).map(|&i| &operations[i])
    }

    /// Look up an operation and validate its arguments.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownOperation`] for unregistered names,
    /// [`Error::Validation`] when the arguments do not fit the schema.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<ValidArgs, Error> {
        let op = self.get(name).ok_or_else(|| Error::UnknownOperation {
            name: name.to_string(),
        })?;
        Ok(op.validate(arguments)?)
    }

    /// Operations in advertisement order.
    pub fn operations(&self) -> &'static [OperationDescriptor] {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
