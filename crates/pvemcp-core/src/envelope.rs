//! The uniform result shape returned from every operation call.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::Error;

/// Success carries the upstream body verbatim; failure carries a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Value),
    Failure { error: String },
}

impl Envelope {
    pub fn failure(error: impl Into<String>) -> Self {
        Envelope::Failure {
            error: error.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Envelope::Failure { .. })
    }

    /// Render as two-space indented JSON.
    pub fn to_pretty_json(&self) -> String {
        // Serializing a Value or a single string field cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl From<Result<Value, Error>> for Envelope {
    fn from(result: Result<Value, Error>) -> Self {
        match result {
            Ok(value) => Envelope::Success(value),
            Err(err) => Envelope::failure(err.to_string()),
        }
    }
}

impl Serialize for Envelope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Envelope::Success(value) => value.serialize(serializer),
            Envelope::Failure { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
