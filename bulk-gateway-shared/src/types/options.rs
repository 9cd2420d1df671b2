//! Per-call engine options.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::PayloadError;

/// Tuning knobs forwarded verbatim to the engine with a single call.
///
/// Typical keys are `refresh`, `op_type`, `routing`, `timeout`, `size` or
/// `seq_no_primary_term`. The gateway does not interpret them.
///
/// # Example
///
/// ```
/// use bulk_gateway_shared::OperationOptions;
///
/// let options = OperationOptions::new().refresh(true).op_type("create");
/// assert_eq!(options.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationOptions(Map<String, Value>);

impl OperationOptions {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set an arbitrary option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Control when the write becomes visible to search.
    pub fn refresh(self, refresh: bool) -> Self {
        self.with("refresh", refresh)
    }

    /// Select the write mode (`index` to upsert, `create` to fail on an existing id).
    pub fn op_type(self, op_type: impl Into<String>) -> Self {
        self.with("op_type", op_type.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for OperationOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for OperationOptions {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PayloadError::not_an_object(&other)),
        }
    }
}
