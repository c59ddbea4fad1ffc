use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema of the selected table or collection.
///
/// The explorer never interprets it; it is displayed and handed back to the
/// sample-query generator verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SchemaDescriptor(Value);

impl SchemaDescriptor {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Take `schema` from a response body, or the whole body when the key is absent
    pub fn from_response(mut body: Value) -> Self {
        match body.get_mut("schema").map(Value::take) {
            Some(schema) => Self(schema),
            None => Self(body),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }

    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}
