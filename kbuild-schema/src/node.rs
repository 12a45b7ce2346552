//! Borrowed views of schema nodes.

use serde_json::{Map, Value};

use crate::{Result, SchemaError};

/// JSON types whose flat option values are given as JSON text.
const COMPOUND_TYPES: [&str; 2] = ["array", "object"];

/// Decode a local reference (`#/a/b/c`) into its key path.
pub fn decode_ref(reference: &str) -> Result<Vec<String>> {
    let Some(rest) = reference.strip_prefix("#/") else {
        return Err(SchemaError::InvalidRef(reference.to_string()));
    };
    Ok(rest.split('/').map(str::to_string).collect())
}

/// A read-only view of one node in a schema document.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    value: &'a Value,
}

impl<'a> SchemaNode<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// The underlying JSON.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The `$ref` target, if this node is a reference.
    pub fn reference(&self) -> Option<&'a str> {
        self.value.get("$ref").and_then(Value::as_str)
    }

    /// The declared `type`, which may be a single name or a list.
    pub fn type_value(&self) -> Option<&'a Value> {
        self.value.get("type")
    }

    /// The declared type when it is a single name.
    pub fn type_name(&self) -> Option<&'a str> {
        self.type_value().and_then(Value::as_str)
    }

    /// Whether the node is an object with nested properties.
    pub fn is_container(&self) -> bool {
        self.type_name() == Some("object")
    }

    /// Whether the node is a settable option.
    pub fn is_leaf(&self) -> bool {
        self.type_value().is_some() && !self.is_container()
    }

    /// Whether values of this node are arrays or objects.
    ///
    /// Only single-name types count; `["string", "null"]` is scalar.
    pub fn is_compound(&self) -> bool {
        self.type_name()
            .is_some_and(|name| COMPOUND_TYPES.contains(&name))
    }

    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.value.get("properties").and_then(Value::as_object)
    }

    pub fn property(&self, name: &str) -> Option<SchemaNode<'a>> {
        self.properties()?.get(name).map(SchemaNode::new)
    }

    pub fn default(&self) -> Option<&'a Value> {
        self.value.get("default")
    }

    pub fn description(&self) -> Option<&'a str> {
        self.value.get("description").and_then(Value::as_str)
    }
}
