//! Configuration schema for kbuild.
//!
//! The schema is a JSON Schema document embedded in the crate. Besides
//! validation, it drives everything user-facing about configuration:
//! the list of settable options, their defaults, and the flat
//! `name = value` form used for command-line overrides.
//!
//! # Module Organization
//!
//! - [`node`] - Borrowed views of schema nodes ([`SchemaNode`])
//! - [`walk`] - Recursive traversal of leaf options with `$ref` resolution
//! - [`options`] - Option list export and the flat [`OptionTable`]
//! - [`validate`] - JSON Schema validation (feature `validation`)

mod error;
pub mod node;
pub mod options;
pub mod validate;
pub mod walk;

use std::{str::FromStr, sync::LazyLock};

pub use error::{Result, SchemaError};
pub use node::{SchemaNode, decode_ref};
pub use options::{OptionSlot, OptionTable, UserOption, schema_to_user_options};
pub use validate::Validator;
pub use walk::{Leaf, leaves, walk};

use serde_json::Value;

/// Source of the embedded configuration schema.
pub const SCHEMA_SOURCE: &str = include_str!("../schema/kbuild.schema.json");

static BUILTIN: LazyLock<Schema> =
    LazyLock::new(|| SCHEMA_SOURCE.parse().expect("embedded schema must be valid JSON"));

/// An immutable schema document.
#[derive(Debug, Clone)]
pub struct Schema {
    document: Value,
}

impl Schema {
    /// The schema shipped with kbuild.
    ///
    /// # Panics
    ///
    /// Panics on first use if the embedded document is not valid JSON.
    pub fn builtin() -> &'static Schema {
        &BUILTIN
    }

    /// Wrap an already parsed schema document.
    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    /// The raw schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The root node.
    pub fn root(&self) -> SchemaNode<'_> {
        SchemaNode::new(&self.document)
    }

    /// Look up a node by its absolute key path from the root.
    pub fn node_at<S: AsRef<str>>(&self, path: &[S]) -> Option<SchemaNode<'_>> {
        kbuild_core::get(&self.document, path).map(SchemaNode::new)
    }

    /// Resolve a `$ref` string such as `#/definitions/formatsRepo`.
    pub fn resolve_ref(&self, reference: &str) -> Result<SchemaNode<'_>> {
        let path = decode_ref(reference)?;
        self.node_at(&path)
            .ok_or_else(|| SchemaError::UnresolvedRef(reference.to_string()))
    }

    /// Follow `$ref` links from `node` until reaching a concrete node.
    pub fn resolve<'a>(&'a self, node: SchemaNode<'a>) -> Result<SchemaNode<'a>> {
        let mut current = node;
        let mut depth = 0;
        while let Some(reference) = current.reference() {
            if depth == MAX_REF_DEPTH {
                return Err(SchemaError::RefCycle(reference.to_string()));
            }
            current = self.resolve_ref(reference)?;
            depth += 1;
        }
        Ok(current)
    }

    /// The default declared for the property at `path`, resolving refs.
    ///
    /// `path` is a property path (e.g. `["repo", "git"]`), not a raw
    /// document path.
    pub fn default_for<S: AsRef<str>>(&self, path: &[S]) -> Result<Value> {
        let mut node = self.root();
        for key in path {
            let resolved = self.resolve(node)?;
            node = resolved
                .property(key.as_ref())
                .ok_or_else(|| SchemaError::UnknownProperty(key.as_ref().to_string()))?;
        }
        let node = self.resolve(node)?;
        Ok(node.default().cloned().unwrap_or(Value::Null))
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(source: &str) -> Result<Self> {
        let document = serde_json::from_str(source).map_err(SchemaError::Parse)?;
        Ok(Self::from_value(document))
    }
}

const MAX_REF_DEPTH: usize = 32;
