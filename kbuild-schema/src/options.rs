//! User-facing options derived from the schema.
//!
//! Every schema leaf is a settable option. [`schema_to_user_options`]
//! lists them for help output, and [`OptionTable`] holds their values
//! in flat form (`repo_git`, `flags_verbose`, ...) so they can be
//! overridden one at a time and written back into a nested config.

use indexmap::IndexMap;
use serde_json::Value;

use crate::{Result, Schema, SchemaError, leaves};

/// A schema leaf presented as a command-line style option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOption {
    /// Dash-joined option path (e.g. `repo-localPath`).
    pub long: String,
    /// Short flag; schema options never have one.
    pub short: Option<char>,
    pub description: Option<String>,
}

/// List every leaf of `schema` as a [`UserOption`].
pub fn schema_to_user_options(schema: &Schema) -> Result<Vec<UserOption>> {
    Ok(leaves(schema)?
        .into_iter()
        .map(|leaf| UserOption {
            long: leaf.joined("-"),
            short: None,
            description: leaf.node.description().map(str::to_string),
        })
        .collect())
}

/// The value of one flat option together with where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSlot {
    /// Property path in the nested config.
    pub path: Vec<String>,
    /// Declared JSON types of the leaf.
    pub types: Vec<String>,
    /// Current value; `null` when unset and without default.
    pub value: Value,
}

impl OptionSlot {
    /// Whether string values of this slot are JSON text to be parsed.
    pub fn is_compound(&self) -> bool {
        matches!(self.types.as_slice(), [t] if t == "array" || t == "object")
    }

    fn accepts(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }
}

/// Flat `name -> value` view of every schema option.
///
/// Names are the `_`-joined property paths. The table is built from the
/// schema, so the set of names is fixed; only values change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionTable {
    slots: IndexMap<String, OptionSlot>,
}

impl OptionTable {
    /// A table holding the schema defaults.
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        Self::export(schema, &Value::Null)
    }

    /// Read every option out of a nested `config`.
    ///
    /// Options missing from `config` take the schema default, or `null`
    /// if the schema declares none.
    pub fn export(schema: &Schema, config: &Value) -> Result<Self> {
        let mut slots = IndexMap::new();
        for leaf in leaves(schema)? {
            let value = kbuild_core::get(config, &leaf.path)
                .or(leaf.node.default())
                .cloned()
                .unwrap_or(Value::Null);
            let types = match leaf.node.type_value() {
                Some(Value::String(t)) => vec![t.clone()],
                Some(Value::Array(ts)) => ts
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            slots.insert(
                leaf.joined("_"),
                OptionSlot {
                    path: leaf.path,
                    types,
                    value,
                },
            );
        }
        Ok(Self { slots })
    }

    /// Write every option back into a nested `config`.
    ///
    /// Compound (array/object) options still holding a string are parsed
    /// as JSON first.
    pub fn import(&self, config: &mut Value) -> Result<()> {
        for (name, slot) in &self.slots {
            let value = match &slot.value {
                Value::String(text) if slot.is_compound() => serde_json::from_str(text)
                    .map_err(|source| SchemaError::InvalidJson {
                        name: name.clone(),
                        source,
                    })?,
                other => other.clone(),
            };
            kbuild_core::set(config, &slot.path, value)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    pub fn slot(&self, name: &str) -> Option<&OptionSlot> {
        self.slots.get(name)
    }

    /// Set the value of option `name`.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| SchemaError::UnknownOption(name.to_string()))?;
        slot.value = value;
        Ok(())
    }

    /// Set option `name` from command-line text.
    ///
    /// Booleans and numbers are parsed according to the declared type,
    /// `null` clears nullable options, and compound options keep the raw
    /// text until [`import`](Self::import).
    pub fn set_from_str(&mut self, name: &str, raw: &str) -> Result<()> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| SchemaError::UnknownOption(name.to_string()))?;

        let value = if slot.is_compound() {
            Value::String(raw.to_string())
        } else if slot.accepts("null") && raw == "null" {
            Value::Null
        } else if slot.accepts("boolean") {
            match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Value::Bool(true),
                "false" | "0" | "no" | "off" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            }
        } else if slot.accepts("integer") {
            raw.parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string()))
        } else if slot.accepts("number") {
            raw.parse::<f64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string()))
        } else {
            Value::String(raw.to_string())
        };

        self.set(name, value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionSlot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
