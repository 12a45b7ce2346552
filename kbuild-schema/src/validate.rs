//! JSON Schema validation of configuration trees.
//!
//! Validation is backed by the `jsonschema` crate and compiled in with
//! the default `validation` feature. Without it, [`Validator`] accepts
//! every instance and logs a warning once at construction.

use serde_json::Value;

#[cfg(feature = "validation")]
use crate::SchemaError;
use crate::{Result, Schema};

/// Validates configuration trees against a [`Schema`].
pub struct Validator {
    #[cfg(feature = "validation")]
    compiled: jsonschema::Validator,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("enabled", &Self::is_enabled())
            .finish()
    }
}

impl Validator {
    /// Whether validation was compiled in.
    pub fn is_enabled() -> bool {
        cfg!(feature = "validation")
    }

    /// Check the schema against its meta-schema and compile it.
    pub fn new(schema: &Schema) -> Result<Self> {
        Self::check_schema(schema)?;

        #[cfg(feature = "validation")]
        {
            let compiled = jsonschema::validator_for(schema.document())
                .map_err(|e| SchemaError::InvalidSchema(e.to_string()))?;
            Ok(Self { compiled })
        }

        #[cfg(not(feature = "validation"))]
        {
            tracing::warn!("built without schema validation, configuration is not validated");
            Ok(Self {})
        }
    }

    /// Check that the schema document is itself a valid JSON Schema.
    pub fn check_schema(schema: &Schema) -> Result<()> {
        #[cfg(feature = "validation")]
        jsonschema::meta::validate(schema.document())
            .map_err(|e| SchemaError::InvalidSchema(e.to_string()))?;

        #[cfg(not(feature = "validation"))]
        let _ = schema;

        Ok(())
    }

    /// Validate `instance`, collecting every violation.
    pub fn validate(&self, instance: &Value) -> Result<()> {
        #[cfg(feature = "validation")]
        {
            let violations: Vec<String> = self
                .compiled
                .iter_errors(instance)
                .map(|e| {
                    let location = e.instance_path.to_string();
                    if location.is_empty() {
                        format!("  (root): {e}")
                    } else {
                        format!("  {location}: {e}")
                    }
                })
                .collect();
            if !violations.is_empty() {
                return Err(SchemaError::Validation(violations));
            }
        }

        #[cfg(not(feature = "validation"))]
        let _ = instance;

        tracing::debug!("configuration validated");
        Ok(())
    }
}
