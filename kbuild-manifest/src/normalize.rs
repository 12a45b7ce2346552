//! Filling a partial configuration from schema defaults.
//!
//! Normalization runs in a fixed order because later rules read fields
//! filled by earlier ones:
//!
//! 1. top-level defaults (`postprocessors`, `tolerableIssues`, ...)
//! 2. compiler flags
//! 3. validation
//! 4. repository descriptor
//! 5. `outputDir` defaulting to `inputDir`
//! 6. remaining schema leaf defaults
//! 7. validation again
//!
//! Target resolution is separate (see [`crate::targets`]) since it must
//! see the final input and output directories.

use kbuild_core::{is_empty, strip_git_suffix};
use kbuild_schema::{Schema, Validator, leaves};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{Config, Error, Result};

/// Fields of the top-level table filled straight from schema defaults.
const TOP_LEVEL_DEFAULTS: [&str; 4] = [
    "tolerableIssues",
    "forceBackend",
    "kaitaiStructRoot",
    "search",
];

/// Normalizes configuration trees against a schema.
#[derive(Debug)]
pub struct Normalizer<'s> {
    schema: &'s Schema,
    validator: Validator,
    postprocessors: Vec<String>,
}

impl<'s> Normalizer<'s> {
    /// Create a normalizer, checking and compiling the schema.
    pub fn new(schema: &'s Schema) -> Result<Self> {
        Ok(Self {
            schema,
            validator: Validator::new(schema)?,
            postprocessors: Vec::new(),
        })
    }

    /// Set the postprocessor names used when `postprocessors` is unset.
    pub fn with_postprocessors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.postprocessors = names.into_iter().map(Into::into).collect();
        self
    }

    /// Normalize `tree` and convert it into a typed [`Config`].
    pub fn normalize(&self, mut tree: Value) -> Result<Config> {
        self.normalize_tree(&mut tree)?;
        Config::from_tree(&tree)
    }

    /// Normalize `tree` in place.
    ///
    /// Running this on an already normalized tree leaves it unchanged.
    pub fn normalize_tree(&self, tree: &mut Value) -> Result<()> {
        let cfg = tree
            .as_object_mut()
            .ok_or_else(|| Error::invalid("configuration must be a table"))?;

        if is_empty(cfg, "postprocessors") {
            debug!(names = ?self.postprocessors, "enabling all registered postprocessors");
            cfg.insert(
                "postprocessors".to_string(),
                Value::from(self.postprocessors.clone()),
            );
        }
        for key in TOP_LEVEL_DEFAULTS {
            if is_empty(cfg, key) {
                cfg.insert(key.to_string(), self.schema.default_for(&[key])?);
            }
        }
        if is_empty(cfg, "flags") {
            cfg.insert("flags".to_string(), Value::Object(Map::new()));
        }
        if let Some(flags) = cfg.get_mut("flags") {
            prepare_compiler_flags(self.schema, flags)?;
        }

        self.validator.validate(tree)?;

        let cfg = as_table(tree)?;
        if is_empty(cfg, "repo") {
            cfg.insert("repo".to_string(), Value::Object(Map::new()));
        }
        if let Some(repo) = cfg.get_mut("repo") {
            prepare_repo(self.schema, repo)?;
        }

        if is_empty(cfg, "outputDir") {
            let input_dir = cfg.get("inputDir").cloned().unwrap_or(Value::Null);
            cfg.insert("outputDir".to_string(), input_dir);
        }

        fill_leaf_defaults(self.schema, tree)?;

        self.validator.validate(tree)?;
        Ok(())
    }
}

/// Fill the repository descriptor.
///
/// `update`, `git` and `refspec` take schema defaults. Without an
/// explicit `localPath`, one is derived from the git URL when updating
/// (`https://example.com/fmt.git` -> `fmt`) and left `null` otherwise.
pub fn prepare_repo(schema: &Schema, repo: &mut Value) -> Result<()> {
    let table = as_table(repo)?;

    for key in ["update", "git", "refspec"] {
        if is_empty(table, key) {
            table.insert(key.to_string(), schema.default_for(&["repo", key])?);
        }
    }

    if is_empty(table, "localPath") {
        let update = table.get("update").and_then(Value::as_bool).unwrap_or(false);
        let local_path = if update {
            let git = table.get("git").and_then(Value::as_str).unwrap_or_default();
            let dir = strip_git_suffix(git);
            debug!(git, dir, "deriving local checkout path");
            Value::String(dir.to_string())
        } else {
            Value::Null
        };
        table.insert("localPath".to_string(), local_path);
    }

    Ok(())
}

/// Fill compiler flags.
///
/// `namespaces` is only defaulted together with `additionalFlags`: when
/// `additionalFlags` is present, `namespaces` is left as given.
pub fn prepare_compiler_flags(schema: &Schema, flags: &mut Value) -> Result<()> {
    let table = as_table(flags)?;

    if is_empty(table, "additionalFlags") {
        table.insert(
            "additionalFlags".to_string(),
            schema.default_for(&["flags", "additionalFlags"])?,
        );
        if is_empty(table, "namespaces") {
            table.insert(
                "namespaces".to_string(),
                schema.default_for(&["flags", "namespaces"])?,
            );
        }
    }

    Ok(())
}

/// Set every absent leaf that has a non-null schema default.
fn fill_leaf_defaults(schema: &Schema, tree: &mut Value) -> Result<()> {
    for leaf in leaves(schema)? {
        let Some(default) = leaf.node.default().filter(|d| !d.is_null()) else {
            continue;
        };
        if kbuild_core::get(tree, &leaf.path).is_none() {
            kbuild_core::set(tree, &leaf.path, default.clone())
                .map_err(kbuild_schema::SchemaError::from)?;
        }
    }
    Ok(())
}

fn as_table(value: &mut Value) -> Result<&mut Map<String, Value>> {
    value
        .as_object_mut()
        .ok_or_else(|| Error::invalid("expected a table"))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn normalizer() -> Normalizer<'static> {
        Normalizer::new(Schema::builtin())
            .unwrap()
            .with_postprocessors(["identity", "normalizeNewlines"])
    }

    #[test]
    fn test_minimal_config_filled() {
        let mut tree = json!({"inputDir": "ksy"});
        normalizer().normalize_tree(&mut tree).unwrap();

        assert_eq!(tree["postprocessors"], json!(["identity", "normalizeNewlines"]));
        assert_eq!(tree["tolerableIssues"], json!([]));
        assert_eq!(tree["forceBackend"], Value::Null);
        assert_eq!(tree["search"], json!(false));
        assert_eq!(tree["outputDir"], json!("ksy"));
        assert_eq!(
            tree["repo"],
            json!({
                "update": false,
                "git": "https://github.com/kaitai-io/kaitai_struct_formats.git",
                "refspec": "master",
                "localPath": null
            })
        );
        assert_eq!(tree["flags"]["additionalFlags"], json!([]));
        assert_eq!(tree["flags"]["namespaces"], json!({}));
        assert_eq!(tree["flags"]["autoRead"], json!(true));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut once = json!({
            "inputDir": "ksy",
            "search": true,
            "repo": {"update": true, "git": "https://example.com/fmt.git"},
            "flags": {"additionalFlags": ["--ksc-json-output"], "readStoresPos": true},
            "formats": {"a.py": {"path": "a.ksy"}}
        });
        normalizer().normalize_tree(&mut once).unwrap();

        let mut twice = once.clone();
        normalizer().normalize_tree(&mut twice).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_every_defaulted_leaf_is_set() {
        let schema = Schema::builtin();
        let mut tree = json!({"inputDir": "ksy", "flags": {"additionalFlags": ["-x"]}});
        normalizer().normalize_tree(&mut tree).unwrap();

        for leaf in leaves(schema).unwrap() {
            if leaf.node.default().is_some_and(|d| !d.is_null()) {
                assert!(
                    kbuild_core::get(&tree, &leaf.path).is_some(),
                    "{} should be set",
                    leaf.joined(".")
                );
            }
        }
    }

    #[test]
    fn test_local_path_derived_from_git_url() {
        let mut repo = json!({"update": true, "git": "https://example.com/fmt.git"});
        prepare_repo(Schema::builtin(), &mut repo).unwrap();

        let local = PathBuf::from(repo["localPath"].as_str().unwrap());
        assert_eq!(local.file_name().unwrap(), "fmt");
        assert_eq!(local.extension(), None);
    }

    #[test]
    fn test_local_path_kept_when_given() {
        let mut repo = json!({"update": true, "git": "https://example.com/fmt.git", "localPath": "vendor/f"});
        prepare_repo(Schema::builtin(), &mut repo).unwrap();
        assert_eq!(repo["localPath"], json!("vendor/f"));
    }

    #[test]
    fn test_local_path_null_without_update() {
        let mut repo = json!({"git": "https://example.com/fmt.git"});
        prepare_repo(Schema::builtin(), &mut repo).unwrap();
        assert_eq!(repo["update"], json!(false));
        assert_eq!(repo["localPath"], Value::Null);
    }

    #[test]
    fn test_namespaces_defaulted_only_with_additional_flags() {
        let schema = Schema::builtin();

        let mut flags = json!({});
        prepare_compiler_flags(schema, &mut flags).unwrap();
        assert_eq!(flags, json!({"additionalFlags": [], "namespaces": {}}));

        let mut flags = json!({"additionalFlags": ["-v"]});
        prepare_compiler_flags(schema, &mut flags).unwrap();
        assert_eq!(flags, json!({"additionalFlags": ["-v"]}));
    }

    #[test]
    fn test_leaf_pass_fills_namespaces_after_additional_flags() {
        let mut tree = json!({"inputDir": "ksy", "flags": {"additionalFlags": ["-v"]}});
        normalizer().normalize_tree(&mut tree).unwrap();

        assert_eq!(tree["flags"]["additionalFlags"], json!(["-v"]));
        assert_eq!(tree["flags"]["namespaces"], json!({}));
    }

    #[test]
    fn test_explicit_postprocessors_kept() {
        let mut tree = json!({"inputDir": "ksy", "postprocessors": ["identity"]});
        normalizer().normalize_tree(&mut tree).unwrap();
        assert_eq!(tree["postprocessors"], json!(["identity"]));
    }

    #[test]
    fn test_output_dir_kept_when_given() {
        let config = normalizer()
            .normalize(json!({"inputDir": "ksy", "outputDir": "gen"}))
            .unwrap();
        assert_eq!(config.input_dir, Path::new("ksy"));
        assert_eq!(config.output_dir, Path::new("gen"));
    }

    #[test]
    fn test_repo_must_be_a_table() {
        let mut tree = json!({"inputDir": "ksy", "repo": 3});
        assert!(normalizer().normalize_tree(&mut tree).is_err());
    }

    #[test]
    fn test_root_must_be_a_table() {
        let mut tree = json!(["inputDir"]);
        let err = normalizer().normalize_tree(&mut tree).unwrap_err();
        assert!(matches!(*err, Error::Invalid { .. }));
    }

    #[test]
    fn test_validation_failure_is_fatal() {
        let mut tree = json!({"inputDir": "ksy", "search": "sometimes"});
        let err = normalizer().normalize_tree(&mut tree).unwrap_err();
        assert!(matches!(*err, Error::Schema(_)));
    }
}
