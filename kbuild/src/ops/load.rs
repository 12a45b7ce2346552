//! Load operation - configuration file to normalized config.

use std::path::Path;

use kbuild_manifest::{Config, ConfigFile, Normalizer, Result};
use kbuild_pipeline::PostprocessorRegistry;
use kbuild_schema::{OptionTable, Schema};
use serde_json::Value;
use tracing::debug;

/// Read `path`, apply `overrides` and normalize the result.
///
/// Unset `postprocessors` default to every name in `postprocessors`.
/// Paths in the file are re-rooted at its directory when it is opened;
/// path overrides are applied afterwards and stay relative to the
/// current directory.
pub fn load_config(
    path: &Path,
    overrides: &[(String, String)],
    postprocessors: &PostprocessorRegistry,
) -> Result<Config> {
    let schema = Schema::builtin();
    let mut tree = ConfigFile::open(path)?.into_tree();
    debug!(path = %path.display(), "loaded configuration");

    apply_overrides(schema, &mut tree, overrides)?;

    Normalizer::new(schema)?
        .with_postprocessors(postprocessors.names())
        .normalize(tree)
}

/// Apply `name = value` overrides through the flat option table.
pub fn apply_overrides(
    schema: &Schema,
    tree: &mut Value,
    overrides: &[(String, String)],
) -> Result<()> {
    if overrides.is_empty() {
        return Ok(());
    }

    let mut table = OptionTable::export(schema, tree)?;
    for (name, value) in overrides {
        debug!(%name, %value, "overriding option");
        table.set_from_str(name, value)?;
    }
    table.import(tree)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_overrides_parsed_by_type() {
        let mut tree = json!({"inputDir": "ksy"});
        apply_overrides(
            Schema::builtin(),
            &mut tree,
            &overrides(&[
                ("search", "true"),
                ("repo_refspec", "v0.10"),
                ("flags_verbose", "[\"file\", \"value\"]"),
                ("forceBackend", "null"),
            ]),
        )
        .unwrap();

        assert_eq!(tree["search"], json!(true));
        assert_eq!(tree["repo"]["refspec"], json!("v0.10"));
        assert_eq!(tree["flags"]["verbose"], json!(["file", "value"]));
        assert_eq!(tree["forceBackend"], Value::Null);
        assert_eq!(tree["inputDir"], json!("ksy"));
    }

    #[test]
    fn test_unknown_override_rejected() {
        let mut tree = json!({"inputDir": "ksy"});
        let err = apply_overrides(Schema::builtin(), &mut tree, &overrides(&[("colour", "1")]))
            .unwrap_err();
        assert!(matches!(*err, kbuild_manifest::Error::Schema(_)));
    }

    #[test]
    fn test_no_overrides_leaves_tree_alone() {
        let mut tree = json!({"inputDir": "ksy"});
        apply_overrides(Schema::builtin(), &mut tree, &[]).unwrap();
        assert_eq!(tree, json!({"inputDir": "ksy"}));
    }

    #[test]
    fn test_load_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kbuild.toml");
        std::fs::write(&path, "inputDir = \"ksy\"\n").unwrap();

        let config = load_config(
            &path,
            &overrides(&[("outputDir", "/tmp/generated")]),
            &PostprocessorRegistry::with_builtins(),
        )
        .unwrap();

        assert_eq!(config.input_dir, temp.path().join("ksy"));
        assert_eq!(config.output_dir, Path::new("/tmp/generated"));
        assert_eq!(config.postprocessors.len(), 4);
    }

    #[test]
    fn test_path_override_stays_relative_to_cwd() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kbuild.toml");
        std::fs::write(&path, "inputDir = \"ksy\"\noutputDir = \"parsers\"\n").unwrap();
        let postprocessors = PostprocessorRegistry::with_builtins();

        let from_file = load_config(&path, &[], &postprocessors).unwrap();
        assert_eq!(from_file.output_dir, temp.path().join("parsers"));

        let overridden =
            load_config(&path, &overrides(&[("outputDir", "gen")]), &postprocessors).unwrap();
        assert_eq!(overridden.input_dir, temp.path().join("ksy"));
        assert_eq!(overridden.output_dir, Path::new("gen"));
    }
}
