//! Typed view of a normalized configuration.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A fully normalized configuration.
///
/// Produced by [`Normalizer::normalize`](crate::Normalizer::normalize);
/// every field the schema declares has a value and path-like fields are
/// [`PathBuf`]s.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub repo: RepoConfig,
    /// Compiler flags shared by every target.
    pub flags: Map<String, Value>,
    /// Postprocessors targets may refer to.
    pub postprocessors: Vec<String>,
    pub tolerable_issues: Vec<String>,
    pub force_backend: Option<String>,
    pub kaitai_struct_root: Vec<PathBuf>,
    /// Whether to compile every specification under `input_dir`.
    pub search: bool,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Explicit targets, keyed by output path.
    #[serde(default)]
    pub formats: IndexMap<String, FormatEntry>,
}

/// The git repository with format specifications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoConfig {
    pub update: bool,
    pub git: String,
    pub refspec: String,
    /// Local checkout; `None` when this run manages no checkout.
    pub local_path: Option<PathBuf>,
}

/// One explicit entry of `formats`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FormatEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub flags: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<Vec<String>>,
}

impl Config {
    /// Convert a normalized tree into a typed config.
    pub fn from_tree(tree: &Value) -> Result<Self> {
        serde_json::from_value(tree.clone()).map_err(|e| Error::invalid(e.to_string()))
    }

    /// Convert back into a tree.
    pub fn to_tree(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_tree() {
        let tree = json!({
            "repo": {"update": false, "git": "g", "refspec": "master", "localPath": null},
            "flags": {"additionalFlags": []},
            "postprocessors": ["identity"],
            "tolerableIssues": [],
            "forceBackend": null,
            "kaitaiStructRoot": [],
            "search": true,
            "inputDir": "ksy",
            "outputDir": "out",
            "formats": {"a.py": {"path": "a.ksy", "postprocess": ["identity"]}}
        });

        let config = Config::from_tree(&tree).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("ksy"));
        assert_eq!(config.repo.local_path, None);
        assert!(config.search);
        let entry = &config.formats["a.py"];
        assert_eq!(entry.path, PathBuf::from("a.ksy"));
        assert!(entry.flags.is_empty());
        assert_eq!(entry.postprocess.as_deref(), Some(&["identity".to_string()][..]));
    }

    #[test]
    fn test_from_tree_missing_field() {
        let err = Config::from_tree(&json!({"inputDir": "ksy"})).unwrap_err();
        assert!(matches!(*err, Error::Invalid { .. }));
    }
}
