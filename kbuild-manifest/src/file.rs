//! Configuration files on disk.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{Error, Result};

/// File name whose configuration lives in a `[tool.kaitai]` section.
pub const PYPROJECT_FILE: &str = "pyproject.toml";

/// Section of `pyproject.toml` holding the configuration.
pub const PYPROJECT_SECTION: &str = "tool.kaitai";

/// A configuration file with both raw content and the extracted tree.
///
/// Two layouts are understood: a standalone `kbuild.toml` whose root
/// table is the configuration, and a `pyproject.toml` with the
/// configuration under `[tool.kaitai]`. Relative directories in the
/// file are taken relative to the file itself.
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    content: String,
    tree: Value,
}

impl ConfigFile {
    /// Open and parse a configuration file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let tree = parse_config(&content, &path, &base_dir)?;

        Ok(Self {
            path,
            content,
            tree,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the configuration tree, with directories re-rooted.
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Take the configuration tree.
    pub fn into_tree(self) -> Value {
        self.tree
    }
}

/// Parse configuration `content` read from `path`.
///
/// Relative directories are re-rooted at `base_dir`.
pub fn parse_config(content: &str, path: &Path, base_dir: &Path) -> Result<Value> {
    let filename = path.display().to_string();
    let table: toml::Table = toml::from_str(content).map_err(|e| Error::parse(e, content, &filename))?;
    let document = serde_json::to_value(table).map_err(|e| Error::invalid(e.to_string()))?;

    let mut tree = if path.file_name().is_some_and(|name| name == PYPROJECT_FILE) {
        let section: Vec<&str> = PYPROJECT_SECTION.split('.').collect();
        kbuild_core::get(&document, &section)
            .cloned()
            .ok_or_else(|| {
                Box::new(Error::MissingSection {
                    path: path.to_path_buf(),
                    section: PYPROJECT_SECTION.to_string(),
                })
            })?
    } else {
        document
    };

    reroot_paths(&mut tree, base_dir);
    Ok(tree)
}

/// Re-root relative directories at `base_dir`.
///
/// `outputDir` and `repo.localPath` are taken relative to `base_dir`.
/// `inputDir` is taken relative to the local checkout when one is
/// configured, and to `base_dir` otherwise.
fn reroot_paths(tree: &mut Value, base_dir: &Path) {
    let Some(cfg) = tree.as_object_mut() else {
        return;
    };

    if let Some(Value::String(out)) = cfg.get_mut("outputDir") {
        *out = join(base_dir, out);
    }

    let local_path = match cfg.get_mut("repo").and_then(|r| r.get_mut("localPath")) {
        Some(Value::String(local)) => {
            *local = join(base_dir, local);
            Some(local.clone())
        }
        _ => None,
    };

    if let Some(Value::String(input)) = cfg.get_mut("inputDir") {
        *input = match &local_path {
            Some(local) => join(Path::new(local), input),
            None => join(base_dir, input),
        };
    }
}

fn join(base: &Path, path: &str) -> String {
    base.join(path).to_string_lossy().into_owned()
}
