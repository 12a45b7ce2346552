//! Resolution of the target set from a normalized configuration.
//!
//! Targets come from two places: explicit `formats` entries and, when
//! `search` is on, every specification found under `inputDir`. Explicit
//! entries win over discovered ones that share their source or key.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{Config, Error, Result};

/// File extension of format specifications.
pub const SPEC_EXTENSION: &str = "ksy";

/// One unit of work: a specification and where its output goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Output path; generated modules are saved next to it.
    pub output_key: PathBuf,
    /// Absolute path of the specification.
    pub source_path: PathBuf,
    /// Per-target compiler flags.
    pub flags: Map<String, Value>,
    /// Postprocessor chain, applied in order.
    pub postprocess: Option<Vec<String>>,
}

impl Target {
    /// Directory in-memory modules of this target are saved into.
    pub fn output_dir(&self) -> &Path {
        self.output_key.parent().unwrap_or(Path::new(""))
    }
}

/// Resolves the targets of a [`Config`] for a backend's file extension.
#[derive(Debug)]
pub struct TargetResolver<'c> {
    config: &'c Config,
    extension: String,
}

impl<'c> TargetResolver<'c> {
    pub fn new(config: &'c Config, extension: impl Into<String>) -> Self {
        Self {
            config,
            extension: extension.into(),
        }
    }

    /// Resolve every target.
    ///
    /// Explicit targets come first in declaration order, followed by
    /// discovered targets in sorted directory order.
    pub fn resolve(&self) -> Result<Vec<Target>> {
        let mut targets = self.explicit()?;

        if self.config.search {
            for source in find_specs(&self.config.input_dir)? {
                let output_key = self.discovered_key(&source);
                let source_path = absolute(&source)?;

                let shadowed = targets
                    .iter()
                    .any(|t| t.source_path == source_path || t.output_key == output_key);
                if shadowed {
                    debug!(source = %source_path.display(), "skipping, already an explicit target");
                    continue;
                }

                targets.push(Target {
                    output_key,
                    source_path,
                    flags: Map::new(),
                    postprocess: None,
                });
            }
        }

        debug!(count = targets.len(), "resolved targets");
        Ok(targets)
    }

    /// Targets declared in `formats`, with keys and paths normalized.
    fn explicit(&self) -> Result<Vec<Target>> {
        self.config
            .formats
            .iter()
            .map(|(key, entry)| {
                Ok(Target {
                    output_key: self.rooted_key(key),
                    source_path: absolute(&self.config.input_dir.join(&entry.path))?,
                    flags: entry.flags.clone(),
                    postprocess: entry.postprocess.clone(),
                })
            })
            .collect()
    }

    /// Root `key` at `outputDir` unless it is absolute or already under it.
    fn rooted_key(&self, key: &str) -> PathBuf {
        let key = Path::new(key);
        if key.is_absolute() || key.starts_with(&self.config.output_dir) {
            key.to_path_buf()
        } else {
            self.config.output_dir.join(key)
        }
    }

    fn discovered_key(&self, source: &Path) -> PathBuf {
        let relative = source
            .strip_prefix(&self.config.input_dir)
            .unwrap_or(source);
        let mut key = self.config.output_dir.join(relative);
        key.set_extension(&self.extension);
        key
    }
}

/// Recursively find specification files under `dir`, in sorted order.
pub fn find_specs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect_specs(dir, &mut found)?;
    Ok(found)
}

fn collect_specs(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let scan_err = |source| {
        Box::new(Error::Scan {
            path: dir.to_path_buf(),
            source,
        })
    };

    let mut entries = std::fs::read_dir(dir)
        .and_then(|rd| rd.collect::<std::io::Result<Vec<_>>>())
        .map_err(scan_err)?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type().map_err(scan_err)?.is_dir() {
            collect_specs(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == SPEC_EXTENSION) {
            found.push(path);
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| {
        Box::new(Error::Scan {
            path: path.to_path_buf(),
            source,
        })
    })
}
