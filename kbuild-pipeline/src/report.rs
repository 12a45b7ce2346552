//! Summaries of a finished build.

use std::path::PathBuf;

use serde::Serialize;

/// Outcome of a whole build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Name of the backend that compiled the targets.
    pub backend: String,
    pub output_dir: PathBuf,
    /// Local checkout that was updated before the build, if any.
    pub updated_repo: Option<PathBuf>,
    pub targets: Vec<TargetReport>,
}

impl BuildReport {
    /// Number of files written across all targets.
    pub fn written_count(&self) -> usize {
        self.targets.iter().map(|t| t.written.len()).sum()
    }

    /// Number of modules that were already on disk and left as is.
    pub fn unchanged_count(&self) -> usize {
        self.targets.iter().map(|t| t.unchanged.len()).sum()
    }
}

/// Outcome of building one target.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TargetReport {
    pub output_key: PathBuf,
    pub source_path: PathBuf,
    /// Files written by the pipeline.
    pub written: Vec<PathBuf>,
    /// Files the backend already persisted and no postprocessor changed.
    pub unchanged: Vec<PathBuf>,
}

/// A build plan: what would be compiled, without compiling.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub backend: String,
    pub extension: String,
    pub output_dir: PathBuf,
    pub targets: Vec<PlannedTarget>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedTarget {
    pub output_key: PathBuf,
    pub source_path: PathBuf,
    /// Whether the specification exists on disk.
    pub exists: bool,
    pub postprocess: Vec<String>,
}
