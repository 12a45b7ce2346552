//! Build operation - compile every target of a config.

use eyre::Result;
use kbuild_manifest::{Config, Target};
use kbuild_pipeline::{
    BackendRegistry, BuildReport, Pipeline, Plugin, PostprocessorRegistry, TargetReport,
};
use tracing::info;

use crate::host::{CliBackendFactory, GitCliUpdater};

/// Backends available to the command line, in priority order.
pub fn backends() -> BackendRegistry {
    BackendRegistry::new().register(CliBackendFactory::default())
}

/// Execute the build operation.
pub fn build(config: &Config, postprocessors: &PostprocessorRegistry) -> Result<BuildReport> {
    let backends = backends();
    Pipeline::new(&backends, postprocessors)
        .updater(GitCliUpdater)
        .plugin(TargetLog)
        .run(config)
}

/// Logs one line per finished target.
struct TargetLog;

impl Plugin for TargetLog {
    fn name(&self) -> &'static str {
        "target-log"
    }

    fn on_after_target(&self, target: &Target, report: &TargetReport) -> Result<()> {
        info!(
            key = %target.output_key.display(),
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            "built"
        );
        Ok(())
    }
}
