//! Check operation - configuration validation and build planning.

use std::path::Path;

use eyre::Result;
use kbuild_manifest::Config;
use kbuild_pipeline::{Pipeline, PostprocessorRegistry};

use super::build::backends;
use crate::reports::CheckReport;

/// Execute the check operation.
///
/// The config is already normalized and validated; this resolves the
/// targets and reports anything that would make the build fail.
pub fn check(
    config: &Config,
    config_path: &Path,
    postprocessors: &PostprocessorRegistry,
) -> Result<CheckReport> {
    let backends = backends();
    let plan = Pipeline::new(&backends, postprocessors).plan(config)?;

    let mut errors = Vec::new();
    for target in &plan.targets {
        if !target.exists {
            errors.push(format!(
                "'{}': specification '{}' does not exist",
                target.output_key.display(),
                target.source_path.display()
            ));
        }
        for name in &target.postprocess {
            if let Err(e) = postprocessors.get_enabled(name, &config.postprocessors) {
                errors.push(format!("'{}': {e}", target.output_key.display()));
            }
        }
    }

    let mut warnings = Vec::new();
    if plan.targets.is_empty() {
        warnings.push("no targets: set 'search = true' or add [formats] entries".to_string());
    }

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        plan,
        errors,
        warnings,
    })
}
