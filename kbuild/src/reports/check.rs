//! Check command report data structures.

use std::path::PathBuf;

use kbuild_pipeline::Plan;

use super::{
    build::plural,
    output::{Output, Report},
};

/// Report data from configuration validation and planning.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    /// What a build would do.
    pub plan: Plan,
    /// Problems that would fail the build.
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }
        for warning in &self.warnings {
            out.warning(warning);
        }
        if !self.warnings.is_empty() || !self.errors.is_empty() {
            out.newline();
        }

        if self.is_valid() {
            out.preformatted(&format!("✓ {} is valid\n", self.config_path.display()));
        }

        out.key_value("Backend", &self.plan.backend);
        out.key_value("Output", &self.plan.output_dir.display().to_string());
        out.newline();

        let count = self.plan.targets.len();
        out.section(&format!("{count} target{}", plural(count)));
        for target in &self.plan.targets {
            let mut line = format!(
                "{} <- {}",
                target.output_key.display(),
                target.source_path.display()
            );
            if !target.postprocess.is_empty() {
                line.push_str(&format!(" [{}]", target.postprocess.join(", ")));
            }
            out.list_item(&line);
        }
    }
}
