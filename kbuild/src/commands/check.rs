use clap::Args;
use eyre::Result;
use kbuild_pipeline::PostprocessorRegistry;

use super::{ConfigArgs, UnwrapOrExit};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let postprocessors = PostprocessorRegistry::with_builtins();
        let config_path = self.config.config_path();
        let config = ops::load_config(&config_path, &self.config.overrides, &postprocessors)
            .unwrap_or_exit();

        let report = ops::check(&config, &config_path, &postprocessors)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
