use clap::Args;
use eyre::Result;
use kbuild_pipeline::PostprocessorRegistry;

use super::{ConfigArgs, UnwrapOrExit};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct BuildCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl BuildCommand {
    /// Run the build command
    pub fn run(&self) -> Result<()> {
        let postprocessors = PostprocessorRegistry::with_builtins();
        let config = ops::load_config(
            &self.config.config_path(),
            &self.config.overrides,
            &postprocessors,
        )
        .unwrap_or_exit();

        let report = ops::build(&config, &postprocessors)?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
