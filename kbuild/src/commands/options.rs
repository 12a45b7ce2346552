use clap::Args;
use eyre::Result;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct OptionsCommand {}

impl OptionsCommand {
    /// Run the options command
    pub fn run(&self) -> Result<()> {
        let report = ops::options()?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
