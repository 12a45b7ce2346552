mod build;
mod check;
mod options;

use std::path::{Path, PathBuf};

use build::BuildCommand;
use check::CheckCommand;
use clap::{Args, Parser, Subcommand};
use eyre::Result;
use kbuild_manifest::PYPROJECT_FILE;
use options::OptionsCommand;

/// Standalone configuration file name.
pub(crate) const CONFIG_FILE: &str = "kbuild.toml";

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for kbuild_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "kbuild")]
#[command(version)]
#[command(about = "Compile Kaitai Struct specifications into parser modules")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Build(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Options(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every configured specification
    Build(BuildCommand),

    /// Validate the configuration and show what would be built
    Check(CheckCommand),

    /// List every configuration option
    Options(OptionsCommand),
}

/// Arguments locating and adjusting the configuration.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to kbuild.toml or pyproject.toml (defaults to whichever exists in ./)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override an option, e.g. `-o search=true` or `-o repo_update=true`.
    /// Relative paths given here resolve against the current directory,
    /// not the config file's directory
    #[arg(short = 'o', long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,
}

impl ConfigArgs {
    /// The configuration file to read.
    pub fn config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None => default_config_path(Path::new(".")),
        }
    }
}

/// Pick `kbuild.toml` in `dir`, falling back to `pyproject.toml`.
fn default_config_path(dir: &Path) -> PathBuf {
    let standalone = dir.join(CONFIG_FILE);
    let pyproject = dir.join(PYPROJECT_FILE);
    if !standalone.exists() && pyproject.exists() {
        pyproject
    } else {
        standalone
    }
}

fn parse_override(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in '{raw}'"));
    }
    Ok((key.replace('-', "_"), value.to_string()))
}
