// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Loading, normalizing and resolving kbuild configurations.
//!
//! A configuration goes through three steps before a build:
//!
//! 1. [`ConfigFile`] reads `kbuild.toml` or `pyproject.toml` into a tree
//! 2. [`Normalizer`] fills schema defaults, validates, and yields a [`Config`]
//! 3. [`TargetResolver`] turns the config into an ordered list of [`Target`]s

mod config;
mod error;
mod file;
mod normalize;
pub mod targets;

pub use config::{Config, FormatEntry, RepoConfig};
pub use error::{Error, Result};
pub use file::{ConfigFile, PYPROJECT_FILE, PYPROJECT_SECTION, parse_config};
pub use normalize::{Normalizer, prepare_compiler_flags, prepare_repo};
pub use targets::{SPEC_EXTENSION, Target, TargetResolver, find_specs};
