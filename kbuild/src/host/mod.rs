//! Host integrations: the real compiler and repository updater.

mod cli_backend;
mod git;

pub use cli_backend::CliBackendFactory;
pub use git::GitCliUpdater;
