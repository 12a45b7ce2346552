//! Core utilities and types for kbuild.
//!
//! This crate provides fundamental types and utilities used across
//! the kbuild workspace: nested-tree access, compile results and
//! file persistence.

mod file;
mod result;
pub mod tree;
mod utils;

// File operations
pub use file::{WriteResult, write_text};
// Compile results
pub use result::CompileResult;
// Tree access
pub use tree::{TreeError, get, get_mut, get_or, is_empty, set};
// String utilities
pub use utils::{strip_git_suffix, to_kebab_case};
