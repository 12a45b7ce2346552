//! Core operations.
//!
//! This module contains the business logic for kbuild commands,
//! separated from CLI argument parsing and output rendering.

pub mod build;
pub mod check;
pub mod load;
pub mod options;

pub use build::build;
pub use check::check;
pub use load::load_config;
pub use options::options;
