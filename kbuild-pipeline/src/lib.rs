//! Build pipeline for kbuild.
//!
//! Takes a normalized [`Config`](kbuild_manifest::Config), optionally
//! updates the local format repository, selects a compiler backend and
//! compiles every resolved target, running postprocessors over the
//! output before it is saved.
//!
//! # Module Organization
//!
//! - [`backend`] - Backend trait, factories and selection ([`BackendRegistry`])
//! - [`postprocess`] - Named output transforms ([`PostprocessorRegistry`])
//! - [`updater`] - Local repository updates ([`LibraryUpdater`])
//! - [`plugin`] - Per-target lifecycle hooks ([`Plugin`])
//! - [`progress`] - Progress callbacks ([`Progress`])
//! - [`report`] - Build summaries ([`BuildReport`], [`Plan`])

pub mod backend;
pub mod plugin;
pub mod postprocess;
pub mod progress;
pub mod report;
mod runner;
pub mod updater;

pub use backend::{
    Backend, BackendError, BackendFactory, BackendRegistry, BackendSettings, CompileOutput,
};
pub use plugin::Plugin;
pub use postprocess::{Postprocessor, PostprocessorRegistry, UnknownPostprocessor};
pub use progress::{Progress, SilentProgress, TracingProgress};
pub use report::{BuildReport, Plan, PlannedTarget, TargetReport};
pub use runner::{Pipeline, TOLERABLE_ISSUES_ENV, env_tolerable_issues};
pub use updater::LibraryUpdater;
