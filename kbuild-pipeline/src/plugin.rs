//! Hooks around each target of a build.

use eyre::Result;
use kbuild_manifest::Target;

use crate::TargetReport;

/// Observes targets as the pipeline builds them.
///
/// Hooks run synchronously on the build thread, in registration order.
/// An error from any hook stops the build just like a compile failure.
///
/// ```ignore
/// struct Ticker(AtomicUsize);
///
/// impl Plugin for Ticker {
///     fn name(&self) -> &'static str {
///         "ticker"
///     }
///
///     fn on_after_target(&self, target: &Target, report: &TargetReport) -> Result<()> {
///         let n = self.0.fetch_add(1, Ordering::Relaxed) + 1;
///         eprintln!("[{n}] {} ({} written)", target.output_key.display(), report.written.len());
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs before the target's specification is compiled.
    fn on_before_target(&self, _target: &Target) -> Result<()> {
        Ok(())
    }

    /// Runs once every module of the target is saved.
    fn on_after_target(&self, _target: &Target, _report: &TargetReport) -> Result<()> {
        Ok(())
    }
}
