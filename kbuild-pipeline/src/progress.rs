//! Progress reporting for long-running steps.

/// Receives human-readable progress messages from backends and updaters.
pub trait Progress: Send + Sync {
    /// Report a progress message.
    fn message(&self, msg: &str);
}

/// Forwards progress messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn message(&self, msg: &str) {
        tracing::info!(target: "kbuild::progress", "{msg}");
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn message(&self, _msg: &str) {}
}
