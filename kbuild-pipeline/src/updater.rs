//! Keeping the local format repository up to date.

use std::path::Path;

use eyre::Result;

use crate::Progress;

/// Brings a local checkout of the format repository to `refspec`.
///
/// Called at most once per build, before targets are resolved, so that
/// discovery sees the updated tree.
pub trait LibraryUpdater {
    fn upgrade(
        &self,
        local_path: &Path,
        git_url: &str,
        refspec: &str,
        progress: &dyn Progress,
    ) -> Result<()>;
}
