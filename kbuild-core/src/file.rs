use std::path::Path;

use eyre::{Result, WrapErr};

use crate::CompileResult;

/// What [`CompileResult::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// The text was written to the save path.
    Written,
    /// The result was already on disk; nothing was touched.
    Skipped,
}

/// Write UTF-8 text to `path`, creating parent directories as needed.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create '{}'", parent.display()))?;
    }
    std::fs::write(path, content.as_bytes())
        .wrap_err_with(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

impl CompileResult {
    /// Persist this result at `path` if it still needs a write.
    pub fn save(&self, path: &Path) -> Result<WriteResult> {
        if !self.needs_write() {
            return Ok(WriteResult::Skipped);
        }
        write_text(path, &self.text()?)?;
        Ok(WriteResult::Written)
    }
}
