//! Results produced by compiler backends.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

/// The output of compiling one logical module.
///
/// Backends either write their output themselves ([`CompileResult::InFile`])
/// or hand the generated text back ([`CompileResult::InMemory`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// Already written by the backend to `path`.
    InFile {
        path: PathBuf,
        /// Replacement text produced by a postprocessor, not yet on disk.
        rewritten: Option<String>,
    },
    /// Generated text held in memory.
    InMemory { text: String, needs_write: bool },
}

impl CompileResult {
    /// A result the backend has already persisted at `path`.
    pub fn in_file(path: impl Into<PathBuf>) -> Self {
        Self::InFile {
            path: path.into(),
            rewritten: None,
        }
    }

    /// A result held in memory that still has to be written.
    pub fn in_memory(text: impl Into<String>) -> Self {
        Self::InMemory {
            text: text.into(),
            needs_write: true,
        }
    }

    /// Whether the result still has to be written to disk.
    pub fn needs_write(&self) -> bool {
        match self {
            Self::InFile { rewritten, .. } => rewritten.is_some(),
            Self::InMemory { needs_write, .. } => *needs_write,
        }
    }

    /// The file path the backend wrote, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InFile { path, .. } => Some(path),
            Self::InMemory { .. } => None,
        }
    }

    /// Get the generated text, reading it from disk if necessary.
    pub fn text(&self) -> Result<String> {
        match self {
            Self::InFile {
                rewritten: Some(text),
                ..
            } => Ok(text.clone()),
            Self::InFile {
                path,
                rewritten: None,
            } => std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read '{}'", path.display())),
            Self::InMemory { text, .. } => Ok(text.clone()),
        }
    }

    /// Replace the text with `f(text)`, keeping the variant.
    ///
    /// Any change marks the result as needing a write. An unchanged text
    /// keeps the original write state, so identity transforms are free.
    pub fn map_text(self, f: impl FnOnce(&str) -> String) -> Result<Self> {
        let current = self.text()?;
        let updated = f(&current);
        if updated == current {
            return Ok(self);
        }
        Ok(match self {
            Self::InFile { path, .. } => Self::InFile {
                path,
                rewritten: Some(updated),
            },
            Self::InMemory { .. } => Self::InMemory {
                text: updated,
                needs_write: true,
            },
        })
    }
}
