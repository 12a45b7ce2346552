//! Compiler backends and their selection.
//!
//! A [`BackendFactory`] describes one way to run the compiler together
//! with the known issues of that way (for example "needs a JVM"). The
//! [`BackendRegistry`] picks the first factory whose issues are all
//! tolerated, unless a backend is forced by name.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use eyre::Result;
use indexmap::IndexMap;
use kbuild_core::CompileResult;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::Progress;

/// Compiler output, keyed by generated module name.
pub type CompileOutput = IndexMap<String, CompileResult>;

/// A constructed compiler backend.
pub trait Backend {
    /// Name of the backend, as used by `forceBackend`.
    fn name(&self) -> &str;

    /// File extension of generated modules, without the dot.
    fn extension(&self) -> &str;

    /// Compile `sources` into `output_dir`.
    ///
    /// `flags` are per-target compiler flags layered over the ones the
    /// backend was created with.
    fn compile(
        &self,
        sources: &[PathBuf],
        output_dir: &Path,
        flags: &Map<String, Value>,
    ) -> Result<CompileOutput>;
}

/// Everything a backend is created with.
#[derive(Clone)]
pub struct BackendSettings {
    pub progress: Arc<dyn Progress>,
    /// Extra directories to search for imported specifications.
    pub dirs: Vec<PathBuf>,
    /// Compiler flags shared by every target.
    pub flags: Map<String, Value>,
    /// Root of the local format repository, if any.
    pub import_path: Option<PathBuf>,
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("dirs", &self.dirs)
            .field("flags", &self.flags)
            .field("import_path", &self.import_path)
            .finish_non_exhaustive()
    }
}

/// Creates a [`Backend`] and describes what may stop it from working.
pub trait BackendFactory: Send + Sync {
    fn name(&self) -> &str;

    /// Known issues with this backend in the current environment.
    ///
    /// An empty list means the backend is expected to work.
    fn issues(&self) -> Vec<String>;

    fn create(&self, settings: BackendSettings) -> Result<Box<dyn Backend>>;
}

/// Errors raised while selecting a backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("unknown backend '{name}' (available: {})", available.join(", "))]
    UnknownBackend {
        name: String,
        available: Vec<String>,
    },

    #[error("no usable backend:\n{}", blocking.join("\n"))]
    NoUsableBackend { blocking: Vec<String> },
}

/// Ordered collection of backend factories.
#[derive(Default)]
pub struct BackendRegistry {
    factories: Vec<Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory with lower priority than the ones already added.
    pub fn register(mut self, factory: impl BackendFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Names of all registered factories, in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    /// Pick the factory to build with.
    ///
    /// A `forced` name bypasses issue checks. Otherwise the first factory
    /// whose issues all appear in `tolerable` is chosen.
    pub fn select(
        &self,
        tolerable: &[String],
        forced: Option<&str>,
    ) -> std::result::Result<&dyn BackendFactory, BackendError> {
        if let Some(name) = forced {
            return self
                .factories
                .iter()
                .find(|f| f.name() == name)
                .map(|f| &**f)
                .ok_or_else(|| BackendError::UnknownBackend {
                    name: name.to_string(),
                    available: self.names().into_iter().map(String::from).collect(),
                });
        }

        let mut blocking = Vec::new();
        for factory in &self.factories {
            let issues: Vec<String> = factory
                .issues()
                .into_iter()
                .filter(|issue| !tolerable.contains(issue))
                .collect();
            if issues.is_empty() {
                debug!(backend = factory.name(), "selected backend");
                return Ok(factory.as_ref());
            }
            blocking.extend(issues.into_iter().map(|i| format!("  {}: {i}", factory.name())));
        }

        Err(BackendError::NoUsableBackend { blocking })
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("factories", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Stub {
        name: &'static str,
        issues: &'static [&'static str],
    }

    impl BackendFactory for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn issues(&self) -> Vec<String> {
            self.issues.iter().map(|s| s.to_string()).collect()
        }

        fn create(&self, _settings: BackendSettings) -> Result<Box<dyn Backend>> {
            eyre::bail!("not constructible")
        }
    }

    fn registry() -> BackendRegistry {
        BackendRegistry::new()
            .register(Stub {
                name: "jvm",
                issues: &["java not found"],
            })
            .register(Stub {
                name: "native",
                issues: &["unsupported platform", "slow"],
            })
            .register(Stub {
                name: "fallback",
                issues: &[],
            })
    }

    #[test]
    fn test_first_issue_free_backend_wins() {
        let registry = registry();
        let chosen = registry.select(&[], None).unwrap();
        assert_eq!(chosen.name(), "fallback");
    }

    #[test]
    fn test_tolerated_issues_allow_earlier_backend() {
        let registry = registry();
        let chosen = registry
            .select(&["java not found".to_string()], None)
            .unwrap();
        assert_eq!(chosen.name(), "jvm");
    }

    #[test]
    fn test_all_issues_must_be_tolerated() {
        let registry = BackendRegistry::new().register(Stub {
            name: "native",
            issues: &["unsupported platform", "slow"],
        });
        let err = registry
            .select(&["slow".to_string()], None)
            .err()
            .unwrap();
        assert_eq!(
            err,
            BackendError::NoUsableBackend {
                blocking: vec!["  native: unsupported platform".to_string()]
            }
        );
    }

    #[test]
    fn test_forced_backend_ignores_issues() {
        let registry = registry();
        let chosen = registry.select(&[], Some("jvm")).unwrap();
        assert_eq!(chosen.name(), "jvm");
    }

    #[test]
    fn test_forced_unknown_backend() {
        let registry = registry();
        let err = registry.select(&[], Some("wasm")).err().unwrap();
        assert!(matches!(err, BackendError::UnknownBackend { ref name, .. } if name == "wasm"));
        assert!(err.to_string().contains("jvm, native, fallback"));
    }

    #[test]
    fn test_empty_registry() {
        let err = BackendRegistry::new().select(&[], None).err().unwrap();
        assert_eq!(err, BackendError::NoUsableBackend { blocking: vec![] });
    }
}
