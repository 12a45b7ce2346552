//! Named transforms applied to compiler output.

use eyre::Result;
use indexmap::IndexMap;
use kbuild_core::CompileResult;
use thiserror::Error;

/// A transform over one compiled module.
pub trait Postprocessor: Send + Sync {
    fn name(&self) -> &str;

    /// Transform `result`.
    ///
    /// Returning a result with unchanged text must keep its write state,
    /// which [`CompileResult::map_text`] takes care of.
    fn process(&self, result: CompileResult) -> Result<CompileResult>;
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown postprocessor '{name}' (available: {})", available.join(", "))]
pub struct UnknownPostprocessor {
    pub name: String,
    pub available: Vec<String>,
}

/// Postprocessors addressable by name.
///
/// Built once at startup and passed by reference; configuration only
/// refers to postprocessors by the names registered here.
#[derive(Default)]
pub struct PostprocessorRegistry {
    entries: IndexMap<String, Box<dyn Postprocessor>>,
}

impl PostprocessorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in postprocessor.
    pub fn with_builtins() -> Self {
        Self::new()
            .register(Identity)
            .register(TrimTrailingWhitespace)
            .register(EnsureTrailingNewline)
            .register(NormalizeNewlines)
    }

    /// Add `pp`, replacing any postprocessor with the same name.
    pub fn register(mut self, pp: impl Postprocessor + 'static) -> Self {
        self.entries.insert(pp.name().to_string(), Box::new(pp));
        self
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> std::result::Result<&dyn Postprocessor, UnknownPostprocessor> {
        self.entries
            .get(name)
            .map(|f| &**f)
            .ok_or_else(|| UnknownPostprocessor {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Look up `name`, treating anything outside `enabled` as unknown.
    ///
    /// `enabled` is the configured `postprocessors` list; the error lists
    /// the enabled names that are actually registered.
    pub fn get_enabled<S: AsRef<str>>(
        &self,
        name: &str,
        enabled: &[S],
    ) -> std::result::Result<&dyn Postprocessor, UnknownPostprocessor> {
        if !enabled.iter().any(|e| e.as_ref() == name) {
            return Err(UnknownPostprocessor {
                name: name.to_string(),
                available: enabled
                    .iter()
                    .map(|e| e.as_ref())
                    .filter(|e| self.entries.contains_key(*e))
                    .map(String::from)
                    .collect(),
            });
        }
        self.get(name)
    }

    /// Fold `result` through the postprocessors named in `chain`.
    ///
    /// Every name must be both registered and listed in `enabled`.
    pub fn apply_chain<S: AsRef<str>, E: AsRef<str>>(
        &self,
        chain: &[S],
        enabled: &[E],
        mut result: CompileResult,
    ) -> Result<CompileResult> {
        for name in chain {
            result = self.get_enabled(name.as_ref(), enabled)?.process(result)?;
        }
        Ok(result)
    }
}

impl std::fmt::Debug for PostprocessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

/// Leaves the result untouched.
#[derive(Debug, Clone, Copy)]
pub struct Identity;

impl Postprocessor for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn process(&self, result: CompileResult) -> Result<CompileResult> {
        Ok(result)
    }
}

/// Strips spaces and tabs at the end of every line.
#[derive(Debug, Clone, Copy)]
pub struct TrimTrailingWhitespace;

impl Postprocessor for TrimTrailingWhitespace {
    fn name(&self) -> &str {
        "trimTrailingWhitespace"
    }

    fn process(&self, result: CompileResult) -> Result<CompileResult> {
        result.map_text(|text| {
            text.split_inclusive('\n')
                .map(|line| {
                    let (body, eol) = split_eol(line);
                    format!("{}{eol}", body.trim_end_matches([' ', '\t']))
                })
                .collect()
        })
    }
}

/// Appends a final newline to non-empty text that lacks one.
#[derive(Debug, Clone, Copy)]
pub struct EnsureTrailingNewline;

impl Postprocessor for EnsureTrailingNewline {
    fn name(&self) -> &str {
        "ensureTrailingNewline"
    }

    fn process(&self, result: CompileResult) -> Result<CompileResult> {
        result.map_text(|text| {
            if text.is_empty() || text.ends_with('\n') {
                text.to_string()
            } else {
                format!("{text}\n")
            }
        })
    }
}

/// Converts `\r\n` and lone `\r` line endings to `\n`.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeNewlines;

impl Postprocessor for NormalizeNewlines {
    fn name(&self) -> &str {
        "normalizeNewlines"
    }

    fn process(&self, result: CompileResult) -> Result<CompileResult> {
        result.map_text(|text| text.replace("\r\n", "\n").replace('\r', "\n"))
    }
}

fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}
