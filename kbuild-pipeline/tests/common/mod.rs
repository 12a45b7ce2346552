#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use eyre::Result;
use kbuild_core::CompileResult;
use kbuild_manifest::{Config, Normalizer};
use kbuild_pipeline::{
    Backend, BackendFactory, BackendSettings, CompileOutput, LibraryUpdater, PostprocessorRegistry,
    Progress,
};
use kbuild_schema::Schema;
use serde_json::{Map, Value};

/// Normalize a configuration tree with the builtin schema.
///
/// An unset `postprocessors` enables every builtin, as the CLI does.
pub fn normalize(tree: Value) -> Config {
    Normalizer::new(Schema::builtin())
        .unwrap()
        .with_postprocessors(PostprocessorRegistry::with_builtins().names())
        .normalize(tree)
        .unwrap()
}

pub fn write(path: impl AsRef<Path>, content: &str) {
    let path = path.as_ref();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Text the fake backends generate for `source`.
pub fn generated_text(source: &Path) -> String {
    let spec = std::fs::read_to_string(source).unwrap_or_default();
    format!("# generated from {}\n{spec}", source.file_name().unwrap().to_string_lossy())
}

/// Backend returning generated text in memory, one module per source.
#[derive(Default)]
pub struct MemoryBackendFactory {
    pub name: &'static str,
    pub issues: Vec<String>,
    pub settings: Arc<Mutex<Option<BackendSettings>>>,
    /// Output directory of every `compile` call.
    pub compile_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl MemoryBackendFactory {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn with_issue(mut self, issue: &str) -> Self {
        self.issues.push(issue.to_string());
        self
    }
}

impl BackendFactory for MemoryBackendFactory {
    fn name(&self) -> &str {
        self.name
    }

    fn issues(&self) -> Vec<String> {
        self.issues.clone()
    }

    fn create(&self, settings: BackendSettings) -> Result<Box<dyn Backend>> {
        *self.settings.lock().unwrap() = Some(settings);
        Ok(Box::new(MemoryBackend {
            name: self.name,
            compile_dirs: Arc::clone(&self.compile_dirs),
        }))
    }
}

pub struct MemoryBackend {
    name: &'static str,
    compile_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn extension(&self) -> &str {
        "py"
    }

    fn compile(
        &self,
        sources: &[PathBuf],
        output_dir: &Path,
        _flags: &Map<String, Value>,
    ) -> Result<CompileOutput> {
        self.compile_dirs.lock().unwrap().push(output_dir.to_path_buf());
        Ok(sources
            .iter()
            .map(|source| {
                let module = source.file_stem().unwrap().to_string_lossy().into_owned();
                (module, CompileResult::in_memory(generated_text(source)))
            })
            .collect())
    }
}

/// Backend that writes its output itself, like the command-line compiler.
pub struct FileBackendFactory;

impl BackendFactory for FileBackendFactory {
    fn name(&self) -> &str {
        "file"
    }

    fn issues(&self) -> Vec<String> {
        Vec::new()
    }

    fn create(&self, _settings: BackendSettings) -> Result<Box<dyn Backend>> {
        Ok(Box::new(FileBackend))
    }
}

pub struct FileBackend;

impl Backend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn extension(&self) -> &str {
        "py"
    }

    fn compile(
        &self,
        sources: &[PathBuf],
        output_dir: &Path,
        _flags: &Map<String, Value>,
    ) -> Result<CompileOutput> {
        let mut out = CompileOutput::new();
        for source in sources {
            let module = source.file_stem().unwrap().to_string_lossy().into_owned();
            let path = output_dir.join(format!("{module}.py"));
            std::fs::create_dir_all(output_dir)?;
            std::fs::write(&path, generated_text(source))?;
            out.insert(module, CompileResult::in_file(path));
        }
        Ok(out)
    }
}

/// Updater that records its calls and drops `files` into the checkout.
#[derive(Default)]
pub struct RecordingUpdater {
    pub calls: Arc<Mutex<Vec<(PathBuf, String, String)>>>,
    pub files: Vec<(&'static str, &'static str)>,
}

impl LibraryUpdater for RecordingUpdater {
    fn upgrade(
        &self,
        local_path: &Path,
        git_url: &str,
        refspec: &str,
        progress: &dyn Progress,
    ) -> Result<()> {
        progress.message(&format!("updating {}", local_path.display()));
        self.calls.lock().unwrap().push((
            local_path.to_path_buf(),
            git_url.to_string(),
            refspec.to_string(),
        ));
        for (name, content) in &self.files {
            write(local_path.join(name), content);
        }
        Ok(())
    }
}

/// Progress sink keeping every message.
#[derive(Default)]
pub struct RecordingProgress {
    pub messages: Mutex<Vec<String>>,
}

impl Progress for RecordingProgress {
    fn message(&self, msg: &str) {
        self.messages.lock().unwrap().push(msg.to_string());
    }
}
