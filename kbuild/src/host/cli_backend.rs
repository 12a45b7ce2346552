//! Backend running the `kaitai-struct-compiler` executable.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use eyre::{Result, WrapErr, bail};
use indexmap::IndexMap;
use kbuild_core::{CompileResult, to_kebab_case};
use kbuild_pipeline::{Backend, BackendFactory, BackendSettings, CompileOutput};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Default compiler executable name.
pub const COMPILER: &str = "kaitai-struct-compiler";

/// Environment variable overriding the compiler executable.
pub const COMPILER_ENV: &str = "KAITAI_STRUCT_COMPILER";

/// Issue reported when the compiler executable cannot be found.
pub const ISSUE_NOT_FOUND: &str = "compilerNotFound";

/// Language generated modules are written in.
const TARGET_LANGUAGE: &str = "python";

/// Creates [`CliBackend`]s for one compiler executable.
#[derive(Debug, Clone)]
pub struct CliBackendFactory {
    program: PathBuf,
}

impl CliBackendFactory {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CliBackendFactory {
    fn default() -> Self {
        let program = std::env::var_os(COMPILER_ENV).unwrap_or_else(|| COMPILER.into());
        Self::new(program)
    }
}

impl BackendFactory for CliBackendFactory {
    fn name(&self) -> &str {
        "cli"
    }

    fn issues(&self) -> Vec<String> {
        if find_program(&self.program).is_some() {
            Vec::new()
        } else {
            vec![ISSUE_NOT_FOUND.to_string()]
        }
    }

    fn create(&self, settings: BackendSettings) -> Result<Box<dyn Backend>> {
        let program = find_program(&self.program).unwrap_or_else(|| self.program.clone());
        debug!(program = %program.display(), "using command-line compiler");
        Ok(Box::new(CliBackend { program, settings }))
    }
}

/// Compiles specifications by spawning the compiler once per call.
pub struct CliBackend {
    program: PathBuf,
    settings: BackendSettings,
}

impl CliBackend {
    fn import_paths(&self) -> Vec<&Path> {
        self.settings
            .dirs
            .iter()
            .map(PathBuf::as_path)
            .chain(self.settings.import_path.as_deref())
            .collect()
    }
}

impl Backend for CliBackend {
    fn name(&self) -> &str {
        "cli"
    }

    fn extension(&self) -> &str {
        "py"
    }

    fn compile(
        &self,
        sources: &[PathBuf],
        output_dir: &Path,
        flags: &Map<String, Value>,
    ) -> Result<CompileOutput> {
        let mut merged = self.settings.flags.clone();
        merged.extend(flags.iter().map(|(k, v)| (k.clone(), v.clone())));

        std::fs::create_dir_all(output_dir)
            .wrap_err_with(|| format!("failed to create '{}'", output_dir.display()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(["--target", TARGET_LANGUAGE, "--ksc-json-output", "--outdir"])
            .arg(output_dir);
        let imports = self.import_paths();
        if !imports.is_empty() {
            let joined: OsString = std::env::join_paths(imports)
                .wrap_err("import path contains a path separator")?;
            cmd.arg("--import-path").arg(joined);
        }
        cmd.args(compiler_args(&merged)).args(sources);

        for source in sources {
            self.settings
                .progress
                .message(&format!("compiling {}", source.display()));
        }
        debug!(?cmd, "spawning compiler");
        let output = cmd
            .output()
            .wrap_err_with(|| format!("failed to run '{}'", self.program.display()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_json_output(&stdout, output_dir) {
            Ok(modules) if output.status.success() || !modules.is_empty() => Ok(modules),
            Ok(_) => bail!(
                "compiler exited with {}:\n{}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim_end()
            ),
            Err(e) if !output.status.success() => Err(e).wrap_err_with(|| {
                format!(
                    "compiler exited with {}:\n{}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim_end()
                )
            }),
            Err(e) => Err(e),
        }
    }
}

/// Translate compiler flags into command-line arguments.
///
/// Known flags map onto their compiler options. Any other flag becomes
/// `--kebab-name [value]`. `additionalFlags` are appended verbatim.
pub fn compiler_args(flags: &Map<String, Value>) -> Vec<String> {
    let mut args = Vec::new();

    for (key, value) in flags {
        match (key.as_str(), value) {
            ("additionalFlags", _) | (_, Value::Null) => {}
            ("namespaces", Value::Object(namespaces)) => {
                for (lang, ns) in namespaces {
                    if let Some(ns) = ns.as_str() {
                        args.push(namespace_option(lang));
                        args.push(ns.to_string());
                    }
                }
            }
            ("readStoresPos", Value::Bool(true)) => args.push("--read-pos".to_string()),
            ("opaqueTypes", Value::Bool(true)) => {
                args.push("--opaque-types".to_string());
                args.push("true".to_string());
            }
            ("autoRead", Value::Bool(false)) => args.push("--no-auto-read".to_string()),
            ("autoRead" | "readStoresPos", Value::Bool(_)) => {}
            ("verbose", Value::Array(items)) if items.is_empty() => {}
            (_, Value::Bool(true)) => args.push(format!("--{}", to_kebab_case(key))),
            (_, Value::Bool(false)) => {}
            (_, Value::Array(items)) => {
                args.push(format!("--{}", to_kebab_case(key)));
                args.push(join_values(items));
            }
            (_, Value::String(s)) => {
                args.push(format!("--{}", to_kebab_case(key)));
                args.push(s.clone());
            }
            (_, other) => {
                args.push(format!("--{}", to_kebab_case(key)));
                args.push(other.to_string());
            }
        }
    }

    if let Some(Value::Array(extra)) = flags.get("additionalFlags") {
        args.extend(extra.iter().map(value_text));
    }
    args
}

fn namespace_option(lang: &str) -> String {
    match lang {
        "python" => "--python-package".to_string(),
        "java" => "--java-package".to_string(),
        "go" => "--go-package".to_string(),
        "csharp" | "dotnet" => "--dotnet-namespace".to_string(),
        "php" => "--php-namespace".to_string(),
        "cpp" | "cpp_stl" => "--cpp-namespace".to_string(),
        other => format!("--{}-package", to_kebab_case(other)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_values(items: &[Value]) -> String {
    items.iter().map(value_text).collect::<Vec<_>>().join(",")
}

#[derive(Debug, Deserialize)]
struct SourceOutput {
    #[serde(default)]
    errors: Vec<CompileMessage>,
    #[serde(default)]
    output: IndexMap<String, IndexMap<String, SpecOutput>>,
}

#[derive(Debug, Deserialize)]
struct SpecOutput {
    #[serde(default)]
    errors: Vec<CompileMessage>,
    #[serde(default)]
    files: Vec<OutputFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputFile {
    file_name: String,
}

#[derive(Debug, Deserialize)]
struct CompileMessage {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    path: Vec<Value>,
    message: String,
}

impl std::fmt::Display for CompileMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}: ")?;
        }
        if !self.path.is_empty() {
            let path: Vec<String> = self.path.iter().map(value_text).collect();
            write!(f, "/{}: ", path.join("/"))?;
        }
        write!(f, "{}", self.message)
    }
}

/// Parse the compiler's `--ksc-json-output` report.
///
/// Every generated file becomes an [`CompileResult::InFile`] keyed by
/// its module name. Reported errors fail the whole call.
pub fn parse_json_output(stdout: &str, output_dir: &Path) -> Result<CompileOutput> {
    let report: IndexMap<String, SourceOutput> =
        serde_json::from_str(stdout).wrap_err("failed to parse compiler output")?;

    let mut errors = Vec::new();
    let mut modules = CompileOutput::new();
    for source in report.values() {
        errors.extend(source.errors.iter().map(ToString::to_string));
        for spec in source.output.values().flat_map(IndexMap::values) {
            errors.extend(spec.errors.iter().map(ToString::to_string));
            for file in &spec.files {
                let path = output_dir.join(&file.file_name);
                let module = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.file_name.clone());
                modules.insert(module, CompileResult::in_file(path));
            }
        }
    }

    if !errors.is_empty() {
        bail!("compilation failed:\n  {}", errors.join("\n  "));
    }
    Ok(modules)
}

/// Locate `program`, searching `PATH` for bare names.
fn find_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let with_suffix = candidate.with_extension(std::env::consts::EXE_EXTENSION);
        (!std::env::consts::EXE_EXTENSION.is_empty() && with_suffix.is_file()).then_some(with_suffix)
    })
}
