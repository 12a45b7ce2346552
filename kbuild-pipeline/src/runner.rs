//! Build orchestrator.

use std::{path::PathBuf, sync::Arc};

use eyre::{Result, WrapErr, bail};
use kbuild_core::{CompileResult, WriteResult};
use kbuild_manifest::{Config, Target, TargetResolver};
use tracing::{debug, info};

use crate::{
    Backend, BackendRegistry, BackendSettings, BuildReport, LibraryUpdater, Plan, PlannedTarget,
    Plugin, PostprocessorRegistry, Progress, TargetReport, TracingProgress,
};

/// Environment variable with extra tolerable backend issues, comma separated.
pub const TOLERABLE_ISSUES_ENV: &str = "KBUILD_TOLERABLE_ISSUES";

/// The build pipeline.
///
/// Owns nothing global: the registries are built by the host and passed
/// in, so several pipelines with different setups can coexist.
///
/// # Example
///
/// ```ignore
/// let postprocessors = PostprocessorRegistry::with_builtins();
/// let backends = BackendRegistry::new().register(CliBackendFactory::default());
///
/// let report = Pipeline::new(&backends, &postprocessors)
///     .updater(GitCliUpdater)
///     .run(&config)?;
/// ```
pub struct Pipeline<'r> {
    backends: &'r BackendRegistry,
    postprocessors: &'r PostprocessorRegistry,
    updater: Option<Box<dyn LibraryUpdater + 'r>>,
    progress: Arc<dyn Progress>,
    plugins: Vec<Box<dyn Plugin + 'r>>,
    tolerable_issues: Vec<String>,
}

impl<'r> Pipeline<'r> {
    pub fn new(backends: &'r BackendRegistry, postprocessors: &'r PostprocessorRegistry) -> Self {
        Self {
            backends,
            postprocessors,
            updater: None,
            progress: Arc::new(TracingProgress),
            plugins: Vec::new(),
            tolerable_issues: Vec::new(),
        }
    }

    /// Set the updater used when `repo.update` is on.
    pub fn updater(mut self, updater: impl LibraryUpdater + 'r) -> Self {
        self.updater = Some(Box::new(updater));
        self
    }

    /// Set the progress sink handed to the backend and the updater.
    pub fn progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Add a plugin to receive target lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'r) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Tolerate backend issues in addition to the configured ones.
    pub fn tolerate<I, S>(mut self, issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tolerable_issues.extend(issues.into_iter().map(Into::into));
        self
    }

    /// Run a full build.
    ///
    /// 1. create the output directory
    /// 2. update the local format repository if `repo.update` is set
    /// 3. select and create the backend
    /// 4. resolve targets
    /// 5. compile, postprocess and save every target in order
    ///
    /// # Errors
    ///
    /// The first failure aborts the build; targets after it are not built.
    pub fn run(&self, config: &Config) -> Result<BuildReport> {
        std::fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
            format!(
                "failed to create output directory '{}'",
                config.output_dir.display()
            )
        })?;

        let updated_repo = self.update_repo(config)?;
        let backend = self.create_backend(config)?;

        let targets = TargetResolver::new(config, backend.extension()).resolve()?;
        info!(
            backend = backend.name(),
            targets = targets.len(),
            "building"
        );

        let mut report = BuildReport {
            backend: backend.name().to_string(),
            output_dir: config.output_dir.clone(),
            updated_repo,
            targets: Vec::with_capacity(targets.len()),
        };

        for target in &targets {
            for plugin in &self.plugins {
                plugin.on_before_target(target)?;
            }

            let target_report = self
                .build_target(backend.as_ref(), target, config)
                .wrap_err_with(|| format!("failed to build '{}'", target.output_key.display()))?;

            for plugin in &self.plugins {
                plugin.on_after_target(target, &target_report)?;
            }
            report.targets.push(target_report);
        }

        Ok(report)
    }

    /// Resolve what a build would do, without updating or compiling.
    pub fn plan(&self, config: &Config) -> Result<Plan> {
        let backend = self.create_backend(config)?;
        let targets = TargetResolver::new(config, backend.extension()).resolve()?;

        Ok(Plan {
            backend: backend.name().to_string(),
            extension: backend.extension().to_string(),
            output_dir: config.output_dir.clone(),
            targets: targets
                .into_iter()
                .map(|t| PlannedTarget {
                    exists: t.source_path.is_file(),
                    postprocess: t.postprocess.unwrap_or_default(),
                    output_key: t.output_key,
                    source_path: t.source_path,
                })
                .collect(),
        })
    }

    fn update_repo(&self, config: &Config) -> Result<Option<PathBuf>> {
        let repo = &config.repo;
        if !repo.update {
            return Ok(None);
        }
        let Some(local_path) = &repo.local_path else {
            bail!("repo.update is set but repo.localPath is empty");
        };
        let Some(updater) = &self.updater else {
            bail!("repo.update is set but no library updater is configured");
        };

        info!(path = %local_path.display(), refspec = %repo.refspec, "updating format repository");
        updater
            .upgrade(local_path, &repo.git, &repo.refspec, self.progress.as_ref())
            .wrap_err_with(|| format!("failed to update '{}' from {}", local_path.display(), repo.git))?;

        Ok(Some(local_path.clone()))
    }

    fn create_backend(&self, config: &Config) -> Result<Box<dyn Backend>> {
        let mut tolerable = config.tolerable_issues.clone();
        tolerable.extend(self.tolerable_issues.iter().cloned());
        tolerable.extend(env_tolerable_issues());

        let factory = self
            .backends
            .select(&tolerable, config.force_backend.as_deref())?;

        let settings = BackendSettings {
            progress: Arc::clone(&self.progress),
            dirs: config.kaitai_struct_root.clone(),
            flags: config.flags.clone(),
            import_path: config.repo.local_path.clone(),
        };
        factory
            .create(settings)
            .wrap_err_with(|| format!("failed to create backend '{}'", factory.name()))
    }

    fn build_target(
        &self,
        backend: &dyn Backend,
        target: &Target,
        config: &Config,
    ) -> Result<TargetReport> {
        if !target.source_path.is_file() {
            bail!(
                "specification '{}' does not exist",
                target.source_path.display()
            );
        }

        debug!(source = %target.source_path.display(), "compiling");
        let modules = backend
            .compile(
                std::slice::from_ref(&target.source_path),
                &config.output_dir,
                &target.flags,
            )
            .wrap_err("compile failed")?;

        let mut report = TargetReport {
            output_key: target.output_key.clone(),
            source_path: target.source_path.clone(),
            ..Default::default()
        };

        for (module, result) in modules {
            let result = match &target.postprocess {
                Some(chain) => self
                    .postprocessors
                    .apply_chain(chain, &config.postprocessors, result)
                    .wrap_err_with(|| format!("postprocess failed for module '{module}'"))?,
                None => result,
            };

            let path = save_path(&result, target, &module, backend.extension());
            match result
                .save(&path)
                .wrap_err_with(|| format!("save failed for module '{module}'"))?
            {
                WriteResult::Written => {
                    debug!(path = %path.display(), "written");
                    report.written.push(path);
                }
                WriteResult::Skipped => report.unchanged.push(path),
            }
        }

        Ok(report)
    }
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("backends", self.backends)
            .field("postprocessors", self.postprocessors)
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("tolerable_issues", &self.tolerable_issues)
            .finish_non_exhaustive()
    }
}

/// Where a compiled module is persisted.
///
/// In-memory modules land next to the target key, so nested keys keep
/// their subdirectory even though the backend only sees `outputDir`.
fn save_path(result: &CompileResult, target: &Target, module: &str, extension: &str) -> PathBuf {
    match result.path() {
        Some(path) => path.to_path_buf(),
        None => target.output_dir().join(format!("{module}.{extension}")),
    }
}

/// Tolerable issues from [`TOLERABLE_ISSUES_ENV`].
pub fn env_tolerable_issues() -> Vec<String> {
    std::env::var(TOLERABLE_ISSUES_ENV)
        .map(|v| parse_issue_list(&v))
        .unwrap_or_default()
}

fn parse_issue_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
