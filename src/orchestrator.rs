//! Workflow coordination for the manifest commands
//!
//! This module provides:
//! - Local workflows: check, fmt, add, remove
//! - Resolution against the package index
//! - Provisioning: resolve, then run the installer
//! - Upgrade: parse → fetch → judge → write, with dry-run support

use crate::config::Settings;
use crate::domain::{Category, Declaration, SkipReason, UpdateResult, UpgradeSummary};
use crate::error::{ManifestError, ResolutionFailure};
use crate::installer::{InstallResult, InstallRunner};
use crate::manifest::{
    check, load_manifest, read_manifest, write_manifest, CheckReport, Manifest, ManifestWriter,
    WriteResult,
};
use crate::progress::Progress;
use crate::registry::{fetch_all, HttpClient, PackageIndex, PyPIAdapter};
use crate::resolve::{ResolvedEnvironment, Resolver};
use crate::update::{UpdateFilter, UpdateJudge};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrator for the manifest workflows
pub struct Orchestrator {
    /// Manifest file the workflows operate on
    path: PathBuf,
    settings: Settings,
    index: Arc<dyn PackageIndex>,
    show_progress: bool,
}

/// Options for the upgrade workflow
#[derive(Debug, Clone, Default)]
pub struct UpgradeOptions {
    pub dry_run: bool,
    pub filter: UpdateFilter,
}

/// Result of the upgrade workflow
pub struct OrchestratorResult {
    /// Upgrade decisions in manifest order
    pub summary: UpgradeSummary,
    /// Outcome of applying the decisions, when it got that far
    pub write_result: Option<WriteResult>,
    /// Manifest text before the upgrade
    pub original: String,
    /// Manifest text with the upgrades applied (also in dry-run mode)
    pub updated: String,
    /// Errors encountered during processing
    pub errors: Vec<OrchestratorError>,
}

/// Result of `install`: the resolution and, if it succeeded, the installer run
pub struct InstallOutcome {
    pub resolution: Result<ResolvedEnvironment, ResolutionFailure>,
    pub install: Option<InstallResult>,
}

impl InstallOutcome {
    pub fn success(&self) -> bool {
        self.resolution.is_ok() && self.install.as_ref().is_some_and(|r| r.success)
    }
}

/// What a local edit did to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditOutcome {
    Added {
        name: String,
        version: String,
        line: usize,
        category: Option<Category>,
    },
    /// `add --force` on a declared package
    Replaced {
        name: String,
        from: String,
        to: String,
    },
    Removed {
        name: String,
        version: String,
        line: usize,
    },
    Formatted {
        /// The file was not in canonical layout
        changed: bool,
        /// The canonical layout was written back
        written: bool,
    },
}

/// Errors that can occur during orchestration
#[derive(Debug)]
pub enum OrchestratorError {
    /// Failed to create HTTP client
    HttpClientError(String),
    /// Manifest could not be read, parsed or edited
    Manifest(ManifestError),
    /// Failed to fetch versions from the index
    RegistryError { package: String, message: String },
    /// Failed to write manifest
    WriteError { path: String, message: String },
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::HttpClientError(msg) => write!(f, "HTTP client error: {}", msg),
            OrchestratorError::Manifest(e) => write!(f, "{}", e),
            OrchestratorError::RegistryError { package, message } => {
                write!(f, "Failed to fetch {}: {}", package, message)
            }
            OrchestratorError::WriteError { path, message } => {
                write!(f, "Failed to write {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl From<ManifestError> for OrchestratorError {
    fn from(e: ManifestError) -> Self {
        OrchestratorError::Manifest(e)
    }
}

impl Orchestrator {
    /// Create an orchestrator talking to the index configured in `settings`
    pub fn new(path: impl Into<PathBuf>, settings: Settings) -> Result<Self, OrchestratorError> {
        let client = HttpClient::with_timeout(settings.timeout)
            .map_err(|e| OrchestratorError::HttpClientError(e.to_string()))?
            .with_max_retries(settings.max_retries);
        let index = Arc::new(PyPIAdapter::with_base_url(client, settings.index_url.clone()));
        Ok(Self::with_index(path, settings, index))
    }

    /// Create an orchestrator with a custom index (for testing)
    pub fn with_index(
        path: impl Into<PathBuf>,
        settings: Settings,
        index: Arc<dyn PackageIndex>,
    ) -> Self {
        Self {
            path: path.into(),
            settings,
            index,
            show_progress: false,
        }
    }

    /// Draw spinners and progress bars on stderr
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read and strictly parse the manifest
    pub fn load(&self) -> Result<Manifest, ManifestError> {
        load_manifest(&self.path)
    }

    /// Validate the manifest, collecting every problem
    pub fn check(&self) -> Result<CheckReport, ManifestError> {
        let content = read_manifest(&self.path)?;
        Ok(check(&content))
    }

    /// Rewrite the manifest in canonical layout, or only report with `check_only`
    pub fn format(&self, check_only: bool) -> Result<EditOutcome, ManifestError> {
        let manifest = self.load()?;
        let changed = !manifest.is_canonical();
        let written = changed && !check_only;
        if written {
            write_manifest(&self.path, &manifest.canonical())?;
            info!("reformatted {}", self.path.display());
        }
        Ok(EditOutcome::Formatted { changed, written })
    }

    /// Add a declaration; with `force` an existing pin is replaced instead
    pub fn add(&self, declaration: Declaration, force: bool) -> Result<EditOutcome, ManifestError> {
        let mut manifest = self.load()?;

        let existing = manifest.get(&declaration.name).map(|d| d.name.clone());
        let outcome = match existing {
            Some(name) if force => {
                let previous = manifest.set_version(&name, &declaration.version)?;
                EditOutcome::Replaced {
                    name,
                    from: previous.to_string(),
                    to: declaration.version.to_string(),
                }
            }
            _ => {
                let line = manifest.add(&declaration)?;
                EditOutcome::Added {
                    name: declaration.name.clone(),
                    version: declaration.version.to_string(),
                    line,
                    category: declaration.category.clone(),
                }
            }
        };

        write_manifest(&self.path, &manifest.render())?;
        info!("{} updated", self.path.display());
        Ok(outcome)
    }

    /// Remove the declaration of `name`
    pub fn remove(&self, name: &str) -> Result<EditOutcome, ManifestError> {
        let mut manifest = self.load()?;
        let removed = manifest.remove(name)?;
        write_manifest(&self.path, &manifest.render())?;
        info!("removed {} from {}", removed, self.path.display());
        Ok(EditOutcome::Removed {
            name: removed.name,
            version: removed.version.to_string(),
            line: removed.line,
        })
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(Arc::clone(&self.index))
            .with_concurrency(self.settings.concurrency)
            .with_target(self.settings.target.clone())
            .with_python(self.settings.python_version.clone())
    }

    /// Resolve every declaration against the index
    pub async fn resolve(
        &self,
        manifest: &Manifest,
    ) -> Result<ResolvedEnvironment, ResolutionFailure> {
        let mut progress = Progress::new(self.show_progress);
        progress.start(manifest.len() as u64, "Resolving");
        let result = self.resolver().resolve_with_progress(manifest, &progress).await;
        progress.finish_and_clear();
        result
    }

    /// Resolve, then run the installer; a failed resolution never reaches the installer
    pub async fn install(&self, manifest: &Manifest, runner: &dyn InstallRunner) -> InstallOutcome {
        let resolution = self.resolve(manifest).await;
        if let Err(ref failure) = resolution {
            warn!(
                "not installing: {} resolution error(s)",
                failure.errors.len()
            );
            return InstallOutcome {
                resolution,
                install: None,
            };
        }

        let mut progress = Progress::new(self.show_progress);
        progress.spinner(&format!("Installing with {}", self.settings.installer));
        let install = runner.run_install(self.settings.installer, &self.path);
        progress.finish_and_clear();

        if install.success {
            info!("{} completed", install.command);
        } else {
            warn!("{} failed", install.command);
        }

        InstallOutcome {
            resolution,
            install: Some(install),
        }
    }

    /// Run the upgrade workflow
    pub async fn upgrade(
        &self,
        options: &UpgradeOptions,
    ) -> Result<OrchestratorResult, OrchestratorError> {
        let mut manifest = self.load()?;
        let original = manifest.render();
        let judge = UpdateJudge::new(options.filter.clone());
        let mut summary = UpgradeSummary::new(&self.path, options.dry_run);
        let mut errors = Vec::new();

        // Filtered packages are decided without a lookup
        let declarations: Vec<Declaration> = manifest.declarations().cloned().collect();
        let early: Vec<Option<SkipReason>> =
            declarations.iter().map(|d| judge.should_skip(d)).collect();
        let lookups: Vec<String> = declarations
            .iter()
            .zip(&early)
            .filter(|(_, skip)| skip.is_none())
            .map(|(d, _)| d.name.clone())
            .collect();

        info!(
            "checking {} of {} packages for upgrades",
            lookups.len(),
            declarations.len()
        );

        let mut progress = Progress::new(self.show_progress);
        progress.start(lookups.len() as u64, "Checking for upgrades");
        let index = Arc::clone(&self.index);
        let fetched = fetch_all(
            lookups,
            self.settings.concurrency,
            move |name| {
                let index = Arc::clone(&index);
                async move { index.fetch_versions(&name).await }
            },
            || progress.inc(),
        )
        .await;
        progress.finish_and_clear();

        let mut fetched = fetched.into_iter();
        for (declaration, skip) in declarations.into_iter().zip(early) {
            if let Some(reason) = skip {
                summary.add_result(UpdateResult::skip(declaration, reason));
                continue;
            }
            match fetched.next() {
                Some(Ok(versions)) => summary.add_result(judge.judge(&declaration, &versions)),
                Some(Err(e)) => {
                    errors.push(OrchestratorError::RegistryError {
                        package: declaration.name.clone(),
                        message: e.to_string(),
                    });
                    summary.add_result(UpdateResult::skip(
                        declaration,
                        SkipReason::FetchFailed(e.to_string()),
                    ));
                }
                None => summary.add_result(UpdateResult::skip(
                    declaration,
                    SkipReason::FetchFailed("no lookup result".to_string()),
                )),
            }
        }

        if !options.dry_run && summary.has_updates() {
            progress.spinner("Writing updates...");
        }
        let writer = ManifestWriter::new(options.dry_run);
        let write_result = match writer.apply_updates(&mut manifest, &summary) {
            Ok(result) => {
                if result.has_updates() {
                    info!(
                        "{} {} pin(s) in {}",
                        if options.dry_run { "would update" } else { "updated" },
                        result.updates_applied,
                        result.path.display()
                    );
                }
                for error in &result.errors {
                    errors.push(OrchestratorError::WriteError {
                        path: result.path.display().to_string(),
                        message: error.clone(),
                    });
                }
                Some(result)
            }
            Err(e) => {
                errors.push(OrchestratorError::WriteError {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                });
                None
            }
        };
        progress.finish_and_clear();

        Ok(OrchestratorResult {
            summary,
            write_result,
            original,
            updated: manifest.render(),
            errors,
        })
    }
}
