//! Resolution of a manifest against a package index
//!
//! Every declaration must name a release that exists in the index, and no
//! release may require a version another declaration does not pin. All
//! problems are collected before failing so they can be fixed in one pass.

use crate::domain::{
    normalize_name, Category, Declaration, Marker, MarkerEnvironment, PinnedVersion,
    Requirement, SpecifierSet,
};
use crate::error::{ResolutionError, ResolutionFailure};
use crate::manifest::Manifest;
use crate::progress::Progress;
use crate::registry::{fetch_all, PackageIndex, ReleaseMetadata, DEFAULT_INDEX_URL};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A declaration confirmed against the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: PinnedVersion,
    pub category: Option<Category>,
    /// Requirements satisfied by other declarations
    pub requires: Vec<String>,
    /// Requirements on packages the manifest does not declare
    pub external: Vec<String>,
    pub yanked: bool,
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    /// Index the manifest was resolved against
    pub index: String,
    /// One entry per declaration, in manifest order
    pub packages: Vec<ResolvedPackage>,
    /// Declarations whose own marker excludes the target environment
    pub skipped: Vec<String>,
    pub warnings: Vec<String>,
}

impl ResolvedEnvironment {
    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        let wanted = normalize_name(name);
        self.packages
            .iter()
            .find(|p| normalize_name(&p.name) == wanted)
    }

    /// Undeclared requirements across all packages, deduplicated by name
    pub fn external_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .packages
            .iter()
            .flat_map(|p| p.external.iter())
            .filter_map(|r| Requirement::parse(r).map(|r| r.normalized_name()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Checks a manifest against a package index
pub struct Resolver {
    index: Arc<dyn PackageIndex>,
    concurrency: usize,
    target: MarkerEnvironment,
    python_version: Option<PinnedVersion>,
}

impl Resolver {
    pub fn new(index: Arc<dyn PackageIndex>) -> Self {
        Self {
            index,
            concurrency: crate::config::DEFAULT_CONCURRENCY,
            target: MarkerEnvironment::default(),
            python_version: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Environment used to evaluate markers in `requires_dist`
    pub fn with_target(mut self, target: MarkerEnvironment) -> Self {
        self.target = target;
        self
    }

    /// Interpreter checked against each release's `requires_python`
    pub fn with_python(mut self, version: Option<PinnedVersion>) -> Self {
        self.python_version = version;
        self
    }

    pub async fn resolve(
        &self,
        manifest: &Manifest,
    ) -> Result<ResolvedEnvironment, ResolutionFailure> {
        self.resolve_with_progress(manifest, &Progress::disabled())
            .await
    }

    pub async fn resolve_with_progress(
        &self,
        manifest: &Manifest,
        progress: &Progress,
    ) -> Result<ResolvedEnvironment, ResolutionFailure> {
        let mut declarations: Vec<&Declaration> = Vec::new();
        let mut skipped: Vec<(&Declaration, Marker)> = Vec::new();
        for decl in manifest.declarations() {
            match self.excluding_marker(decl) {
                Some(marker) => {
                    skipped.push((decl, marker));
                    progress.inc();
                }
                None => declarations.push(decl),
            }
        }
        info!(
            "resolving {} declarations against {}",
            declarations.len(),
            self.index.index_name()
        );

        let lookups: Vec<(String, PinnedVersion)> = declarations
            .iter()
            .map(|d| (d.name.clone(), d.version.clone()))
            .collect();
        let index = Arc::clone(&self.index);
        let releases = fetch_all(
            lookups,
            self.concurrency,
            move |(name, version)| {
                let index = Arc::clone(&index);
                async move { index.fetch_release(&name, &version).await }
            },
            || progress.inc(),
        )
        .await;

        let pinned: HashMap<String, &Declaration> = declarations
            .iter()
            .map(|d| (d.normalized_name(), *d))
            .collect();

        let mut errors = Vec::new();
        let mut env = ResolvedEnvironment {
            index: self.index_label(),
            ..ResolvedEnvironment::default()
        };
        for (decl, marker) in &skipped {
            let message = format!(
                "{}: skipped, '{}' excludes the target environment",
                decl,
                marker.as_str()
            );
            info!("{}", message);
            env.skipped.push(decl.requirement());
            env.warnings.push(message);
        }

        for (decl, release) in declarations.iter().zip(releases) {
            match release {
                Ok(release) => {
                    let package = self.check_release(decl, &release, &pinned, &mut errors, &mut env.warnings);
                    env.packages.push(package);
                }
                Err(e) => {
                    debug!(package = %decl.name, error = %e, "lookup failed");
                    errors.push(ResolutionError::from_index(e, &decl.name, decl.version()));
                }
            }
        }

        if errors.is_empty() {
            info!("resolved {} packages", env.packages.len());
            Ok(env)
        } else {
            Err(ResolutionFailure::new(errors))
        }
    }

    /// The declaration's own marker, when it evaluates to false for the target
    fn excluding_marker(&self, decl: &Declaration) -> Option<Marker> {
        let text = decl.marker.as_deref()?;
        let Some(marker) = Marker::parse(text) else {
            warn!("{}: ignoring unparseable marker '{}'", decl.name, text);
            return None;
        };
        (!marker.evaluate(&self.target.with_extras(&decl.extras))).then_some(marker)
    }

    fn index_label(&self) -> String {
        match self.index.index_name() {
            "PyPI" => DEFAULT_INDEX_URL.to_string(),
            other => other.to_string(),
        }
    }

    fn check_release(
        &self,
        decl: &Declaration,
        release: &ReleaseMetadata,
        pinned: &HashMap<String, &Declaration>,
        errors: &mut Vec<ResolutionError>,
        warnings: &mut Vec<String>,
    ) -> ResolvedPackage {
        if release.yanked {
            let message = match release.yanked_reason {
                Some(ref reason) if !reason.is_empty() => {
                    format!("{} is yanked: {}", decl, reason)
                }
                _ => format!("{} is yanked", decl),
            };
            warn!("{}", message);
            warnings.push(message);
        }

        if let (Some(python), Some(requires_python)) =
            (self.python_version.as_ref(), release.requires_python.as_deref())
        {
            match SpecifierSet::parse(requires_python) {
                Some(set) if !set.contains(python) => {
                    errors.push(ResolutionError::VersionConflict {
                        package: "python".to_string(),
                        pinned: python.to_string(),
                        requirement: format!("python{}", set),
                        required_by: decl.name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    let message = format!(
                        "{}: ignoring unparseable requires_python '{}'",
                        decl, requires_python
                    );
                    warn!("{}", message);
                    warnings.push(message);
                }
            }
        }

        let env = self.target.with_extras(&decl.extras);
        let mut requires = Vec::new();
        let mut external = Vec::new();

        for raw in &release.requires_dist {
            let Some(requirement) = Requirement::parse(raw) else {
                let message = format!("{}: ignoring unparseable requirement '{}'", decl, raw);
                warn!("{}", message);
                warnings.push(message);
                continue;
            };
            if !requirement.applies_to(&env) {
                continue;
            }

            let spec = format!("{}{}", requirement.name, requirement.specifier);
            match pinned.get(&requirement.normalized_name()) {
                Some(other) => {
                    if requirement.url.is_none() && !requirement.specifier.contains(&other.version)
                    {
                        errors.push(ResolutionError::VersionConflict {
                            package: other.name.clone(),
                            pinned: other.version.to_string(),
                            requirement: spec.clone(),
                            required_by: decl.name.clone(),
                        });
                    }
                    requires.push(spec);
                }
                None => external.push(spec),
            }
        }

        ResolvedPackage {
            name: decl.name.clone(),
            version: decl.version.clone(),
            category: decl.category.clone(),
            requires,
            external,
            yanked: release.yanked,
        }
    }
}
