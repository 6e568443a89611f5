//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of every command result
//! - Structured per-declaration update/skip information

use crate::domain::{Declaration, SkipReason, UpdateResult, UpgradeSummary};
use crate::error::ResolutionFailure;
use crate::installer::InstallResult;
use crate::manifest::{CheckReport, Diagnostic, Manifest};
use crate::orchestrator::{EditOutcome, InstallOutcome, OrchestratorResult};
use crate::output::text::VersionChangeType;
use crate::output::{OutputFormatter, Verbosity};
use crate::resolve::ResolvedEnvironment;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

#[derive(Serialize)]
struct JsonCheck<'a> {
    path: String,
    ok: bool,
    declarations: usize,
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct JsonList<'a> {
    path: String,
    count: usize,
    groups: Vec<JsonGroup<'a>>,
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    /// Category slug, `null` for declarations above any header
    category: Option<String>,
    declarations: Vec<&'a Declaration>,
}

#[derive(Serialize)]
struct JsonEdit<'a> {
    path: String,
    #[serde(flatten)]
    outcome: &'a EditOutcome,
}

#[derive(Serialize)]
struct JsonResolution<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a ResolvedEnvironment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<JsonError>,
}

#[derive(Serialize)]
struct JsonError {
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct JsonInstall<'a> {
    ok: bool,
    resolution: JsonResolution<'a>,
    install: Option<&'a InstallResult>,
}

/// JSON representation of the upgrade result
#[derive(Serialize)]
struct JsonOutput {
    /// Whether this was a dry-run
    dry_run: bool,
    path: String,
    /// Summary statistics
    summary: JsonSummary,
    updates: Vec<JsonUpdate>,
    /// List of skips (only in verbose mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skips: Vec<JsonSkip>,
    /// Errors encountered
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    /// Total number of updates
    updates: usize,
    /// Total number of skips
    skips: usize,
}

/// JSON representation of an update
#[derive(Serialize)]
struct JsonUpdate {
    /// Package name
    name: String,
    /// Old version
    from: String,
    /// New version
    to: String,
    /// major, minor, patch or other
    change: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    released_at: Option<DateTime<Utc>>,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip {
    /// Package name
    name: String,
    /// Current version
    version: String,
    /// Skip reason
    reason: String,
}

impl JsonFormatter {
    /// Convert skip reason to string
    fn skip_reason_to_string(reason: &SkipReason) -> String {
        match reason {
            SkipReason::AlreadyLatest => "already_latest".to_string(),
            SkipReason::Excluded => "excluded".to_string(),
            SkipReason::NotInOnlyList => "not_in_only_list".to_string(),
            SkipReason::FetchFailed(msg) => format!("fetch_failed: {}", msg),
            SkipReason::NoSuitableVersion => "no_suitable_version".to_string(),
        }
    }

    fn resolution_to_json<'a>(
        resolution: &'a Result<ResolvedEnvironment, ResolutionFailure>,
    ) -> JsonResolution<'a> {
        match resolution {
            Ok(env) => JsonResolution {
                ok: true,
                environment: Some(env),
                errors: Vec::new(),
            },
            Err(failure) => JsonResolution {
                ok: false,
                environment: None,
                errors: failure
                    .errors
                    .iter()
                    .map(|e| JsonError {
                        kind: e.kind(),
                        message: e.to_string(),
                    })
                    .collect(),
            },
        }
    }

    fn summary_to_json(&self, summary: &UpgradeSummary) -> (Vec<JsonUpdate>, Vec<JsonSkip>) {
        let updates = summary
            .updates()
            .filter_map(|result| match result {
                UpdateResult::Update {
                    declaration,
                    new_version,
                    released_at,
                } => Some(JsonUpdate {
                    name: declaration.name.clone(),
                    from: declaration.version.to_string(),
                    to: new_version.to_string(),
                    change: VersionChangeType::from_versions(&declaration.version, new_version)
                        .label(),
                    released_at: *released_at,
                }),
                UpdateResult::Skip { .. } => None,
            })
            .collect();

        let skips = if self.verbosity == Verbosity::Verbose {
            summary
                .skips()
                .filter_map(|result| match result {
                    UpdateResult::Skip {
                        declaration,
                        reason,
                    } => Some(JsonSkip {
                        name: declaration.name.clone(),
                        version: declaration.version.to_string(),
                        reason: Self::skip_reason_to_string(reason),
                    }),
                    UpdateResult::Update { .. } => None,
                })
                .collect()
        } else {
            Vec::new()
        };

        (updates, skips)
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_check(
        &self,
        path: &Path,
        report: &CheckReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(
            &JsonCheck {
                path: path.display().to_string(),
                ok: report.is_ok(),
                declarations: report.declarations,
                diagnostics: &report.diagnostics,
            },
            writer,
        )
    }

    fn format_list(
        &self,
        path: &Path,
        manifest: &Manifest,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let groups = manifest
            .groups()
            .into_iter()
            .map(|(category, declarations)| JsonGroup {
                category: category.map(|c| c.slug().to_string()),
                declarations,
            })
            .collect();
        Self::write_json(
            &JsonList {
                path: path.display().to_string(),
                count: manifest.len(),
                groups,
            },
            writer,
        )
    }

    fn format_edit(
        &self,
        path: &Path,
        outcome: &EditOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(
            &JsonEdit {
                path: path.display().to_string(),
                outcome,
            },
            writer,
        )
    }

    fn format_resolution(
        &self,
        resolution: &Result<ResolvedEnvironment, ResolutionFailure>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(&Self::resolution_to_json(resolution), writer)
    }

    fn format_install(
        &self,
        outcome: &InstallOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(
            &JsonInstall {
                ok: outcome.success(),
                resolution: Self::resolution_to_json(&outcome.resolution),
                install: outcome.install.as_ref(),
            },
            writer,
        )
    }

    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let (updates, skips) = self.summary_to_json(&result.summary);
        let output = JsonOutput {
            dry_run: result.summary.dry_run,
            path: result.summary.path.display().to_string(),
            summary: JsonSummary {
                updates: result.summary.update_count(),
                skips: result.summary.skip_count(),
            },
            updates,
            skips,
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };
        Self::write_json(&output, writer)
    }

    fn format_summary(
        &self,
        summary: &UpgradeSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(
            &JsonSummary {
                updates: summary.update_count(),
                skips: summary.skip_count(),
            },
            writer,
        )
    }
}
