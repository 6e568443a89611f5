//! Output formatting for command results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing
//! - Diff output for showing upgrade changes

mod diff;
mod json;
mod text;

pub use diff::DiffFormatter;
pub use json::JsonFormatter;
pub use text::{TextFormatter, VersionChangeType};

use crate::domain::UpgradeSummary;
use crate::error::ResolutionFailure;
use crate::manifest::{CheckReport, Manifest};
use crate::orchestrator::{EditOutcome, InstallOutcome, OrchestratorResult};
use crate::resolve::ResolvedEnvironment;
use std::io::Write;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
    /// Unified diff format
    Diff,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Minimal output
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Detailed output with additional information
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output format (text, json, diff)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether this is a dry-run
    pub dry_run: bool,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            dry_run: false,
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(format: OutputFormat, verbosity: Verbosity, dry_run: bool) -> Self {
        Self {
            format,
            verbosity,
            dry_run,
            color: true,
        }
    }

    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, diff: bool, verbose: bool, quiet: bool, dry_run: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else if diff {
            OutputFormat::Diff
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            dry_run,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format the diagnostics of `pinreq check`
    fn format_check(
        &self,
        path: &Path,
        report: &CheckReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format the declarations grouped by category
    fn format_list(
        &self,
        path: &Path,
        manifest: &Manifest,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format the outcome of fmt, add or remove
    fn format_edit(
        &self,
        path: &Path,
        outcome: &EditOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format a resolved environment or every resolution error
    fn format_resolution(
        &self,
        resolution: &Result<ResolvedEnvironment, ResolutionFailure>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format the resolution and installer run of `pinreq install`
    fn format_install(
        &self,
        outcome: &InstallOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format and write the upgrade result
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write just the upgrade summary
    fn format_summary(
        &self,
        summary: &UpgradeSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    let text = TextFormatter::with_color(config.verbosity, config.dry_run, config.color);
    match config.format {
        OutputFormat::Text => Box::new(text),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.verbosity)),
        OutputFormat::Diff => Box::new(DiffFormatter::new(config.dry_run, text)),
    }
}
