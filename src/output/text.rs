//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Check diagnostics and grouped declaration listings
//! - Resolution results with every error found
//! - Upgrade results with version change type indication (major/minor/patch)
//! - Skipped package display with reasons
//! - Summary with detailed breakdown

use crate::domain::{Category, PinnedVersion, SkipReason, UpdateResult, UpgradeSummary};
use crate::error::ResolutionFailure;
use crate::manifest::{CheckReport, Manifest, Severity};
use crate::orchestrator::{EditOutcome, InstallOutcome, OrchestratorResult};
use crate::output::{OutputFormatter, Verbosity};
use crate::resolve::ResolvedEnvironment;
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use std::io::Write;
use std::path::Path;

/// Kind of version bump between two pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// First release segment (or epoch) changed
    Major,
    /// Second release segment changed
    Minor,
    /// Any later release segment changed
    Patch,
    /// Same release, different pre/post/dev suffix
    Other,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &PinnedVersion, new: &PinnedVersion) -> Self {
        if old.epoch() != new.epoch() || old.segment(0) != new.segment(0) {
            VersionChangeType::Major
        } else if old.segment(1) != new.segment(1) {
            VersionChangeType::Minor
        } else {
            let len = old.release().len().max(new.release().len());
            if (2..len).any(|i| old.segment(i) != new.segment(i)) {
                VersionChangeType::Patch
            } else {
                VersionChangeType::Other
            }
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Other => "other".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Other => "other",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    fn paint(&self, text: &str, style: fn(ColoredString) -> ColoredString) -> String {
        if self.color {
            style(text.into()).to_string()
        } else {
            text.to_string()
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if self.dry_run {
            format!("{} ", self.paint("(dry-run)", |s| s.cyan()))
        } else {
            String::new()
        }
    }

    /// Format a skip reason for display
    fn format_skip_reason(&self, reason: &SkipReason) -> String {
        match reason {
            SkipReason::AlreadyLatest => "latest".to_string(),
            SkipReason::Excluded => "excluded".to_string(),
            SkipReason::NotInOnlyList => "not in --only".to_string(),
            SkipReason::FetchFailed(msg) => format!("fetch failed: {}", msg),
            SkipReason::NoSuitableVersion => "no suitable version".to_string(),
        }
    }

    fn category_title(category: Option<&Category>) -> String {
        match category {
            Some(category) => format!("{} ({})", category.header(), category.slug()),
            None => "Uncategorized".to_string(),
        }
    }

    /// Format a single update line
    fn format_update_line(
        &self,
        name: &str,
        old_version: &PinnedVersion,
        new_version: &PinnedVersion,
        released_at: Option<DateTime<Utc>>,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let change_type = VersionChangeType::from_versions(old_version, new_version);
        let date_display = released_at
            .map(|d| format!(" ({})", d.format("%Y/%m/%d %H:%M")))
            .unwrap_or_default();

        if self.color {
            writeln!(
                writer,
                "  {:width$} {} {} {} [{}]{}",
                name,
                old_version.as_str().dimmed(),
                "→".dimmed(),
                new_version.as_str().bright_white().bold(),
                change_type.colored_label(),
                date_display.dimmed(),
                width = max_name_len
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]{}",
                name,
                old_version,
                new_version,
                change_type.label(),
                date_display,
                width = max_name_len
            )
        }
    }

    /// Format the per-manifest upgrade block
    fn format_upgrades(
        &self,
        summary: &UpgradeSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let updates: Vec<_> = summary.updates().collect();
        let skips: Vec<_> = summary.skips().collect();

        if updates.is_empty() && (self.verbosity != Verbosity::Verbose || skips.is_empty()) {
            return Ok(());
        }

        let update_count = updates.len();
        let skip_count = skips.len();
        writeln!(
            writer,
            "{}{} — {} {}, {} {}",
            self.dry_run_prefix(),
            self.paint(&summary.path.display().to_string(), |s| s.bold()),
            self.paint(&update_count.to_string(), |s| s.green()),
            if update_count == 1 { "update" } else { "updates" },
            self.paint(&skip_count.to_string(), |s| s.dimmed()),
            if skip_count == 1 { "skip" } else { "skips" }
        )?;

        let max_name_len = summary
            .results
            .iter()
            .map(|r| r.declaration().name.len())
            .max()
            .unwrap_or(0)
            .max(20);

        for result in &updates {
            if let UpdateResult::Update {
                declaration,
                new_version,
                released_at,
            } = result
            {
                self.format_update_line(
                    &declaration.name,
                    &declaration.version,
                    new_version,
                    *released_at,
                    max_name_len,
                    writer,
                )?;
            }
        }

        if self.verbosity == Verbosity::Verbose && !skips.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "  {}", self.paint("Skipped:", |s| s.dimmed()))?;
            for result in &skips {
                if let UpdateResult::Skip {
                    declaration,
                    reason,
                } = result
                {
                    let name = format!("{:width$}", declaration.name, width = max_name_len);
                    let reason = format!("({})", self.format_skip_reason(reason));
                    writeln!(
                        writer,
                        "  {} {}",
                        self.paint(&name, |s| s.dimmed()),
                        self.paint(&reason, |s| s.dimmed())
                    )?;
                }
            }
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Count updates by change type
    fn count_by_change_type(&self, summary: &UpgradeSummary) -> (usize, usize, usize, usize) {
        let mut major = 0;
        let mut minor = 0;
        let mut patch = 0;
        let mut other = 0;

        for result in summary.updates() {
            if let UpdateResult::Update {
                declaration,
                new_version,
                ..
            } = result
            {
                match VersionChangeType::from_versions(&declaration.version, new_version) {
                    VersionChangeType::Major => major += 1,
                    VersionChangeType::Minor => minor += 1,
                    VersionChangeType::Patch => patch += 1,
                    VersionChangeType::Other => other += 1,
                }
            }
        }

        (major, minor, patch, other)
    }

    /// Count skips by reason
    fn count_by_skip_reason(&self, summary: &UpgradeSummary) -> Vec<(String, usize)> {
        use std::collections::HashMap;
        let mut counts: HashMap<String, usize> = HashMap::new();

        for result in summary.skips() {
            if let Some(reason) = result.skip_reason() {
                let key = match reason {
                    SkipReason::FetchFailed(_) => "fetch failed".to_string(),
                    other => self.format_skip_reason(other),
                };
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let mut result: Vec<_> = counts.into_iter().collect();
        result.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        result
    }

    fn format_environment(
        &self,
        env: &ResolvedEnvironment,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(
            writer,
            "{} Resolved {} package(s) against {}",
            self.paint("✓", |s| s.green()),
            env.packages.len(),
            env.index
        )?;

        if self.verbosity == Verbosity::Verbose {
            let max_name_len = env
                .packages
                .iter()
                .map(|p| p.name.len())
                .max()
                .unwrap_or(0);
            for package in &env.packages {
                let yanked = if package.yanked {
                    format!(" {}", self.paint("(yanked)", |s| s.yellow()))
                } else {
                    String::new()
                };
                writeln!(
                    writer,
                    "  {:width$} {}{}",
                    package.name,
                    package.version,
                    yanked,
                    width = max_name_len
                )?;
                if !package.external.is_empty() {
                    let external = format!("requires {}", package.external.join(", "));
                    writeln!(writer, "    {}", self.paint(&external, |s| s.dimmed()))?;
                }
            }
        }

        let external = env.external_names();
        if !external.is_empty() && self.verbosity != Verbosity::Quiet {
            let line = format!(
                "{} transitive package(s) left to the installer",
                external.len()
            );
            writeln!(writer, "  {}", self.paint(&line, |s| s.dimmed()))?;
        }

        for warning in &env.warnings {
            writeln!(writer, "  {} {}", self.paint("warning:", |s| s.yellow()), warning)?;
        }
        Ok(())
    }

    fn format_failure(
        &self,
        failure: &ResolutionFailure,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(
            writer,
            "{} ({} error(s)):",
            self.paint("Resolution failed", |s| s.red().bold()),
            failure.errors.len()
        )?;
        for error in &failure.errors {
            writeln!(
                writer,
                "  {} [{}] {}",
                self.paint("✗", |s| s.red()),
                error.kind(),
                error
            )?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format_check(
        &self,
        path: &Path,
        report: &CheckReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for diagnostic in &report.diagnostics {
            let label = match diagnostic.severity {
                Severity::Error => self.paint("error", |s| s.red().bold()),
                Severity::Warning => self.paint("warning", |s| s.yellow()),
            };
            writeln!(
                writer,
                "{}[{}] {}",
                label, diagnostic.code, diagnostic.message
            )?;
        }

        let errors = report.errors().count();
        let warnings = report.warnings().count();
        if report.is_ok() {
            writeln!(
                writer,
                "{} {}: {} declaration(s), {} warning(s)",
                self.paint("✓", |s| s.green()),
                path.display(),
                report.declarations,
                warnings
            )
        } else {
            writeln!(
                writer,
                "{} {}: {} error(s), {} warning(s)",
                self.paint("✗", |s| s.red()),
                path.display(),
                errors,
                warnings
            )
        }
    }

    fn format_list(
        &self,
        path: &Path,
        manifest: &Manifest,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let max_name_len = manifest
            .declarations()
            .map(|d| d.requirement().len())
            .max()
            .unwrap_or(0);

        for (category, declarations) in manifest.groups() {
            let title = Self::category_title(category.as_ref());
            writeln!(writer, "{}", self.paint(&title, |s| s.bold()))?;
            for declaration in declarations {
                match declaration.comment {
                    Some(ref comment) => writeln!(
                        writer,
                        "  {:width$}  {}",
                        declaration.requirement(),
                        self.paint(&format!("# {}", comment), |s| s.dimmed()),
                        width = max_name_len
                    )?,
                    None => writeln!(writer, "  {}", declaration.requirement())?,
                }
            }
            writeln!(writer)?;
        }

        if self.verbosity != Verbosity::Quiet {
            writeln!(
                writer,
                "{}: {} declaration(s)",
                path.display(),
                manifest.len()
            )?;
        }
        Ok(())
    }

    fn format_edit(
        &self,
        path: &Path,
        outcome: &EditOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let path = path.display();
        match outcome {
            EditOutcome::Added {
                name,
                version,
                line,
                ..
            } => writeln!(
                writer,
                "Added {}=={} to {} (line {})",
                self.paint(name, |s| s.bold()),
                version,
                path,
                line
            ),
            EditOutcome::Replaced { name, from, to } => writeln!(
                writer,
                "Updated {} in {}: {} -> {}",
                self.paint(name, |s| s.bold()),
                path,
                from,
                self.paint(to, |s| s.green())
            ),
            EditOutcome::Removed {
                name,
                version,
                line,
            } => writeln!(
                writer,
                "Removed {}=={} from {} (line {})",
                self.paint(name, |s| s.bold()),
                version,
                path,
                line
            ),
            EditOutcome::Formatted { changed, written } => match (changed, written) {
                (true, true) => writeln!(writer, "Reformatted {}", path),
                (true, false) => writeln!(
                    writer,
                    "{} {}",
                    self.paint("Would reformat", |s| s.yellow()),
                    path
                ),
                (false, _) => writeln!(writer, "{} is already formatted", path),
            },
        }
    }

    fn format_resolution(
        &self,
        resolution: &Result<ResolvedEnvironment, ResolutionFailure>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match resolution {
            Ok(env) => self.format_environment(env, writer),
            Err(failure) => self.format_failure(failure, writer),
        }
    }

    fn format_install(
        &self,
        outcome: &InstallOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.format_resolution(&outcome.resolution, writer)?;

        let Some(ref install) = outcome.install else {
            return writeln!(writer, "Installer was not run");
        };

        if install.success {
            writeln!(
                writer,
                "{} Installed with `{}`",
                self.paint("✓", |s| s.green()),
                install.command
            )?;
            if self.verbosity == Verbosity::Verbose && !install.stdout.is_empty() {
                write!(writer, "{}", install.stdout)?;
            }
        } else {
            let status = install
                .exit_code
                .map(|code| format!("exit code {}", code))
                .unwrap_or_else(|| "not started".to_string());
            writeln!(
                writer,
                "{} `{}` failed ({})",
                self.paint("✗", |s| s.red()),
                install.command,
                status
            )?;
            for line in install.stderr.lines() {
                writeln!(writer, "    {}", line)?;
            }
        }
        Ok(())
    }

    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&result.summary, writer);
        }

        self.format_upgrades(&result.summary, writer)?;

        if !result.errors.is_empty() {
            writeln!(writer, "{}:", self.paint("Errors", |s| s.red().bold()))?;
            for error in &result.errors {
                writeln!(writer, "  {} {}", self.paint("✗", |s| s.red()), error)?;
            }
            writeln!(writer)?;
        }

        self.format_summary(&result.summary, writer)
    }

    fn format_summary(
        &self,
        summary: &UpgradeSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = summary.update_count();
        let skips = summary.skip_count();

        if self.verbosity == Verbosity::Quiet {
            return if updates > 0 {
                writeln!(
                    writer,
                    "{}{} updated",
                    prefix,
                    self.paint(&updates.to_string(), |s| s.green())
                )
            } else {
                writeln!(writer, "{}{}", prefix, self.paint("No updates", |s| s.dimmed()))
            };
        }

        writeln!(writer, "{}{}:", prefix, self.paint("Summary", |s| s.bold()))?;

        if updates > 0 {
            let (major, minor, patch, other) = self.count_by_change_type(summary);
            let mut parts = Vec::new();
            if major > 0 {
                parts.push(format!("{} major", self.paint(&major.to_string(), |s| s.red())));
            }
            if minor > 0 {
                parts.push(format!("{} minor", self.paint(&minor.to_string(), |s| s.yellow())));
            }
            if patch > 0 {
                parts.push(format!("{} patch", self.paint(&patch.to_string(), |s| s.green())));
            }
            if other > 0 {
                parts.push(format!("{} other", self.paint(&other.to_string(), |s| s.dimmed())));
            }
            writeln!(
                writer,
                "  {} package(s) updated ({})",
                self.paint(&updates.to_string(), |s| s.green()),
                parts.join(", ")
            )?;
        } else {
            writeln!(writer, "  {}", self.paint("No packages updated", |s| s.dimmed()))?;
        }

        write!(writer, "  {} package(s) skipped", skips)?;
        if self.verbosity == Verbosity::Verbose && skips > 0 {
            let parts: Vec<_> = self
                .count_by_skip_reason(summary)
                .iter()
                .map(|(reason, count)| format!("{} {}", count, reason))
                .collect();
            write!(writer, " ({})", self.paint(&parts.join(", "), |s| s.dimmed()))?;
        }
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Installer;
    use crate::domain::Declaration;
    use crate::error::ResolutionError;
    use crate::installer::InstallResult;
    use crate::manifest::check;
    use crate::resolve::ResolvedPackage;

    fn version(text: &str) -> PinnedVersion {
        PinnedVersion::parse(text).unwrap()
    }

    fn declaration(name: &str, v: &str) -> Declaration {
        Declaration::new(name, version(v))
    }

    fn plain(verbosity: Verbosity) -> TextFormatter {
        TextFormatter::with_color(verbosity, false, false)
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn create_summary() -> UpgradeSummary {
        let mut summary = UpgradeSummary::new("requirements.txt", false);
        summary.add_result(UpdateResult::update(
            declaration("plotly", "5.18.0"),
            version("5.24.1"),
        ));
        summary.add_result(UpdateResult::update(
            declaration("pandas", "2.1.4"),
            version("2.1.5"),
        ));
        summary.add_result(UpdateResult::skip(
            declaration("xlrd", "2.0.1"),
            SkipReason::AlreadyLatest,
        ));
        summary
    }

    fn create_result() -> OrchestratorResult {
        OrchestratorResult {
            summary: create_summary(),
            write_result: None,
            original: String::new(),
            updated: String::new(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_version_change_type() {
        let change = |a, b| VersionChangeType::from_versions(&version(a), &version(b));
        assert_eq!(change("1.26.2", "2.0.0"), VersionChangeType::Major);
        assert_eq!(change("5.18.0", "5.24.1"), VersionChangeType::Minor);
        assert_eq!(change("2.1.4", "2.1.5"), VersionChangeType::Patch);
        assert_eq!(change("2023.3", "2024.1"), VersionChangeType::Major);
        assert_eq!(change("2023.3", "2023.3.post1"), VersionChangeType::Other);
        assert_eq!(change("1.0", "1!1.0"), VersionChangeType::Major);
        assert_eq!(change("3.1", "3.1.2"), VersionChangeType::Patch);
    }

    #[test]
    fn test_dry_run_prefix() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, true, false);
        assert_eq!(formatter.dry_run_prefix(), "(dry-run) ");

        let formatter = TextFormatter::with_color(Verbosity::Normal, false, false);
        assert_eq!(formatter.dry_run_prefix(), "");
    }

    #[test]
    fn test_format_skip_reason() {
        let formatter = plain(Verbosity::Normal);
        assert_eq!(formatter.format_skip_reason(&SkipReason::AlreadyLatest), "latest");
        assert_eq!(
            formatter.format_skip_reason(&SkipReason::NotInOnlyList),
            "not in --only"
        );
        assert!(formatter
            .format_skip_reason(&SkipReason::FetchFailed("timeout".to_string()))
            .contains("fetch failed"));
    }

    #[test]
    fn test_format_upgrade_normal() {
        let output = render(|w| plain(Verbosity::Normal).format(&create_result(), w));

        assert!(output.contains("requirements.txt — 2 updates, 1 skip"));
        assert!(output.contains("5.18.0 -> 5.24.1 [minor]"));
        assert!(output.contains("2.1.4 -> 2.1.5 [patch]"));
        assert!(!output.contains("xlrd"));
        assert!(output.contains("2 package(s) updated (1 minor, 1 patch)"));
    }

    #[test]
    fn test_format_upgrade_quiet() {
        let output = render(|w| plain(Verbosity::Quiet).format(&create_result(), w));
        assert_eq!(output, "2 updated\n");
    }

    #[test]
    fn test_format_upgrade_verbose() {
        let output = render(|w| plain(Verbosity::Verbose).format(&create_result(), w));
        assert!(output.contains("Skipped:"));
        assert!(output.contains("xlrd"));
        assert!(output.contains("1 package(s) skipped (1 latest)"));
    }

    #[test]
    fn test_format_upgrade_dry_run_and_errors() {
        let mut result = create_result();
        result.errors.push(crate::orchestrator::OrchestratorError::RegistryError {
            package: "numpy".to_string(),
            message: "timeout".to_string(),
        });
        let formatter = TextFormatter::with_color(Verbosity::Normal, true, false);
        let output = render(|w| formatter.format(&result, w));
        assert!(output.contains("(dry-run) requirements.txt"));
        assert!(output.contains("Errors:"));
        assert!(output.contains("Failed to fetch numpy: timeout"));
    }

    #[test]
    fn test_format_summary_no_updates() {
        let summary = UpgradeSummary::new("requirements.txt", false);
        let output = render(|w| plain(Verbosity::Normal).format_summary(&summary, w));
        assert!(output.contains("No packages updated"));

        let output = render(|w| plain(Verbosity::Quiet).format_summary(&summary, w));
        assert_eq!(output, "No updates\n");
    }

    #[test]
    fn test_format_check() {
        let report = check("pandas==2.1.4\n-r base.txt\nnumpy>=1.26\n");
        let output =
            render(|w| plain(Verbosity::Normal).format_check(Path::new("requirements.txt"), &report, w));
        assert!(output.contains("error[unpinned] line 3:"));
        assert!(output.contains("warning[directive] line 2:"));
        assert!(output.contains("✗ requirements.txt: 1 error(s), 1 warning(s)"));

        let report = check("pandas==2.1.4\n");
        let output =
            render(|w| plain(Verbosity::Normal).format_check(Path::new("requirements.txt"), &report, w));
        assert_eq!(output, "✓ requirements.txt: 1 declaration(s), 0 warning(s)\n");
    }

    #[test]
    fn test_format_list_groups() {
        let manifest = Manifest::parse(
            "# Core dependencies\npandas==2.1.4\n\n# Excel support\nxlrd==2.0.1  # Legacy Excel support\n",
        )
        .unwrap();
        let output =
            render(|w| plain(Verbosity::Normal).format_list(Path::new("requirements.txt"), &manifest, w));
        assert!(output.contains("Core (core)\n  pandas==2.1.4\n"));
        assert!(output.contains("Excel support (excel-support)\n  xlrd==2.0.1"));
        assert!(output.contains("  # Legacy Excel support\n"));
        assert!(output.ends_with("requirements.txt: 2 declaration(s)\n"));
    }

    #[test]
    fn test_format_edit() {
        let formatter = plain(Verbosity::Normal);
        let path = Path::new("requirements.txt");

        let output = render(|w| {
            formatter.format_edit(
                path,
                &EditOutcome::Formatted {
                    changed: true,
                    written: false,
                },
                w,
            )
        });
        assert_eq!(output, "Would reformat requirements.txt\n");

        let output = render(|w| {
            formatter.format_edit(
                path,
                &EditOutcome::Removed {
                    name: "xlrd".to_string(),
                    version: "2.0.1".to_string(),
                    line: 9,
                },
                w,
            )
        });
        assert_eq!(output, "Removed xlrd==2.0.1 from requirements.txt (line 9)\n");
    }

    #[test]
    fn test_format_resolution_failure_lists_every_error() {
        let failure = ResolutionFailure::new(vec![
            ResolutionError::PackageNotFound {
                package: "colour".to_string(),
                version: "9.9.9".to_string(),
            },
            ResolutionError::IndexUnavailable {
                package: "pandas".to_string(),
                message: "timeout".to_string(),
            },
        ]);
        let output = render(|w| plain(Verbosity::Normal).format_resolution(&Err(failure), w));
        assert!(output.starts_with("Resolution failed (2 error(s)):"));
        assert!(output.contains("[package_not_found]"));
        assert!(output.contains("[index_unavailable]"));
    }

    #[test]
    fn test_format_resolution_success() {
        let env = ResolvedEnvironment {
            index: "https://pypi.org/pypi".to_string(),
            packages: vec![ResolvedPackage {
                name: "seaborn".to_string(),
                version: version("0.13.0"),
                category: Some(Category::Visualization),
                requires: vec![],
                external: vec!["scipy>=1.3".to_string()],
                yanked: false,
            }],
            skipped: vec![],
            warnings: vec!["xlrd==2.0.1 is yanked".to_string()],
        };
        let output = render(|w| plain(Verbosity::Verbose).format_resolution(&Ok(env), w));
        assert!(output.contains("✓ Resolved 1 package(s) against https://pypi.org/pypi"));
        assert!(output.contains("requires scipy>=1.3"));
        assert!(output.contains("warning: xlrd==2.0.1 is yanked"));
    }

    #[test]
    fn test_format_install_failure() {
        let outcome = InstallOutcome {
            resolution: Ok(ResolvedEnvironment::default()),
            install: Some(InstallResult {
                installer: Installer::Uv,
                command: "uv pip install -r requirements.txt".to_string(),
                success: false,
                exit_code: Some(2),
                stdout: String::new(),
                stderr: "error: no interpreter found".to_string(),
            }),
        };
        let output = render(|w| plain(Verbosity::Normal).format_install(&outcome, w));
        assert!(output.contains("`uv pip install -r requirements.txt` failed (exit code 2)"));
        assert!(output.contains("    error: no interpreter found"));
    }
}
