//! Diff output formatter for showing changes
//!
//! This module provides:
//! - Unified diff format display of upgraded lines
//! - Text output for the commands that do not change pins

use crate::domain::UpgradeSummary;
use crate::error::ResolutionFailure;
use crate::manifest::{CheckReport, Manifest};
use crate::orchestrator::{EditOutcome, InstallOutcome, OrchestratorResult};
use crate::output::{OutputFormatter, TextFormatter};
use crate::resolve::ResolvedEnvironment;
use std::io::Write;
use std::path::Path;

/// Diff formatter for showing version changes
pub struct DiffFormatter {
    /// Whether this is a dry-run
    dry_run: bool,
    /// Used for everything that is not an upgrade
    text: TextFormatter,
}

impl DiffFormatter {
    /// Create a new diff formatter
    pub fn new(dry_run: bool, text: TextFormatter) -> Self {
        Self { dry_run, text }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> &'static str {
        if self.dry_run {
            "(dry-run) "
        } else {
            ""
        }
    }
}

/// 1-based numbers and texts of the lines that differ
///
/// Upgrades only rewrite version text, so both sides have the same lines.
fn changed_lines<'a>(original: &'a str, updated: &'a str) -> Vec<(usize, &'a str, &'a str)> {
    original
        .split('\n')
        .zip(updated.split('\n'))
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(idx, (old, new))| (idx + 1, old, new))
        .collect()
}

impl OutputFormatter for DiffFormatter {
    fn format_check(
        &self,
        path: &Path,
        report: &CheckReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.text.format_check(path, report, writer)
    }

    fn format_list(
        &self,
        path: &Path,
        manifest: &Manifest,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.text.format_list(path, manifest, writer)
    }

    fn format_edit(
        &self,
        path: &Path,
        outcome: &EditOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.text.format_edit(path, outcome, writer)
    }

    fn format_resolution(
        &self,
        resolution: &Result<ResolvedEnvironment, ResolutionFailure>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.text.format_resolution(resolution, writer)
    }

    fn format_install(
        &self,
        outcome: &InstallOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.text.format_install(outcome, writer)
    }

    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let changes = changed_lines(&result.original, &result.updated);

        if !changes.is_empty() {
            let path = result.summary.path.display();
            writeln!(writer, "{}--- a/{}", prefix, path)?;
            writeln!(writer, "{}+++ b/{}", prefix, path)?;

            for (line, old, new) in &changes {
                writeln!(writer, "@@ -{line},1 +{line},1 @@")?;
                writeln!(writer, "-{}", old.trim_end_matches('\r'))?;
                writeln!(writer, "+{}", new.trim_end_matches('\r'))?;
            }
            writeln!(writer)?;
        }

        for error in &result.errors {
            writeln!(writer, "# error: {}", error)?;
        }

        self.format_summary(&result.summary, writer)
    }

    fn format_summary(
        &self,
        summary: &UpgradeSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let verb = if self.dry_run {
            "would be updated"
        } else {
            "updated"
        };
        writeln!(
            writer,
            "{}# {} package(s) {}, {} skipped",
            self.dry_run_prefix(),
            summary.update_count(),
            verb,
            summary.skip_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Declaration, PinnedVersion, SkipReason, UpdateResult};
    use crate::output::Verbosity;

    fn version(text: &str) -> PinnedVersion {
        PinnedVersion::parse(text).unwrap()
    }

    fn formatter(dry_run: bool) -> DiffFormatter {
        DiffFormatter::new(
            dry_run,
            TextFormatter::with_color(Verbosity::Normal, dry_run, false),
        )
    }

    fn create_result(dry_run: bool) -> OrchestratorResult {
        let mut summary = UpgradeSummary::new("requirements.txt", dry_run);
        summary.add_result(UpdateResult::update(
            Declaration::new("pytz", version("2023.3.post1")),
            version("2024.2"),
        ));
        summary.add_result(UpdateResult::skip(
            Declaration::new("colour", version("0.1.5")),
            SkipReason::AlreadyLatest,
        ));
        OrchestratorResult {
            summary,
            write_result: None,
            original: "# File handling\npytz==2023.3.post1\n\n# Styling\ncolour==0.1.5\n"
                .to_string(),
            updated: "# File handling\npytz==2024.2\n\n# Styling\ncolour==0.1.5\n".to_string(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_changed_lines() {
        let changes = changed_lines("a==1\nb==2\n", "a==1\nb==3\n");
        assert_eq!(changes, vec![(2, "b==2", "b==3")]);
    }

    #[test]
    fn test_format_diff() {
        let mut output = Vec::new();
        formatter(false)
            .format(&create_result(false), &mut output)
            .unwrap();
        let output_str = String::from_utf8(output).unwrap();

        assert!(output_str.contains("--- a/requirements.txt"));
        assert!(output_str.contains("+++ b/requirements.txt"));
        assert!(output_str.contains("@@ -2,1 +2,1 @@\n-pytz==2023.3.post1\n+pytz==2024.2\n"));
        assert!(!output_str.contains("colour"));
        assert!(output_str.contains("# 1 package(s) updated, 1 skipped"));
    }

    #[test]
    fn test_format_diff_dry_run() {
        let mut output = Vec::new();
        formatter(true)
            .format(&create_result(true), &mut output)
            .unwrap();
        let output_str = String::from_utf8(output).unwrap();

        assert!(output_str.contains("(dry-run) --- a/requirements.txt"));
        assert!(output_str.contains("(dry-run) # 1 package(s) would be updated"));
    }

    #[test]
    fn test_format_diff_no_changes() {
        let mut result = create_result(false);
        result.updated = result.original.clone();
        result.summary = UpgradeSummary::new("requirements.txt", false);

        let mut output = Vec::new();
        formatter(false).format(&result, &mut output).unwrap();
        let output_str = String::from_utf8(output).unwrap();

        assert!(!output_str.contains("---"));
        assert_eq!(output_str, "# 0 package(s) updated, 0 skipped\n");
    }

    #[test]
    fn test_non_upgrade_output_is_text() {
        let mut output = Vec::new();
        formatter(false)
            .format_edit(
                Path::new("requirements.txt"),
                &EditOutcome::Formatted {
                    changed: false,
                    written: false,
                },
                &mut output,
            )
            .unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "requirements.txt is already formatted\n"
        );
    }
}
