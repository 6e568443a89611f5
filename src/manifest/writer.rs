//! Manifest file writing and update operations
//!
//! This module provides:
//! - ManifestWriter for applying version bumps to a manifest file
//! - Dry-run mode support (no actual file modifications)
//! - Format preservation: only the version text of a bumped line changes

use super::Manifest;
use crate::domain::{UpdateResult, UpgradeSummary};
use crate::error::ManifestError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writer for manifest files that applies version updates
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of applying updates to a manifest file
#[derive(Debug)]
pub struct WriteResult {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Number of updates successfully applied
    pub updates_applied: usize,
    /// Number of updates that failed
    pub updates_failed: usize,
    /// Whether the file was actually modified
    pub file_modified: bool,
    /// Errors encountered during update
    pub errors: Vec<String>,
}

impl WriteResult {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            updates_applied: 0,
            updates_failed: 0,
            file_modified: false,
            errors: Vec::new(),
        }
    }

    /// Returns true if any updates were successfully applied
    pub fn has_updates(&self) -> bool {
        self.updates_applied > 0
    }
}

impl ManifestWriter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Apply the updates of `summary` to `manifest` and write it back to disk
    ///
    /// `manifest` is edited in memory even in dry-run mode so callers can
    /// render the would-be result.
    pub fn apply_updates(
        &self,
        manifest: &mut Manifest,
        summary: &UpgradeSummary,
    ) -> Result<WriteResult, ManifestError> {
        let mut result = WriteResult::new(&summary.path);

        for update in summary.updates() {
            if let UpdateResult::Update {
                declaration,
                new_version,
                ..
            } = update
            {
                match manifest.set_version(&declaration.name, new_version) {
                    Ok(_) => result.updates_applied += 1,
                    Err(e) => {
                        result.updates_failed += 1;
                        result
                            .errors
                            .push(format!("Failed to update {}: {}", declaration.name, e));
                    }
                }
            }
        }

        if result.updates_applied > 0 && !self.dry_run {
            write_manifest(&summary.path, &manifest.render())?;
            result.file_modified = true;
        }

        Ok(result)
    }
}

/// Read a manifest file, distinguishing a missing file from other failures
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ManifestError::not_found(path),
        _ => ManifestError::read_error(path, &e),
    })
}

/// Write content to a manifest file
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, &e))
}
