//! Upgrade summary for one manifest file

use super::UpdateResult;
use serde::Serialize;
use std::path::PathBuf;

/// Upgrade results for a manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeSummary {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Individual declaration results, in manifest order
    pub results: Vec<UpdateResult>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl UpgradeSummary {
    /// Creates a new, empty summary
    pub fn new(path: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            path: path.into(),
            results: Vec::new(),
            dry_run,
        }
    }

    /// Adds a result
    pub fn add_result(&mut self, result: UpdateResult) {
        self.results.push(result);
    }

    /// Returns the number of updates
    pub fn update_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_update()).count()
    }

    /// Returns the number of skips
    pub fn skip_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skip()).count()
    }

    /// Returns all updates
    pub fn updates(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_update())
    }

    /// Returns all skips
    pub fn skips(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_skip())
    }

    pub fn has_updates(&self) -> bool {
        self.update_count() > 0
    }
}
