//! Version information from the package index
//!
//! This module provides the VersionInfo struct that represents
//! a released version with its upload date and yank status.

use crate::domain::PinnedVersion;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Information about a released version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: PinnedVersion,
    /// Earliest upload time of the release files
    pub released_at: DateTime<Utc>,
    /// Every file of the release is yanked
    pub yanked: bool,
}

impl VersionInfo {
    pub fn new(version: PinnedVersion, released_at: DateTime<Utc>) -> Self {
        Self {
            version,
            released_at,
            yanked: false,
        }
    }

    /// Mark the release as yanked (builder pattern)
    pub fn with_yanked(mut self, yanked: bool) -> Self {
        self.yanked = yanked;
        self
    }

    pub fn is_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.released_at.cmp(&other.released_at))
    }
}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info(version: &str) -> VersionInfo {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        VersionInfo::new(PinnedVersion::parse(version).unwrap(), date)
    }

    #[test]
    fn test_version_info_new() {
        let v = info("1.26.2");
        assert_eq!(v.version.as_str(), "1.26.2");
        assert!(!v.yanked);
        assert!(v.with_yanked(true).yanked);
    }

    #[test]
    fn test_ordering_follows_pep440() {
        assert!(info("2023.3") < info("2023.3.post1"));
        assert!(info("2.0.0rc1") < info("2.0.0"));
        assert!(info("1.9") < info("1.10"));
    }

    #[test]
    fn test_is_prerelease() {
        assert!(info("2.0.0b1").is_prerelease());
        assert!(info("2.0.0.dev3").is_prerelease());
        assert!(!info("2023.3.post1").is_prerelease());
    }

    #[test]
    fn test_max_picks_latest() {
        let versions = [info("1.26.2"), info("2.0.0"), info("1.26.4")];
        assert_eq!(versions.iter().max().unwrap().version.as_str(), "2.0.0");
    }
}
