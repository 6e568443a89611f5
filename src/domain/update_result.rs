//! Upgrade decision result types

use super::{Declaration, PinnedVersion};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Reason why a declaration was left at its current pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already at the latest eligible version
    AlreadyLatest,
    /// Package was excluded via --exclude
    Excluded,
    /// Package not in --only list
    NotInOnlyList,
    /// Failed to fetch release list from the index
    FetchFailed(String),
    /// No release passed the pre-release, yank and age filters
    NoSuitableVersion,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyLatest => write!(f, "already at latest"),
            SkipReason::Excluded => write!(f, "excluded by --exclude"),
            SkipReason::NotInOnlyList => write!(f, "not in --only list"),
            SkipReason::FetchFailed(msg) => write!(f, "fetch failed: {}", msg),
            SkipReason::NoSuitableVersion => write!(f, "no suitable version"),
        }
    }
}

/// Result of an upgrade decision for a single declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateResult {
    /// Declaration will be bumped
    Update {
        declaration: Declaration,
        new_version: PinnedVersion,
        /// Upload time of the new release
        #[serde(skip_serializing_if = "Option::is_none")]
        released_at: Option<DateTime<Utc>>,
    },
    /// Declaration stays as is
    Skip {
        declaration: Declaration,
        reason: SkipReason,
    },
}

impl UpdateResult {
    /// Creates an Update result
    pub fn update(declaration: Declaration, new_version: PinnedVersion) -> Self {
        UpdateResult::Update {
            declaration,
            new_version,
            released_at: None,
        }
    }

    /// Creates an Update result carrying the release date
    pub fn update_with_date(
        declaration: Declaration,
        new_version: PinnedVersion,
        released_at: DateTime<Utc>,
    ) -> Self {
        UpdateResult::Update {
            declaration,
            new_version,
            released_at: Some(released_at),
        }
    }

    /// Creates a Skip result
    pub fn skip(declaration: Declaration, reason: SkipReason) -> Self {
        UpdateResult::Skip {
            declaration,
            reason,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, UpdateResult::Update { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateResult::Skip { .. })
    }

    /// Returns the declaration this result is about
    pub fn declaration(&self) -> &Declaration {
        match self {
            UpdateResult::Update { declaration, .. } => declaration,
            UpdateResult::Skip { declaration, .. } => declaration,
        }
    }

    /// Returns the new version if this is an update
    pub fn new_version(&self) -> Option<&PinnedVersion> {
        match self {
            UpdateResult::Update { new_version, .. } => Some(new_version),
            UpdateResult::Skip { .. } => None,
        }
    }

    /// Returns the skip reason if this is a skip
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            UpdateResult::Skip { reason, .. } => Some(reason),
            UpdateResult::Update { .. } => None,
        }
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateResult::Update {
                declaration,
                new_version,
                ..
            } => write!(
                f,
                "{}: {} -> {}",
                declaration.name, declaration.version, new_version
            ),
            UpdateResult::Skip {
                declaration,
                reason,
            } => write!(f, "{}: skipped ({})", declaration.name, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn declaration(name: &str, version: &str) -> Declaration {
        Declaration::new(name, PinnedVersion::parse(version).unwrap())
    }

    #[test]
    fn test_update_result_update() {
        let result = UpdateResult::update(
            declaration("plotly", "5.18.0"),
            PinnedVersion::parse("5.24.1").unwrap(),
        );
        assert!(result.is_update());
        assert!(!result.is_skip());
        assert_eq!(result.new_version().unwrap().as_str(), "5.24.1");
        assert!(result.skip_reason().is_none());
    }

    #[test]
    fn test_update_result_skip() {
        let result = UpdateResult::skip(declaration("numpy", "1.26.2"), SkipReason::Excluded);
        assert!(result.is_skip());
        assert_eq!(result.skip_reason(), Some(&SkipReason::Excluded));
        assert_eq!(result.declaration().name, "numpy");
    }

    #[test]
    fn test_update_with_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let result = UpdateResult::update_with_date(
            declaration("pandas", "2.1.4"),
            PinnedVersion::parse("2.2.1").unwrap(),
            date,
        );
        if let UpdateResult::Update { released_at, .. } = result {
            assert_eq!(released_at, Some(date));
        } else {
            panic!("expected update");
        }
    }

    #[test]
    fn test_display() {
        let update = UpdateResult::update(
            declaration("plotly", "5.18.0"),
            PinnedVersion::parse("5.24.1").unwrap(),
        );
        assert_eq!(update.to_string(), "plotly: 5.18.0 -> 5.24.1");

        let skip = UpdateResult::skip(declaration("xlrd", "2.0.1"), SkipReason::AlreadyLatest);
        assert_eq!(skip.to_string(), "xlrd: skipped (already at latest)");
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::FetchFailed("timeout".to_string()).to_string(),
            "fetch failed: timeout"
        );
        assert_eq!(SkipReason::NotInOnlyList.to_string(), "not in --only list");
    }

    #[test]
    fn test_serialize_tagged() {
        let skip = UpdateResult::skip(declaration("xlrd", "2.0.1"), SkipReason::NoSuitableVersion);
        let json = serde_json::to_value(&skip).unwrap();
        assert_eq!(json["type"], "skip");
        assert_eq!(json["reason"], "no_suitable_version");
    }
}
