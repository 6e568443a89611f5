//! Upgrade judgment logic for declarations
//!
//! This module provides:
//! - Update filter configuration from CLI args and `pinreq.toml`
//! - Version info from the index with release date and yank status
//! - Update judgment engine that decides whether to bump or skip

mod filter;
mod version_info;

pub use filter::UpdateFilter;
pub use version_info::VersionInfo;

use crate::domain::{Declaration, SkipReason, UpdateResult};
use chrono::{DateTime, Utc};

/// Update judgment engine that decides whether to bump a pin
pub struct UpdateJudge {
    filter: UpdateFilter,
    /// Current time for age calculations
    now: DateTime<Utc>,
}

impl UpdateJudge {
    pub fn new(filter: UpdateFilter) -> Self {
        Self {
            filter,
            now: Utc::now(),
        }
    }

    /// Create a judge with a fixed current time (for testing)
    pub fn with_time(filter: UpdateFilter, now: DateTime<Utc>) -> Self {
        Self { filter, now }
    }

    /// Returns Some(SkipReason) if the declaration is filtered out before fetching
    pub fn should_skip(&self, declaration: &Declaration) -> Option<SkipReason> {
        if self.filter.should_process_package(&declaration.name) {
            return None;
        }
        if !self.filter.only.is_empty() {
            Some(SkipReason::NotInOnlyList)
        } else {
            Some(SkipReason::Excluded)
        }
    }

    /// Judge whether to bump a declaration given the released versions
    pub fn judge(&self, declaration: &Declaration, available: &[VersionInfo]) -> UpdateResult {
        if let Some(reason) = self.should_skip(declaration) {
            return UpdateResult::skip(declaration.clone(), reason);
        }

        if available.is_empty() {
            return UpdateResult::skip(
                declaration.clone(),
                SkipReason::FetchFailed("no versions available".to_string()),
            );
        }

        // Pre-releases only when already on one or explicitly allowed
        let allow_pre = self.filter.allow_prerelease || declaration.version.is_prerelease();
        let cutoff = self.filter.min_age.map(|age| {
            chrono::Duration::from_std(age)
                .ok()
                .and_then(|age| self.now.checked_sub_signed(age))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        });

        let latest = available
            .iter()
            .filter(|v| !v.yanked)
            .filter(|v| allow_pre || !v.is_prerelease())
            .filter(|v| cutoff.map_or(true, |cutoff| v.released_at <= cutoff))
            .max();

        let Some(latest) = latest else {
            return UpdateResult::skip(declaration.clone(), SkipReason::NoSuitableVersion);
        };

        // Never downgrade
        if latest.version <= declaration.version {
            return UpdateResult::skip(declaration.clone(), SkipReason::AlreadyLatest);
        }

        UpdateResult::update_with_date(
            declaration.clone(),
            latest.version.clone(),
            latest.released_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PinnedVersion;
    use chrono::TimeZone;
    use std::time::Duration;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn declaration(name: &str, version: &str) -> Declaration {
        Declaration::new(name, PinnedVersion::parse(version).unwrap())
    }

    fn released(version: &str, days_ago: i64) -> VersionInfo {
        VersionInfo::new(
            PinnedVersion::parse(version).unwrap(),
            fixed_time() - chrono::Duration::days(days_ago),
        )
    }

    fn judge(filter: UpdateFilter) -> UpdateJudge {
        UpdateJudge::with_time(filter, fixed_time())
    }

    fn new_version(result: &UpdateResult) -> Option<&str> {
        result.new_version().map(|v| v.as_str())
    }

    #[test]
    fn test_judge_simple_update() {
        let versions = vec![
            released("5.18.0", 200),
            released("5.20.0", 100),
            released("5.22.0", 10),
        ];
        let result = judge(UpdateFilter::new()).judge(&declaration("plotly", "5.18.0"), &versions);
        assert_eq!(new_version(&result), Some("5.22.0"));
    }

    #[test]
    fn test_judge_carries_release_date() {
        let versions = vec![released("2.2.0", 5)];
        let result = judge(UpdateFilter::new()).judge(&declaration("pandas", "2.1.4"), &versions);
        if let UpdateResult::Update { released_at, .. } = result {
            assert_eq!(released_at, Some(fixed_time() - chrono::Duration::days(5)));
        } else {
            panic!("expected update");
        }
    }

    #[test]
    fn test_judge_already_latest() {
        let versions = vec![released("2.0.0", 300), released("2.0.1", 200)];
        let result = judge(UpdateFilter::new()).judge(&declaration("xlrd", "2.0.1"), &versions);
        assert_eq!(result.skip_reason(), Some(&SkipReason::AlreadyLatest));
    }

    #[test]
    fn test_judge_never_downgrades() {
        let versions = vec![released("1.0.0", 300), released("1.1.0", 200)];
        let result = judge(UpdateFilter::new()).judge(&declaration("colour", "2.0.0"), &versions);
        assert_eq!(result.skip_reason(), Some(&SkipReason::AlreadyLatest));
    }

    #[test]
    fn test_judge_post_release_is_newer() {
        let versions = vec![released("2023.3", 300), released("2023.3.post1", 200)];
        let result = judge(UpdateFilter::new()).judge(&declaration("pytz", "2023.3"), &versions);
        assert_eq!(new_version(&result), Some("2023.3.post1"));
    }

    #[test]
    fn test_judge_skips_prereleases_by_default() {
        let versions = vec![released("1.26.4", 100), released("2.0.0rc1", 10)];
        let result = judge(UpdateFilter::new()).judge(&declaration("numpy", "1.26.2"), &versions);
        assert_eq!(new_version(&result), Some("1.26.4"));
    }

    #[test]
    fn test_judge_prereleases_when_allowed() {
        let versions = vec![released("1.26.4", 100), released("2.0.0rc1", 10)];
        let result = judge(UpdateFilter::new().with_prerelease(true))
            .judge(&declaration("numpy", "1.26.2"), &versions);
        assert_eq!(new_version(&result), Some("2.0.0rc1"));
    }

    #[test]
    fn test_judge_prereleases_when_current_is_prerelease() {
        let versions = vec![released("2.0.0b1", 100), released("2.0.0rc1", 10)];
        let result = judge(UpdateFilter::new()).judge(&declaration("numpy", "2.0.0b1"), &versions);
        assert_eq!(new_version(&result), Some("2.0.0rc1"));
    }

    #[test]
    fn test_judge_ignores_yanked() {
        let versions = vec![
            released("3.1.2", 300),
            released("3.1.3", 10).with_yanked(true),
        ];
        let result = judge(UpdateFilter::new()).judge(&declaration("openpyxl", "3.1.2"), &versions);
        assert_eq!(result.skip_reason(), Some(&SkipReason::AlreadyLatest));
    }

    #[test]
    fn test_judge_min_age() {
        let versions = vec![released("0.13.1", 30), released("0.13.2", 3)];
        let filter = UpdateFilter::new().with_min_age(Duration::from_secs(7 * 86400));
        let result = judge(filter).judge(&declaration("seaborn", "0.13.0"), &versions);
        assert_eq!(new_version(&result), Some("0.13.1"));
    }

    #[test]
    fn test_judge_min_age_filters_everything() {
        let versions = vec![released("0.13.1", 1)];
        let filter = UpdateFilter::new().with_min_age(Duration::from_secs(7 * 86400));
        let result = judge(filter).judge(&declaration("seaborn", "0.13.0"), &versions);
        assert_eq!(result.skip_reason(), Some(&SkipReason::NoSuitableVersion));
    }

    #[test]
    fn test_judge_excluded() {
        let filter = UpdateFilter::new().with_exclude(vec!["numpy".to_string()]);
        let result = judge(filter).judge(&declaration("numpy", "1.26.2"), &[released("2.0.0", 1)]);
        assert_eq!(result.skip_reason(), Some(&SkipReason::Excluded));
    }

    #[test]
    fn test_judge_not_in_only_list() {
        let filter = UpdateFilter::new().with_only(vec!["pandas".to_string()]);
        let result = judge(filter).judge(&declaration("numpy", "1.26.2"), &[released("2.0.0", 1)]);
        assert_eq!(result.skip_reason(), Some(&SkipReason::NotInOnlyList));
    }

    #[test]
    fn test_judge_no_versions() {
        let result = judge(UpdateFilter::new()).judge(&declaration("chardet", "5.2.0"), &[]);
        assert!(matches!(
            result.skip_reason(),
            Some(SkipReason::FetchFailed(_))
        ));
    }
}
