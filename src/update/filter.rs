//! Update filter configuration
//!
//! This module provides the UpdateFilter struct that encapsulates
//! all filter options for upgrade judgment.

use crate::domain::normalize_name;
use std::time::Duration;

/// Filter configuration for upgrade judgment
#[derive(Debug, Clone, Default)]
pub struct UpdateFilter {
    /// Packages to exclude from updates
    pub exclude: Vec<String>,
    /// If non-empty, only update these packages
    pub only: Vec<String>,
    /// Minimum age for versions to be considered
    pub min_age: Option<Duration>,
    /// Consider pre-releases even when the current pin is final
    pub allow_prerelease: bool,
}

impl UpdateFilter {
    /// Create a new UpdateFilter with default settings (process all)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    pub fn with_min_age(mut self, age: Duration) -> Self {
        self.min_age = Some(age);
        self
    }

    pub fn with_prerelease(mut self, allow: bool) -> Self {
        self.allow_prerelease = allow;
        self
    }

    /// Check if a package should be processed based on filters
    ///
    /// Names are compared after PEP 503 normalization. `only` wins over `exclude`.
    pub fn should_process_package(&self, name: &str) -> bool {
        let name = normalize_name(name);
        if !self.only.is_empty() {
            return self.only.iter().any(|p| normalize_name(p) == name);
        }
        !self.exclude.iter().any(|p| normalize_name(p) == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filter() {
        let filter = UpdateFilter::new();
        assert!(filter.exclude.is_empty());
        assert!(filter.only.is_empty());
        assert!(filter.min_age.is_none());
        assert!(!filter.allow_prerelease);
    }

    #[test]
    fn test_chained_builders() {
        let filter = UpdateFilter::new()
            .with_exclude(vec!["numpy".to_string()])
            .with_min_age(Duration::from_secs(86400))
            .with_prerelease(true);

        assert_eq!(filter.exclude, vec!["numpy"]);
        assert_eq!(filter.min_age, Some(Duration::from_secs(86400)));
        assert!(filter.allow_prerelease);
    }

    #[test]
    fn test_should_process_package_no_filter() {
        let filter = UpdateFilter::new();
        assert!(filter.should_process_package("pandas"));
    }

    #[test]
    fn test_should_process_package_with_exclude() {
        let filter = UpdateFilter::new().with_exclude(vec!["numpy".to_string()]);
        assert!(!filter.should_process_package("numpy"));
        assert!(!filter.should_process_package("NumPy"));
        assert!(filter.should_process_package("pandas"));
    }

    #[test]
    fn test_should_process_package_with_only() {
        let filter = UpdateFilter::new().with_only(vec!["python_dateutil".to_string()]);
        assert!(filter.should_process_package("python-dateutil"));
        assert!(!filter.should_process_package("pytz"));
    }

    #[test]
    fn test_only_takes_precedence() {
        let filter = UpdateFilter::new()
            .with_only(vec!["xlrd".to_string()])
            .with_exclude(vec!["xlrd".to_string()]);
        assert!(filter.should_process_package("xlrd"));
    }
}
