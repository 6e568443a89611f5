//! PyPI JSON API adapter
//!
//! Endpoints:
//! - `{index}/{package}/json` for the release list
//! - `{index}/{package}/{version}/json` for one release

use crate::domain::{normalize_name, PinnedVersion};
use crate::error::IndexError;
use crate::registry::{HttpClient, PackageIndex, ReleaseMetadata};
use crate::update::VersionInfo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Public PyPI JSON API
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

/// PyPI adapter
pub struct PyPIAdapter {
    client: HttpClient,
    base_url: String,
}

/// `{package}/json` response
#[derive(Debug, Deserialize)]
struct ProjectResponse {
    /// Release files keyed by version
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

/// `{package}/{version}/json` response
#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    info: ReleaseInfo,
    /// Files of this release
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    name: String,
    version: String,
    #[serde(default)]
    requires_dist: Option<Vec<String>>,
    #[serde(default)]
    requires_python: Option<String>,
    #[serde(default)]
    yanked: bool,
    #[serde(default)]
    yanked_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    upload_time_iso_8601: Option<String>,
    #[serde(default)]
    yanked: bool,
}

impl PyPIAdapter {
    /// Create an adapter for the public index
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_INDEX_URL)
    }

    /// Create an adapter for a mirror exposing the same JSON API
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn project_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.base_url, normalize_name(package))
    }

    fn release_url(&self, package: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/json",
            self.base_url,
            normalize_name(package),
            version
        )
    }
}

/// Earliest upload time among the files of a release
fn earliest_upload(files: &[ReleaseFile]) -> Option<DateTime<Utc>> {
    files
        .iter()
        .filter_map(|f| f.upload_time_iso_8601.as_deref())
        .filter_map(|t| t.parse::<DateTime<Utc>>().ok())
        .min()
}

#[async_trait]
impl PackageIndex for PyPIAdapter {
    fn index_name(&self) -> &str {
        if self.base_url == DEFAULT_INDEX_URL {
            "PyPI"
        } else {
            &self.base_url
        }
    }

    async fn fetch_release(
        &self,
        package: &str,
        version: &PinnedVersion,
    ) -> Result<ReleaseMetadata, IndexError> {
        let url = self.release_url(package, version.as_str());
        let response: ReleaseResponse = self
            .client
            .get_json(&url, package, self.index_name())
            .await?;

        let info = response.info;
        let yanked = info.yanked
            || (!response.urls.is_empty() && response.urls.iter().all(|f| f.yanked));

        Ok(ReleaseMetadata {
            name: info.name,
            version: info.version,
            requires_dist: info.requires_dist.unwrap_or_default(),
            requires_python: info.requires_python.filter(|s| !s.trim().is_empty()),
            yanked,
            yanked_reason: info.yanked_reason,
        })
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, IndexError> {
        let url = self.project_url(package);
        let response: ProjectResponse = self
            .client
            .get_json(&url, package, self.index_name())
            .await?;

        let mut versions = Vec::new();

        for (version, files) in response.releases {
            let Some(parsed) = PinnedVersion::parse(&version) else {
                debug!(package, version = %version, "ignoring non-PEP 440 release");
                continue;
            };
            // Releases without files cannot be installed
            let Some(released_at) = earliest_upload(&files) else {
                continue;
            };
            let yanked = files.iter().all(|f| f.yanked);
            versions.push(VersionInfo::new(parsed, released_at).with_yanked(yanked));
        }

        versions.sort();
        Ok(versions)
    }
}
