//! `pinreq.toml` configuration
//!
//! Settings are layered: CLI flag > environment variable > config file >
//! default. clap folds environment variables into the CLI layer, so this
//! module only merges overrides on top of the file.

use crate::domain::{normalize_name, MarkerEnvironment, PinnedVersion};
use crate::error::ConfigError;
use crate::registry::{DEFAULT_INDEX_URL, DEFAULT_TIMEOUT, MAX_RETRIES};
use crate::update::UpdateFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up next to the manifest
pub const CONFIG_FILE: &str = "pinreq.toml";

/// Default number of concurrent index lookups
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Parse duration string in format: Nd (days), Nw (weeks), Nm (months)
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration {
        value: s.to_string(),
    };
    let trimmed = s.trim();

    let (num_str, days_per_unit) = if let Some(n) = trimmed.strip_suffix('d') {
        (n, 1)
    } else if let Some(n) = trimmed.strip_suffix('w') {
        (n, 7)
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 30) // months are 30 days
    } else {
        return Err(invalid());
    };

    let num: u64 = num_str.parse().map_err(|_| invalid())?;
    let seconds = num
        .checked_mul(days_per_unit * 24 * 60 * 60)
        .ok_or_else(invalid)?;

    Ok(Duration::from_secs(seconds))
}

/// External tool that installs the manifest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Installer {
    #[default]
    Pip,
    Uv,
}

impl std::fmt::Display for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Installer::Pip => write!(f, "pip"),
            Installer::Uv => write!(f, "uv"),
        }
    }
}

/// `[upgrade]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpgradeConfig {
    pub min_age: Option<String>,
    pub exclude: Vec<String>,
    pub only: Vec<String>,
    pub allow_prerelease: bool,
}

/// Raw contents of `pinreq.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub index_url: Option<String>,
    pub python_version: Option<String>,
    pub sys_platform: Option<String>,
    pub platform_system: Option<String>,
    pub os_name: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub installer: Option<Installer>,
    pub upgrade: UpgradeConfig,
}

impl ConfigFile {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Load the explicit config, else `pinreq.toml` beside the manifest, else defaults
    pub fn discover(explicit: Option<&Path>, manifest: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = Self::default_path(manifest);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn default_path(manifest: &Path) -> PathBuf {
        match manifest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(CONFIG_FILE),
            _ => PathBuf::from(CONFIG_FILE),
        }
    }
}

/// Values given on the command line (or through their environment variables)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub index_url: Option<String>,
    pub python_version: Option<String>,
    pub installer: Option<Installer>,
}

/// Effective settings after layering
#[derive(Debug, Clone)]
pub struct Settings {
    pub index_url: String,
    /// Target interpreter, when known
    pub python_version: Option<PinnedVersion>,
    /// Environment markers are evaluated against
    pub target: MarkerEnvironment,
    pub concurrency: usize,
    pub timeout: Duration,
    pub max_retries: u32,
    pub installer: Installer,
    /// Upgrade filter from the `[upgrade]` table
    pub upgrade: UpdateFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            python_version: None,
            target: MarkerEnvironment::default(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            max_retries: MAX_RETRIES,
            installer: Installer::default(),
            upgrade: UpdateFilter::default(),
        }
    }
}

impl Settings {
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let python_version = overrides
            .python_version
            .or(file.python_version)
            .map(|v| parse_python_version(&v))
            .transpose()?;

        let target = MarkerEnvironment {
            python_version: python_version.as_ref().map(|v| {
                format!("{}.{}", v.segment(0), v.segment(1))
            }),
            // `3.11` says nothing about the micro version, so leave it unknown
            python_full_version: python_version
                .as_ref()
                .filter(|v| v.release().len() >= 3)
                .map(|v| v.to_string()),
            sys_platform: file.sys_platform,
            platform_system: file.platform_system,
            os_name: file.os_name,
            extras: Vec::new(),
        };

        if let Some(name) = file.upgrade.only.iter().find(|n| {
            let n = normalize_name(n);
            file.upgrade.exclude.iter().any(|e| normalize_name(e) == n)
        }) {
            return Err(ConfigError::ConflictingOptions {
                message: format!("'{}' is in both upgrade.only and upgrade.exclude", name),
            });
        }

        let mut upgrade = UpdateFilter::new()
            .with_exclude(file.upgrade.exclude)
            .with_only(file.upgrade.only)
            .with_prerelease(file.upgrade.allow_prerelease);
        if let Some(age) = file.upgrade.min_age {
            upgrade = upgrade.with_min_age(parse_duration(&age)?);
        }

        Ok(Self {
            index_url: overrides
                .index_url
                .or(file.index_url)
                .unwrap_or(defaults.index_url),
            python_version,
            target,
            concurrency: file.concurrency.unwrap_or(defaults.concurrency).max(1),
            timeout: file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: file.max_retries.unwrap_or(defaults.max_retries),
            installer: overrides
                .installer
                .or(file.installer)
                .unwrap_or(defaults.installer),
            upgrade,
        })
    }
}

/// `3.11` or `3.11.4`; pre-release interpreters are accepted, local labels are not
pub fn parse_python_version(value: &str) -> Result<PinnedVersion, ConfigError> {
    let invalid = || ConfigError::InvalidPythonVersion {
        value: value.to_string(),
    };
    let version = PinnedVersion::parse(value).ok_or_else(invalid)?;
    if version.release().len() < 2 || version.local().is_some() || version.epoch() != 0 {
        return Err(invalid());
    }
    Ok(version)
}
