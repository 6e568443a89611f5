//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with reading, parsing or editing the manifest
//! - IndexError: Issues with package index communication
//! - ResolutionError: Outcome of resolving the manifest against an index
//! - ConfigError: Issues with CLI or `pinreq.toml` configuration

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package index related errors
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Resolution failed
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest files and their declarations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// Line is not a comment, directive or `name==version` declaration
    #[error("line {line}: cannot parse '{content}': {message}")]
    InvalidLine {
        line: usize,
        content: String,
        message: String,
    },

    /// Declaration does not pin an exact version
    #[error("line {line}: '{name}' is not pinned to an exact version (found '{spec}')")]
    UnpinnedVersion {
        line: usize,
        name: String,
        spec: String,
    },

    /// Version text is not a valid PEP 440 version
    #[error("line {line}: '{version}' is not a valid version for '{name}'")]
    InvalidVersion {
        line: usize,
        name: String,
        version: String,
    },

    /// The same package is declared twice
    #[error("line {line}: duplicate declaration of '{name}' (first declared on line {first_line})")]
    DuplicateName {
        name: String,
        first_line: usize,
        line: usize,
    },

    /// Adding a package that is already declared
    #[error("'{name}' is already declared on line {line}")]
    AlreadyDeclared { name: String, line: usize },

    /// Editing a package that is not declared
    #[error("'{name}' is not declared in the manifest")]
    UnknownPackage { name: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a new InvalidLine error
    pub fn invalid_line(
        line: usize,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidLine {
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnpinnedVersion error
    pub fn unpinned(line: usize, name: impl Into<String>, spec: impl Into<String>) -> Self {
        ManifestError::UnpinnedVersion {
            line,
            name: name.into(),
            spec: spec.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(
        line: usize,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidVersion {
            line,
            name: name.into(),
            version: version.into(),
        }
    }

    /// Short machine-readable code used in check reports
    pub fn code(&self) -> &'static str {
        match self {
            ManifestError::NotFound { .. } => "not-found",
            ManifestError::ReadError { .. } => "read-error",
            ManifestError::WriteError { .. } => "write-error",
            ManifestError::InvalidLine { .. } => "invalid-line",
            ManifestError::UnpinnedVersion { .. } => "unpinned",
            ManifestError::InvalidVersion { .. } => "invalid-version",
            ManifestError::DuplicateName { .. } => "duplicate",
            ManifestError::AlreadyDeclared { .. } => "already-declared",
            ManifestError::UnknownPackage { .. } => "unknown-package",
        }
    }

    /// The 1-based line this error points at, when it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            ManifestError::InvalidLine { line, .. }
            | ManifestError::UnpinnedVersion { line, .. }
            | ManifestError::InvalidVersion { line, .. }
            | ManifestError::DuplicateName { line, .. }
            | ManifestError::AlreadyDeclared { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Errors related to package index communication
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Package or release not found in the index
    #[error("'{package}' not found in {index}")]
    NotFound { package: String, index: String },

    /// Network request failed
    #[error("failed to fetch '{package}' from {index}: {message}")]
    Network {
        package: String,
        index: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {index}")]
    RateLimited { index: String },

    /// Timeout
    #[error("timeout while fetching '{package}' from {index}")]
    Timeout { package: String, index: String },

    /// Invalid response from the index
    #[error("invalid response from {index} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        index: String,
        message: String,
    },
}

impl IndexError {
    /// Creates a new NotFound error
    pub fn not_found(package: impl Into<String>, index: impl Into<String>) -> Self {
        IndexError::NotFound {
            package: package.into(),
            index: index.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(
        package: impl Into<String>,
        index: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        IndexError::Network {
            package: package.into(),
            index: index.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, index: impl Into<String>) -> Self {
        IndexError::Timeout {
            package: package.into(),
            index: index.into(),
        }
    }
}

/// A single reason the manifest cannot be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The declared name has no release matching the pinned version
    #[error("no release of '{package}' matches =={version} in the package index")]
    PackageNotFound { package: String, version: String },

    /// A declared package requires a version another declaration does not satisfy
    #[error("'{required_by}' requires {requirement}, but {package} is pinned to {pinned}")]
    VersionConflict {
        package: String,
        pinned: String,
        requirement: String,
        required_by: String,
    },

    /// The index could not be reached or answered unusably
    #[error("package index unavailable while resolving '{package}': {message}")]
    IndexUnavailable { package: String, message: String },
}

impl ResolutionError {
    /// Map an index failure for `package==version` into the resolution taxonomy
    pub fn from_index(error: IndexError, package: &str, version: &str) -> Self {
        match error {
            IndexError::NotFound { .. } => ResolutionError::PackageNotFound {
                package: package.to_string(),
                version: version.to_string(),
            },
            other => ResolutionError::IndexUnavailable {
                package: package.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionError::PackageNotFound { .. } => "package_not_found",
            ResolutionError::VersionConflict { .. } => "version_conflict",
            ResolutionError::IndexUnavailable { .. } => "index_unavailable",
        }
    }
}

/// Every resolution error found in one pass over the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    pub errors: Vec<ResolutionError>,
}

impl ResolutionFailure {
    pub fn new(errors: Vec<ResolutionError>) -> Self {
        Self { errors }
    }

    /// Returns true if the index could not be queried for at least one package
    pub fn index_unavailable(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, ResolutionError::IndexUnavailable { .. }))
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [only] => write!(f, "resolution failed: {}", only),
            errors => {
                write!(f, "resolution failed with {} errors", errors.len())?;
                for error in errors {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ResolutionFailure {}

/// Errors related to configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid duration format
    #[error("invalid duration format '{value}': expected format like '2w', '10d', '1m'")]
    InvalidDuration { value: String },

    /// Failed to read the config file
    #[error("failed to read config file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to parse the config file
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Invalid target python version
    #[error("invalid python version '{value}'")]
    InvalidPythonVersion { value: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}
