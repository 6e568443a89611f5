//! Dependency declaration structures

use super::{Category, PinnedVersion};
use serde::Serialize;
use std::fmt;

/// PEP 503 name normalization: lowercase, runs of `-`, `_`, `.` become one `-`
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    normalized
}

/// One `name==version` line of the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Package name as written
    pub name: String,
    /// Extras requested with `name[extra]`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    /// The pinned version
    pub version: PinnedVersion,
    /// Environment marker after `;`, kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Group derived from the nearest header comment above
    pub category: Option<Category>,
    /// Trailing `# ...` annotation
    pub comment: Option<String>,
    /// 1-based line number in the manifest
    pub line: usize,
}

impl Declaration {
    /// Creates a new declaration without category, comment or position
    pub fn new(name: impl Into<String>, version: PinnedVersion) -> Self {
        Self {
            name: name.into(),
            extras: Vec::new(),
            version,
            marker: None,
            category: None,
            comment: None,
            line: 0,
        }
    }

    /// Sets the category (builder pattern)
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the trailing comment (builder pattern)
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// PEP 503 normalized name used for uniqueness checks and index lookups
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Returns the pinned version string
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// `name[extras]==version; marker`, without the comment
    pub fn requirement(&self) -> String {
        let mut text = self.name.clone();
        if !self.extras.is_empty() {
            text.push('[');
            text.push_str(&self.extras.join(","));
            text.push(']');
        }
        text.push_str("==");
        text.push_str(self.version.as_str());
        if let Some(ref marker) = self.marker {
            text.push_str("; ");
            text.push_str(marker);
        }
        text
    }

    /// The requirement followed by the comment in canonical spacing
    pub fn canonical_line(&self) -> String {
        match self.comment {
            Some(ref comment) => format!("{}  # {}", self.requirement(), comment),
            None => self.requirement(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}
