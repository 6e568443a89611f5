//! Purpose groups derived from section comments

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// What a group of declarations is for, taken from the header comment above it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Core data handling (`# Core dependencies`)
    Core,
    /// Plotting and charts
    Visualization,
    /// Spreadsheet reading and writing
    ExcelSupport,
    /// Encodings, dates, time zones
    FileHandling,
    /// Colors and themes
    Styling,
    /// Any other header, kept as a slug
    Other(String),
}

impl Category {
    /// The five groups the dashboard manifest uses
    pub fn known() -> &'static [Category] {
        &[
            Category::Core,
            Category::Visualization,
            Category::ExcelSupport,
            Category::FileHandling,
            Category::Styling,
        ]
    }

    /// Derive a category from header comment text (without the leading `#`)
    pub fn from_header(text: &str) -> Self {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect();

        let any = |prefixes: &[&str]| {
            words
                .iter()
                .any(|w| prefixes.iter().any(|p| w.starts_with(p)))
        };

        if any(&["excel", "spreadsheet", "xls"]) {
            Category::ExcelSupport
        } else if any(&["visual", "plot", "chart", "graph"]) {
            Category::Visualization
        } else if any(&["styl", "color", "colour", "theme"]) {
            Category::Styling
        } else if any(&["file", "encoding", "locale", "date", "time"]) {
            Category::FileHandling
        } else if any(&["core", "data", "essential", "base"]) {
            Category::Core
        } else {
            Category::Other(slugify(text))
        }
    }

    /// Kebab-case identifier used in output and on the command line
    pub fn slug(&self) -> &str {
        match self {
            Category::Core => "core",
            Category::Visualization => "visualization",
            Category::ExcelSupport => "excel-support",
            Category::FileHandling => "file-handling",
            Category::Styling => "styling",
            Category::Other(slug) => slug,
        }
    }

    /// Header comment text written when a new section is created
    pub fn header(&self) -> String {
        match self {
            Category::Core => "Core".to_string(),
            Category::Visualization => "Visualization".to_string(),
            Category::ExcelSupport => "Excel support".to_string(),
            Category::FileHandling => "File handling".to_string(),
            Category::Styling => "Styling".to_string(),
            Category::Other(slug) => {
                let text = slug.replace('-', " ");
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = slugify(s);
        if slug.is_empty() {
            return Err("category must not be empty".to_string());
        }
        // Anything else is read the way a header would be, so the section
        // written by `add` maps back to the same category
        Ok(Category::known()
            .iter()
            .find(|c| c.slug() == slug)
            .cloned()
            .unwrap_or_else(|| Category::from_header(s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}
