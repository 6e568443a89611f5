//! PEP 440 version specifiers
//!
//! Used to check what declared packages require of each other
//! (`numpy<2,>=1.21`, `pandas>=1.2`, `~=3.1`, `!=3.6.1`, `==1.*`).

use super::PinnedVersion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(===|==|!=|~=|>=|<=|>|<)\s*(\S+)$").unwrap());

/// Comparison operator of a single specifier clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `===`, plain string equality
    Arbitrary,
    /// `==`, optionally with a trailing `.*`
    Equal,
    /// `!=`, optionally with a trailing `.*`
    NotEqual,
    /// `~=`, compatible release
    Compatible,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
}

impl Operator {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "===" => Operator::Arbitrary,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "~=" => Operator::Compatible,
            ">=" => Operator::GreaterOrEqual,
            "<=" => Operator::LessOrEqual,
            ">" => Operator::Greater,
            "<" => Operator::Less,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Arbitrary => "===",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Compatible => "~=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }
}

/// One clause such as `>=1.21`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    operator: Operator,
    raw_version: String,
    version: Option<PinnedVersion>,
    wildcard: bool,
}

impl Specifier {
    /// Parse a single clause, returning None if it is not a valid specifier
    pub fn parse(text: &str) -> Option<Self> {
        let caps = CLAUSE_RE.captures(text.trim())?;
        let operator = Operator::from_symbol(caps.get(1)?.as_str())?;
        let raw_version = caps.get(2)?.as_str().to_string();

        if operator == Operator::Arbitrary {
            return Some(Self {
                operator,
                raw_version,
                version: None,
                wildcard: false,
            });
        }

        let (base, wildcard) = match raw_version.strip_suffix(".*") {
            Some(base) => (base, true),
            None => (raw_version.as_str(), false),
        };

        // Wildcards are only meaningful for equality clauses
        if wildcard && !matches!(operator, Operator::Equal | Operator::NotEqual) {
            return None;
        }

        let version = PinnedVersion::parse(base)?;

        // `~=` needs at least two release segments
        if operator == Operator::Compatible && version.release().len() < 2 {
            return None;
        }

        Some(Self {
            operator,
            version: Some(version),
            raw_version,
            wildcard,
        })
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns true if `candidate` satisfies this clause
    ///
    /// Pre-releases are always accepted: a manifest pins them explicitly.
    pub fn contains(&self, candidate: &PinnedVersion) -> bool {
        let Some(ref spec) = self.version else {
            return candidate.as_str().eq_ignore_ascii_case(&self.raw_version);
        };

        match self.operator {
            Operator::Arbitrary => unreachable!("arbitrary clauses carry no parsed version"),
            Operator::Equal => self.equals(spec, candidate),
            Operator::NotEqual => !self.equals(spec, candidate),
            Operator::Compatible => {
                let prefix = &spec.release()[..spec.release().len() - 1];
                candidate >= spec && candidate.release_starts_with(spec.epoch(), prefix)
            }
            Operator::GreaterOrEqual => candidate >= spec,
            Operator::LessOrEqual => candidate <= spec,
            Operator::Greater => {
                // `>1.0` does not admit 1.0.post1
                candidate > spec
                    && !(candidate.is_postrelease()
                        && !spec.is_postrelease()
                        && candidate.same_release(spec))
            }
            Operator::Less => {
                // `<2.0` does not admit 2.0rc1
                candidate < spec
                    && !(candidate.is_prerelease()
                        && !spec.is_prerelease()
                        && candidate.same_release(spec))
            }
        }
    }

    fn equals(&self, spec: &PinnedVersion, candidate: &PinnedVersion) -> bool {
        if self.wildcard {
            return candidate.release_starts_with(spec.epoch(), spec.release());
        }
        if spec.local().is_none() {
            candidate.without_local() == *spec
        } else {
            candidate == spec
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.symbol(), self.raw_version)
    }
}

/// Comma-separated conjunction of clauses; empty means "any version"
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecifierSet {
    clauses: Vec<Specifier>,
}

impl SpecifierSet {
    /// Parse `>=1.21,<2` (surrounding parentheses allowed, as in older metadata)
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(trimmed)
            .trim();

        if trimmed.is_empty() {
            return Some(Self::default());
        }

        let clauses = trimmed
            .split(',')
            .map(Specifier::parse)
            .collect::<Option<Vec<_>>>()?;

        Some(Self { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Specifier] {
        &self.clauses
    }

    /// Returns true if `candidate` satisfies every clause
    pub fn contains(&self, candidate: &PinnedVersion) -> bool {
        self.clauses.iter().all(|clause| clause.contains(candidate))
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", rendered.join(","))
    }
}
