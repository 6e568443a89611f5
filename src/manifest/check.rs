//! Manifest validation that reports every problem at once

use super::parser::{parse_lines, LineKind};
use crate::error::ManifestError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding about a manifest line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    fn error(error: &ManifestError) -> Self {
        Self {
            line: error.line().unwrap_or(0),
            severity: Severity::Error,
            code: error.code(),
            message: error.to_string(),
        }
    }

    fn warning(line: usize, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

/// Outcome of `check`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Number of valid declarations
    pub declarations: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    /// True when there are no errors (warnings are allowed)
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// Validate manifest content, collecting diagnostics in line order
pub fn check(content: &str) -> CheckReport {
    let (lines, _) = parse_lines(content);
    let mut report = CheckReport::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for line in lines {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                report.diagnostics.push(Diagnostic::error(&e));
                continue;
            }
        };

        match line.kind {
            LineKind::Declaration {
                ref declaration, ..
            } => {
                let key = declaration.normalized_name();
                match seen.get(&key) {
                    Some(&first_line) => {
                        let err = ManifestError::DuplicateName {
                            name: declaration.name.clone(),
                            first_line,
                            line: line.number,
                        };
                        report.diagnostics.push(Diagnostic::error(&err));
                    }
                    None => {
                        seen.insert(key, line.number);
                        report.declarations += 1;
                    }
                }
            }
            LineKind::Directive(ref text) => {
                report.diagnostics.push(Diagnostic::warning(
                    line.number,
                    "directive",
                    format!("line {}: directive '{}' is kept but not processed", line.number, text),
                ));
            }
            LineKind::Blank | LineKind::Comment(_) => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_clean_manifest() {
        let report = check("# Core\npandas==2.1.4\nnumpy==1.26.2\n");
        assert!(report.is_ok());
        assert_eq!(report.declarations, 2);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_check_collects_every_error() {
        let content = "pandas>=2.0\nnumpy==1.26.2\nnumpy==1.26.3\n???\nxlrd==abc\n";
        let report = check(content);
        assert!(!report.is_ok());
        let found: Vec<_> = report.errors().map(|d| (d.line, d.code)).collect();
        assert_eq!(
            found,
            vec![
                (1, "unpinned"),
                (3, "duplicate"),
                (4, "invalid-line"),
                (5, "invalid-version"),
            ]
        );
        assert_eq!(report.declarations, 1);
    }

    #[test]
    fn test_check_directive_is_warning() {
        let report = check("-r base.txt\npandas==2.1.4\n");
        assert!(report.is_ok());
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 1);
        assert_eq!(warnings[0].code, "directive");
    }

    #[test]
    fn test_serialize_report() {
        let report = check("pandas\n");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["declarations"], 0);
        assert_eq!(json["diagnostics"][0]["severity"], "error");
        assert_eq!(json["diagnostics"][0]["code"], "unpinned");
    }
}
