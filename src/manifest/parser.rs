//! Line-oriented requirements parser
//!
//! Handles line formats:
//! - Declaration: `name==version`, `name[extra]==version; marker`
//! - Trailing comment: `xlrd==2.0.1  # Legacy Excel support`
//! - Section header / comment: `# Visualization`
//! - Directive: `-r base.txt`, `--index-url ...` (kept, not processed)
//! - Blank line

use crate::domain::{Category, Declaration, Marker, PinnedVersion};
use crate::error::ManifestError;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<spec>[^;]*?)\s*(?:;\s*(?P<marker>.*?))?\s*$",
    )
    .unwrap()
});

/// What a manifest line contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Full-line comment, text after `#` trimmed
    Comment(String),
    /// pip option line such as `-r other.txt`
    Directive(String),
    Declaration {
        declaration: Declaration,
        /// Byte range of the version text inside the raw line
        version_span: Range<usize>,
    },
}

/// A single manifest line with its original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number
    pub number: usize,
    /// Original text without the line terminator (a trailing `\r` is kept)
    pub raw: String,
    pub kind: LineKind,
}

impl Line {
    pub fn declaration(&self) -> Option<&Declaration> {
        match self.kind {
            LineKind::Declaration {
                ref declaration, ..
            } => Some(declaration),
            _ => None,
        }
    }
}

/// Returns true if a full-line comment starts a new section
///
/// Commented-out declarations (`# numpy==1.26.2`) are not headers.
pub fn is_section_header(text: &str) -> bool {
    !text.is_empty() && !text.contains("==")
}

/// Split content into lines, reporting whether it ended with a newline
pub fn split_lines(content: &str) -> (Vec<&str>, bool) {
    if content.is_empty() {
        return (Vec::new(), false);
    }
    match content.strip_suffix('\n') {
        Some(body) => (body.split('\n').collect(), true),
        None => (content.split('\n').collect(), false),
    }
}

/// Byte offset of an inline comment: a `#` at the start or after whitespace
fn comment_start(text: &str) -> Option<usize> {
    text.char_indices()
        .find(|&(idx, c)| {
            c == '#' && (idx == 0 || text[..idx].ends_with(char::is_whitespace))
        })
        .map(|(idx, _)| idx)
}

/// Parse one line. `category` is the section the line sits in.
pub fn parse_line(
    number: usize,
    raw: &str,
    category: Option<&Category>,
) -> Result<LineKind, ManifestError> {
    let text = raw.strip_suffix('\r').unwrap_or(raw);
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(LineKind::Blank);
    }
    if let Some(rest) = trimmed.strip_prefix('#') {
        return Ok(LineKind::Comment(rest.trim().to_string()));
    }
    if trimmed.starts_with('-') {
        return Ok(LineKind::Directive(trimmed.to_string()));
    }

    let (body, comment) = match comment_start(text) {
        Some(idx) => {
            let comment = text[idx + 1..].trim();
            (
                &text[..idx],
                (!comment.is_empty()).then(|| comment.to_string()),
            )
        }
        None => (text, None),
    };

    let caps = DECLARATION_RE.captures(body).ok_or_else(|| {
        ManifestError::invalid_line(number, trimmed, "expected <name>==<version>")
    })?;

    let name = caps
        .name("name")
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ManifestError::invalid_line(number, trimmed, "missing package name"))?;

    let extras = caps
        .name("extras")
        .map(|m| {
            m.as_str()
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let marker = match caps.name("marker").map(|m| m.as_str()) {
        Some(text) if !text.is_empty() => {
            if Marker::parse(text).is_none() {
                return Err(ManifestError::invalid_line(
                    number,
                    trimmed,
                    format!("invalid environment marker '{}'", text),
                ));
            }
            Some(text.to_string())
        }
        _ => None,
    };

    let Some(spec) = caps.name("spec") else {
        return Err(ManifestError::unpinned(number, name, ""));
    };
    let spec_text = spec.as_str();

    let after = match spec_text.strip_prefix("==") {
        Some(after) if !after.starts_with('=') => after,
        _ => return Err(ManifestError::unpinned(number, name, spec_text)),
    };
    let version_text = after.trim_start();

    if version_text.contains([',', '*']) {
        return Err(ManifestError::unpinned(number, name, spec_text));
    }

    let version = PinnedVersion::parse(version_text)
        .ok_or_else(|| ManifestError::invalid_version(number, &name, version_text))?;

    let start = spec.start() + 2 + (after.len() - version_text.len());
    let version_span = start..start + version_text.len();

    let declaration = Declaration {
        name,
        extras,
        version,
        marker,
        category: category.cloned(),
        comment,
        line: number,
    };

    Ok(LineKind::Declaration {
        declaration,
        version_span,
    })
}

/// Parse a single `name==version` requirement given outside a file
pub fn parse_declaration(text: &str) -> Result<Declaration, ManifestError> {
    match parse_line(1, text, None)? {
        LineKind::Declaration { declaration, .. } => Ok(declaration),
        _ => Err(ManifestError::invalid_line(
            1,
            text.trim(),
            "expected <name>==<version>",
        )),
    }
}

/// Parse every line, keeping per-line failures instead of stopping
pub fn parse_lines(content: &str) -> (Vec<Result<Line, ManifestError>>, bool) {
    let (raw_lines, trailing_newline) = split_lines(content);
    let mut current: Option<Category> = None;
    let mut lines = Vec::with_capacity(raw_lines.len());

    for (idx, raw) in raw_lines.into_iter().enumerate() {
        let number = idx + 1;
        let parsed = parse_line(number, raw, current.as_ref());

        if let Ok(LineKind::Comment(ref text)) = parsed {
            if is_section_header(text) {
                current = Some(Category::from_header(text));
            }
        }

        lines.push(parsed.map(|kind| Line {
            number,
            raw: raw.to_string(),
            kind,
        }));
    }

    (lines, trailing_newline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(line: &str) -> (Declaration, Range<usize>) {
        match parse_line(1, line, None).unwrap() {
            LineKind::Declaration {
                declaration,
                version_span,
            } => (declaration, version_span),
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_plain_declaration() {
        let (decl, span) = declaration("openpyxl==3.1.2");
        assert_eq!(decl.name, "openpyxl");
        assert_eq!(decl.version(), "3.1.2");
        assert!(decl.comment.is_none());
        assert_eq!(&"openpyxl==3.1.2"[span], "3.1.2");
    }

    #[test]
    fn test_parse_trailing_comment() {
        let line = "xlrd==2.0.1  # Legacy Excel support";
        let (decl, span) = declaration(line);
        assert_eq!(decl.name, "xlrd");
        assert_eq!(decl.version(), "2.0.1");
        assert_eq!(decl.comment.as_deref(), Some("Legacy Excel support"));
        assert_eq!(&line[span], "2.0.1");
    }

    #[test]
    fn test_parse_spaces_around_operator() {
        let line = "  pandas == 2.1.4 ";
        let (decl, span) = declaration(line);
        assert_eq!(decl.version(), "2.1.4");
        assert_eq!(&line[span], "2.1.4");
    }

    #[test]
    fn test_parse_post_release() {
        let (decl, _) = declaration("pytz==2023.3.post1");
        assert_eq!(decl.version(), "2023.3.post1");
    }

    #[test]
    fn test_parse_extras_and_marker() {
        let line = "pandas[excel,plot]==2.1.4 ; python_version >= \"3.9\"  # extras";
        let (decl, span) = declaration(line);
        assert_eq!(decl.extras, vec!["excel", "plot"]);
        assert_eq!(decl.marker.as_deref(), Some("python_version >= \"3.9\""));
        assert_eq!(decl.comment.as_deref(), Some("extras"));
        assert_eq!(&line[span], "2.1.4");
    }

    #[test]
    fn test_hash_inside_word_is_not_a_comment() {
        assert!(comment_start("name==1.0#frag").is_none());
        assert_eq!(comment_start("name==1.0 #c"), Some(10));
    }

    #[test]
    fn test_parse_blank_comment_directive() {
        assert_eq!(parse_line(1, "   ", None).unwrap(), LineKind::Blank);
        assert_eq!(
            parse_line(1, "# Core dependencies", None).unwrap(),
            LineKind::Comment("Core dependencies".to_string())
        );
        assert_eq!(
            parse_line(1, "-r base.txt", None).unwrap(),
            LineKind::Directive("-r base.txt".to_string())
        );
    }

    #[test]
    fn test_parse_crlf() {
        let (decl, span) = declaration("numpy==1.26.2\r");
        assert_eq!(decl.version(), "1.26.2");
        assert_eq!(span, 7..13);
    }

    #[test]
    fn test_parse_unpinned_specs() {
        for line in [
            "pandas>=2.0",
            "pandas~=2.1",
            "pandas",
            "pandas==2.*",
            "pandas==2.1,<3",
            "pandas===2.1.4",
            "pandas!=2.0",
        ] {
            let err = parse_line(4, line, None).unwrap_err();
            assert_eq!(err.code(), "unpinned", "line: {}", line);
            assert_eq!(err.line(), Some(4));
        }
    }

    #[test]
    fn test_parse_invalid_version() {
        let err = parse_line(2, "pandas==latest", None).unwrap_err();
        assert_eq!(
            err,
            ManifestError::invalid_version(2, "pandas", "latest")
        );
    }

    #[test]
    fn test_parse_invalid_line() {
        let err = parse_line(3, "!!! not a requirement", None).unwrap_err();
        assert_eq!(err.code(), "invalid-line");
    }

    #[test]
    fn test_parse_invalid_marker() {
        let err = parse_line(3, "numpy==1.26.2; python_version <", None).unwrap_err();
        assert_eq!(err.code(), "invalid-line");
    }

    #[test]
    fn test_category_is_attached() {
        let kind = parse_line(2, "plotly==5.18.0", Some(&Category::Visualization)).unwrap();
        if let LineKind::Declaration { declaration, .. } = kind {
            assert_eq!(declaration.category, Some(Category::Visualization));
            assert_eq!(declaration.line, 2);
        } else {
            panic!("expected declaration");
        }
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines(""), (vec![], false));
        assert_eq!(split_lines("a\nb\n"), (vec!["a", "b"], true));
        assert_eq!(split_lines("a\nb"), (vec!["a", "b"], false));
        assert_eq!(split_lines("a\n\n"), (vec!["a", ""], true));
    }

    #[test]
    fn test_parse_lines_tracks_sections() {
        let content = "# Core\npandas==2.1.4\n\n# Visualization\nplotly==5.18.0\n# numpy==1.0\nseaborn==0.13.0\n";
        let (lines, trailing) = parse_lines(content);
        assert!(trailing);
        let categories: Vec<_> = lines
            .iter()
            .filter_map(|l| l.as_ref().ok())
            .filter_map(|l| l.declaration())
            .map(|d| d.category.clone())
            .collect();
        assert_eq!(
            categories,
            vec![
                Some(Category::Core),
                Some(Category::Visualization),
                Some(Category::Visualization)
            ]
        );
    }

    #[test]
    fn test_parse_declaration() {
        let declaration = parse_declaration("Colour==0.1.5  # named colors").unwrap();
        assert_eq!(declaration.name, "Colour");
        assert_eq!(declaration.version(), "0.1.5");
        assert_eq!(declaration.comment.as_deref(), Some("named colors"));

        assert!(matches!(
            parse_declaration("# Styling"),
            Err(ManifestError::InvalidLine { .. })
        ));
        assert!(matches!(
            parse_declaration("colour>=0.1"),
            Err(ManifestError::UnpinnedVersion { .. })
        ));
    }

    #[test]
    fn test_is_section_header() {
        assert!(is_section_header("Styling"));
        assert!(!is_section_header(""));
        assert!(!is_section_header("numpy==1.26.2"));
    }
}
