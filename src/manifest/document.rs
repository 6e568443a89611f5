//! Lossless manifest document
//!
//! Every line is kept with its raw text, so rendering an unmodified
//! manifest reproduces the input byte for byte. Edits touch only the
//! lines they concern.

use super::parser::{is_section_header, parse_lines, Line, LineKind};
use crate::domain::{normalize_name, Category, Declaration, PinnedVersion};
use crate::error::ManifestError;
use std::collections::{BTreeMap, HashMap};

/// A parsed requirements manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    lines: Vec<Line>,
    trailing_newline: bool,
}

impl Manifest {
    /// Parse manifest content, failing on the first invalid line or duplicate name
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let (parsed, trailing_newline) = parse_lines(content);
        let mut lines = Vec::with_capacity(parsed.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for line in parsed {
            let line = line?;
            if let Some(decl) = line.declaration() {
                if let Some(&first_line) = seen.get(&decl.normalized_name()) {
                    return Err(ManifestError::DuplicateName {
                        name: decl.name.clone(),
                        first_line,
                        line: line.number,
                    });
                }
                seen.insert(decl.normalized_name(), line.number);
            }
            lines.push(line);
        }

        Ok(Self {
            lines,
            trailing_newline,
        })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Declarations in file order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.lines.iter().filter_map(Line::declaration)
    }

    pub fn len(&self) -> usize {
        self.declarations().count()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations().next().is_none()
    }

    /// Look up a declaration by name (PEP 503 normalized comparison)
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        let wanted = normalize_name(name);
        self.declarations()
            .find(|d| d.normalized_name() == wanted)
    }

    /// Directive lines (`-r`, `--index-url`, ...) with their line numbers
    pub fn directives(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().filter_map(|line| match line.kind {
            LineKind::Directive(ref text) => Some((line.number, text.as_str())),
            _ => None,
        })
    }

    /// Declarations grouped by category, groups in order of first appearance
    pub fn groups(&self) -> Vec<(Option<Category>, Vec<&Declaration>)> {
        let mut groups: Vec<(Option<Category>, Vec<&Declaration>)> = Vec::new();
        for decl in self.declarations() {
            match groups.iter_mut().find(|(c, _)| *c == decl.category) {
                Some((_, members)) => members.push(decl),
                None => groups.push((decl.category.clone(), vec![decl])),
            }
        }
        groups
    }

    /// Normalized name to pinned version
    pub fn pairs(&self) -> BTreeMap<String, PinnedVersion> {
        self.declarations()
            .map(|d| (d.normalized_name(), d.version.clone()))
            .collect()
    }

    /// True if both manifests pin the same packages to the same versions
    pub fn equivalent(&self, other: &Manifest) -> bool {
        self.pairs() == other.pairs()
    }

    /// Original text, including any edits
    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(|l| l.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    /// Canonical layout used by `pinreq fmt`
    pub fn canonical(&self) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.lines.len());

        for line in &self.lines {
            match line.kind {
                LineKind::Blank => {
                    if out.last().is_some_and(|l| !l.is_empty()) {
                        out.push(String::new());
                    }
                }
                LineKind::Comment(ref text) if text.is_empty() => out.push("#".to_string()),
                LineKind::Comment(ref text) => out.push(format!("# {}", text)),
                LineKind::Directive(ref text) => out.push(text.clone()),
                LineKind::Declaration {
                    ref declaration, ..
                } => out.push(declaration.canonical_line()),
            }
        }

        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }

        if out.is_empty() {
            String::new()
        } else {
            let mut text = out.join("\n");
            text.push('\n');
            text
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.render() == self.canonical()
    }

    /// Replace the pinned version of `name`, returning the previous one
    pub fn set_version(
        &mut self,
        name: &str,
        version: &PinnedVersion,
    ) -> Result<PinnedVersion, ManifestError> {
        let idx = self.position(name)?;
        let line = &self.lines[idx];
        let LineKind::Declaration {
            ref declaration,
            ref version_span,
        } = line.kind
        else {
            return Err(self.unknown(name));
        };
        let previous = declaration.version.clone();

        let mut raw = line.raw.clone();
        raw.replace_range(version_span.clone(), version.as_str());

        let mut raws = self.raw_lines();
        raws[idx] = raw;
        self.reload(raws)?;
        Ok(previous)
    }

    /// Add a declaration to the end of its category section
    ///
    /// Without a category the line goes after the last non-blank line. A
    /// category with no section yet gets a new header at the end of the file.
    pub fn add(&mut self, declaration: &Declaration) -> Result<usize, ManifestError> {
        if let Some(existing) = self.get(&declaration.name) {
            return Err(ManifestError::AlreadyDeclared {
                name: existing.name.clone(),
                line: existing.line,
            });
        }

        let eol = self.line_suffix();
        let text = format!("{}{}", declaration.canonical_line(), eol);
        let mut raws = self.raw_lines();

        let anchor = declaration
            .category
            .as_ref()
            .and_then(|category| self.section_end(category));

        match (anchor, declaration.category.as_ref()) {
            (Some(idx), _) => raws.insert(idx + 1, text),
            (None, Some(category)) => {
                while raws.last().is_some_and(|r| r.trim().is_empty()) {
                    raws.pop();
                }
                if !raws.is_empty() {
                    raws.push(eol.to_string());
                }
                raws.push(format!("# {}{}", category.header(), eol));
                raws.push(text);
            }
            (None, None) => {
                let idx = raws
                    .iter()
                    .rposition(|r| !r.trim().is_empty())
                    .map_or(0, |i| i + 1);
                raws.insert(idx, text);
            }
        }

        if self.lines.is_empty() {
            self.trailing_newline = true;
        }
        self.reload(raws)?;

        self.get(&declaration.name)
            .map(|d| d.line)
            .ok_or_else(|| self.unknown(&declaration.name))
    }

    /// Remove the declaration for `name`
    pub fn remove(&mut self, name: &str) -> Result<Declaration, ManifestError> {
        let idx = self.position(name)?;
        let removed = self.lines[idx]
            .declaration()
            .cloned()
            .ok_or_else(|| self.unknown(name))?;

        let mut raws = self.raw_lines();
        raws.remove(idx);
        self.reload(raws)?;
        Ok(removed)
    }

    fn position(&self, name: &str) -> Result<usize, ManifestError> {
        let wanted = normalize_name(name);
        self.lines
            .iter()
            .position(|l| l.declaration().is_some_and(|d| d.normalized_name() == wanted))
            .ok_or_else(|| self.unknown(name))
    }

    fn unknown(&self, name: &str) -> ManifestError {
        ManifestError::UnknownPackage {
            name: name.to_string(),
        }
    }

    /// Index of the last line belonging to `category`: its last declaration,
    /// or the header itself when the section is still empty
    fn section_end(&self, category: &Category) -> Option<usize> {
        self.lines
            .iter()
            .rposition(|l| {
                l.declaration()
                    .is_some_and(|d| d.category.as_ref() == Some(category))
            })
            .or_else(|| {
                self.lines.iter().rposition(|l| match l.kind {
                    LineKind::Comment(ref text) => {
                        is_section_header(text) && Category::from_header(text) == *category
                    }
                    _ => false,
                })
            })
    }

    /// `\r` when the file uses CRLF line endings
    fn line_suffix(&self) -> &'static str {
        if self.lines.iter().any(|l| l.raw.ends_with('\r')) {
            "\r"
        } else {
            ""
        }
    }

    fn raw_lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.raw.clone()).collect()
    }

    fn reload(&mut self, raws: Vec<String>) -> Result<(), ManifestError> {
        let mut content = raws.join("\n");
        if self.trailing_newline {
            content.push('\n');
        }
        *self = Self::parse(&content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Core dependencies
streamlit==1.29.0
pandas==2.1.4

# Excel support
openpyxl==3.1.2
xlrd==2.0.1  # Legacy Excel support

# Styling
colour==0.1.5
";

    fn version(text: &str) -> PinnedVersion {
        PinnedVersion::parse(text).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.len(), 5);
        let xlrd = manifest.get("xlrd").unwrap();
        assert_eq!(xlrd.category, Some(Category::ExcelSupport));
        assert_eq!(xlrd.comment.as_deref(), Some("Legacy Excel support"));
        assert_eq!(xlrd.line, 7);
    }

    #[test]
    fn test_render_is_byte_identical() {
        for content in [
            SAMPLE,
            "a==1.0",
            "",
            "\n\n",
            "  pandas == 2.1.4   #  spaced  \r\nnumpy==1.26.2\r\n",
        ] {
            let manifest = Manifest::parse(content).unwrap();
            assert_eq!(manifest.render(), content);
        }
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Manifest::parse("pandas==2.1.4\nnumpy==1.26.2\npandas==2.0.0\n").unwrap_err();
        assert_eq!(
            err,
            ManifestError::DuplicateName {
                name: "pandas".to_string(),
                first_line: 1,
                line: 3,
            }
        );
    }

    #[test]
    fn test_duplicate_uses_normalized_names() {
        let err = Manifest::parse("python-dateutil==2.8.2\nPython_Dateutil==2.8.2\n").unwrap_err();
        assert_eq!(err.code(), "duplicate");
    }

    #[test]
    fn test_get_normalized() {
        let manifest = Manifest::parse("python-dateutil==2.8.2\n").unwrap();
        assert!(manifest.get("Python_Dateutil").is_some());
        assert!(manifest.get("dateutil").is_none());
    }

    #[test]
    fn test_groups_in_order() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        let groups = manifest.groups();
        let names: Vec<_> = groups.iter().map(|(c, m)| (c.clone(), m.len())).collect();
        assert_eq!(
            names,
            vec![
                (Some(Category::Core), 2),
                (Some(Category::ExcelSupport), 2),
                (Some(Category::Styling), 1),
            ]
        );
    }

    #[test]
    fn test_canonical() {
        let content = "\n#Core\npandas == 2.1.4   \n\n\n\nxlrd==2.0.1 #legacy\n-r base.txt\n\n";
        let manifest = Manifest::parse(content).unwrap();
        assert_eq!(
            manifest.canonical(),
            "# Core\npandas==2.1.4\n\nxlrd==2.0.1  # legacy\n-r base.txt\n"
        );
        assert!(!manifest.is_canonical());
        assert!(Manifest::parse(SAMPLE).unwrap().is_canonical());
    }

    #[test]
    fn test_canonical_preserves_pairs() {
        let manifest = Manifest::parse("b==2.0  # x\n\n\na==1.0\n").unwrap();
        let canonical = Manifest::parse(&manifest.canonical()).unwrap();
        assert!(manifest.equivalent(&canonical));
    }

    #[test]
    fn test_equivalent_ignores_order_and_comments() {
        let a = Manifest::parse("pandas==2.1.4\nnumpy==1.26.2\n").unwrap();
        let b = Manifest::parse("# data\nnumpy==1.26.2  # arrays\nPandas==2.1.4\n").unwrap();
        let c = Manifest::parse("pandas==2.1.4\nnumpy==1.26.3\n").unwrap();
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&c));
    }

    #[test]
    fn test_set_version_touches_only_version() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        let previous = manifest.set_version("xlrd", &version("2.0.2")).unwrap();
        assert_eq!(previous.as_str(), "2.0.1");
        assert_eq!(
            manifest.render(),
            SAMPLE.replace("xlrd==2.0.1", "xlrd==2.0.2")
        );
    }

    #[test]
    fn test_set_version_unknown() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        let err = manifest.set_version("numpy", &version("2.0.0")).unwrap_err();
        assert_eq!(err.code(), "unknown-package");
    }

    #[test]
    fn test_add_into_existing_section() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        let decl = Declaration::new("numpy", version("1.26.2")).with_category(Category::Core);
        let line = manifest.add(&decl).unwrap();
        assert_eq!(line, 4);
        assert!(manifest
            .render()
            .starts_with("# Core dependencies\nstreamlit==1.29.0\npandas==2.1.4\nnumpy==1.26.2\n\n"));
    }

    #[test]
    fn test_add_new_section() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        let decl = Declaration::new("plotly", version("5.18.0"))
            .with_category(Category::Visualization);
        manifest.add(&decl).unwrap();
        assert!(manifest
            .render()
            .ends_with("colour==0.1.5\n\n# Visualization\nplotly==5.18.0\n"));
        assert_eq!(
            manifest.get("plotly").unwrap().category,
            Some(Category::Visualization)
        );
    }

    #[test]
    fn test_add_with_keyword_category_reuses_section() {
        let mut manifest =
            Manifest::parse("# Visualization\nplotly==5.18.0\n\n# Styling\ncolour==0.1.5\n").unwrap();
        for (name, ver) in [("seaborn", "0.13.0"), ("matplotlib", "3.8.2")] {
            let category: Category = "plots".parse().unwrap();
            let decl = Declaration::new(name, version(ver)).with_category(category);
            manifest.add(&decl).unwrap();
        }

        let rendered = manifest.render();
        assert_eq!(rendered.matches("# ").count(), 2);
        assert!(rendered.starts_with(
            "# Visualization\nplotly==5.18.0\nseaborn==0.13.0\nmatplotlib==3.8.2\n\n# Styling"
        ));
        assert_eq!(
            manifest.get("seaborn").unwrap().category,
            Some(Category::Visualization)
        );
    }

    #[test]
    fn test_add_into_empty_section() {
        let mut manifest = Manifest::parse("# Styling\n\n# Core\npandas==2.1.4\n").unwrap();
        let decl = Declaration::new("colour", version("0.1.5")).with_category(Category::Styling);
        manifest.add(&decl).unwrap();
        assert_eq!(
            manifest.render(),
            "# Styling\ncolour==0.1.5\n\n# Core\npandas==2.1.4\n"
        );
    }

    #[test]
    fn test_add_without_category() {
        let mut manifest = Manifest::parse("pandas==2.1.4\n\n").unwrap();
        manifest
            .add(&Declaration::new("numpy", version("1.26.2")).with_comment("arrays"))
            .unwrap();
        assert_eq!(manifest.render(), "pandas==2.1.4\nnumpy==1.26.2  # arrays\n\n");
    }

    #[test]
    fn test_add_to_empty_manifest() {
        let mut manifest = Manifest::parse("").unwrap();
        manifest
            .add(&Declaration::new("pandas", version("2.1.4")))
            .unwrap();
        assert_eq!(manifest.render(), "pandas==2.1.4\n");
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        let err = manifest
            .add(&Declaration::new("Pandas", version("2.2.0")))
            .unwrap_err();
        assert_eq!(
            err,
            ManifestError::AlreadyDeclared {
                name: "pandas".to_string(),
                line: 3,
            }
        );
        assert_eq!(manifest.render(), SAMPLE);
    }

    #[test]
    fn test_add_keeps_crlf() {
        let mut manifest = Manifest::parse("# Core\r\npandas==2.1.4\r\n").unwrap();
        manifest
            .add(&Declaration::new("numpy", version("1.26.2")).with_category(Category::Core))
            .unwrap();
        assert_eq!(manifest.render(), "# Core\r\npandas==2.1.4\r\nnumpy==1.26.2\r\n");
    }

    #[test]
    fn test_remove() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        let removed = manifest.remove("XLRD").unwrap();
        assert_eq!(removed.version(), "2.0.1");
        assert!(manifest.get("xlrd").is_none());
        assert_eq!(manifest.len(), 4);
        assert_eq!(
            manifest.render(),
            SAMPLE.replace("xlrd==2.0.1  # Legacy Excel support\n", "")
        );
    }

    #[test]
    fn test_remove_unknown() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        assert!(manifest.remove("numpy").is_err());
    }

    #[test]
    fn test_directives() {
        let manifest = Manifest::parse("-r base.txt\npandas==2.1.4\n--index-url https://x\n").unwrap();
        let directives: Vec<_> = manifest.directives().collect();
        assert_eq!(directives, vec![(1, "-r base.txt"), (3, "--index-url https://x")]);
    }
}
