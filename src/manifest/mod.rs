//! Requirements manifest parsing, validation and editing
//!
//! This module provides functionality to:
//! - Parse `requirements.txt` into a lossless line model
//! - Validate it and report every problem with its line number
//! - Render it unchanged or in canonical layout
//! - Edit pins in place and write the result back

mod check;
mod document;
mod parser;
mod writer;

pub use check::{check, CheckReport, Diagnostic, Severity};
pub use document::Manifest;
pub use parser::{parse_declaration, Line, LineKind};
pub use writer::{read_manifest, write_manifest, ManifestWriter, WriteResult};

use crate::error::ManifestError;
use std::path::{Path, PathBuf};

/// File name looked up when a directory is given
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Resolve a user-supplied path: a directory means its `requirements.txt`
pub fn locate_manifest(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_MANIFEST)
    } else {
        path.to_path_buf()
    }
}

/// Read and strictly parse the manifest at `path`
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = read_manifest(path)?;
    Manifest::parse(&content)
}
