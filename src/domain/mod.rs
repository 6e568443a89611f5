//! Core domain models for pinreq
//!
//! This module contains the fundamental types used throughout the application:
//! - Declarations and the categories they are grouped into
//! - PEP 440 versions and specifiers
//! - PEP 508 requirements and environment markers
//! - Upgrade decision results and summaries

mod category;
mod declaration;
mod requirement;
mod specifier;
mod summary;
mod update_result;
mod version;

pub use category::Category;
pub use declaration::{normalize_name, Declaration};
pub use requirement::{Marker, MarkerEnvironment, Requirement};
pub use specifier::{Operator, Specifier, SpecifierSet};
pub use summary::UpgradeSummary;
pub use update_result::{SkipReason, UpdateResult};
pub use version::{PinnedVersion, PreRelease};
