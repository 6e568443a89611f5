//! Package index access
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - The `PackageIndex` trait used by the resolver and the upgrader
//! - PyPI JSON API adapter
//! - Bounded concurrent lookups

mod client;
mod pypi;

pub use client::{HttpClient, DEFAULT_TIMEOUT, MAX_RETRIES};
pub use pypi::{PyPIAdapter, DEFAULT_INDEX_URL};

use crate::domain::PinnedVersion;
use crate::error::IndexError;
use crate::update::VersionInfo;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Metadata of one exact release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseMetadata {
    /// Project name as the index spells it
    pub name: String,
    pub version: String,
    /// PEP 508 requirement strings of the release
    pub requires_dist: Vec<String>,
    /// PEP 440 specifier for supported interpreters
    pub requires_python: Option<String>,
    pub yanked: bool,
    pub yanked_reason: Option<String>,
}

/// A source of release information
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Human readable name used in messages
    fn index_name(&self) -> &str;

    /// Fetch metadata for exactly `package==version`
    async fn fetch_release(
        &self,
        package: &str,
        version: &PinnedVersion,
    ) -> Result<ReleaseMetadata, IndexError>;

    /// Fetch every released version of `package`, oldest first
    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, IndexError>;
}

/// Run one index lookup per item, at most `concurrency` at a time
///
/// Results come back in input order. `on_done` is called as each lookup
/// finishes, in completion order.
pub async fn fetch_all<I, T, F, Fut>(
    items: Vec<I>,
    concurrency: usize,
    fetch: F,
    mut on_done: impl FnMut(),
) -> Vec<Result<T, IndexError>>
where
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, IndexError>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let total = items.len();

    for (idx, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let lookup = fetch(item);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (idx, lookup.await)
        });
    }

    let mut results: Vec<Option<Result<T, IndexError>>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        on_done();
        match joined {
            Ok((idx, result)) => results[idx] = Some(result),
            Err(e) => warn!("index lookup task failed: {}", e),
        }
    }

    results
        .into_iter()
        .map(|r| r.unwrap_or_else(|| Err(IndexError::network("", "index", "lookup task failed"))))
        .collect()
}
