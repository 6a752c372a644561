//! Local filesystem feeds
//!
//! A local feed is a directory holding `index.yaml` (or one subdirectory per
//! package with a `package.yaml` manifest). Download URLs are resolved
//! relative to the feed root unless they are `file://` URIs.

use async_trait::async_trait;
use pkgscout_core::Package;
use std::path::{Component, Path, PathBuf};
use url::Url;

use crate::error::{RepoError, Result};
use crate::index::FeedIndex;
use crate::request::Request;
use crate::resource::{ArchiveSource, FeedResources};

/// Archives read straight from the feed directory
#[derive(Debug, Clone)]
pub struct LocalArchives {
    root: PathBuf,
}

impl LocalArchives {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a download URL onto a path under the feed root
    ///
    /// `file://` URIs and absolute paths must already point inside the root;
    /// relative paths may not climb out of it.
    fn resolve_path(&self, url: &str) -> Option<PathBuf> {
        let path = if url.starts_with("file://") {
            Url::parse(url).ok()?.to_file_path().ok()?
        } else {
            let path = Path::new(url);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root.join(path)
            }
        };

        let climbs = path
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if climbs || !path.starts_with(&self.root) {
            return None;
        }
        Some(path)
    }
}

#[async_trait]
impl ArchiveSource for LocalArchives {
    async fn fetch(&self, package: &Package, url: &str, request: &dyn Request) -> Result<Vec<u8>> {
        let outside_root = || RepoError::InvalidArgument {
            message: format!(
                "download URL '{}' of {}@{} points outside the feed at {}",
                url,
                package.id,
                package.version,
                self.root.display()
            ),
        };
        let not_found = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RepoError::ArchiveNotFound {
                    id: package.id.clone(),
                    version: package.version.to_string(),
                    source_location: self.root.display().to_string(),
                }
            } else {
                e.into()
            }
        };

        let path = self.resolve_path(url).ok_or_else(outside_root)?;

        // Symlinks inside the feed may still lead elsewhere
        let root = tokio::fs::canonicalize(&self.root).await?;
        let real = tokio::fs::canonicalize(&path).await.map_err(not_found)?;
        if !real.starts_with(&root) {
            return Err(outside_root());
        }

        request.debug(&format!("LocalArchives: reading {}", real.display()));
        tokio::fs::read(&real).await.map_err(not_found)
    }
}

/// Load the feed at a validated `file://` location
pub async fn resolve(location: &Url, request: &dyn Request) -> Result<FeedResources<LocalArchives>> {
    let root = location
        .to_file_path()
        .map_err(|_| RepoError::InvalidSource {
            location: location.to_string(),
        })?;

    request.debug(&format!("LocalFeed: loading index from {}", root.display()));
    let index = FeedIndex::load_dir(&root)?;
    tracing::debug!(
        "Loaded local feed {} with {} package id(s)",
        root.display(),
        index.entries.len()
    );

    Ok(FeedResources::new(
        location.as_str(),
        index,
        LocalArchives::new(root),
    ))
}
