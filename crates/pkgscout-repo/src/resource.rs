//! Feed resources
//!
//! A resolved feed exposes three resources: packages (find by id), query
//! (term search) and files (download / install). Repositories only route to
//! them; everything a feed knows about its own protocol stays behind these
//! traits.

use async_trait::async_trait;
use pkgscout_core::search::filter::version_allowed;
use pkgscout_core::{Package, SearchContext, SearchResult};
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::archive::{extract_archive, install_dir, verify_package};
use crate::error::{RepoError, Result};
use crate::index::{FeedIndex, is_native};
use crate::request::{Request, ensure_active};

/// Find packages by id
#[async_trait]
pub trait PackagesResource: Send + Sync {
    /// `Ok(None)` means the feed produced no result container at all
    async fn find(&self, context: &SearchContext, request: &dyn Request)
    -> Result<Option<SearchResult>>;
}

/// Search packages by terms
#[async_trait]
pub trait QueryResource: Send + Sync {
    async fn search(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Option<SearchResult>>;
}

/// Fetch package archives
#[async_trait]
pub trait FilesResource: Send + Sync {
    /// Save the package archive to `destination`
    async fn download_package(
        &self,
        package: &Package,
        destination: &Path,
        request: &dyn Request,
    ) -> Result<bool>;

    /// Unpack the package under the request's install root
    async fn install_package(&self, package: &Package, request: &dyn Request) -> Result<bool>;
}

/// The resources of one resolved feed
pub trait ResourceCollection: Send + Sync {
    /// Feed location the resources were resolved from
    fn location(&self) -> &str;

    fn packages(&self) -> &dyn PackagesResource;

    fn query(&self) -> &dyn QueryResource;

    fn files(&self) -> &dyn FilesResource;
}

/// Resolve the resources for a validated location
pub async fn resolve_resources(
    location: &str,
    is_file: bool,
    request: &dyn Request,
) -> Result<Arc<dyn ResourceCollection>> {
    ensure_active(request)?;
    let url = Url::parse(location).map_err(|_| RepoError::InvalidSource {
        location: location.to_string(),
    })?;

    if is_file {
        let feed = crate::local::resolve(&url, request).await?;
        Ok(Arc::new(feed))
    } else {
        let feed = crate::http::resolve(&url, request).await?;
        Ok(Arc::new(feed))
    }
}

// ============ Index-backed packages & query ============

/// Packages and query resources answered from a loaded [`FeedIndex`]
#[derive(Debug, Clone)]
pub struct IndexFeed {
    index: Arc<FeedIndex>,
}

impl IndexFeed {
    pub fn new(index: FeedIndex) -> Self {
        Self {
            index: Arc::new(index),
        }
    }

    pub fn index(&self) -> &FeedIndex {
        &self.index
    }
}

fn prepare(package: &Package, context: &SearchContext) -> Package {
    let mut package = package.clone();
    if context.bypass_deep_metadata {
        package.dependency_sets.clear();
    }
    package
}

#[async_trait]
impl PackagesResource for IndexFeed {
    async fn find(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Option<SearchResult>> {
        ensure_active(request)?;

        let Some(id) = context.target_id() else {
            request.debug("IndexFeed::find called without a target package");
            return Ok(None);
        };

        // The lookup is by id; only extra name terms remain for the caller
        let name_required = context.terms.iter().any(|t| t.kind().is_name_filter());

        let Some(versions) = self.index.find(id) else {
            request.debug(&format!("IndexFeed::find '{}': no such id", id));
            return Ok(Some(context.make_result_with(
                Vec::<Package>::new(),
                true,
                name_required,
                true,
            )));
        };

        if let Some(required) = &context.required_version {
            let hits: Vec<Package> = versions
                .iter()
                .filter(|p| &p.version == required)
                .map(|p| prepare(p, context))
                .collect();
            return Ok(Some(context.make_result_with(hits, false, name_required, true)));
        }

        let mut items: Vec<Package> = versions.iter().map(|p| prepare(p, context)).collect();
        items.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(Some(context.make_result_with(items, true, name_required, true)))
    }
}

#[async_trait]
impl QueryResource for IndexFeed {
    async fn search(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Option<SearchResult>> {
        ensure_active(request)?;

        let name_required = context.target_package.is_some()
            || context
                .terms
                .iter()
                .any(|t| t.kind().is_name_filter() && !is_native(t.kind()));

        // The latest version is picked here only among versions that matched
        // every term; with terms left to the caller it has to pick
        let narrow = !context.return_all_versions && !name_required;

        let mut items = Vec::new();
        for hits in self.index.search(&context.terms) {
            if narrow {
                let pick = hits
                    .into_iter()
                    .filter(|p| version_allowed(&p.version, context))
                    .max_by(|a, b| a.version.cmp(&b.version));
                items.extend(pick.map(|p| prepare(p, context)));
            } else {
                items.extend(hits.into_iter().map(|p| prepare(p, context)));
            }
        }

        request.debug(&format!(
            "IndexFeed::search {} term(s): {} candidate(s)",
            context.terms.len(),
            items.len()
        ));
        Ok(Some(context.make_result_with(items, !narrow, name_required, false)))
    }
}

// ============ Archive-backed files ============

/// Where archive bytes come from for a given download URL
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    async fn fetch(&self, package: &Package, url: &str, request: &dyn Request) -> Result<Vec<u8>>;
}

/// Files resource over any [`ArchiveSource`]
#[derive(Debug, Clone)]
pub struct ArchiveFiles<S> {
    source: S,
}

impl<S: ArchiveSource> ArchiveFiles<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    async fn fetch_verified(
        &self,
        package: &Package,
        request: &dyn Request,
    ) -> Result<Option<Vec<u8>>> {
        ensure_active(request)?;
        let Some(url) = package.download_url.as_deref() else {
            request.debug(&format!(
                "ArchiveFiles: {}@{} has no download URL",
                package.id, package.version
            ));
            return Ok(None);
        };

        let data = self.source.fetch(package, url, request).await?;
        verify_package(package, &data)?;
        Ok(Some(data))
    }
}

#[async_trait]
impl<S: ArchiveSource> FilesResource for ArchiveFiles<S> {
    async fn download_package(
        &self,
        package: &Package,
        destination: &Path,
        request: &dyn Request,
    ) -> Result<bool> {
        let Some(data) = self.fetch_verified(package, request).await? else {
            return Ok(false);
        };

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, &data).await?;
        Ok(true)
    }

    async fn install_package(&self, package: &Package, request: &dyn Request) -> Result<bool> {
        let Some(data) = self.fetch_verified(package, request).await? else {
            return Ok(false);
        };

        let dest = install_dir(&request.install_root(), package);
        extract_archive(&data, &dest)?;
        request.debug(&format!(
            "ArchiveFiles: installed {}@{} into {}",
            package.id,
            package.version,
            dest.display()
        ));
        Ok(true)
    }
}

/// Index-backed packages/query resources plus archive-backed files
pub struct FeedResources<S> {
    location: String,
    feed: IndexFeed,
    files: ArchiveFiles<S>,
}

impl<S: ArchiveSource> FeedResources<S> {
    pub fn new(location: impl Into<String>, index: FeedIndex, source: S) -> Self {
        Self {
            location: location.into(),
            feed: IndexFeed::new(index),
            files: ArchiveFiles::new(source),
        }
    }

    pub fn index(&self) -> &FeedIndex {
        self.feed.index()
    }
}

impl<S: ArchiveSource + 'static> ResourceCollection for FeedResources<S> {
    fn location(&self) -> &str {
        &self.location
    }

    fn packages(&self) -> &dyn PackagesResource {
        &self.feed
    }

    fn query(&self) -> &dyn QueryResource {
        &self.feed
    }

    fn files(&self) -> &dyn FilesResource {
        &self.files
    }
}
