//! Repository façade
//!
//! A repository validates its location once, resolves the feed's resources
//! once, and afterwards only routes calls: find to the packages resource,
//! search to the query resource, download and install to the files resource.

use async_trait::async_trait;
use pkgscout_core::{Package, SearchContext, SearchResult};
use std::path::Path;
use std::sync::Arc;

use crate::error::{RepoError, Result};
use crate::location::{FileLocationValidator, HttpLocationValidator, LocationValidator};
use crate::params::RepositoryCreateParameters;
use crate::request::Request;
use crate::resource::{ResourceCollection, resolve_resources};

/// A package repository backed by one feed
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Validated location
    fn source(&self) -> &str;

    /// Whether the feed lives on the local filesystem
    fn is_file(&self) -> bool;

    /// Resolved feed resources
    fn resource_provider(&self) -> &Arc<dyn ResourceCollection>;

    /// Short component name used in traces
    fn component(&self) -> &'static str;

    /// First match from the packages resource, if any
    ///
    /// A missing result container and an empty one both yield `None`.
    async fn find_package(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Option<Package>> {
        trace(self.component(), "find_package", context, request);
        let result = self
            .resource_provider()
            .packages()
            .find(context, request)
            .await?;
        Ok(result.and_then(SearchResult::first))
    }

    /// Raw result of the packages resource, unfiltered
    async fn find_packages_by_id(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Option<SearchResult>> {
        trace(self.component(), "find_packages_by_id", context, request);
        self.resource_provider()
            .packages()
            .find(context, request)
            .await
    }

    /// Raw result of the query resource, unfiltered
    async fn search(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Option<SearchResult>> {
        trace(self.component(), "search", context, request);
        self.resource_provider().query().search(context, request).await
    }

    async fn download_package(
        &self,
        package: &Package,
        destination: &Path,
        request: &dyn Request,
    ) -> Result<bool> {
        request.debug(&format!(
            "{}::download_package '{}'",
            self.component(),
            package.id
        ));
        self.resource_provider()
            .files()
            .download_package(package, destination, request)
            .await
    }

    async fn install_package(&self, package: &Package, request: &dyn Request) -> Result<bool> {
        request.debug(&format!(
            "{}::install_package '{}'",
            self.component(),
            package.id
        ));
        self.resource_provider()
            .files()
            .install_package(package, request)
            .await
    }
}

fn trace(component: &str, operation: &str, context: &SearchContext, request: &dyn Request) {
    match context.target_id() {
        Some(id) => request.debug(&format!("{}::{} '{}'", component, operation, id)),
        None => request.debug(&format!(
            "{}::{} ({} term(s))",
            component,
            operation,
            context.terms.len()
        )),
    }
}

/// Validate, then resolve; shared by both repository kinds
async fn open(
    location: &str,
    validator: Arc<dyn LocationValidator>,
    is_file: bool,
    request: Arc<dyn Request>,
) -> Result<(String, Arc<dyn ResourceCollection>)> {
    let params = RepositoryCreateParameters::new(location, validator, request);
    if !params.validate_location().await {
        return Err(RepoError::InvalidSource {
            location: params.original_location().to_string(),
        });
    }

    let source = params.location().to_string();
    let resources = resolve_resources(&source, is_file, params.request().as_ref()).await?;
    Ok((source, resources))
}

/// Repository over a local feed directory
pub struct LocalRepository {
    source: String,
    resources: Arc<dyn ResourceCollection>,
}

impl LocalRepository {
    pub async fn new(location: &str, request: Arc<dyn Request>) -> Result<Self> {
        let (source, resources) =
            open(location, Arc::new(FileLocationValidator), true, request).await?;
        Ok(Self { source, resources })
    }
}

#[async_trait]
impl PackageRepository for LocalRepository {
    fn source(&self) -> &str {
        &self.source
    }

    fn is_file(&self) -> bool {
        true
    }

    fn resource_provider(&self) -> &Arc<dyn ResourceCollection> {
        &self.resources
    }

    fn component(&self) -> &'static str {
        "LocalRepository"
    }
}

/// Repository over a network feed
pub struct FeedRepository {
    source: String,
    resources: Arc<dyn ResourceCollection>,
}

impl FeedRepository {
    pub async fn new(location: &str, request: Arc<dyn Request>) -> Result<Self> {
        let (source, resources) =
            open(location, Arc::new(HttpLocationValidator), false, request).await?;
        Ok(Self { source, resources })
    }
}

#[async_trait]
impl PackageRepository for FeedRepository {
    fn source(&self) -> &str {
        &self.source
    }

    fn is_file(&self) -> bool {
        false
    }

    fn resource_provider(&self) -> &Arc<dyn ResourceCollection> {
        &self.resources
    }

    fn component(&self) -> &'static str {
        "FeedRepository"
    }
}
