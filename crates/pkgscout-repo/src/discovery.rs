//! Multi-source discovery
//!
//! Fans a query out over every configured repository at once, applies the
//! post filters each result still requires, and records what survives into a
//! shared [`EntryIndex`]. A failing source is logged and skipped; the query
//! only fails when every source does.

use futures::future::join_all;
use pkgscout_core::{EntryIndex, Package, SearchContext, SearchResult, apply_post_filters};
use std::sync::Arc;

use crate::config::SourcesConfig;
use crate::error::{RepoError, Result};
use crate::factory::create_repository;
use crate::repository::PackageRepository;
use crate::request::Request;

/// A package together with the name of the source it came from
#[derive(Debug, Clone)]
pub struct SourcedPackage {
    pub source: String,
    pub package: Package,
}

struct NamedRepository {
    name: String,
    repository: Box<dyn PackageRepository>,
}

#[derive(Clone, Copy)]
enum Operation {
    Find,
    Search,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Find => "find_packages_by_id",
            Operation::Search => "search",
        }
    }
}

/// Queries a set of named repositories as one
pub struct Discovery {
    repositories: Vec<NamedRepository>,
    entries: Arc<EntryIndex>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Discovery {
    pub fn new() -> Self {
        Self::with_entries(Arc::new(EntryIndex::new()))
    }

    /// Share an existing entry index, e.g. across sessions
    pub fn with_entries(entries: Arc<EntryIndex>) -> Self {
        Self {
            repositories: Vec::new(),
            entries,
        }
    }

    /// Build a repository for every enabled source
    ///
    /// Sources whose repository cannot be created are skipped with a warning.
    pub async fn from_config(config: &SourcesConfig, request: Arc<dyn Request>) -> Self {
        let sources: Vec<_> = config.enabled().collect();
        let opened = join_all(
            sources
                .iter()
                .map(|source| create_repository(Some(source.location.as_str()), request.clone())),
        )
        .await;

        let mut discovery = Self::new();
        for (source, repository) in sources.into_iter().zip(opened) {
            match repository {
                Ok(repository) => discovery.add(&source.name, repository),
                Err(e) => {
                    tracing::warn!(
                        source = %source.name,
                        location = %source.location,
                        "Skipping package source: {}",
                        e
                    );
                }
            }
        }
        discovery
    }

    /// Add a repository under `name`, after the existing ones
    pub fn add(&mut self, name: impl Into<String>, repository: Box<dyn PackageRepository>) {
        self.repositories.push(NamedRepository {
            name: name.into(),
            repository,
        });
    }

    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Versions recorded from every query so far
    pub fn entries(&self) -> &Arc<EntryIndex> {
        &self.entries
    }

    /// Look up the context's target package in every source
    pub async fn find_packages_by_id(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Vec<SourcedPackage>> {
        self.fan_out(Operation::Find, context, request).await
    }

    /// Run the context's terms against every source
    pub async fn search(
        &self,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Vec<SourcedPackage>> {
        self.fan_out(Operation::Search, context, request).await
    }

    async fn fan_out(
        &self,
        operation: Operation,
        context: &SearchContext,
        request: &dyn Request,
    ) -> Result<Vec<SourcedPackage>> {
        if self.repositories.is_empty() {
            return Err(RepoError::NoSources);
        }

        let results = join_all(self.repositories.iter().map(|named| async move {
            let result = match operation {
                Operation::Find => named.repository.find_packages_by_id(context, request).await,
                Operation::Search => named.repository.search(context, request).await,
            };
            (named.name.as_str(), result)
        }))
        .await;

        let mut packages = Vec::new();
        let mut first_error = None;
        let mut failures = 0;

        for (name, result) in results {
            match result {
                Ok(Some(result)) => packages.extend(self.collect(name, result, context)),
                Ok(None) => {
                    tracing::debug!(source = name, "{} returned no result", operation.as_str());
                }
                Err(e) => {
                    tracing::warn!(source = name, "{} failed: {}", operation.as_str(), e);
                    failures += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if failures == self.repositories.len() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        tracing::debug!(
            sources = self.repositories.len(),
            failures,
            count = packages.len(),
            "{} complete",
            operation.as_str()
        );
        Ok(packages)
    }

    fn collect(&self, source: &str, result: SearchResult, context: &SearchContext) -> Vec<SourcedPackage> {
        apply_post_filters(result, context)
            .into_iter()
            .map(|package| {
                self.entries.record(&package);
                SourcedPackage {
                    source: source.to_string(),
                    package,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackageSource;
    use crate::repository::LocalRepository;
    use crate::request::SessionRequest;
    use crate::resource::ResourceCollection;
    use crate::testing::write_local_feed;
    use async_trait::async_trait;
    use pkgscout_core::{PackageEntryInfo, PackageVersion, SearchTerm};
    use std::path::Path;

    const MIRROR_INDEX: &str = r#"
apiVersion: pkgscout.io/v1
entries:
  Json.Core:
    - id: Json.Core
      version: "2.1.0"
      description: JSON reader and writer
  Yaml.Lite:
    - id: Yaml.Lite
      version: "1.0.0"
      description: Small YAML parser
"#;

    fn request() -> Arc<dyn Request> {
        Arc::new(SessionRequest::new())
    }

    fn target(id: &str) -> SearchContext {
        SearchContext::for_package(Arc::new(PackageEntryInfo::new(id)))
    }

    async fn local(root: &Path) -> Box<dyn PackageRepository> {
        Box::new(
            LocalRepository::new(root.to_str().unwrap(), request())
                .await
                .unwrap(),
        )
    }

    /// Answers every query with a network error
    struct BrokenRepository {
        resources: Arc<dyn ResourceCollection>,
    }

    #[async_trait]
    impl PackageRepository for BrokenRepository {
        fn source(&self) -> &str {
            "broken://"
        }
        fn is_file(&self) -> bool {
            false
        }
        fn resource_provider(&self) -> &Arc<dyn ResourceCollection> {
            &self.resources
        }
        fn component(&self) -> &'static str {
            "BrokenRepository"
        }

        async fn find_packages_by_id(
            &self,
            _context: &SearchContext,
            _request: &dyn Request,
        ) -> Result<Option<SearchResult>> {
            Err(RepoError::NetworkError {
                message: "connection refused".to_string(),
            })
        }

        async fn search(
            &self,
            _context: &SearchContext,
            _request: &dyn Request,
        ) -> Result<Option<SearchResult>> {
            Err(RepoError::NetworkError {
                message: "connection refused".to_string(),
            })
        }
    }

    async fn broken(root: &Path) -> Box<dyn PackageRepository> {
        let inner = local(root).await;
        Box::new(BrokenRepository {
            resources: inner.resource_provider().clone(),
        })
    }

    #[tokio::test]
    async fn test_no_sources() {
        let discovery = Discovery::new();
        let err = discovery
            .search(&SearchContext::new(), &SessionRequest::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NoSources));
    }

    #[tokio::test]
    async fn test_find_across_sources() {
        let main = tempfile::tempdir().unwrap();
        write_local_feed(main.path());
        let mirror = tempfile::tempdir().unwrap();
        std::fs::write(mirror.path().join("index.yaml"), MIRROR_INDEX).unwrap();

        let mut discovery = Discovery::new();
        discovery.add("main", local(main.path()).await);
        discovery.add("mirror", local(mirror.path()).await);

        let found = discovery
            .find_packages_by_id(&target("json.core"), &SessionRequest::new())
            .await
            .unwrap();

        let tagged: Vec<(String, String)> = found
            .iter()
            .map(|p| (p.source.clone(), p.package.version.to_string()))
            .collect();
        assert_eq!(
            tagged,
            vec![
                ("main".to_string(), "2.0.0".to_string()),
                ("mirror".to_string(), "2.1.0".to_string()),
            ]
        );

        let entry = discovery.entries().get("JSON.CORE").unwrap();
        assert_eq!(entry.version_count(), 2);
        assert_eq!(entry.latest_version(), Some(PackageVersion::new(2, 1, 0)));
    }

    #[tokio::test]
    async fn test_search_applies_post_filters() {
        let main = tempfile::tempdir().unwrap();
        write_local_feed(main.path());
        let mirror = tempfile::tempdir().unwrap();
        std::fs::write(mirror.path().join("index.yaml"), MIRROR_INDEX).unwrap();

        let mut discovery = Discovery::new();
        discovery.add("main", local(main.path()).await);
        discovery.add("mirror", local(mirror.path()).await);

        // Prefix matching is never done by the feed itself
        let ctx = SearchContext::for_terms([SearchTerm::auto_complete("y")]);
        let found = discovery.search(&ctx, &SessionRequest::new()).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|p| p.package.id.as_str()).collect();
        assert_eq!(ids, vec!["Yaml.Lite"]);
        assert_eq!(found[0].source, "mirror");
        assert_eq!(discovery.entries().ids(), vec!["Yaml.Lite".to_string()]);
    }

    #[tokio::test]
    async fn test_search_with_version_constraint() {
        let main = tempfile::tempdir().unwrap();
        write_local_feed(main.path());

        let mut discovery = Discovery::new();
        discovery.add("main", local(main.path()).await);
        let request = SessionRequest::new();

        let ctx = SearchContext::for_terms([SearchTerm::tag("json")])
            .with_required_version(PackageVersion::new(1, 0, 0));
        let found = discovery.search(&ctx, &request).await.unwrap();
        let versions: Vec<String> = found.iter().map(|p| p.package.version.to_string()).collect();
        assert_eq!(versions, vec!["1.0.0"]);

        let ctx = SearchContext::for_terms([SearchTerm::tag("json")])
            .with_version_range(None, Some(PackageVersion::parse("1.5.0").unwrap()));
        let found = discovery.search(&ctx, &request).await.unwrap();
        let versions: Vec<String> = found.iter().map(|p| p.package.version.to_string()).collect();
        assert_eq!(versions, vec!["1.0.0"]);
    }

    #[tokio::test]
    async fn test_search_returns_only_matching_versions() {
        let feed = tempfile::tempdir().unwrap();
        std::fs::write(
            feed.path().join("index.yaml"),
            r#"
entries:
  Foo:
    - id: Foo
      version: "2.0.0"
      tags: [stable]
    - id: Foo
      version: "3.0.0-beta"
      tags: [beta-api]
"#,
        )
        .unwrap();

        let mut discovery = Discovery::new();
        discovery.add("main", local(feed.path()).await);
        let request = SessionRequest::new();

        let ctx = SearchContext::for_terms([SearchTerm::tag("beta-api")]);
        let found = discovery.search(&ctx, &request).await.unwrap();
        assert!(found.is_empty());

        let found = discovery
            .search(&ctx.allow_prerelease(true), &request)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].package.has_tag("beta-api"));
    }

    #[tokio::test]
    async fn test_failing_source_is_skipped() {
        let main = tempfile::tempdir().unwrap();
        write_local_feed(main.path());

        let mut discovery = Discovery::new();
        discovery.add("down", broken(main.path()).await);
        discovery.add("main", local(main.path()).await);

        let found = discovery
            .find_packages_by_id(&target("Xml.Tools"), &SessionRequest::new())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, "main");
    }

    #[tokio::test]
    async fn test_all_sources_failing_returns_first_error() {
        let main = tempfile::tempdir().unwrap();
        write_local_feed(main.path());

        let mut discovery = Discovery::new();
        discovery.add("a", broken(main.path()).await);
        discovery.add("b", local(main.path()).await);

        let request = SessionRequest::new();
        request.cancel();

        // The local source fails on cancellation, the broken one on the network
        let err = discovery
            .search(&SearchContext::for_terms([SearchTerm::id("Xml.Tools")]), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NetworkError { .. }));
    }

    #[tokio::test]
    async fn test_from_config_skips_bad_sources() {
        let main = tempfile::tempdir().unwrap();
        write_local_feed(main.path());

        let mut config = SourcesConfig::default();
        config
            .add(PackageSource::new("main", main.path().to_str().unwrap()))
            .unwrap();
        config
            .add(PackageSource::new("missing", "/definitely/not/here"))
            .unwrap();
        let mut disabled = PackageSource::new("off", main.path().to_str().unwrap());
        disabled.enabled = false;
        config.add(disabled).unwrap();

        let discovery = Discovery::from_config(&config, request()).await;
        assert_eq!(discovery.names(), vec!["main"]);
    }
}
