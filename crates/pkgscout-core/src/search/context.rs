//! Query descriptor passed to feeds

use std::sync::Arc;

use crate::entry::PackageEntryInfo;
use crate::package::Package;
use crate::search::result::SearchResult;
use crate::search::term::{SearchTerm, SearchTermKind};
use crate::version::PackageVersion;

/// Everything a feed needs to answer a find or search call
///
/// When `required_version` is set, `min_version` and `max_version` are
/// ignored by the post filters.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub target_package: Option<Arc<PackageEntryInfo>>,
    pub terms: Vec<SearchTerm>,
    pub required_version: Option<PackageVersion>,
    pub min_version: Option<PackageVersion>,
    pub max_version: Option<PackageVersion>,
    pub allow_prerelease: bool,
    pub return_all_versions: bool,
    /// Skip fetching dependency sets and other expensive metadata
    pub bypass_deep_metadata: bool,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context targeting a single package id
    pub fn for_package(target: Arc<PackageEntryInfo>) -> Self {
        Self {
            target_package: Some(target),
            ..Self::default()
        }
    }

    /// Context for a term search
    pub fn for_terms(terms: impl IntoIterator<Item = SearchTerm>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_term(mut self, term: SearchTerm) -> Self {
        self.terms.push(term);
        self
    }

    pub fn with_required_version(mut self, version: PackageVersion) -> Self {
        self.required_version = Some(version);
        self
    }

    pub fn with_version_range(
        mut self,
        min: Option<PackageVersion>,
        max: Option<PackageVersion>,
    ) -> Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    pub fn allow_prerelease(mut self, allow: bool) -> Self {
        self.allow_prerelease = allow;
        self
    }

    pub fn return_all_versions(mut self, all: bool) -> Self {
        self.return_all_versions = all;
        self
    }

    pub fn bypass_deep_metadata(mut self, bypass: bool) -> Self {
        self.bypass_deep_metadata = bypass;
        self
    }

    /// Id of the target package, if any
    pub fn target_id(&self) -> Option<&str> {
        self.target_package.as_ref().map(|p| p.id())
    }

    /// Terms of a given kind, in order
    pub fn terms_of(&self, kind: SearchTermKind) -> impl Iterator<Item = &SearchTerm> {
        self.terms.iter().filter(move |t| t.kind() == kind)
    }

    pub fn has_version_constraint(&self) -> bool {
        self.required_version.is_some() || self.min_version.is_some() || self.max_version.is_some()
    }

    /// Wrap items with every post filter still required
    pub fn make_result<I>(&self, items: I) -> SearchResult
    where
        I: IntoIterator<Item = Package>,
        I::IntoIter: Send + 'static,
    {
        self.make_result_with(items, true, true, true)
    }

    /// Wrap items, clearing the flags for filters the backend already applied
    pub fn make_result_with<I>(
        &self,
        items: I,
        version_post_filter_required: bool,
        name_post_filter_required: bool,
        contains_post_filter_required: bool,
    ) -> SearchResult
    where
        I: IntoIterator<Item = Package>,
        I::IntoIter: Send + 'static,
    {
        SearchResult::new(
            Box::new(items.into_iter()),
            version_post_filter_required,
            name_post_filter_required,
            contains_post_filter_required,
        )
    }

    /// Empty result that still demands full filtering
    pub fn empty_result(&self) -> SearchResult {
        SearchResult::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(id: &str, version: &str) -> Package {
        Package::new(id, PackageVersion::parse(version).unwrap())
    }

    #[test]
    fn test_make_result_defaults_all_flags() {
        let ctx = SearchContext::new();
        let result = ctx.make_result(vec![pkg("foo", "1.0.0")]);
        assert!(result.version_post_filter_required);
        assert!(result.name_post_filter_required);
        assert!(result.contains_post_filter_required);
        assert_eq!(result.into_iter().count(), 1);
    }

    #[test]
    fn test_make_result_with_preserves_flags() {
        let ctx = SearchContext::new();
        let result = ctx.make_result_with(Vec::<Package>::new(), false, true, false);
        assert!(!result.version_post_filter_required);
        assert!(result.name_post_filter_required);
        assert!(!result.contains_post_filter_required);

        let result = ctx.make_result_with(Vec::<Package>::new(), true, false, true);
        assert!(result.version_post_filter_required);
        assert!(!result.name_post_filter_required);
        assert!(result.contains_post_filter_required);
    }

    #[test]
    fn test_empty_result() {
        let result = SearchContext::new().empty_result();
        assert!(result.needs_post_filter());
        assert!(result.first().is_none());
    }

    #[test]
    fn test_builders() {
        let target = Arc::new(PackageEntryInfo::new("Foo"));
        let ctx = SearchContext::for_package(target)
            .with_term(SearchTerm::tag("json"))
            .with_term(SearchTerm::contains("fast"))
            .with_version_range(Some(PackageVersion::new(1, 0, 0)), None)
            .allow_prerelease(true);

        assert_eq!(ctx.target_id(), Some("Foo"));
        assert_eq!(ctx.terms.len(), 2);
        assert_eq!(ctx.terms_of(SearchTermKind::Tag).count(), 1);
        assert!(ctx.has_version_constraint());
        assert!(ctx.allow_prerelease);
        assert!(!ctx.return_all_versions);
    }
}
