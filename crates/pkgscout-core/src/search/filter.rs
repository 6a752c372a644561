//! Client-side post filters
//!
//! Feeds differ in how much of a query they evaluate themselves. Whatever a
//! [`SearchResult`] still flags as required is applied here, and nothing else.

use glob::{MatchOptions, Pattern};
use std::collections::HashMap;

use crate::package::Package;
use crate::search::context::SearchContext;
use crate::search::result::SearchResult;
use crate::search::term::{SearchTerm, SearchTermKind};
use crate::version::PackageVersion;

/// Apply the filters `result` still requires, according to `context`
pub fn apply_post_filters(result: SearchResult, context: &SearchContext) -> Vec<Package> {
    let by_name = result.name_post_filter_required;
    let by_contains = result.contains_post_filter_required;
    let by_version = result.version_post_filter_required;

    let mut packages: Vec<Package> = result
        .into_iter()
        .filter(|p| !by_name || matches_name(p, context))
        .filter(|p| !by_contains || matches_contains(p, context))
        .filter(|p| !by_version || version_allowed(&p.version, context))
        .collect();

    if by_version && !context.return_all_versions {
        packages = latest_per_id(packages);
    }

    tracing::debug!(
        count = packages.len(),
        by_name,
        by_contains,
        by_version,
        "applied post filters"
    );
    packages
}

/// Target id and every name-filtering term must match
pub fn matches_name(package: &Package, context: &SearchContext) -> bool {
    if let Some(target) = context.target_id() {
        if !package.id_matches(target) {
            return false;
        }
    }

    context
        .terms
        .iter()
        .filter(|t| t.kind().is_name_filter())
        .all(|t| term_matches(package, t))
}

/// Every `Contains` term must appear in id, title or description
pub fn matches_contains(package: &Package, context: &SearchContext) -> bool {
    context
        .terms_of(SearchTermKind::Contains)
        .all(|t| term_matches(package, t))
}

/// Evaluate a single term against a package
pub fn term_matches(package: &Package, term: &SearchTerm) -> bool {
    let text = term.text();
    match term.kind() {
        SearchTermKind::Id => package.id_matches(text),
        SearchTermKind::Tag => package.has_tag(text),
        SearchTermKind::PackageType => package
            .package_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(text)),
        SearchTermKind::AutoComplete => package
            .id
            .to_lowercase()
            .starts_with(&text.to_lowercase()),
        SearchTermKind::LegacyPattern => pattern_matches(text, &package.id),
        SearchTermKind::FreeText => package.text_contains(text),
        SearchTermKind::Contains => {
            let needle = text.to_lowercase();
            package.id.to_lowercase().contains(&needle)
                || [&package.title, &package.description]
                    .into_iter()
                    .flatten()
                    .any(|s| s.to_lowercase().contains(&needle))
        }
    }
}

/// Wildcard match on ids; an unparseable pattern only matches itself
fn pattern_matches(pattern: &str, id: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    match Pattern::new(pattern) {
        Ok(p) => p.matches_with(id, options),
        Err(_) => pattern.eq_ignore_ascii_case(id),
    }
}

/// Version policy: required version, else inclusive range, then prerelease policy
pub fn version_allowed(version: &PackageVersion, context: &SearchContext) -> bool {
    if let Some(required) = &context.required_version {
        return version == required;
    }

    if context.min_version.as_ref().is_some_and(|min| version < min) {
        return false;
    }
    if context.max_version.as_ref().is_some_and(|max| version > max) {
        return false;
    }

    context.allow_prerelease || !version.is_prerelease()
}

/// Keep only the highest version of each id, in order of first appearance
fn latest_per_id(packages: Vec<Package>) -> Vec<Package> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Package> = Vec::new();

    for package in packages {
        let key = package.id.to_lowercase();
        match slots.get(&key) {
            Some(&idx) => {
                if package.version > kept[idx].version {
                    kept[idx] = package;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(package);
            }
        }
    }

    kept
}
