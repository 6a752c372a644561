//! Search results with post-filter obligations

use std::fmt;

use crate::package::Package;

/// Lazily produced packages
pub type PackageStream = Box<dyn Iterator<Item = Package> + Send>;

/// Candidate packages from one backend call
///
/// Each flag says whether the backend left that filter to the caller. A flag
/// is only cleared by a backend that actually applied the filter, so the
/// default is always "filter required".
pub struct SearchResult {
    items: PackageStream,
    pub version_post_filter_required: bool,
    pub name_post_filter_required: bool,
    pub contains_post_filter_required: bool,
}

impl SearchResult {
    pub fn new(
        items: PackageStream,
        version_post_filter_required: bool,
        name_post_filter_required: bool,
        contains_post_filter_required: bool,
    ) -> Self {
        Self {
            items,
            version_post_filter_required,
            name_post_filter_required,
            contains_post_filter_required,
        }
    }

    /// Empty result with every filter still required
    pub fn empty() -> Self {
        Self::new(Box::new(std::iter::empty()), true, true, true)
    }

    /// Whether any client-side filtering is still owed
    pub fn needs_post_filter(&self) -> bool {
        self.version_post_filter_required
            || self.name_post_filter_required
            || self.contains_post_filter_required
    }

    /// Take the item stream, leaving the flags behind
    pub fn into_items(self) -> PackageStream {
        self.items
    }

    pub fn first(self) -> Option<Package> {
        self.into_iter().next()
    }
}

impl IntoIterator for SearchResult {
    type Item = Package;
    type IntoIter = PackageStream;

    fn into_iter(self) -> Self::IntoIter {
        self.items
    }
}

impl fmt::Debug for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResult")
            .field("version_post_filter_required", &self.version_post_filter_required)
            .field("name_post_filter_required", &self.name_post_filter_required)
            .field("contains_post_filter_required", &self.contains_post_filter_required)
            .finish_non_exhaustive()
    }
}
