//! pkgscout Core - value types for package discovery
//!
//! This crate provides the types shared by every feed backend:
//! - `PackageVersion`: Ordered version with prerelease detection
//! - `Package`: One published version of a package
//! - `SearchTerm` / `SearchContext`: What the caller is looking for
//! - `SearchResult`: Candidates plus the filters the feed left undone
//! - `PackageEntryInfo`: Concurrently built index of one id's versions

pub mod entry;
pub mod error;
pub mod package;
pub mod search;
pub mod version;

pub use entry::{EntryIndex, EntrySnapshot, PackageEntryInfo};
pub use error::{CoreError, Result};
pub use package::{DependencySet, Package, PackageDependency};
pub use search::{
    PackageStream, SearchContext, SearchResult, SearchTerm, SearchTermKind, apply_post_filters,
};
pub use version::PackageVersion;
