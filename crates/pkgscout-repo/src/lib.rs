//! pkgscout Repository Access
//!
//! This crate turns a package source location into a queryable repository:
//!
//! - **Local feeds**: A directory with `index.yaml` or per-package manifests
//! - **Network feeds**: `index.yaml` served over HTTP(S)
//! - **Factory**: Picks the repository kind from the location alone
//! - **Discovery**: Queries every configured source at once
//!
//! ## Key Features
//!
//! - **Validate once**: A location is checked at most once per repository
//! - **Null vs empty**: Feeds can answer "no result" distinctly from "nothing found"
//! - **Post filters**: Results say which filters the caller still has to apply
//! - **Integrity**: SHA-256 digests are verified before archives are saved
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pkgscout_core::{PackageEntryInfo, SearchContext};
//! use pkgscout_repo::{SessionRequest, create_repository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = Arc::new(SessionRequest::new());
//! let repo = create_repository(Some("https://feed.example.com/v1/"), request.clone()).await?;
//!
//! let context = SearchContext::for_package(Arc::new(PackageEntryInfo::new("Json.Core")));
//! if let Some(package) = repo.find_package(&context, request.as_ref()).await? {
//!     repo.install_package(&package, request.as_ref()).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod discovery;
pub mod error;
pub mod factory;
pub mod http;
pub mod index;
pub mod local;
pub mod location;
pub mod params;
pub mod repository;
pub mod request;
pub mod resource;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::{PackageSource, SourcesConfig};
pub use discovery::{Discovery, SourcedPackage};
pub use error::{RepoError, Result};
pub use factory::create_repository;
pub use http::{FeedClient, HttpArchives};
pub use index::FeedIndex;
pub use local::LocalArchives;
pub use location::{FileLocationValidator, HttpLocationValidator, LocationValidator};
pub use params::RepositoryCreateParameters;
pub use repository::{FeedRepository, LocalRepository, PackageRepository};
pub use request::{Request, SessionRequest};
pub use resource::{
    ArchiveSource, FeedResources, FilesResource, PackagesResource, QueryResource,
    ResourceCollection,
};
