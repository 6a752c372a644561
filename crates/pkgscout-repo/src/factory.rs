//! Repository factory
//!
//! Routing is decided purely from the location's scheme: local paths and
//! `file://` URIs get a [`LocalRepository`], everything else a
//! [`FeedRepository`]. Unsupported schemes are rejected by the chosen
//! repository's own validation.

use std::sync::Arc;

use crate::error::{RepoError, Result};
use crate::location::is_file_location;
use crate::repository::{FeedRepository, LocalRepository, PackageRepository};
use crate::request::Request;

/// Create a repository for `location`
pub async fn create_repository(
    location: Option<&str>,
    request: Arc<dyn Request>,
) -> Result<Box<dyn PackageRepository>> {
    let location = location.ok_or_else(|| RepoError::InvalidArgument {
        message: "location must not be null".to_string(),
    })?;

    if is_file_location(location) {
        request.debug(&format!("RepositoryFactory: '{}' -> local", location));
        Ok(Box::new(LocalRepository::new(location, request).await?))
    } else {
        request.debug(&format!("RepositoryFactory: '{}' -> feed", location));
        Ok(Box::new(FeedRepository::new(location, request).await?))
    }
}
