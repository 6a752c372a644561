//! Location parsing and scheme-specific validation

use async_trait::async_trait;
use std::path::Path;
use url::Url;

use crate::request::Request;

/// Scheme-specific check of a parsed location
///
/// Returns the normalized location, or `None` if the location is not usable.
#[async_trait]
pub trait LocationValidator: Send + Sync {
    async fn validate(&self, uri: &Url, request: &dyn Request) -> Option<Url>;
}

/// Parse a location as an absolute URI
///
/// Absolute filesystem paths are accepted and converted to `file://` URIs.
pub fn parse_location(location: &str) -> Option<Url> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return None;
    }

    if is_filesystem_path(trimmed) {
        return Url::from_file_path(trimmed).ok();
    }

    Url::parse(trimmed).ok()
}

/// Whether a raw location names something on the local filesystem
pub fn is_file_location(location: &str) -> bool {
    let trimmed = location.trim();
    is_filesystem_path(trimmed)
        || Url::parse(trimmed).is_ok_and(|u| u.scheme() == "file")
}

fn is_filesystem_path(location: &str) -> bool {
    if Path::new(location).is_absolute() || location.starts_with('/') {
        return true;
    }
    // Windows drive letters parse as a one-letter URL scheme
    let bytes = location.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Accepts `file://` URIs naming an existing directory
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLocationValidator;

#[async_trait]
impl LocationValidator for FileLocationValidator {
    async fn validate(&self, uri: &Url, request: &dyn Request) -> Option<Url> {
        if uri.scheme() != "file" {
            request.debug(&format!("FileLocationValidator: '{}' is not a file URI", uri));
            return None;
        }

        let path = uri.to_file_path().ok()?;
        let canonical = match tokio::fs::canonicalize(&path).await {
            Ok(p) => p,
            Err(e) => {
                request.debug(&format!(
                    "FileLocationValidator: cannot resolve '{}': {}",
                    path.display(),
                    e
                ));
                return None;
            }
        };

        if !canonical.is_dir() {
            request.debug(&format!(
                "FileLocationValidator: '{}' is not a directory",
                canonical.display()
            ));
            return None;
        }

        Url::from_directory_path(&canonical).ok()
    }
}

/// Accepts `http://` and `https://` URIs with a host
///
/// The path is normalized to end with `/` so feed documents resolve relative
/// to the feed root.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpLocationValidator;

#[async_trait]
impl LocationValidator for HttpLocationValidator {
    async fn validate(&self, uri: &Url, request: &dyn Request) -> Option<Url> {
        if !matches!(uri.scheme(), "http" | "https") {
            request.debug(&format!(
                "HttpLocationValidator: unsupported scheme '{}' in '{}'",
                uri.scheme(),
                uri
            ));
            return None;
        }

        if uri.host_str().is_none_or(str::is_empty) {
            request.debug(&format!("HttpLocationValidator: '{}' has no host", uri));
            return None;
        }

        let mut normalized = uri.clone();
        normalized.set_fragment(None);
        if !normalized.path().ends_with('/') {
            let path = format!("{}/", normalized.path());
            normalized.set_path(&path);
        }
        Some(normalized)
    }
}
