//! Session context threaded through every repository call
//!
//! A request carries cancellation, a diagnostics sink and ambient options.
//! Repositories and feeds never interpret it beyond checking cancellation and
//! reading the options they need; it is passed along unchanged.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{RepoError, Result};

/// Default timeout for feed HTTP calls
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-session context passed to every repository operation
pub trait Request: Send + Sync {
    /// Whether the caller asked to stop
    fn is_cancelled(&self) -> bool;

    /// Diagnostic trace
    fn debug(&self, message: &str);

    /// Recoverable problem worth surfacing
    fn warning(&self, message: &str);

    /// Free-form option set by the host
    fn option(&self, key: &str) -> Option<String>;

    /// Where installed packages are unpacked
    fn install_root(&self) -> PathBuf;

    /// Timeout applied to network feed calls
    fn http_timeout(&self) -> Duration {
        DEFAULT_HTTP_TIMEOUT
    }
}

/// Fail with [`RepoError::Cancelled`] if the request was cancelled
pub fn ensure_active(request: &dyn Request) -> Result<()> {
    if request.is_cancelled() {
        Err(RepoError::Cancelled)
    } else {
        Ok(())
    }
}

/// Default [`Request`] backed by `tracing`
#[derive(Debug, Clone)]
pub struct SessionRequest {
    cancelled: Arc<AtomicBool>,
    options: HashMap<String, String>,
    install_root: Option<PathBuf>,
    http_timeout: Duration,
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            options: HashMap::new(),
            install_root: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl SessionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Cancel this request and every clone sharing its flag
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Shared flag, for cancelling from another task
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Default install root: `<data dir>/pkgscout/packages`
    pub fn default_install_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("pkgscout")
            .join("packages")
    }
}

impl Request for SessionRequest {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "pkgscout::request", "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "pkgscout::request", "{}", message);
    }

    fn option(&self, key: &str) -> Option<String> {
        self.options.get(key).cloned()
    }

    fn install_root(&self) -> PathBuf {
        self.install_root
            .clone()
            .unwrap_or_else(Self::default_install_root)
    }

    fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_shared_between_clones() {
        let request = SessionRequest::new();
        let clone = request.clone();
        assert!(ensure_active(&clone).is_ok());

        request.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(ensure_active(&clone), Err(RepoError::Cancelled)));
    }

    #[test]
    fn test_options() {
        let request = SessionRequest::new()
            .with_option("feed.pageSize", "50")
            .with_install_root("/tmp/pkgs")
            .with_http_timeout(Duration::from_secs(5));

        assert_eq!(request.option("feed.pageSize").as_deref(), Some("50"));
        assert_eq!(request.option("missing"), None);
        assert_eq!(request.install_root(), PathBuf::from("/tmp/pkgs"));
        assert_eq!(request.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_install_root() {
        let root = SessionRequest::new().install_root();
        assert!(root.ends_with("pkgscout/packages"));
    }
}
