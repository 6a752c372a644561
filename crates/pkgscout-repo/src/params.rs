//! Repository construction parameters
//!
//! Location validation can touch the filesystem or network, so the outcome is
//! computed once and cached. Concurrent first callers wait on the same
//! computation; every later call is a plain read.

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::location::{LocationValidator, parse_location};
use crate::request::Request;

#[derive(Debug, Clone)]
struct Resolution {
    valid: bool,
    location: String,
}

/// Location plus a lazily computed, cached validity flag
pub struct RepositoryCreateParameters {
    original_location: String,
    resolution: OnceCell<Resolution>,
    validator: Arc<dyn LocationValidator>,
    request: Arc<dyn Request>,
}

impl RepositoryCreateParameters {
    pub fn new(
        location: impl Into<String>,
        validator: Arc<dyn LocationValidator>,
        request: Arc<dyn Request>,
    ) -> Self {
        Self {
            original_location: location.into(),
            resolution: OnceCell::new(),
            validator,
            request,
        }
    }

    /// Validated location once validation succeeded, otherwise the original
    pub fn location(&self) -> &str {
        match self.resolution.get() {
            Some(r) if r.valid => &r.location,
            _ => &self.original_location,
        }
    }

    /// Location exactly as given by the caller
    pub fn original_location(&self) -> &str {
        &self.original_location
    }

    /// `None` until validation has run
    pub fn location_valid(&self) -> Option<bool> {
        self.resolution.get().map(|r| r.valid)
    }

    pub fn request(&self) -> &Arc<dyn Request> {
        &self.request
    }

    /// Validate the location, computing the result at most once
    pub async fn validate_location(&self) -> bool {
        if let Some(resolution) = self.resolution.get() {
            return resolution.valid;
        }

        self.resolution
            .get_or_init(|| self.resolve())
            .await
            .valid
    }

    async fn resolve(&self) -> Resolution {
        let invalid = || Resolution {
            valid: false,
            location: self.original_location.clone(),
        };

        let Some(uri) = parse_location(&self.original_location) else {
            self.request.debug(&format!(
                "RepositoryCreateParameters: '{}' is not an absolute URI",
                self.original_location
            ));
            return invalid();
        };

        match self.validator.validate(&uri, self.request.as_ref()).await {
            Some(validated) => Resolution {
                valid: true,
                location: validated.to_string(),
            },
            None => invalid(),
        }
    }
}

impl std::fmt::Debug for RepositoryCreateParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryCreateParameters")
            .field("location", &self.location())
            .field("location_valid", &self.location_valid())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::HttpLocationValidator;
    use crate::request::SessionRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    /// Counts calls and normalizes by appending a path segment
    struct CountingValidator {
        calls: AtomicUsize,
        accept: bool,
    }

    #[async_trait]
    impl LocationValidator for CountingValidator {
        async fn validate(&self, uri: &Url, _request: &dyn Request) -> Option<Url> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.accept {
                uri.join("normalized/").ok()
            } else {
                None
            }
        }
    }

    fn counting(accept: bool) -> Arc<CountingValidator> {
        Arc::new(CountingValidator {
            calls: AtomicUsize::new(0),
            accept,
        })
    }

    fn request() -> Arc<dyn Request> {
        Arc::new(SessionRequest::new())
    }

    #[tokio::test]
    async fn test_unknown_until_validated() {
        let params = RepositoryCreateParameters::new(
            "https://feed.example.com/v1",
            Arc::new(HttpLocationValidator),
            request(),
        );
        assert_eq!(params.location_valid(), None);
        assert!(params.validate_location().await);
        assert_eq!(params.location_valid(), Some(true));
        assert_eq!(params.location(), "https://feed.example.com/v1/");
        assert_eq!(params.original_location(), "https://feed.example.com/v1");
    }

    #[tokio::test]
    async fn test_validation_runs_once() {
        let validator = counting(true);
        let params = RepositoryCreateParameters::new(
            "https://feed.example.com/",
            validator.clone(),
            request(),
        );

        for _ in 0..10 {
            assert!(params.validate_location().await);
        }
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(params.location(), "https://feed.example.com/normalized/");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_validation() {
        let validator = counting(true);
        let params = Arc::new(RepositoryCreateParameters::new(
            "https://feed.example.com/",
            validator.clone(),
            request(),
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let params = Arc::clone(&params);
                tokio::spawn(async move {
                    let valid = params.validate_location().await;
                    (valid, params.location().to_string())
                })
            })
            .collect();

        for handle in handles {
            let (valid, location) = handle.await.unwrap();
            assert!(valid);
            assert_eq!(location, "https://feed.example.com/normalized/");
        }
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparseable_location_skips_validator() {
        let validator = counting(true);
        let params = RepositoryCreateParameters::new("not a uri", validator.clone(), request());

        assert!(!params.validate_location().await);
        assert!(!params.validate_location().await);
        assert_eq!(params.location_valid(), Some(false));
        assert_eq!(params.location(), "not a uri");
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_location_is_cached() {
        let validator = counting(false);
        let params =
            RepositoryCreateParameters::new("https://feed.example.com/", validator.clone(), request());

        assert!(!params.validate_location().await);
        assert!(!params.validate_location().await);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(params.location(), "https://feed.example.com/");
    }
}
