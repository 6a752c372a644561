//! Feed index document
//!
//! Both local and network feeds publish an `index.yaml` listing every package
//! version they serve, grouped by id.

use chrono::{DateTime, Utc};
use pkgscout_core::{Package, PackageEntryInfo, SearchTerm, SearchTermKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{RepoError, Result};

/// File name of the index at a feed root
pub const INDEX_FILE: &str = "index.yaml";

/// File name of a per-package manifest in an unindexed local feed
pub const MANIFEST_FILE: &str = "package.yaml";

/// Feed index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedIndex {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// When this index was generated
    #[serde(default = "Utc::now")]
    pub generated: DateTime<Utc>,

    /// Package versions indexed by id
    #[serde(default)]
    pub entries: HashMap<String, Vec<Package>>,
}

fn default_api_version() -> String {
    "pkgscout.io/v1".to_string()
}

impl Default for FeedIndex {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            generated: Utc::now(),
            entries: HashMap::new(),
        }
    }
}

impl FeedIndex {
    /// Parse index from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut index: Self =
            serde_yaml::from_str(yaml).map_err(|e| RepoError::IndexParseError {
                message: e.to_string(),
            })?;
        index.prepare()?;
        Ok(index)
    }

    /// Parse index from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let yaml = std::str::from_utf8(bytes).map_err(|e| RepoError::IndexParseError {
            message: format!("Invalid UTF-8: {}", e),
        })?;
        Self::from_yaml(yaml)
    }

    /// Load a local feed directory
    ///
    /// Uses `index.yaml` when present, otherwise collects `package.yaml`
    /// manifests from the immediate subdirectories.
    pub fn load_dir(root: &Path) -> Result<Self> {
        let index_path = root.join(INDEX_FILE);
        if index_path.is_file() {
            let content = std::fs::read(&index_path)?;
            return Self::from_bytes(&content);
        }

        let mut index = Self::default();
        for entry in std::fs::read_dir(root)? {
            let path = entry?.path();
            let manifest = path.join(MANIFEST_FILE);
            if !path.is_dir() || !manifest.is_file() {
                continue;
            }

            let content = std::fs::read_to_string(&manifest)?;
            match serde_yaml::from_str::<Package>(&content) {
                Ok(package) if package.validate().is_ok() => index.add_package(package),
                Ok(_) => tracing::warn!("Skipping manifest without id: {}", manifest.display()),
                Err(e) => tracing::warn!("Skipping unreadable manifest {}: {}", manifest.display(), e),
            }
        }

        if index.entries.is_empty() {
            return Err(RepoError::IndexNotFound {
                location: root.display().to_string(),
            });
        }

        index.stamp_latest();
        Ok(index)
    }

    /// Validate entries and mark latest versions
    fn prepare(&mut self) -> Result<()> {
        for packages in self.entries.values() {
            for package in packages {
                package.validate()?;
            }
        }
        self.stamp_latest();
        Ok(())
    }

    /// Recompute `is_latest_version` / `is_absolute_latest_version` for every package
    pub fn stamp_latest(&mut self) {
        for packages in self.entries.values_mut() {
            let Some(first) = packages.first() else {
                continue;
            };
            let entry = PackageEntryInfo::new(first.id.clone());
            entry.add_versions(packages.iter().map(|p| &p.version));
            for package in packages.iter_mut() {
                entry.stamp(package);
            }
        }
    }

    /// All versions of a package (case-insensitive id)
    pub fn find(&self, id: &str) -> Option<&Vec<Package>> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(id))
            .map(|(_, packages)| packages)
    }

    /// A specific version of a package
    pub fn find_version(&self, id: &str, version: &pkgscout_core::PackageVersion) -> Option<&Package> {
        self.find(id)?.iter().find(|p| &p.version == version)
    }

    /// Package versions matching every natively supported term, grouped by id
    ///
    /// `Id`, `Tag`, `FreeText` and `Contains` terms are evaluated against each
    /// version on its own; other kinds are ignored and left to the caller.
    /// Groups are ordered by id, versions newest first.
    pub fn search(&self, terms: &[SearchTerm]) -> Vec<Vec<&Package>> {
        let native: Vec<&SearchTerm> = terms.iter().filter(|t| is_native(t.kind())).collect();

        let mut results: Vec<(&String, Vec<&Package>)> = self
            .entries
            .iter()
            .map(|(id, packages)| {
                let mut hits: Vec<&Package> = packages
                    .iter()
                    .filter(|p| {
                        native
                            .iter()
                            .all(|t| pkgscout_core::search::filter::term_matches(p, t))
                    })
                    .collect();
                hits.sort_by(|a, b| b.version.cmp(&a.version));
                (id, hits)
            })
            .filter(|(_, hits)| !hits.is_empty())
            .collect();

        results.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()));
        results.into_iter().map(|(_, hits)| hits).collect()
    }

    /// Every package version in the index, ordered by id
    pub fn all(&self) -> Vec<&Package> {
        let mut ids: Vec<&String> = self.entries.keys().collect();
        ids.sort_by_key(|id| id.to_lowercase());
        ids.into_iter()
            .flat_map(|id| self.entries[id].iter())
            .collect()
    }

    /// List all package ids
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// Add a package to the index
    pub fn add_package(&mut self, package: Package) {
        let key = self
            .entries
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&package.id))
            .cloned()
            .unwrap_or_else(|| package.id.clone());
        self.entries.entry(key).or_default().push(package);
    }

    /// Merge another index into this one
    pub fn merge(&mut self, other: FeedIndex) {
        for package in other.entries.into_values().flatten() {
            self.add_package(package);
        }
        self.stamp_latest();
        self.generated = Utc::now();
    }
}

/// Term kinds a feed index evaluates itself
pub fn is_native(kind: SearchTermKind) -> bool {
    matches!(
        kind,
        SearchTermKind::Id | SearchTermKind::Tag | SearchTermKind::FreeText | SearchTermKind::Contains
    )
}
