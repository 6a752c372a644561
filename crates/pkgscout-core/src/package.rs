//! Package values returned by feeds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::version::PackageVersion;

/// One published version of a package, as reported by a feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Package id
    pub id: String,

    /// Published version
    pub version: PackageVersion,

    /// Display title
    #[serde(default)]
    pub title: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub owners: Vec<String>,

    #[serde(default)]
    pub license_url: Option<String>,

    #[serde(default)]
    pub project_url: Option<String>,

    #[serde(default)]
    pub icon_url: Option<String>,

    /// Tags for search
    #[serde(default)]
    pub tags: Vec<String>,

    /// Package type (e.g. `dependency`, `tool`)
    #[serde(default)]
    pub package_type: Option<String>,

    /// Dependencies grouped by target framework or platform
    #[serde(default)]
    pub dependency_sets: Vec<DependencySet>,

    /// Archive hash, hex encoded
    #[serde(default)]
    pub hash: Option<String>,

    #[serde(default)]
    pub hash_algorithm: Option<String>,

    /// Where the archive can be fetched, absolute or relative to the feed
    #[serde(default)]
    pub download_url: Option<String>,

    /// Unlisted packages stay installable but are hidden from listings
    #[serde(default = "default_listed")]
    pub listed: bool,

    /// Highest stable version of this id in its feed
    #[serde(default)]
    pub is_latest_version: bool,

    /// Highest version of this id in its feed, prerelease included
    #[serde(default)]
    pub is_absolute_latest_version: bool,

    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

fn default_listed() -> bool {
    true
}

impl Package {
    /// Create a package with only identity set
    pub fn new(id: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            id: id.into(),
            version,
            title: None,
            description: None,
            authors: Vec::new(),
            owners: Vec::new(),
            license_url: None,
            project_url: None,
            icon_url: None,
            tags: Vec::new(),
            package_type: None,
            dependency_sets: Vec::new(),
            hash: None,
            hash_algorithm: None,
            download_url: None,
            listed: true,
            is_latest_version: false,
            is_absolute_latest_version: false,
            published: None,
        }
    }

    /// Check that identity fields are usable
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::MissingField {
                field: "id".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }

    /// Title if set, otherwise the id
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Case-insensitive id comparison
    pub fn id_matches(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }

    /// Whether id, title, description or any tag contains `needle` (case-insensitive)
    pub fn text_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.id.to_lowercase().contains(&needle)
            || self
                .title
                .as_ref()
                .is_some_and(|t| t.to_lowercase().contains(&needle))
            || self
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || self.has_tag(&needle)
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Dependencies for one target framework / platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySet {
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,
}

/// A dependency on another package id with a version range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    pub id: String,
    #[serde(default)]
    pub version_range: Option<String>,
}
