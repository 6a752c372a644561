//! Package source configuration
//!
//! Stores configured sources in `~/.config/pkgscout/sources.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};
use crate::location::is_file_location;

/// Sources configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesConfig {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Configured sources, in priority order
    #[serde(default)]
    pub sources: Vec<PackageSource>,
}

fn default_api_version() -> String {
    "pkgscout.io/v1".to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            sources: Vec::new(),
        }
    }
}

impl SourcesConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to default location
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("pkgscout").join("sources.yaml"))
    }

    fn check(&self) -> Result<()> {
        for (i, source) in self.sources.iter().enumerate() {
            if source.name.trim().is_empty() {
                return Err(RepoError::InvalidConfig {
                    message: format!("source #{} has an empty name", i + 1),
                });
            }
            if self.sources[..i].iter().any(|s| s.name == source.name) {
                return Err(RepoError::InvalidConfig {
                    message: format!("duplicate source name '{}'", source.name),
                });
            }
        }
        Ok(())
    }

    /// Get a source by name
    pub fn get(&self, name: &str) -> Option<&PackageSource> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Add a source
    pub fn add(&mut self, source: PackageSource) -> Result<()> {
        if self.get(&source.name).is_some() {
            return Err(RepoError::SourceAlreadyExists {
                name: source.name.clone(),
            });
        }
        self.sources.push(source);
        Ok(())
    }

    /// Remove a source by name
    pub fn remove(&mut self, name: &str) -> Result<PackageSource> {
        let idx = self
            .sources
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| RepoError::SourceNotFound {
                name: name.to_string(),
            })?;
        Ok(self.sources.remove(idx))
    }

    /// Sources that take part in discovery
    pub fn enabled(&self) -> impl Iterator<Item = &PackageSource> {
        self.sources.iter().filter(|s| s.enabled)
    }

    /// List all source names
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A configured package source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSource {
    /// Unique name for this source
    pub name: String,

    /// Feed URL or local directory
    pub location: String,

    /// Disabled sources are kept in the file but skipped
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub trusted: bool,
}

fn default_enabled() -> bool {
    true
}

impl PackageSource {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            enabled: true,
            trusted: false,
        }
    }

    /// Whether this source points at the local filesystem
    pub fn is_file(&self) -> bool {
        is_file_location(&self.location)
    }
}
