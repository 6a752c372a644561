//! Per-package version aggregation
//!
//! A [`PackageEntryInfo`] collects every version of one package id seen during
//! a discovery session. Feeds and mirrors often report overlapping version
//! sets concurrently, so adding a version is idempotent and duplicates are
//! rejected on a lock-free fast path before the entry lock is taken.

use dashmap::{DashMap, DashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::package::Package;
use crate::version::PackageVersion;

/// All known versions of one package id
#[derive(Debug)]
pub struct PackageEntryInfo {
    id: String,
    /// Canonical version strings already recorded
    seen: DashSet<String>,
    state: Mutex<EntryState>,
}

#[derive(Debug, Clone, Default)]
struct EntryState {
    all_versions: Vec<PackageVersion>,
    latest_version: Option<PackageVersion>,
    absolute_latest_version: Option<PackageVersion>,
}

/// Consistent view of an entry at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub id: String,
    /// Versions in insertion order
    pub all_versions: Vec<PackageVersion>,
    /// Highest non-prerelease version
    pub latest_version: Option<PackageVersion>,
    /// Highest version including prereleases
    pub absolute_latest_version: Option<PackageVersion>,
}

impl PackageEntryInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            seen: DashSet::new(),
            state: Mutex::new(EntryState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record a version; adding the same canonical version again is a no-op
    pub fn add_version(&self, version: &PackageVersion) -> &Self {
        let key = version.to_string();
        if self.seen.contains(&key) {
            return self;
        }

        let mut state = self.lock();
        // Another caller may have recorded it while we waited for the lock
        if self.seen.contains(&key) {
            return self;
        }

        state.all_versions.push(version.clone());

        if state
            .absolute_latest_version
            .as_ref()
            .is_none_or(|current| version > current)
        {
            state.absolute_latest_version = Some(version.clone());
        }

        if !version.is_prerelease()
            && state
                .latest_version
                .as_ref()
                .is_none_or(|current| version > current)
        {
            state.latest_version = Some(version.clone());
        }

        self.seen.insert(key);
        self
    }

    /// Record several versions
    pub fn add_versions<'a>(&self, versions: impl IntoIterator<Item = &'a PackageVersion>) -> &Self {
        for version in versions {
            self.add_version(version);
        }
        self
    }

    pub fn contains(&self, version: &PackageVersion) -> bool {
        self.seen.contains(&version.to_string())
    }

    pub fn latest_version(&self) -> Option<PackageVersion> {
        self.lock().latest_version.clone()
    }

    pub fn absolute_latest_version(&self) -> Option<PackageVersion> {
        self.lock().absolute_latest_version.clone()
    }

    /// Copy of the recorded versions in insertion order
    pub fn all_versions(&self) -> Vec<PackageVersion> {
        self.lock().all_versions.clone()
    }

    pub fn version_count(&self) -> usize {
        self.lock().all_versions.len()
    }

    /// All three version fields read under a single lock
    pub fn snapshot(&self) -> EntrySnapshot {
        let state = self.lock().clone();
        EntrySnapshot {
            id: self.id.clone(),
            all_versions: state.all_versions,
            latest_version: state.latest_version,
            absolute_latest_version: state.absolute_latest_version,
        }
    }

    /// Set `is_latest_version` / `is_absolute_latest_version` on a package of this id
    pub fn stamp(&self, package: &mut Package) {
        let state = self.lock();
        package.is_latest_version = state.latest_version.as_ref() == Some(&package.version);
        package.is_absolute_latest_version =
            state.absolute_latest_version.as_ref() == Some(&package.version);
    }

    fn lock(&self) -> MutexGuard<'_, EntryState> {
        // State is only replaced field by field, so a poisoned guard is still coherent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Session-scoped map of package id to its entry
///
/// Ids are matched case-insensitively; the first spelling seen is kept.
#[derive(Debug, Default)]
pub struct EntryIndex {
    entries: DashMap<String, Arc<PackageEntryInfo>>,
}

impl EntryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `id`, creating it if needed
    pub fn entry(&self, id: &str) -> Arc<PackageEntryInfo> {
        self.entries
            .entry(id.to_lowercase())
            .or_insert_with(|| Arc::new(PackageEntryInfo::new(id)))
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<PackageEntryInfo>> {
        self.entries.get(&id.to_lowercase()).map(|e| e.clone())
    }

    /// Add a package's version to the entry for its id
    pub fn record(&self, package: &Package) -> Arc<PackageEntryInfo> {
        let entry = self.entry(&package.id);
        entry.add_version(&package.version);
        entry
    }

    pub fn record_all<'a>(&self, packages: impl IntoIterator<Item = &'a Package>) {
        for package in packages {
            self.record(package);
        }
    }

    /// Ids as first seen, sorted case-insensitively
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.value().id().to_string())
            .collect();
        ids.sort_by_key(|id| id.to_lowercase());
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
