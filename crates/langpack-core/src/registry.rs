//! The registry of installed packages.
//!
//! An ordered, deduplicated list of local [`PackageRecord`]s. Entries are
//! kept sorted by (source language, target language, short name), which is
//! also the identity of a package, so lookups are binary searches and an
//! in-place update never moves an entry.

use crate::events::{EventSender, ManagerEvent};
use crate::package::{PackageIdentity, PackageRecord};
use tracing::{debug, warn};

/// Authoritative set of installed packages.
#[derive(Debug)]
pub struct PackageRegistry {
    packages: Vec<PackageRecord>,
    events: EventSender,
}

fn key(record: &PackageRecord) -> (&str, &str, &str) {
    (
        record.source_language.as_str(),
        record.target_language.as_str(),
        record.short_name.as_str(),
    )
}

fn identity_key(identity: &PackageIdentity) -> (&str, &str, &str) {
    (
        identity.source_language.as_str(),
        identity.target_language.as_str(),
        identity.short_name.as_str(),
    )
}

impl PackageRegistry {
    pub fn new(events: EventSender) -> Self {
        Self {
            packages: Vec::new(),
            events,
        }
    }

    fn search(&self, wanted: (&str, &str, &str)) -> std::result::Result<usize, usize> {
        self.packages.binary_search_by(|p| key(p).cmp(&wanted))
    }

    /// Insert `record`, or update the entry with the same identity.
    ///
    /// Returns `true` if a new entry was added, `false` if an existing one
    /// was replaced. A replacement takes `record` as is, remote versions
    /// included; the next reconciliation fills them in again.
    pub fn insert(&mut self, record: PackageRecord) -> bool {
        if !record.is_local() {
            warn!(
                "Refusing to register {} without an install path",
                record.identity()
            );
            return false;
        }

        match self.search(key(&record)) {
            Ok(index) => {
                self.packages[index] = record;
                debug!("Updated package at index {}", index);
                self.events.emit(ManagerEvent::EntryChanged { index });
                false
            }
            Err(index) => {
                debug!("Registered {} at index {}", record.identity(), index);
                self.packages.insert(index, record);
                self.events.emit(ManagerEvent::PackageInserted { index });
                true
            }
        }
    }

    /// Remove the entry with the same identity as `record`.
    ///
    /// Returns `false` if no such entry exists.
    pub fn remove(&mut self, record: &PackageRecord) -> bool {
        self.remove_identity(&record.identity()).is_some()
    }

    /// Remove the entry with `identity`, returning it.
    pub fn remove_identity(&mut self, identity: &PackageIdentity) -> Option<PackageRecord> {
        let index = self.search(identity_key(identity)).ok()?;
        let removed = self.packages.remove(index);
        self.events.emit(ManagerEvent::PackageRemoved { index });
        Some(removed)
    }

    /// The installed packages, in order.
    pub fn list(&self) -> &[PackageRecord] {
        &self.packages
    }

    pub fn get(&self, index: usize) -> Option<&PackageRecord> {
        self.packages.get(index)
    }

    pub fn position(&self, identity: &PackageIdentity) -> Option<usize> {
        self.search(identity_key(identity)).ok()
    }

    pub fn find(&self, identity: &PackageIdentity) -> Option<&PackageRecord> {
        self.position(identity).map(|index| &self.packages[index])
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Annotate the entry at `index` with the catalog's versions, or clear
    /// them with `None`.
    ///
    /// Returns `true` and emits `EntryChanged` only if a value changed.
    pub fn set_remote_versions(
        &mut self,
        index: usize,
        version: Option<f64>,
        api_version: Option<f64>,
    ) -> bool {
        let Some(record) = self.packages.get_mut(index) else {
            return false;
        };
        if record.remote_version == version && record.remote_api_version == api_version {
            return false;
        }
        record.set_remote_versions(version, api_version);
        self.events.emit(ManagerEvent::EntryChanged { index });
        true
    }
}
