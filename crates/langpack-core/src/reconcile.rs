//! Reconciliation of installed packages against the remote catalog.
//!
//! Every pass starts from scratch: the "new" and "outdated" sets are rebuilt
//! from the current registry and catalog, never patched.

use crate::events::{EventSender, ManagerEvent};
use crate::package::{PackageIdentity, PackageRecord};
use crate::registry::PackageRegistry;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Derived availability sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Availability {
    /// Catalog packages with no installed counterpart.
    pub new_packages: Vec<PackageRecord>,
    /// Catalog packages newer than the installed counterpart. These are the
    /// remote records, so each carries the URL needed to update.
    pub outdated_packages: Vec<PackageRecord>,
}

/// Computes [`Availability`] and annotates the registry with catalog
/// versions.
#[derive(Debug)]
pub struct Reconciler {
    availability: Availability,
    events: EventSender,
}

impl Reconciler {
    pub fn new(events: EventSender) -> Self {
        Self {
            availability: Availability::default(),
            events,
        }
    }

    /// Result of the most recent pass.
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Recompute both sets from `registry` and `catalog`.
    ///
    /// Every registry entry gets the matching catalog entry's version and API
    /// version copied onto it; entries the catalog no longer lists have
    /// both cleared. `EntryChanged` is emitted only for entries whose values
    /// actually changed. A single `AvailabilityChanged` follows at the end of
    /// the pass.
    pub fn recompute(
        &mut self,
        registry: &mut PackageRegistry,
        catalog: &[PackageRecord],
    ) -> &Availability {
        let newest = newest_per_identity(catalog);
        let by_identity: HashMap<PackageIdentity, &PackageRecord> = newest
            .iter()
            .map(|remote| (remote.identity(), *remote))
            .collect();

        let mut availability = Availability::default();
        for index in 0..registry.len() {
            let Some(identity) = registry.get(index).map(PackageRecord::identity) else {
                continue;
            };
            let remote = by_identity.get(&identity).copied();
            registry.set_remote_versions(
                index,
                remote.and_then(|r| r.remote_version),
                remote.and_then(|r| r.remote_api_version),
            );
            if let Some(remote) = remote {
                if registry.get(index).is_some_and(PackageRecord::is_outdated) {
                    availability.outdated_packages.push(remote.clone());
                }
            }
        }

        availability.new_packages = newest
            .into_iter()
            .filter(|remote| registry.position(&remote.identity()).is_none())
            .cloned()
            .collect();

        debug!(
            "Reconciled {} catalog entries: {} new, {} outdated",
            catalog.len(),
            availability.new_packages.len(),
            availability.outdated_packages.len()
        );

        self.events.emit(ManagerEvent::AvailabilityChanged {
            new_count: availability.new_packages.len(),
            outdated_count: availability.outdated_packages.len(),
        });
        self.availability = availability;
        &self.availability
    }
}

/// Collapse catalog entries sharing an identity to the one with the highest
/// version, keeping first-seen order.
fn newest_per_identity(catalog: &[PackageRecord]) -> Vec<&PackageRecord> {
    let mut newest: Vec<&PackageRecord> = Vec::with_capacity(catalog.len());
    let mut seen: HashMap<PackageIdentity, usize> = HashMap::new();

    for remote in catalog {
        match seen.entry(remote.identity()) {
            Entry::Occupied(slot) => {
                let current = &mut newest[*slot.get()];
                if remote.remote_version > current.remote_version {
                    *current = remote;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(newest.len());
                newest.push(remote);
            }
        }
    }

    newest
}
