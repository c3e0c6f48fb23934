//! Checkpointed membership sets
//!
//! Every batch mutation bumps the set's version and appends a checkpoint for
//! each affected item, so membership can be answered as of any past version.
//! Proposals record the version of their scope at creation time.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Membership state of one item from `version` onwards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u64,
    pub listed: bool,
}

/// A set with versioned history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VersionedSet<T: Ord> {
    version: u64,
    current: BTreeSet<T>,
    history: BTreeMap<T, Vec<Checkpoint>>,
}

impl<T: Ord> Default for VersionedSet<T> {
    fn default() -> Self {
        Self {
            version: 0,
            current: BTreeSet::new(),
            history: BTreeMap::new(),
        }
    }
}

impl<T: Ord + Clone> VersionedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version. Starts at 0 and grows by one per effective batch.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.current.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.current.iter()
    }

    /// Insert a batch. Items already present are skipped; returns the items
    /// that were actually added. The version only moves if something changed.
    pub fn insert_all(&mut self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let added: BTreeSet<T> = items
            .into_iter()
            .filter(|item| !self.current.contains(item))
            .collect();
        self.commit(added, true)
    }

    /// Remove a batch. Absent items are skipped; returns the items removed.
    pub fn remove_all(&mut self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let removed: BTreeSet<T> = items
            .into_iter()
            .filter(|item| self.current.contains(item))
            .collect();
        self.commit(removed, false)
    }

    /// Whether `item` was in the set at `version`
    pub fn contains_at(&self, item: &T, version: u64) -> bool {
        self.history
            .get(item)
            .and_then(|checkpoints| checkpoints.iter().rev().find(|c| c.version <= version))
            .map_or(false, |c| c.listed)
    }

    fn commit(&mut self, changed: BTreeSet<T>, listed: bool) -> Vec<T> {
        if changed.is_empty() {
            return Vec::new();
        }

        self.version += 1;
        let version = self.version;

        for item in &changed {
            if listed {
                self.current.insert(item.clone());
            } else {
                self.current.remove(item);
            }
            self.history
                .entry(item.clone())
                .or_default()
                .push(Checkpoint { version, listed });
        }

        changed.into_iter().collect()
    }
}
