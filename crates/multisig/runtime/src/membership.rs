//! Membership Registry: the global approver list
//!
//! Additions and removals are idempotent. Removing a member here does not
//! touch any group's member set.

use multisig_types::{Address, VersionedSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MembershipRegistry {
    members: VersionedSet<Address>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add members; returns those that were not listed before
    pub fn add(&mut self, members: impl IntoIterator<Item = Address>) -> Vec<Address> {
        let added = self.members.insert_all(members);
        if !added.is_empty() {
            debug!(count = added.len(), version = self.version(), "Members added");
        }
        added
    }

    /// Remove members; returns those that were listed
    pub fn remove(&mut self, members: impl IntoIterator<Item = Address>) -> Vec<Address> {
        let removed = self.members.remove_all(members);
        if !removed.is_empty() {
            debug!(count = removed.len(), version = self.version(), "Members removed");
        }
        removed
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// Membership as of an earlier version
    pub fn is_member_at(&self, address: &Address, version: u64) -> bool {
        self.members.contains_at(address, version)
    }

    pub fn version(&self) -> u64 {
        self.members.version()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> Vec<Address> {
        self.members.iter().cloned().collect()
    }
}
