//! Groups: named member subsets with their own vault

use crate::{Address, GroupId, VersionedSet};
use serde::{Deserialize, Serialize};

/// A named subset of members with its own asset vault and approval scope
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Group members (checkpointed for proposal snapshots)
    pub members: VersionedSet<Address>,
    /// Asset-holding handle for this group
    pub vault: Address,
    /// Optional token allocation assigned at creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<u128>,
}

impl Group {
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        vault: Address,
        allocation: Option<u128>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            members: VersionedSet::new(),
            vault,
            allocation,
        }
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
