//! Group Registry: named member subsets with their own vaults
//!
//! Group ids are sequential from 0 and never reused. Group membership is
//! independent of the global registry once a group exists.

use multisig_types::{Address, Group, GroupId, MultisigError, MultisigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupRegistry {
    next_id: GroupId,
    groups: BTreeMap<GroupId, Group>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id and store a group with `members`
    pub fn create(
        &mut self,
        name: impl Into<String>,
        members: impl IntoIterator<Item = Address>,
        vault: Address,
        allocation: Option<u128>,
    ) -> GroupId {
        let id = self.next_id;
        self.next_id = id.next();

        let mut group = Group::new(id, name, vault, allocation);
        group.members.insert_all(members);

        info!(
            group_id = %id,
            name = %group.name,
            members = group.member_count(),
            "Group created"
        );
        self.groups.insert(id, group);
        id
    }

    pub fn get(&self, id: GroupId) -> MultisigResult<&Group> {
        self.groups.get(&id).ok_or(MultisigError::GroupNotFound(id))
    }

    fn get_mut(&mut self, id: GroupId) -> MultisigResult<&mut Group> {
        self.groups
            .get_mut(&id)
            .ok_or(MultisigError::GroupNotFound(id))
    }

    /// Add addresses to one group only
    pub fn add_members(
        &mut self,
        id: GroupId,
        members: impl IntoIterator<Item = Address>,
    ) -> MultisigResult<Vec<Address>> {
        let group = self.get_mut(id)?;
        let added = group.members.insert_all(members);
        debug!(group_id = %id, added = added.len(), "Group members added");
        Ok(added)
    }

    /// Remove addresses from one group only
    pub fn remove_members(
        &mut self,
        id: GroupId,
        members: impl IntoIterator<Item = Address>,
    ) -> MultisigResult<Vec<Address>> {
        let group = self.get_mut(id)?;
        let removed = group.members.remove_all(members);
        debug!(group_id = %id, removed = removed.len(), "Group members removed");
        Ok(removed)
    }

    pub fn is_member_in_group(&self, address: &Address, id: GroupId) -> MultisigResult<bool> {
        Ok(self.get(id)?.is_member(address))
    }

    /// Name of a group
    pub fn name(&self, id: GroupId) -> MultisigResult<&str> {
        Ok(self.get(id)?.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
