//! Proposal Store
//!
//! Owns every proposal. Ids are sequential from 0 and never reused, even
//! for cancelled or expired proposals.

use chrono::{DateTime, Utc};
use multisig_types::{
    Address, MultisigError, MultisigResult, Proposal, ProposalDraft, ProposalId,
    ProposalParameters,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    next_id: ProposalId,
    proposals: BTreeMap<ProposalId, Proposal>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new proposal built from `draft` and return its id
    pub fn insert(
        &mut self,
        creator: Address,
        draft: ProposalDraft,
        parameters: ProposalParameters,
        created_at: DateTime<Utc>,
    ) -> ProposalId {
        let id = self.next_id;
        self.next_id = id.next();

        self.proposals.insert(
            id,
            Proposal {
                id,
                creator,
                metadata: draft.metadata,
                actions: draft.actions,
                allow_failure_map: draft.allow_failure_map,
                approvals: BTreeSet::new(),
                parameters,
                group_id: draft.group_id,
                executed: false,
                cancelled: false,
                created_at,
            },
        );
        id
    }

    pub fn get(&self, id: ProposalId) -> MultisigResult<&Proposal> {
        self.proposals
            .get(&id)
            .ok_or(MultisigError::ProposalNotFound(id))
    }

    pub fn get_mut(&mut self, id: ProposalId) -> MultisigResult<&mut Proposal> {
        self.proposals
            .get_mut(&id)
            .ok_or(MultisigError::ProposalNotFound(id))
    }

    /// The id the next proposal will receive
    pub fn next_id(&self) -> ProposalId {
        self.next_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}
