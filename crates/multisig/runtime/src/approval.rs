//! Approval Policy: who may create and approve, and when the threshold holds
//!
//! Eligibility of an approver:
//!
//! - global proposal, `only_listed`: listed now AND listed at the proposal's
//!   snapshot version
//! - global proposal, open listing: anyone
//! - group proposal: member of the group now, and additionally at the
//!   snapshot version when `only_listed`

use crate::{GroupRegistry, MembershipRegistry};
use chrono::{DateTime, Utc};
use multisig_types::{
    Address, GroupId, MultisigError, MultisigResult, MultisigSettings, NotExecutableReason,
    Proposal,
};
use tracing::debug;

/// Read-only view over the registries used to adjudicate approvals
pub struct ApprovalPolicy<'a> {
    members: &'a MembershipRegistry,
    groups: &'a GroupRegistry,
}

impl<'a> ApprovalPolicy<'a> {
    pub fn new(members: &'a MembershipRegistry, groups: &'a GroupRegistry) -> Self {
        Self { members, groups }
    }

    /// Version of the approver scope a new proposal snapshots
    pub fn scope_version(&self, group_id: Option<GroupId>) -> MultisigResult<u64> {
        match group_id {
            Some(id) => Ok(self.groups.get(id)?.members.version()),
            None => Ok(self.members.version()),
        }
    }

    /// Whether `creator` may open a proposal in the given scope
    pub fn check_creator(
        &self,
        settings: &MultisigSettings,
        creator: &Address,
        group_id: Option<GroupId>,
    ) -> MultisigResult<()> {
        let allowed = match group_id {
            Some(id) => self.groups.get(id)?.is_member(creator),
            None => !settings.only_listed || self.members.is_member(creator),
        };
        if !allowed {
            debug!(creator = %creator, group_id = ?group_id, "Proposal creation refused");
            return Err(MultisigError::ProposalCreationForbidden(creator.clone()));
        }
        Ok(())
    }

    /// Whether `address` belongs to the proposal's approver set
    pub fn is_eligible(&self, proposal: &Proposal, address: &Address) -> bool {
        let only_listed = proposal.parameters.only_listed;
        let snapshot = proposal.parameters.snapshot_version;

        match proposal.group_id {
            Some(id) => self.groups.get(id).is_ok_and(|group| {
                group.is_member(address)
                    && (!only_listed || group.members.contains_at(address, snapshot))
            }),
            None => {
                !only_listed
                    || (self.members.is_member(address)
                        && self.members.is_member_at(address, snapshot))
            }
        }
    }

    pub fn can_approve(
        &self,
        proposal: &Proposal,
        denied: bool,
        address: &Address,
        now: DateTime<Utc>,
    ) -> bool {
        let open = !proposal.is_closed() && proposal.has_started(now) && !proposal.has_ended(now);
        open && !denied && !proposal.has_approved(address) && self.is_eligible(proposal, address)
    }

    /// Lifecycle, window and threshold conditions for execution
    pub fn check_executable(proposal: &Proposal, now: DateTime<Utc>) -> MultisigResult<()> {
        let reason = if proposal.executed {
            NotExecutableReason::AlreadyExecuted
        } else if proposal.cancelled {
            NotExecutableReason::Cancelled
        } else if !proposal.has_started(now) {
            NotExecutableReason::NotStarted
        } else if proposal.has_ended(now) {
            NotExecutableReason::Expired
        } else if !proposal.threshold_met() {
            NotExecutableReason::ThresholdNotMet {
                required: proposal.parameters.min_approvals,
                current: proposal.approval_count(),
            }
        } else {
            return Ok(());
        };

        Err(MultisigError::ProposalNotExecutable {
            proposal_id: proposal.id,
            reason,
        })
    }
}
