//! Proposals and their lifecycle

use crate::{Action, Address, ContentRef, FailureMap, GroupId, ProposalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Everything a caller supplies to create a proposal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    /// Reference to the published description
    pub metadata: ContentRef,
    pub actions: Vec<Action>,
    pub allow_failure_map: FailureMap,
    /// Record the creator's approval atomically with creation
    pub approve: bool,
    /// Attempt execution right away if the threshold is already met
    pub try_execution: bool,
    /// Absent means "now"
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    /// Scope the proposal to a group
    pub group_id: Option<GroupId>,
}

impl ProposalDraft {
    pub fn new(metadata: ContentRef, end_date: DateTime<Utc>) -> Self {
        Self {
            metadata,
            actions: Vec::new(),
            allow_failure_map: FailureMap::none(),
            approve: false,
            try_execution: false,
            start_date: None,
            end_date,
            group_id: None,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn with_failure_map(mut self, map: FailureMap) -> Self {
        self.allow_failure_map = map;
        self
    }

    pub fn approved(mut self) -> Self {
        self.approve = true;
        self
    }

    pub fn try_execution(mut self) -> Self {
        self.try_execution = true;
        self
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }
}

/// Policy values frozen into a proposal at creation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalParameters {
    pub min_approvals: u16,
    pub only_listed: bool,
    /// Version of the approver scope (global list or group) at creation
    pub snapshot_version: u64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// A stored proposal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub creator: Address,
    pub metadata: ContentRef,
    pub actions: Vec<Action>,
    pub allow_failure_map: FailureMap,
    pub approvals: BTreeSet<Address>,
    pub parameters: ProposalParameters,
    pub group_id: Option<GroupId>,
    pub executed: bool,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    pub fn has_approved(&self, address: &Address) -> bool {
        self.approvals.contains(address)
    }

    /// `approvals >= min_approvals`, inclusive
    pub fn threshold_met(&self) -> bool {
        self.approvals.len() >= usize::from(self.parameters.min_approvals)
    }

    pub fn is_closed(&self) -> bool {
        self.executed || self.cancelled
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.parameters.start_date <= now
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.parameters.end_date
    }

    /// Lifecycle state at `now`
    pub fn status(&self, now: DateTime<Utc>, denied: bool) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.cancelled {
            ProposalStatus::Cancelled
        } else if denied {
            ProposalStatus::Denied
        } else if self.has_ended(now) {
            ProposalStatus::Expired
        } else if !self.has_started(now) {
            ProposalStatus::Pending
        } else {
            ProposalStatus::Open
        }
    }
}

/// Lifecycle state of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Created, start date not reached
    Pending,
    Open,
    Executed,
    Cancelled,
    /// End date passed without execution
    Expired,
    /// Vetoed through intervention
    Denied,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Open)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Denied => "denied",
        };
        f.write_str(s)
    }
}
