//! Governance event log
//!
//! Every successful mutation appends one or more records. The log is part of
//! the engine state, so a failed operation rolls its events back too.

use crate::{Address, ContentRef, GroupId, MultisigSettings, ProposalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that happened to an engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    MembersAdded {
        members: Vec<Address>,
    },
    MembersRemoved {
        members: Vec<Address>,
    },
    SettingsUpdated {
        settings: MultisigSettings,
    },
    GroupCreated {
        group_id: GroupId,
        name: String,
        vault: Address,
    },
    GroupMembersAdded {
        group_id: GroupId,
        members: Vec<Address>,
    },
    GroupMembersRemoved {
        group_id: GroupId,
        members: Vec<Address>,
    },
    ProposalCreated {
        proposal_id: ProposalId,
        creator: Address,
        metadata: ContentRef,
        group_id: Option<GroupId>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    },
    Approved {
        proposal_id: ProposalId,
        approver: Address,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
        failure_map: u128,
    },
    ProposalCancelled {
        proposal_id: ProposalId,
    },
    ParentSet {
        parent: Address,
        child: Address,
        hard_link: bool,
    },
    ParentUnset {
        parent: Address,
        child: Address,
    },
    ProposalIntervened {
        proposal_id: ProposalId,
        rejected: bool,
    },
    ProposalDenied {
        proposal_id: ProposalId,
        by: Address,
    },
    Deactivated {
        plugin: Address,
    },
    PluginUpgraded {
        from_build: u16,
        to_build: u16,
    },
    VaultWithdrawal {
        group_id: GroupId,
        token: Address,
        to: Address,
        amount: u128,
    },
}

impl GovernanceEvent {
    /// Short name, as used in logs and the CLI listing
    pub fn name(&self) -> &'static str {
        match self {
            Self::MembersAdded { .. } => "members_added",
            Self::MembersRemoved { .. } => "members_removed",
            Self::SettingsUpdated { .. } => "settings_updated",
            Self::GroupCreated { .. } => "group_created",
            Self::GroupMembersAdded { .. } => "group_members_added",
            Self::GroupMembersRemoved { .. } => "group_members_removed",
            Self::ProposalCreated { .. } => "proposal_created",
            Self::Approved { .. } => "approved",
            Self::ProposalExecuted { .. } => "proposal_executed",
            Self::ProposalCancelled { .. } => "proposal_cancelled",
            Self::ParentSet { .. } => "parent_set",
            Self::ParentUnset { .. } => "parent_unset",
            Self::ProposalIntervened { .. } => "proposal_intervened",
            Self::ProposalDenied { .. } => "proposal_denied",
            Self::Deactivated { .. } => "deactivated",
            Self::PluginUpgraded { .. } => "plugin_upgraded",
            Self::VaultWithdrawal { .. } => "vault_withdrawal",
        }
    }
}

/// A logged event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 1
    pub sequence: u64,
    /// Unique receipt identifier
    pub receipt_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: GovernanceEvent,
}

/// Append-only event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number
    pub fn emit(&mut self, timestamp: DateTime<Utc>, event: GovernanceEvent) -> u64 {
        let sequence = self.records.len() as u64 + 1;
        self.records.push(EventRecord {
            sequence,
            receipt_id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            event,
        });
        sequence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records with a sequence number strictly greater than `sequence`
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = (sequence as usize).min(self.records.len());
        &self.records[start..]
    }
}
