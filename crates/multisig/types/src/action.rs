//! Actions, failure maps and execution outcomes

use crate::{Address, MultisigSettings, ProposalId};
use serde::{Deserialize, Serialize};

/// Maximum number of actions in one proposal (one bit per action in [`FailureMap`]).
pub const MAX_ACTIONS: usize = 128;

/// A single state-changing action executed when a proposal passes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Where the action is applied
    pub target: Address,
    /// Native value attached to the action
    pub value: u128,
    /// What to do at the target
    pub payload: ActionPayload,
}

impl Action {
    /// An opaque call forwarded to the host executor
    pub fn call(target: Address, value: u128, data: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload: ActionPayload::Call(data),
        }
    }

    /// A governance call addressed to an engine's plugin handle
    pub fn governance(plugin: Address, call: GovernanceCall) -> Self {
        Self {
            target: plugin,
            value: 0,
            payload: ActionPayload::Governance(call),
        }
    }

    /// A transfer out of a vault
    pub fn transfer(token: Address, from: Address, to: Address, amount: u128) -> Self {
        Self {
            target: token,
            value: 0,
            payload: ActionPayload::Transfer { from, to, amount },
        }
    }
}

/// Action payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionPayload {
    /// Opaque calldata interpreted by the host
    Call(Vec<u8>),
    /// Asset movement interpreted by the host
    Transfer {
        from: Address,
        to: Address,
        amount: u128,
    },
    /// Governance operation on an engine
    Governance(GovernanceCall),
}

/// Governance operations that an engine applies to itself when a proposal
/// targets its own plugin handle. The caller is the engine's dao.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceCall {
    AddMembers(Vec<Address>),
    RemoveMembers(Vec<Address>),
    UpdateSettings(MultisigSettings),
    SetParent { parent: Address, hard_link: bool },
    UnsetParent,
    Intervene { proposal_id: ProposalId, deny: bool },
    Deactivate,
}

impl GovernanceCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddMembers(_) => "add_members",
            Self::RemoveMembers(_) => "remove_members",
            Self::UpdateSettings(_) => "update_settings",
            Self::SetParent { .. } => "set_parent",
            Self::UnsetParent => "unset_parent",
            Self::Intervene { .. } => "intervene",
            Self::Deactivate => "deactivate",
        }
    }
}

/// Bitmask of tolerated action failures: bit `i` set means a failure of
/// action `i` does not abort the batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureMap(pub u128);

impl FailureMap {
    pub fn none() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self(u128::MAX)
    }

    pub fn with(mut self, index: usize) -> Self {
        self.set(index);
        self
    }

    pub fn set(&mut self, index: usize) {
        if index < MAX_ACTIONS {
            self.0 |= 1u128 << index;
        }
    }

    pub fn allows(&self, index: usize) -> bool {
        index < MAX_ACTIONS && self.0 & (1u128 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Result of one action in an executed batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub index: usize,
    pub target: Address,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionOutcome {
    pub fn success(index: usize, target: Address) -> Self {
        Self {
            index,
            target,
            succeeded: true,
            detail: None,
        }
    }

    pub fn failure(index: usize, target: Address, detail: impl Into<String>) -> Self {
        Self {
            index,
            target,
            succeeded: false,
            detail: Some(detail.into()),
        }
    }
}

/// Outcome of a proposal execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub proposal_id: ProposalId,
    /// Outcomes in action order
    pub outcomes: Vec<ActionOutcome>,
    /// Bits of the actions that failed (all of them tolerated)
    pub failure_map: FailureMap,
}

impl ExecutionReport {
    pub fn new(proposal_id: ProposalId, outcomes: Vec<ActionOutcome>) -> Self {
        let mut failure_map = FailureMap::none();
        for outcome in outcomes.iter().filter(|o| !o.succeeded) {
            failure_map.set(outcome.index);
        }
        Self {
            proposal_id,
            outcomes,
            failure_map,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_map.is_empty()
    }
}
