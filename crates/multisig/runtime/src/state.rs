//! Engine state
//!
//! One owned struct holding every registry. Operations work on a clone and
//! the clone replaces the original only on success.

use crate::{
    AuthorizationPredicate, EngineConfig, GroupRegistry, InterventionState, MembershipRegistry,
    ProposalStore,
};
use multisig_types::{Address, EventLog, MultisigSettings};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineState {
    pub(crate) dao: Address,
    pub(crate) plugin: Address,
    pub(crate) build: u16,
    pub(crate) settings: MultisigSettings,
    pub(crate) members: MembershipRegistry,
    pub(crate) groups: GroupRegistry,
    pub(crate) proposals: ProposalStore,
    pub(crate) interventions: InterventionState,
    pub(crate) execute_condition: AuthorizationPredicate,
    pub(crate) events: EventLog,
}

impl EngineState {
    pub(crate) fn new(config: &EngineConfig) -> Self {
        Self {
            dao: config.dao.clone(),
            plugin: config.plugin.clone(),
            build: 1,
            settings: config.settings,
            members: MembershipRegistry::new(),
            groups: GroupRegistry::new(),
            proposals: ProposalStore::new(),
            interventions: InterventionState::new(config.intervention_policy),
            execute_condition: config.execute_condition.clone(),
            events: EventLog::new(),
        }
    }

    pub fn dao(&self) -> &Address {
        &self.dao
    }

    pub fn plugin(&self) -> &Address {
        &self.plugin
    }

    pub fn build(&self) -> u16 {
        self.build
    }

    pub fn settings(&self) -> &MultisigSettings {
        &self.settings
    }

    pub fn members(&self) -> &MembershipRegistry {
        &self.members
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn interventions(&self) -> &InterventionState {
        &self.interventions
    }

    pub fn execute_condition(&self) -> &AuthorizationPredicate {
        &self.execute_condition
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
