//! Engine configuration

use crate::AuthorizationPredicate;
use multisig_types::{Address, InterventionPolicy, MultisigError, MultisigResult, MultisigSettings};
use serde::{Deserialize, Serialize};

/// Everything needed to initialize an engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The entity whose governance the engine runs
    pub dao: Address,
    /// The engine's own handle
    pub plugin: Address,
    /// Initial global members
    pub members: Vec<Address>,
    pub settings: MultisigSettings,
    pub intervention_policy: InterventionPolicy,
    /// Condition on the plugin's EXECUTE grant while a parent is linked
    pub execute_condition: AuthorizationPredicate,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dao: Address::new("dao"),
            plugin: Address::new("multisig"),
            members: Vec::new(),
            settings: MultisigSettings::default(),
            intervention_policy: InterventionPolicy::default(),
            execute_condition: AuthorizationPredicate::default(),
        }
    }
}

impl EngineConfig {
    pub fn new(dao: Address, plugin: Address) -> Self {
        Self {
            dao,
            plugin,
            ..Self::default()
        }
    }

    pub fn with_members(mut self, members: impl IntoIterator<Item = Address>) -> Self {
        self.members = members.into_iter().collect();
        self
    }

    pub fn with_settings(mut self, settings: MultisigSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_intervention_policy(mut self, policy: InterventionPolicy) -> Self {
        self.intervention_policy = policy;
        self
    }

    pub fn with_execute_condition(mut self, condition: AuthorizationPredicate) -> Self {
        self.execute_condition = condition;
        self
    }

    pub fn validate(&self) -> MultisigResult<()> {
        self.settings.validate()?;
        if self.dao == self.plugin {
            return Err(MultisigError::InvalidSettings(
                "dao and plugin must be distinct".into(),
            ));
        }
        Ok(())
    }
}
