//! Plugin setup: installation and uninstallation plans
//!
//! Produces the engine configuration plus the permission changes the host
//! must apply before the engine is usable.

use crate::{AuthorizationPredicate, EngineConfig};
use multisig_types::{
    Address, Capability, InterventionPolicy, MultisigResult, MultisigSettings, PermissionChange,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Capabilities the dao receives on the plugin
const DAO_CAPABILITIES: [Capability; 4] = [
    Capability::UpdateAddresses,
    Capability::UpdateMultisigSettings,
    Capability::CreateGroup,
    Capability::UpgradePlugin,
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstallationParams {
    pub dao: Address,
    pub plugin: Address,
    pub members: Vec<Address>,
    pub settings: MultisigSettings,
    /// Supervising parent, if the engine starts out as a child
    pub parent: Option<Address>,
    #[serde(default)]
    pub intervention_policy: InterventionPolicy,
}

impl InstallationParams {
    pub fn new(dao: Address, plugin: Address, members: Vec<Address>) -> Self {
        Self {
            dao,
            plugin,
            members,
            settings: MultisigSettings::default(),
            parent: None,
            intervention_policy: InterventionPolicy::default(),
        }
    }

    pub fn with_settings(mut self, settings: MultisigSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_parent(mut self, parent: Address) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Result of preparing an installation
#[derive(Clone, Debug)]
pub struct PreparedSetup {
    pub config: EngineConfig,
    pub permissions: Vec<PermissionChange>,
}

pub struct PluginSetup;

impl PluginSetup {
    pub fn prepare_installation(params: InstallationParams) -> MultisigResult<PreparedSetup> {
        let execute_condition = match &params.parent {
            Some(parent) => AuthorizationPredicate::ParentCondition {
                parent: parent.clone(),
            },
            None => AuthorizationPredicate::AlwaysAllow,
        };

        let config = EngineConfig::new(params.dao.clone(), params.plugin.clone())
            .with_members(params.members)
            .with_settings(params.settings)
            .with_intervention_policy(params.intervention_policy)
            .with_execute_condition(execute_condition);
        config.validate()?;

        let permissions = Self::grants(&params.dao, &params.plugin, params.parent.as_ref());
        info!(
            dao = %params.dao,
            plugin = %params.plugin,
            permissions = permissions.len(),
            "Installation prepared"
        );
        Ok(PreparedSetup {
            config,
            permissions,
        })
    }

    /// Revokes matching everything `prepare_installation` granted
    pub fn prepare_uninstallation(
        dao: &Address,
        plugin: &Address,
        parent: Option<&Address>,
    ) -> Vec<PermissionChange> {
        Self::grants(dao, plugin, parent)
            .iter()
            .map(PermissionChange::inverse)
            .collect()
    }

    fn grants(dao: &Address, plugin: &Address, parent: Option<&Address>) -> Vec<PermissionChange> {
        let mut changes: Vec<PermissionChange> = DAO_CAPABILITIES
            .iter()
            .map(|capability| PermissionChange::grant(plugin.clone(), dao.clone(), *capability))
            .collect();
        changes.push(PermissionChange::grant(
            dao.clone(),
            plugin.clone(),
            Capability::Execute,
        ));
        if let Some(parent) = parent {
            changes.push(PermissionChange::grant(
                plugin.clone(),
                parent.clone(),
                Capability::DenyProposal,
            ));
        }
        changes
    }
}
