//! Administrative capabilities and permission changes
//!
//! Capabilities are granted by the host's access-control layer to
//! (principal, scope) pairs. The engine only ever asks whether a principal
//! holds a capability on a scope.

use crate::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named capability checked before an administrative operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    UpdateAddresses,
    UpdateMultisigSettings,
    CreateGroup,
    UpgradePlugin,
    DenyProposal,
    Execute,
    SetTrustedRemote,
    /// Top-level authority of an entity over itself
    Root,
}

impl Capability {
    /// Canonical permission identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::UpdateAddresses => "UPDATE_ADDRESSES_PERMISSION",
            Self::UpdateMultisigSettings => "UPDATE_MULTISIG_SETTINGS_PERMISSION",
            Self::CreateGroup => "CREATE_GROUP_PERMISSION",
            Self::UpgradePlugin => "UPGRADE_PLUGIN_PERMISSION",
            Self::DenyProposal => "DENY_PROPOSAL_PERMISSION",
            Self::Execute => "EXECUTE_PERMISSION",
            Self::SetTrustedRemote => "SET_TRUSTED_REMOTE_PERMISSION",
            Self::Root => "ROOT_PERMISSION",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Grant or revoke
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionOp {
    Grant,
    Revoke,
}

/// A pending change to the host's permission table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionChange {
    pub op: PermissionOp,
    /// Where the capability applies
    pub scope: Address,
    /// Who holds it
    pub who: Address,
    pub capability: Capability,
}

impl PermissionChange {
    pub fn grant(scope: Address, who: Address, capability: Capability) -> Self {
        Self {
            op: PermissionOp::Grant,
            scope,
            who,
            capability,
        }
    }

    pub fn revoke(scope: Address, who: Address, capability: Capability) -> Self {
        Self {
            op: PermissionOp::Revoke,
            scope,
            who,
            capability,
        }
    }

    /// Whether this change concerns the given triple
    pub fn matches(&self, who: &Address, scope: &Address, capability: Capability) -> bool {
        self.capability == capability && &self.who == who && &self.scope == scope
    }

    /// The same change with the operation flipped
    pub fn inverse(&self) -> Self {
        let op = match self.op {
            PermissionOp::Grant => PermissionOp::Revoke,
            PermissionOp::Revoke => PermissionOp::Grant,
        };
        Self { op, ..self.clone() }
    }
}
