//! Administrative permission interface
//!
//! The host's access-control layer grants capabilities to (principal, scope)
//! pairs. The engine asks before every administrative mutation and hands
//! back the changes it wants applied (root escrow on attach and deactivate).

use multisig_types::{Address, Capability, MultisigResult, PermissionChange, PermissionOp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockWriteGuard};
use tracing::debug;

pub trait PermissionManager: Send + Sync {
    /// Whether `who` holds `capability` on `scope`
    fn has_capability(&self, who: &Address, scope: &Address, capability: Capability) -> bool;

    /// Apply a batch of changes in order
    fn apply(&self, changes: &[PermissionChange]) -> MultisigResult<()>;
}

/// One row of the permission table
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Grant {
    pub scope: Address,
    pub who: Address,
    pub capability: Capability,
}

/// Permission table held in memory
#[derive(Debug, Default)]
pub struct InMemoryPermissions {
    grants: RwLock<BTreeSet<Grant>>,
}

impl InMemoryPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        Self {
            grants: RwLock::new(grants.into_iter().collect()),
        }
    }

    pub fn grant(&self, scope: &Address, who: &Address, capability: Capability) {
        self.table().insert(Grant {
            scope: scope.clone(),
            who: who.clone(),
            capability,
        });
    }

    pub fn revoke(&self, scope: &Address, who: &Address, capability: Capability) {
        self.table().remove(&Grant {
            scope: scope.clone(),
            who: who.clone(),
            capability,
        });
    }

    /// Snapshot of every grant
    pub fn grants(&self) -> Vec<Grant> {
        match self.grants.read() {
            Ok(grants) => grants.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn table(&self) -> RwLockWriteGuard<'_, BTreeSet<Grant>> {
        self.grants
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PermissionManager for InMemoryPermissions {
    fn has_capability(&self, who: &Address, scope: &Address, capability: Capability) -> bool {
        let key = Grant {
            scope: scope.clone(),
            who: who.clone(),
            capability,
        };
        // Fail closed on a poisoned table
        self.grants
            .read()
            .map(|grants| grants.contains(&key))
            .unwrap_or(false)
    }

    fn apply(&self, changes: &[PermissionChange]) -> MultisigResult<()> {
        let mut grants = self.table();

        for change in changes {
            let row = Grant {
                scope: change.scope.clone(),
                who: change.who.clone(),
                capability: change.capability,
            };
            debug!(
                op = ?change.op,
                scope = %row.scope,
                who = %row.who,
                capability = %row.capability,
                "Applying permission change"
            );
            match change.op {
                PermissionOp::Grant => {
                    grants.insert(row);
                }
                PermissionOp::Revoke => {
                    grants.remove(&row);
                }
            }
        }
        Ok(())
    }
}
