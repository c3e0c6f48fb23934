//! Intervention Subsystem: parent link and veto records
//!
//! The child keeps a one-directional link to its parent. Denials are keyed
//! by proposal id; under [`InterventionPolicy::Monotonic`] they are
//! permanent.

use multisig_types::{
    Address, InterventionPolicy, MultisigError, MultisigResult, ParentLink, ProposalId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InterventionState {
    link: Option<ParentLink>,
    denied: BTreeSet<ProposalId>,
    policy: InterventionPolicy,
    deactivated: bool,
    /// The dao's ROOT capability is currently held by the plugin
    root_escrowed: bool,
}

impl InterventionState {
    pub fn new(policy: InterventionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> InterventionPolicy {
        self.policy
    }

    pub fn link(&self) -> Option<&ParentLink> {
        self.link.as_ref()
    }

    pub fn parent(&self) -> Option<&Address> {
        self.link.as_ref().map(|link| &link.parent)
    }

    pub fn is_parent(&self, who: &Address) -> bool {
        self.parent() == Some(who)
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    pub fn root_escrowed(&self) -> bool {
        self.root_escrowed
    }

    pub(crate) fn set_root_escrowed(&mut self, escrowed: bool) {
        self.root_escrowed = escrowed;
    }

    /// Install `link`, replacing any existing one. Returns the previous link.
    ///
    /// A hard link is only replaced when its own parent asks.
    pub fn attach(
        &mut self,
        caller: &Address,
        link: ParentLink,
    ) -> MultisigResult<Option<ParentLink>> {
        if self.deactivated {
            return Err(MultisigError::action_failed(
                "plugin is deactivated and cannot be attached",
            ));
        }
        if let Some(current) = &self.link {
            if current.hard_link && &current.parent != caller {
                warn!(parent = %current.parent, by = %caller, "Attempted to replace a hard link");
                return Err(MultisigError::action_failed(
                    "hard link can only be replaced by the parent",
                ));
            }
        }
        Ok(self.link.replace(link))
    }

    /// Whether `caller` may clear the link.
    ///
    /// The parent always may. The child's own dao may only clear a soft link.
    pub fn check_detach(&self, caller: &Address, dao: &Address) -> MultisigResult<&ParentLink> {
        let link = self
            .link
            .as_ref()
            .ok_or_else(|| MultisigError::action_failed("no parent link to clear"))?;

        if &link.parent == caller {
            return Ok(link);
        }
        if caller == dao {
            if link.hard_link {
                warn!(parent = %link.parent, "Child attempted to clear a hard link");
                return Err(MultisigError::action_failed(
                    "hard link can only be cleared by the parent",
                ));
            }
            return Ok(link);
        }
        Err(MultisigError::unauthorized(format!(
            "{caller} may not clear the parent link"
        )))
    }

    pub fn detach(&mut self, caller: &Address, dao: &Address) -> MultisigResult<ParentLink> {
        self.check_detach(caller, dao)?;
        self.link
            .take()
            .ok_or_else(|| MultisigError::action_failed("no parent link to clear"))
    }

    /// Record an intervention. Returns whether the denial state changed.
    pub fn record(&mut self, proposal_id: ProposalId, deny: bool) -> bool {
        if deny {
            return self.denied.insert(proposal_id);
        }
        match self.policy {
            InterventionPolicy::Monotonic => {
                debug!(proposal_id = %proposal_id, "Monotonic policy keeps existing denial");
                false
            }
            InterventionPolicy::Revocable => self.denied.remove(&proposal_id),
        }
    }

    pub fn is_denied(&self, proposal_id: ProposalId) -> bool {
        self.denied.contains(&proposal_id)
    }

    pub fn denied(&self) -> impl Iterator<Item = &ProposalId> {
        self.denied.iter()
    }

    /// Give up parent supervision for good. The link must already be cleared.
    pub fn deactivate(&mut self) -> MultisigResult<()> {
        if let Some(link) = &self.link {
            return Err(MultisigError::action_failed(format!(
                "still attached to {}",
                link.parent
            )));
        }
        if self.deactivated {
            return Err(MultisigError::action_failed("already deactivated"));
        }
        self.deactivated = true;
        Ok(())
    }
}
