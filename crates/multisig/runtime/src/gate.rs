//! Execution Gate: the single check before any dispatch
//!
//! `allowed = threshold and window hold
//!            AND NOT denied
//!            AND (no parent link OR the execute condition holds)
//!            AND the plugin holds EXECUTE on the dao`
//!
//! The execute condition is an injected [`AuthorizationPredicate`]; it is the
//! only place parent-vs-child trust is decided.

use crate::{ApprovalPolicy, InterventionState};
use chrono::{DateTime, Utc};
use multisig_types::{Address, MultisigError, MultisigResult, Proposal, ProposalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Condition attached to the plugin's EXECUTE grant on the dao
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorizationPredicate {
    #[default]
    AlwaysAllow,
    /// Grantee must be one of `allowed`
    ListMembership { allowed: BTreeSet<Address> },
    /// Proposal not denied and the engine attached to `parent` (or to no one)
    ParentCondition { parent: Address },
}

/// Inputs to an [`AuthorizationPredicate`]
pub struct AuthorizationRequest<'a> {
    /// Holder of the EXECUTE grant (the plugin)
    pub grantee: &'a Address,
    /// Where EXECUTE applies (the dao)
    pub grantor: &'a Address,
    pub proposal_id: ProposalId,
    pub interventions: &'a InterventionState,
}

impl AuthorizationPredicate {
    pub fn evaluate(&self, request: &AuthorizationRequest<'_>) -> bool {
        match self {
            Self::AlwaysAllow => true,
            Self::ListMembership { allowed } => allowed.contains(request.grantee),
            Self::ParentCondition { parent } => {
                !request.interventions.is_denied(request.proposal_id)
                    && request
                        .interventions
                        .parent()
                        .map_or(true, |linked| linked == parent)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AlwaysAllow => "always_allow",
            Self::ListMembership { .. } => "list_membership",
            Self::ParentCondition { .. } => "parent_condition",
        }
    }
}

pub struct ExecutionGate<'a> {
    interventions: &'a InterventionState,
    condition: &'a AuthorizationPredicate,
}

impl<'a> ExecutionGate<'a> {
    pub fn new(interventions: &'a InterventionState, condition: &'a AuthorizationPredicate) -> Self {
        Self {
            interventions,
            condition,
        }
    }

    /// Veto checks only: denial, parent condition, EXECUTE grant
    pub fn authorize(
        &self,
        proposal_id: ProposalId,
        plugin: &Address,
        dao: &Address,
        execute_granted: bool,
    ) -> MultisigResult<()> {
        if self.interventions.is_denied(proposal_id) {
            warn!(proposal_id = %proposal_id, "Execution vetoed by intervention");
            return Err(MultisigError::unauthorized(format!(
                "proposal {proposal_id} was denied"
            )));
        }

        if self.interventions.link().is_some() {
            let request = AuthorizationRequest {
                grantee: plugin,
                grantor: dao,
                proposal_id,
                interventions: self.interventions,
            };
            if !self.condition.evaluate(&request) {
                warn!(
                    proposal_id = %proposal_id,
                    condition = self.condition.name(),
                    "Execute condition rejected proposal"
                );
                return Err(MultisigError::unauthorized(format!(
                    "execute condition {} rejected proposal {proposal_id}",
                    self.condition.name()
                )));
            }
        }

        if !execute_granted {
            return Err(MultisigError::unauthorized(format!(
                "{plugin} lacks EXECUTE_PERMISSION on {dao}"
            )));
        }

        debug!(proposal_id = %proposal_id, "Execution gate passed");
        Ok(())
    }

    /// Full check. A denial outranks everything; otherwise lifecycle and
    /// threshold come first, then the veto checks.
    pub fn check(
        &self,
        proposal: &Proposal,
        now: DateTime<Utc>,
        plugin: &Address,
        dao: &Address,
        execute_granted: bool,
    ) -> MultisigResult<()> {
        if !self.interventions.is_denied(proposal.id) {
            ApprovalPolicy::check_executable(proposal, now)?;
        }
        self.authorize(proposal.id, plugin, dao, execute_granted)
    }
}
