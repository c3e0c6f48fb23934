//! Governance Engine: the public face of one multisig instance
//!
//! Every mutating operation runs as a transaction: it works on a copy of
//! the state, collects permission changes on the side, and only commits both
//! when it succeeds. A failed operation leaves no trace, events included.
//!
//! Actions aimed at the engine's own plugin handle carrying a
//! [`GovernanceCall`] are applied by the engine itself during execution with
//! the dao as caller. Everything else goes to the host executor as a single
//! batch after the internal calls.

use crate::{
    ApprovalPolicy, AuthorizationPredicate, Clock, EngineConfig, EngineState, ExecutionGate,
    HostExecutor, MetadataStore, PermissionManager,
};
use chrono::{DateTime, Utc};
use multisig_types::{
    Action, ActionOutcome, ActionPayload, Address, Capability, ContentRef, EventLog,
    ExecutionReport, FailureMap, GovernanceCall, GovernanceEvent, Group, GroupId, MultisigError,
    MultisigResult, MultisigSettings, ParentLink, PermissionChange, PermissionOp, Proposal,
    ProposalDraft, ProposalId, ProposalParameters, ProposalStatus, MAX_ACTIONS,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// External collaborators of an engine
#[derive(Clone)]
pub struct Environment {
    pub clock: Arc<dyn Clock>,
    pub permissions: Arc<dyn PermissionManager>,
    pub executor: Arc<dyn HostExecutor>,
    pub metadata: Arc<dyn MetadataStore>,
}

impl Environment {
    pub fn new(
        clock: Arc<dyn Clock>,
        permissions: Arc<dyn PermissionManager>,
        executor: Arc<dyn HostExecutor>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            clock,
            permissions,
            executor,
            metadata,
        }
    }
}

pub struct GovernanceEngine {
    env: Environment,
    state: EngineState,
}

impl GovernanceEngine {
    /// Create an engine, register the initial members and validate settings
    pub fn initialize(config: EngineConfig, env: Environment) -> MultisigResult<Self> {
        config.validate()?;

        let now = env.clock.now();
        let mut state = EngineState::new(&config);
        let added = state.members.add(config.members.iter().cloned());
        if !added.is_empty() {
            state
                .events
                .emit(now, GovernanceEvent::MembersAdded { members: added });
        }
        state.events.emit(
            now,
            GovernanceEvent::SettingsUpdated {
                settings: config.settings,
            },
        );

        info!(
            dao = %config.dao,
            plugin = %config.plugin,
            members = state.members.len(),
            min_approvals = config.settings.min_approvals,
            "Governance engine initialized"
        );
        Ok(Self { env, state })
    }

    /// Resume an engine from a persisted state
    pub fn from_state(state: EngineState, env: Environment) -> Self {
        Self { env, state }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn into_state(self) -> EngineState {
        self.state
    }

    pub fn dao(&self) -> &Address {
        &self.state.dao
    }

    pub fn plugin(&self) -> &Address {
        &self.state.plugin
    }

    /// Whether `who` holds `capability` on this engine's plugin
    pub fn has_capability(&self, who: &Address, capability: Capability) -> bool {
        self.env
            .permissions
            .has_capability(who, &self.state.plugin, capability)
    }

    // ------------------------------------------------------------------
    // Membership & groups
    // ------------------------------------------------------------------

    pub fn add_members(
        &mut self,
        caller: &Address,
        members: Vec<Address>,
    ) -> MultisigResult<Vec<Address>> {
        self.transact("add_members", |txn| txn.add_members(caller, members))
    }

    /// Remove from the global list only; group memberships are kept
    pub fn remove_members(
        &mut self,
        caller: &Address,
        members: Vec<Address>,
    ) -> MultisigResult<Vec<Address>> {
        self.transact("remove_members", |txn| txn.remove_members(caller, members))
    }

    pub fn update_multisig_settings(
        &mut self,
        caller: &Address,
        settings: MultisigSettings,
    ) -> MultisigResult<()> {
        self.transact("update_multisig_settings", |txn| {
            txn.update_settings(caller, settings)
        })
    }

    /// Create a group. Initial members are also added to the global list.
    pub fn create_group(
        &mut self,
        caller: &Address,
        name: &str,
        members: Vec<Address>,
        vault: Address,
        allocation: Option<u128>,
    ) -> MultisigResult<GroupId> {
        self.transact("create_group", |txn| {
            txn.create_group(caller, name, members, vault, allocation)
        })
    }

    pub fn add_members_to_group(
        &mut self,
        caller: &Address,
        group_id: GroupId,
        members: Vec<Address>,
    ) -> MultisigResult<Vec<Address>> {
        self.transact("add_members_to_group", |txn| {
            txn.add_members_to_group(caller, group_id, members)
        })
    }

    pub fn remove_members_from_group(
        &mut self,
        caller: &Address,
        group_id: GroupId,
        members: Vec<Address>,
    ) -> MultisigResult<Vec<Address>> {
        self.transact("remove_members_from_group", |txn| {
            txn.remove_members_from_group(caller, group_id, members)
        })
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.state.members.is_member(address)
    }

    pub fn is_member_in_group(&self, address: &Address, group_id: GroupId) -> MultisigResult<bool> {
        self.state.groups.is_member_in_group(address, group_id)
    }

    pub fn members(&self) -> Vec<Address> {
        self.state.members.members()
    }

    pub fn group(&self, group_id: GroupId) -> MultisigResult<&Group> {
        self.state.groups.get(group_id)
    }

    /// Move tokens out of a group's vault. Any group member may do this.
    pub fn withdraw_from_vault(
        &mut self,
        caller: &Address,
        group_id: GroupId,
        token: Address,
        amount: u128,
        to: Address,
    ) -> MultisigResult<ActionOutcome> {
        self.transact("withdraw_from_vault", |txn| {
            txn.withdraw_from_vault(caller, group_id, token, amount, to)
        })
    }

    // ------------------------------------------------------------------
    // Proposals
    // ------------------------------------------------------------------

    /// Publish a proposal description and get the reference to store
    pub fn publish_metadata(&self, content: &[u8]) -> ContentRef {
        self.env.metadata.publish(content)
    }

    pub fn create_proposal(
        &mut self,
        caller: &Address,
        draft: ProposalDraft,
    ) -> MultisigResult<ProposalId> {
        self.transact("create_proposal", |txn| txn.create_proposal(caller, draft))
    }

    /// Approve; with `try_execution`, execute if the gate would pass.
    /// Returns the execution report when execution happened.
    pub fn approve(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        try_execution: bool,
    ) -> MultisigResult<Option<ExecutionReport>> {
        self.transact("approve", |txn| {
            txn.approve(caller, proposal_id, try_execution)
        })
    }

    pub fn execute(&mut self, proposal_id: ProposalId) -> MultisigResult<ExecutionReport> {
        self.transact("execute", |txn| txn.execute(proposal_id))
    }

    pub fn cancel_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
    ) -> MultisigResult<()> {
        self.transact("cancel_proposal", |txn| {
            txn.cancel_proposal(caller, proposal_id)
        })
    }

    pub fn proposal(&self, proposal_id: ProposalId) -> MultisigResult<&Proposal> {
        self.state.proposals.get(proposal_id)
    }

    pub fn can_approve(&self, proposal_id: ProposalId, address: &Address) -> MultisigResult<bool> {
        let proposal = self.state.proposals.get(proposal_id)?;
        let denied = self.state.interventions.is_denied(proposal_id);
        Ok(ApprovalPolicy::new(&self.state.members, &self.state.groups).can_approve(
            proposal,
            denied,
            address,
            self.env.clock.now(),
        ))
    }

    /// Whether `execute` would pass the gate right now
    pub fn can_execute(&self, proposal_id: ProposalId) -> MultisigResult<bool> {
        let proposal = self.state.proposals.get(proposal_id)?;
        let granted = self.env.permissions.has_capability(
            &self.state.plugin,
            &self.state.dao,
            Capability::Execute,
        );
        Ok(
            ExecutionGate::new(&self.state.interventions, &self.state.execute_condition)
                .check(
                    proposal,
                    self.env.clock.now(),
                    &self.state.plugin,
                    &self.state.dao,
                    granted,
                )
                .is_ok(),
        )
    }

    pub fn proposal_status(&self, proposal_id: ProposalId) -> MultisigResult<ProposalStatus> {
        let proposal = self.state.proposals.get(proposal_id)?;
        Ok(proposal.status(
            self.env.clock.now(),
            self.state.interventions.is_denied(proposal_id),
        ))
    }

    // ------------------------------------------------------------------
    // Parent / child
    // ------------------------------------------------------------------

    /// Attach to a parent. Only the dao itself may do this, normally through
    /// one of its own proposals.
    pub fn set_parent(
        &mut self,
        caller: &Address,
        parent: Address,
        hard_link: bool,
    ) -> MultisigResult<()> {
        self.transact("set_parent", |txn| txn.set_parent(caller, parent, hard_link))
    }

    pub fn unset_parent(&mut self, caller: &Address) -> MultisigResult<()> {
        self.transact("unset_parent", |txn| txn.unset_parent(caller))
    }

    /// Veto (or, under a revocable policy, un-veto) a proposal
    pub fn intervene(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        deny: bool,
    ) -> MultisigResult<()> {
        self.transact("intervene", |txn| txn.intervene(caller, proposal_id, deny))
    }

    pub fn deny_proposal(&mut self, caller: &Address, proposal_id: ProposalId) -> MultisigResult<()> {
        self.transact("deny_proposal", |txn| txn.deny_proposal(caller, proposal_id))
    }

    pub fn deactivate(&mut self, caller: &Address) -> MultisigResult<()> {
        self.transact("deactivate", |txn| txn.deactivate(caller))
    }

    pub fn upgrade(&mut self, caller: &Address, build: u16) -> MultisigResult<()> {
        self.transact("upgrade", |txn| txn.upgrade(caller, build))
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.state.interventions.link()
    }

    pub fn is_denied(&self, proposal_id: ProposalId) -> bool {
        self.state.interventions.is_denied(proposal_id)
    }

    pub fn is_deactivated(&self) -> bool {
        self.state.interventions.is_deactivated()
    }

    pub fn settings(&self) -> &MultisigSettings {
        &self.state.settings
    }

    pub fn events(&self) -> &EventLog {
        &self.state.events
    }

    fn transact<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Txn<'_>) -> MultisigResult<T>,
    ) -> MultisigResult<T> {
        let mut txn = Txn {
            env: &self.env,
            state: self.state.clone(),
            permission_changes: Vec::new(),
            now: self.env.clock.now(),
        };

        let value = match f(&mut txn) {
            Ok(value) => value,
            Err(err) => {
                warn!(operation, error = %err, "Operation rejected, state unchanged");
                return Err(err);
            }
        };

        let Txn {
            state,
            permission_changes,
            ..
        } = txn;
        if !permission_changes.is_empty() {
            self.env.permissions.apply(&permission_changes)?;
        }
        self.state = state;
        Ok(value)
    }
}

/// Working copy of the state for one operation
struct Txn<'e> {
    env: &'e Environment,
    state: EngineState,
    permission_changes: Vec<PermissionChange>,
    now: DateTime<Utc>,
}

impl Txn<'_> {
    /// Permission lookup that sees this transaction's own pending changes
    fn has_capability(&self, who: &Address, scope: &Address, capability: Capability) -> bool {
        self.permission_changes
            .iter()
            .rev()
            .find(|change| change.matches(who, scope, capability))
            .map(|change| change.op == PermissionOp::Grant)
            .unwrap_or_else(|| self.env.permissions.has_capability(who, scope, capability))
    }

    fn require(&self, caller: &Address, capability: Capability) -> MultisigResult<()> {
        if self.has_capability(caller, &self.state.plugin, capability) {
            return Ok(());
        }
        warn!(caller = %caller, capability = %capability, "Missing capability");
        Err(MultisigError::unauthorized(format!(
            "{caller} lacks {capability} on {}",
            self.state.plugin
        )))
    }

    fn require_dao(&self, caller: &Address, operation: &str) -> MultisigResult<()> {
        if caller == &self.state.dao {
            return Ok(());
        }
        Err(MultisigError::unauthorized(format!(
            "{operation} must be called by {}",
            self.state.dao
        )))
    }

    fn emit(&mut self, event: GovernanceEvent) {
        self.state.events.emit(self.now, event);
    }

    fn add_members(&mut self, caller: &Address, members: Vec<Address>) -> MultisigResult<Vec<Address>> {
        self.require(caller, Capability::UpdateAddresses)?;
        let added = self.state.members.add(members);
        if !added.is_empty() {
            info!(count = added.len(), "Members added");
            self.emit(GovernanceEvent::MembersAdded {
                members: added.clone(),
            });
        }
        Ok(added)
    }

    fn remove_members(
        &mut self,
        caller: &Address,
        members: Vec<Address>,
    ) -> MultisigResult<Vec<Address>> {
        self.require(caller, Capability::UpdateAddresses)?;
        let removed = self.state.members.remove(members);
        if !removed.is_empty() {
            info!(count = removed.len(), "Members removed");
            self.emit(GovernanceEvent::MembersRemoved {
                members: removed.clone(),
            });
        }
        Ok(removed)
    }

    fn update_settings(&mut self, caller: &Address, settings: MultisigSettings) -> MultisigResult<()> {
        self.require(caller, Capability::UpdateMultisigSettings)?;
        settings.validate()?;
        self.state.settings = settings;
        info!(
            min_approvals = settings.min_approvals,
            only_listed = settings.only_listed,
            "Multisig settings updated"
        );
        self.emit(GovernanceEvent::SettingsUpdated { settings });
        Ok(())
    }

    fn create_group(
        &mut self,
        caller: &Address,
        name: &str,
        members: Vec<Address>,
        vault: Address,
        allocation: Option<u128>,
    ) -> MultisigResult<GroupId> {
        self.require(caller, Capability::CreateGroup)?;

        let added = self.state.members.add(members.iter().cloned());
        if !added.is_empty() {
            self.emit(GovernanceEvent::MembersAdded { members: added });
        }

        let group_id = self
            .state
            .groups
            .create(name, members, vault.clone(), allocation);
        self.emit(GovernanceEvent::GroupCreated {
            group_id,
            name: name.to_string(),
            vault,
        });
        Ok(group_id)
    }

    fn add_members_to_group(
        &mut self,
        caller: &Address,
        group_id: GroupId,
        members: Vec<Address>,
    ) -> MultisigResult<Vec<Address>> {
        self.require(caller, Capability::UpdateAddresses)?;
        let added = self.state.groups.add_members(group_id, members)?;
        if !added.is_empty() {
            self.emit(GovernanceEvent::GroupMembersAdded {
                group_id,
                members: added.clone(),
            });
        }
        Ok(added)
    }

    fn remove_members_from_group(
        &mut self,
        caller: &Address,
        group_id: GroupId,
        members: Vec<Address>,
    ) -> MultisigResult<Vec<Address>> {
        self.require(caller, Capability::UpdateAddresses)?;
        let removed = self.state.groups.remove_members(group_id, members)?;
        if !removed.is_empty() {
            self.emit(GovernanceEvent::GroupMembersRemoved {
                group_id,
                members: removed.clone(),
            });
        }
        Ok(removed)
    }

    fn withdraw_from_vault(
        &mut self,
        caller: &Address,
        group_id: GroupId,
        token: Address,
        amount: u128,
        to: Address,
    ) -> MultisigResult<ActionOutcome> {
        let group = self.state.groups.get(group_id)?;
        if !group.is_member(caller) {
            return Err(MultisigError::NotGroupMember {
                group_id,
                address: caller.clone(),
            });
        }
        let vault = group.vault.clone();

        let action = Action::transfer(token.clone(), vault.clone(), to.clone(), amount);
        let outcome = self
            .env
            .executor
            .dispatch(&vault, &[action], FailureMap::none())?
            .into_iter()
            .next()
            .ok_or_else(|| MultisigError::action_failed("host returned no outcome"))?;

        info!(group_id = %group_id, token = %token, to = %to, amount, "Vault withdrawal");
        self.emit(GovernanceEvent::VaultWithdrawal {
            group_id,
            token,
            to,
            amount,
        });
        Ok(outcome)
    }

    fn create_proposal(&mut self, caller: &Address, draft: ProposalDraft) -> MultisigResult<ProposalId> {
        if draft.actions.len() > MAX_ACTIONS {
            return Err(MultisigError::TooManyActions {
                count: draft.actions.len(),
                limit: MAX_ACTIONS,
            });
        }

        let start = draft.start_date.unwrap_or(self.now);
        if draft.end_date < start {
            return Err(MultisigError::DateOutOfBounds {
                start,
                end: draft.end_date,
            });
        }

        let policy = ApprovalPolicy::new(&self.state.members, &self.state.groups);
        policy.check_creator(&self.state.settings, caller, draft.group_id)?;
        let parameters = ProposalParameters {
            min_approvals: self.state.settings.min_approvals,
            only_listed: self.state.settings.only_listed,
            snapshot_version: policy.scope_version(draft.group_id)?,
            start_date: start,
            end_date: draft.end_date,
        };

        let approve = draft.approve;
        let try_execution = draft.try_execution;
        let metadata = draft.metadata.clone();
        let group_id = draft.group_id;
        let end_date = draft.end_date;

        let proposal_id = self
            .state
            .proposals
            .insert(caller.clone(), draft, parameters, self.now);

        info!(
            proposal_id = %proposal_id,
            creator = %caller,
            group_id = ?group_id,
            "Proposal created"
        );
        self.emit(GovernanceEvent::ProposalCreated {
            proposal_id,
            creator: caller.clone(),
            metadata,
            group_id,
            start_date: start,
            end_date,
        });

        if approve {
            self.approve(caller, proposal_id, try_execution)?;
        }
        Ok(proposal_id)
    }

    fn approve(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        try_execution: bool,
    ) -> MultisigResult<Option<ExecutionReport>> {
        let proposal = self.state.proposals.get(proposal_id)?;
        let denied = self.state.interventions.is_denied(proposal_id);
        let policy = ApprovalPolicy::new(&self.state.members, &self.state.groups);
        if !policy.can_approve(proposal, denied, caller, self.now) {
            debug!(proposal_id = %proposal_id, approver = %caller, "Approval refused");
            return Err(MultisigError::ApprovalCastForbidden {
                proposal_id,
                approver: caller.clone(),
            });
        }

        let proposal = self.state.proposals.get_mut(proposal_id)?;
        proposal.approvals.insert(caller.clone());
        let approvals = proposal.approval_count();

        info!(
            proposal_id = %proposal_id,
            approver = %caller,
            approvals,
            "Proposal approved"
        );
        self.emit(GovernanceEvent::Approved {
            proposal_id,
            approver: caller.clone(),
        });

        if try_execution && self.gate_check(proposal_id).is_ok() {
            return self.execute(proposal_id).map(Some);
        }
        Ok(None)
    }

    fn gate_check(&self, proposal_id: ProposalId) -> MultisigResult<()> {
        let proposal = self.state.proposals.get(proposal_id)?;
        let granted = self.has_capability(&self.state.plugin, &self.state.dao, Capability::Execute);
        ExecutionGate::new(&self.state.interventions, &self.state.execute_condition).check(
            proposal,
            self.now,
            &self.state.plugin,
            &self.state.dao,
            granted,
        )
    }

    fn execute(&mut self, proposal_id: ProposalId) -> MultisigResult<ExecutionReport> {
        self.gate_check(proposal_id)?;

        let proposal = self.state.proposals.get_mut(proposal_id)?;
        proposal.executed = true;
        let proposal = proposal.clone();

        let outcomes = self.dispatch(&proposal)?;
        let report = ExecutionReport::new(proposal_id, outcomes);

        info!(
            proposal_id = %proposal_id,
            actions = proposal.actions.len(),
            failed = report.outcomes.iter().filter(|o| !o.succeeded).count(),
            "Proposal executed"
        );
        self.emit(GovernanceEvent::ProposalExecuted {
            proposal_id,
            failure_map: report.failure_map.0,
        });
        Ok(report)
    }

    fn dispatch(&mut self, proposal: &Proposal) -> MultisigResult<Vec<ActionOutcome>> {
        let plugin = self.state.plugin.clone();
        let dao = self.state.dao.clone();
        let allow = proposal.allow_failure_map;

        let mut outcomes = Vec::with_capacity(proposal.actions.len());
        let mut host_actions = Vec::new();
        let mut host_indices = Vec::new();
        let mut host_allow = FailureMap::none();

        for (index, action) in proposal.actions.iter().enumerate() {
            let call = match &action.payload {
                ActionPayload::Governance(call) if action.target == plugin => call,
                _ => {
                    if allow.allows(index) {
                        host_allow.set(host_actions.len());
                    }
                    host_indices.push(index);
                    host_actions.push(action.clone());
                    continue;
                }
            };

            let saved_state = self.state.clone();
            let saved_changes = self.permission_changes.len();
            match self.apply_governance(&dao, call) {
                Ok(()) => outcomes.push(ActionOutcome::success(index, action.target.clone())),
                Err(err) if allow.allows(index) => {
                    debug!(index, call = call.name(), error = %err, "Tolerated action failure");
                    self.state = saved_state;
                    self.permission_changes.truncate(saved_changes);
                    outcomes.push(ActionOutcome::failure(
                        index,
                        action.target.clone(),
                        err.to_string(),
                    ));
                }
                Err(err) => {
                    return Err(MultisigError::action_failed(format!(
                        "action {index} ({}) failed: {err}",
                        call.name()
                    )));
                }
            }
        }

        if !host_actions.is_empty() {
            let results = self.env.executor.dispatch(&dao, &host_actions, host_allow)?;
            for outcome in results {
                let index = host_indices
                    .get(outcome.index)
                    .copied()
                    .unwrap_or(outcome.index);
                outcomes.push(ActionOutcome { index, ..outcome });
            }
        }

        outcomes.sort_by_key(|outcome| outcome.index);
        Ok(outcomes)
    }

    fn apply_governance(&mut self, dao: &Address, call: &GovernanceCall) -> MultisigResult<()> {
        debug!(call = call.name(), "Applying governance call");
        match call {
            GovernanceCall::AddMembers(members) => self.add_members(dao, members.clone()).map(drop),
            GovernanceCall::RemoveMembers(members) => {
                self.remove_members(dao, members.clone()).map(drop)
            }
            GovernanceCall::UpdateSettings(settings) => self.update_settings(dao, *settings),
            GovernanceCall::SetParent { parent, hard_link } => {
                self.set_parent(dao, parent.clone(), *hard_link)
            }
            GovernanceCall::UnsetParent => self.unset_parent(dao),
            GovernanceCall::Intervene { proposal_id, deny } => {
                self.intervene(dao, *proposal_id, *deny)
            }
            GovernanceCall::Deactivate => self.deactivate(dao),
        }
    }

    fn cancel_proposal(&mut self, caller: &Address, proposal_id: ProposalId) -> MultisigResult<()> {
        let now = self.now;
        let denied = self.state.interventions.is_denied(proposal_id);
        let proposal = self.state.proposals.get_mut(proposal_id)?;

        if &proposal.creator != caller {
            return Err(MultisigError::unauthorized(format!(
                "only the creator may cancel proposal {proposal_id}"
            )));
        }
        if proposal.status(now, denied).is_terminal() {
            return Err(MultisigError::ProposalClosed(proposal_id));
        }

        proposal.cancelled = true;
        info!(proposal_id = %proposal_id, "Proposal cancelled");
        self.emit(GovernanceEvent::ProposalCancelled { proposal_id });
        Ok(())
    }

    fn set_parent(&mut self, caller: &Address, parent: Address, hard_link: bool) -> MultisigResult<()> {
        self.require_dao(caller, "set_parent")?;
        if parent == self.state.dao || parent == self.state.plugin {
            return Err(MultisigError::action_failed("an engine cannot be its own parent"));
        }

        let dao = self.state.dao.clone();
        let previous = self
            .state
            .interventions
            .attach(caller, ParentLink::new(parent.clone(), hard_link))?;
        if let Some(previous) = previous {
            if previous.parent != parent {
                self.release_parent(&previous.parent);
                self.emit(GovernanceEvent::ParentUnset {
                    parent: previous.parent,
                    child: dao.clone(),
                });
            }
        }

        self.escrow_root();

        info!(parent = %parent, hard_link, "Parent set");
        self.emit(GovernanceEvent::ParentSet {
            parent,
            child: dao,
            hard_link,
        });
        Ok(())
    }

    /// Move the dao's ROOT on itself to the plugin, once
    fn escrow_root(&mut self) {
        let dao = self.state.dao.clone();
        let plugin = self.state.plugin.clone();
        if self.state.interventions.root_escrowed()
            || !self.has_capability(&dao, &dao, Capability::Root)
        {
            return;
        }
        self.permission_changes
            .push(PermissionChange::revoke(dao.clone(), dao.clone(), Capability::Root));
        self.permission_changes
            .push(PermissionChange::grant(dao, plugin, Capability::Root));
        self.state.interventions.set_root_escrowed(true);
        debug!("ROOT escrowed with plugin");
    }

    /// Drop a former parent's veto grant on the plugin
    fn release_parent(&mut self, parent: &Address) {
        let plugin = self.state.plugin.clone();
        if !self.has_capability(parent, &plugin, Capability::DenyProposal) {
            return;
        }
        self.permission_changes.push(PermissionChange::revoke(
            plugin,
            parent.clone(),
            Capability::DenyProposal,
        ));
        debug!(parent = %parent, "Parent veto grant revoked");
    }

    fn unset_parent(&mut self, caller: &Address) -> MultisigResult<()> {
        let dao = self.state.dao.clone();
        let link = self.state.interventions.detach(caller, &dao)?;
        self.release_parent(&link.parent);
        info!(parent = %link.parent, by = %caller, "Parent unset");
        self.emit(GovernanceEvent::ParentUnset {
            parent: link.parent,
            child: dao,
        });
        Ok(())
    }

    fn intervene(&mut self, caller: &Address, proposal_id: ProposalId, deny: bool) -> MultisigResult<()> {
        let plugin = self.state.plugin.clone();
        let authorized = self.state.interventions.is_parent(caller)
            || self.has_capability(caller, &plugin, Capability::DenyProposal);
        if !authorized {
            return Err(MultisigError::unauthorized(format!(
                "{caller} may not intervene on {plugin}"
            )));
        }
        self.state.proposals.get(proposal_id)?;

        let changed = self.state.interventions.record(proposal_id, deny);
        warn!(proposal_id = %proposal_id, deny, changed, by = %caller, "Proposal intervened");
        self.emit(GovernanceEvent::ProposalIntervened {
            proposal_id,
            rejected: deny,
        });
        Ok(())
    }

    fn deny_proposal(&mut self, caller: &Address, proposal_id: ProposalId) -> MultisigResult<()> {
        self.require(caller, Capability::DenyProposal)?;
        self.state.proposals.get(proposal_id)?;

        self.state.interventions.record(proposal_id, true);
        warn!(proposal_id = %proposal_id, by = %caller, "Proposal denied");
        self.emit(GovernanceEvent::ProposalDenied {
            proposal_id,
            by: caller.clone(),
        });
        Ok(())
    }

    fn deactivate(&mut self, caller: &Address) -> MultisigResult<()> {
        self.require_dao(caller, "deactivate")?;
        self.state.interventions.deactivate()?;

        let dao = self.state.dao.clone();
        let plugin = self.state.plugin.clone();
        if self.state.interventions.root_escrowed() {
            self.permission_changes
                .push(PermissionChange::revoke(dao.clone(), plugin.clone(), Capability::Root));
            self.permission_changes
                .push(PermissionChange::grant(dao.clone(), dao, Capability::Root));
            self.state.interventions.set_root_escrowed(false);
        }
        let supervisor = match &self.state.execute_condition {
            AuthorizationPredicate::ParentCondition { parent } => Some(parent.clone()),
            _ => None,
        };
        if let Some(parent) = supervisor {
            self.release_parent(&parent);
        }
        self.state.execute_condition = AuthorizationPredicate::AlwaysAllow;

        info!(plugin = %plugin, "Plugin deactivated");
        self.emit(GovernanceEvent::Deactivated { plugin });
        Ok(())
    }

    fn upgrade(&mut self, caller: &Address, build: u16) -> MultisigResult<()> {
        self.require(caller, Capability::UpgradePlugin)?;
        let from_build = self.state.build;
        if build <= from_build {
            return Err(MultisigError::action_failed(format!(
                "cannot move from build {from_build} to {build}"
            )));
        }
        self.state.build = build;
        info!(from_build, to_build = build, "Plugin upgraded");
        self.emit(GovernanceEvent::PluginUpgraded {
            from_build,
            to_build: build,
        });
        Ok(())
    }
}
