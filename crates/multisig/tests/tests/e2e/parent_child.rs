//! End-to-end test: parent oversight of a child multisig.
//!
//! Verifies that:
//! - a child links itself to a parent through its own proposal flow
//! - a hard link can only be dissolved or replaced by the parent
//! - a detached or replaced parent keeps no veto over the child
//! - a parent veto beats any number of approvals, whatever the call order
//! - deactivation hands ROOT back to the child dao once unlinked

use multisig_runtime::{InstallationParams, PermissionManager};
use multisig_tests::{addr, addrs, Harness, DAO, PLUGIN};
use multisig_types::{
    Action, Capability, GovernanceCall, GovernanceEvent, InterventionPolicy, MultisigError,
    MultisigSettings, ProposalId, ProposalStatus,
};

/// Pass a self-governed call through alice's single-approval proposal
fn govern(h: &mut Harness, call: GovernanceCall) -> ProposalId {
    let draft = h
        .draft(call.name())
        .with_action(Action::governance(h.plugin(), call))
        .approved()
        .try_execution();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    assert!(h.engine.proposal(id).unwrap().executed, "proposal executed");
    id
}

fn link(h: &mut Harness, hard_link: bool) {
    govern(
        h,
        GovernanceCall::SetParent {
            parent: addr("parent"),
            hard_link,
        },
    );
}

fn has_root(h: &Harness, who: &str) -> bool {
    h.permissions
        .has_capability(&addr(who), &addr(DAO), Capability::Root)
}

// ---------------------------------------------------------------------------
// Linking
// ---------------------------------------------------------------------------

#[test]
fn child_links_through_its_own_proposal() {
    let mut h = Harness::install(&["alice"], 1);
    link(&mut h, true);

    let link = h.engine.parent().expect("linked");
    assert_eq!(link.parent, addr("parent"));
    assert!(link.hard_link);
    assert!(has_root(&h, PLUGIN));
    assert!(!has_root(&h, DAO));
    assert!(h.engine.events().iter().any(|r| matches!(
        &r.event,
        GovernanceEvent::ParentSet { hard_link: true, .. }
    )));
}

#[test]
fn strangers_cannot_link() {
    let mut h = Harness::install(&["alice"], 1);
    assert!(matches!(
        h.engine.set_parent(&addr("alice"), addr("parent"), false),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(matches!(
        h.engine.set_parent(&addr(DAO), addr(DAO), false),
        Err(MultisigError::ActionFailed(_))
    ));
    assert!(h.engine.parent().is_none());
}

#[test]
fn relinking_overwrites_the_previous_parent() {
    let mut h = Harness::install(&["alice"], 1);
    link(&mut h, false);
    let dao = h.dao();
    h.engine.set_parent(&dao, addr("other-parent"), true).unwrap();

    assert_eq!(h.engine.parent().unwrap().parent, addr("other-parent"));
    assert!(h.engine.events().iter().any(|r| matches!(
        &r.event,
        GovernanceEvent::ParentUnset { parent, .. } if parent == &addr("parent")
    )));
}

// ---------------------------------------------------------------------------
// Unlinking
// ---------------------------------------------------------------------------

#[test]
fn hard_link_only_dissolved_by_parent() {
    let mut h = Harness::install(&["alice"], 1);
    link(&mut h, true);

    let dao = h.dao();
    assert!(matches!(
        h.engine.unset_parent(&dao),
        Err(MultisigError::ActionFailed(_))
    ));
    assert!(matches!(
        h.engine.unset_parent(&addr("mallory")),
        Err(MultisigError::Unauthorized(_))
    ));

    // Routing the same call through a child proposal fails too
    let draft = h
        .draft("escape")
        .with_action(Action::governance(h.plugin(), GovernanceCall::UnsetParent))
        .approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    assert!(matches!(
        h.engine.execute(id),
        Err(MultisigError::ActionFailed(_))
    ));
    assert!(h.engine.parent().is_some());

    h.engine.unset_parent(&addr("parent")).unwrap();
    assert!(h.engine.parent().is_none());
}

#[test]
fn hard_link_cannot_be_swapped_for_a_soft_one() {
    let mut h = Harness::install(&["alice"], 1);
    link(&mut h, true);

    let draft = h
        .draft("swap parent")
        .with_action(Action::governance(
            h.plugin(),
            GovernanceCall::SetParent {
                parent: addr("puppet"),
                hard_link: false,
            },
        ))
        .approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    assert!(matches!(
        h.engine.execute(id),
        Err(MultisigError::ActionFailed(_))
    ));

    let dao = h.dao();
    assert!(matches!(
        h.engine.set_parent(&dao, addr("puppet"), false),
        Err(MultisigError::ActionFailed(_))
    ));

    // With the link intact the follow-up escape still fails
    let draft = h
        .draft("escape")
        .with_action(Action::governance(h.plugin(), GovernanceCall::UnsetParent))
        .approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    assert!(h.engine.execute(id).is_err());

    let link = h.engine.parent().expect("still linked");
    assert_eq!(link.parent, addr("parent"));
    assert!(link.hard_link);
}

#[test]
fn soft_link_dissolved_by_either_side() {
    let mut h = Harness::install(&["alice"], 1);
    link(&mut h, false);
    govern(&mut h, GovernanceCall::UnsetParent);
    assert!(h.engine.parent().is_none());

    link(&mut h, false);
    h.engine.unset_parent(&addr("parent")).unwrap();
    assert!(h.engine.parent().is_none());

    assert!(matches!(
        h.engine.unset_parent(&addr("parent")),
        Err(MultisigError::ActionFailed(_))
    ));
}

// ---------------------------------------------------------------------------
// Interventions
// ---------------------------------------------------------------------------

#[test]
fn veto_after_threshold_blocks_execution() {
    let mut h = Harness::install_child(&["alice", "bob", "carol"], 2, "parent");
    let draft = h
        .draft("treasury move")
        .with_action(Action::call(addr("0xexchange"), 1_000, vec![]));
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    h.engine.approve(&addr("alice"), id, false).unwrap();
    h.engine.approve(&addr("bob"), id, false).unwrap();
    assert!(h.engine.can_execute(id).unwrap());

    h.engine.intervene(&addr("parent"), id, true).unwrap();

    assert!(matches!(
        h.engine.execute(id),
        Err(MultisigError::Unauthorized(_))
    ));
    assert_eq!(h.engine.proposal_status(id).unwrap(), ProposalStatus::Denied);
    assert!(!h.engine.can_approve(id, &addr("carol")).unwrap());
    assert!(h.executor.batches().is_empty());
}

#[test]
fn veto_before_approvals_blocks_execution() {
    let mut h = Harness::install_child(&["alice", "bob"], 1, "parent");
    let draft = h.draft("pre-empted");
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    h.engine.intervene(&addr("parent"), id, true).unwrap();

    assert!(matches!(
        h.engine.approve(&addr("bob"), id, true),
        Err(MultisigError::ApprovalCastForbidden { .. })
    ));
    assert!(matches!(
        h.engine.execute(id),
        Err(MultisigError::Unauthorized(_))
    ));
}

#[test]
fn linked_parent_vetoes_through_parent_condition() {
    let mut h = Harness::install_child(&["alice"], 1, "parent");
    link(&mut h, true);

    let draft = h.draft("watched").approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    h.engine.intervene(&addr("parent"), id, true).unwrap();
    assert!(h.engine.is_denied(id));
    assert!(!h.engine.can_execute(id).unwrap());

    let draft = h.draft("fine").approved();
    let ok = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    h.engine.execute(ok).unwrap();
}

#[test]
fn veto_is_monotonic_by_default() {
    let mut h = Harness::install_child(&["alice"], 1, "parent");
    let draft = h.draft("stuck").approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    h.engine.intervene(&addr("parent"), id, true).unwrap();
    h.engine.intervene(&addr("parent"), id, false).unwrap();
    assert!(h.engine.is_denied(id));
}

#[test]
fn revocable_policy_lifts_veto() {
    let mut params = InstallationParams::new(addr(DAO), addr(PLUGIN), addrs(&["alice"]))
        .with_settings(MultisigSettings::new(1, true))
        .with_parent(addr("parent"));
    params.intervention_policy = InterventionPolicy::Revocable;
    let mut h = Harness::install_with(params);

    let draft = h.draft("second chance").approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    h.engine.intervene(&addr("parent"), id, true).unwrap();
    h.engine.intervene(&addr("parent"), id, false).unwrap();

    assert!(!h.engine.is_denied(id));
    h.engine.execute(id).unwrap();
}

#[test]
fn deny_proposal_requires_delegated_authority() {
    let mut h = Harness::install_child(&["alice"], 1, "parent");
    let draft = h.draft("contested").approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    assert!(matches!(
        h.engine.deny_proposal(&addr("alice"), id),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(matches!(
        h.engine.intervene(&addr("mallory"), id, true),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(matches!(
        h.engine.deny_proposal(&addr("parent"), ProposalId(99)),
        Err(MultisigError::ProposalNotFound(_))
    ));

    h.engine.deny_proposal(&addr("parent"), id).unwrap();
    assert!(h.engine.is_denied(id));
    assert!(matches!(
        h.engine.events().last().map(|r| &r.event),
        Some(GovernanceEvent::ProposalDenied { .. })
    ));
}

#[test]
fn detached_parent_loses_its_veto() {
    let mut h = Harness::install_child(&["alice"], 1, "parent");
    link(&mut h, false);
    govern(&mut h, GovernanceCall::UnsetParent);
    assert!(!h
        .permissions
        .has_capability(&addr("parent"), &addr(PLUGIN), Capability::DenyProposal));

    let draft = h.draft("independent").approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    assert!(matches!(
        h.engine.intervene(&addr("parent"), id, true),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(matches!(
        h.engine.deny_proposal(&addr("parent"), id),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(!h.engine.is_denied(id));
    h.engine.execute(id).unwrap();
}

#[test]
fn replaced_parent_loses_its_veto() {
    let mut h = Harness::install_child(&["alice"], 1, "parent");
    link(&mut h, false);
    govern(
        &mut h,
        GovernanceCall::SetParent {
            parent: addr("new-parent"),
            hard_link: false,
        },
    );

    let draft = h.draft("under new oversight").approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    assert!(matches!(
        h.engine.intervene(&addr("parent"), id, true),
        Err(MultisigError::Unauthorized(_))
    ));
    h.engine.intervene(&addr("new-parent"), id, true).unwrap();
    assert!(h.engine.is_denied(id));
}

// ---------------------------------------------------------------------------
// Deactivation
// ---------------------------------------------------------------------------

#[test]
fn deactivation_returns_root_after_unlink() {
    let mut h = Harness::install(&["alice"], 1);
    link(&mut h, true);
    assert!(has_root(&h, PLUGIN));

    let dao = h.dao();
    assert!(matches!(
        h.engine.deactivate(&dao),
        Err(MultisigError::ActionFailed(_))
    ));

    h.engine.unset_parent(&addr("parent")).unwrap();
    govern(&mut h, GovernanceCall::Deactivate);

    assert!(h.engine.is_deactivated());
    assert!(has_root(&h, DAO));
    assert!(!has_root(&h, PLUGIN));

    // A deactivated engine cannot be put back under a parent
    assert!(matches!(
        h.engine.set_parent(&dao, addr("parent"), false),
        Err(MultisigError::ActionFailed(_))
    ));
}

#[test]
fn deactivation_revokes_installed_parent_veto() {
    let mut h = Harness::install_child(&["alice"], 1, "parent");
    govern(&mut h, GovernanceCall::Deactivate);
    assert!(!h
        .permissions
        .has_capability(&addr("parent"), &addr(PLUGIN), Capability::DenyProposal));

    let draft = h.draft("self-governed").approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    assert!(matches!(
        h.engine.deny_proposal(&addr("parent"), id),
        Err(MultisigError::Unauthorized(_))
    ));
    h.engine.execute(id).unwrap();
}
