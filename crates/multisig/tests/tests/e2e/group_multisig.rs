//! End-to-end test: group-scoped proposals from creation to execution.
//!
//! Verifies that:
//! - a group proposal executes on the approval that meets the threshold
//! - approvers outside the group are refused
//! - group memberships are independent of each other and of the global list
//! - an expired proposal cannot be executed or approved
//! - group vaults pay out to group members only

use chrono::Duration;
use multisig_tests::{addr, addrs, Harness};
use multisig_types::{
    Action, FailureMap, GovernanceEvent, GroupId, MultisigError, NotExecutableReason,
    ProposalStatus,
};

const FIVE: [&str; 5] = ["alice", "bob", "carol", "dave", "erin"];

fn with_group(members: &[&str], min_approvals: u16) -> (Harness, GroupId) {
    let mut h = Harness::install(members, min_approvals);
    let dao = h.dao();
    let group = h
        .engine
        .create_group(&dao, "core", addrs(members), addr("vault-core"), Some(10_000))
        .unwrap();
    (h, group)
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

#[test]
fn third_approval_executes_group_proposal() {
    let (mut h, group) = with_group(&FIVE, 3);
    let draft = h
        .draft("fund the audit")
        .in_group(group)
        .with_action(Action::call(addr("0xauditor"), 500, vec![0xde, 0xad]));
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    assert!(h.engine.approve(&addr("alice"), id, false).unwrap().is_none());
    assert!(h.engine.approve(&addr("bob"), id, true).unwrap().is_none());
    assert_eq!(h.engine.proposal_status(id).unwrap(), ProposalStatus::Open);

    let report = h
        .engine
        .approve(&addr("carol"), id, true)
        .unwrap()
        .expect("third approval executes");
    assert!(report.all_succeeded());
    assert_eq!(h.engine.proposal_status(id).unwrap(), ProposalStatus::Executed);

    let batches = h.executor.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].principal, h.dao());
    assert_eq!(batches[0].actions[0].target, addr("0xauditor"));
}

#[test]
fn approving_twice_is_rejected() {
    let (mut h, group) = with_group(&FIVE, 3);
    let draft = h.draft("x").in_group(group).approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    let err = h.engine.approve(&addr("alice"), id, false).unwrap_err();
    assert!(matches!(err, MultisigError::ApprovalCastForbidden { .. }));
    assert_eq!(h.engine.proposal(id).unwrap().approval_count(), 1);
}

#[test]
fn approval_arrival_order_is_irrelevant() {
    let orders = [["alice", "bob", "carol"], ["carol", "alice", "bob"]];
    for order in orders {
        let (mut h, group) = with_group(&FIVE, 3);
        let draft = h.draft("order").in_group(group);
        let id = h.engine.create_proposal(&addr("dave"), draft).unwrap();
        for approver in order {
            h.engine.approve(&addr(approver), id, false).unwrap();
        }
        assert!(h.engine.can_execute(id).unwrap());
        h.engine.execute(id).unwrap();
    }
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[test]
fn outsider_cannot_approve_group_proposal() {
    let mut h = Harness::install(&["alice", "bob", "carol"], 2);
    let dao = h.dao();
    let group = h
        .engine
        .create_group(&dao, "pair", addrs(&["alice", "bob"]), addr("vault-pair"), None)
        .unwrap();
    let draft = h.draft("pair only").in_group(group);
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    // carol is a global member but not in the group; mallory is neither
    for outsider in ["carol", "mallory"] {
        assert!(!h.engine.can_approve(id, &addr(outsider)).unwrap());
        let err = h.engine.approve(&addr(outsider), id, false).unwrap_err();
        assert!(matches!(err, MultisigError::ApprovalCastForbidden { .. }));
    }
    assert!(h.engine.can_approve(id, &addr("bob")).unwrap());
}

#[test]
fn outsider_cannot_open_group_proposal() {
    let (mut h, group) = with_group(&["alice", "bob"], 1);
    let draft = h.draft("nope").in_group(group);
    let err = h
        .engine
        .create_proposal(&addr("mallory"), draft)
        .unwrap_err();
    assert!(matches!(err, MultisigError::ProposalCreationForbidden(_)));
    assert_eq!(h.engine.state().proposals().len(), 0);
}

#[test]
fn members_added_after_creation_cannot_approve() {
    let (mut h, group) = with_group(&["alice", "bob"], 2);
    let draft = h.draft("snapshot").in_group(group);
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    let dao = h.dao();
    h.engine
        .add_members_to_group(&dao, group, vec![addr("frank")])
        .unwrap();
    assert!(h.engine.is_member_in_group(&addr("frank"), group).unwrap());
    assert!(!h.engine.can_approve(id, &addr("frank")).unwrap());
}

#[test]
fn unknown_group_is_not_found() {
    let mut h = Harness::install(&["alice"], 1);
    let dao = h.dao();
    assert!(matches!(
        h.engine
            .add_members_to_group(&dao, GroupId(42), vec![addr("bob")]),
        Err(MultisigError::GroupNotFound(GroupId(42)))
    ));

    let draft = h.draft("ghost").in_group(GroupId(42));
    assert!(matches!(
        h.engine.create_proposal(&addr("alice"), draft),
        Err(MultisigError::GroupNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Isolation
// ---------------------------------------------------------------------------

#[test]
fn group_removal_is_isolated() {
    let mut h = Harness::install(&[], 1);
    let dao = h.dao();
    let a = h
        .engine
        .create_group(&dao, "a", addrs(&["alice", "bob"]), addr("vault-a"), None)
        .unwrap();
    let b = h
        .engine
        .create_group(&dao, "b", addrs(&["alice"]), addr("vault-b"), None)
        .unwrap();
    assert_eq!((a, b), (GroupId(0), GroupId(1)));

    // Creating groups also lists their members globally
    assert!(h.engine.is_member(&addr("alice")));
    assert!(h.engine.is_member(&addr("bob")));

    h.engine
        .remove_members_from_group(&dao, a, vec![addr("alice")])
        .unwrap();
    assert!(!h.engine.is_member_in_group(&addr("alice"), a).unwrap());
    assert!(h.engine.is_member_in_group(&addr("alice"), b).unwrap());
    assert!(h.engine.is_member(&addr("alice")));
}

#[test]
fn global_removal_keeps_group_membership() {
    let (mut h, group) = with_group(&["alice", "bob"], 1);
    let dao = h.dao();
    h.engine.remove_members(&dao, vec![addr("bob")]).unwrap();

    assert!(!h.engine.is_member(&addr("bob")));
    assert!(h.engine.is_member_in_group(&addr("bob"), group).unwrap());
}

#[test]
fn only_the_dao_manages_members() {
    let (mut h, group) = with_group(&["alice", "bob"], 1);
    assert!(matches!(
        h.engine.add_members(&addr("alice"), vec![addr("mallory")]),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(matches!(
        h.engine
            .create_group(&addr("alice"), "rogue", vec![], addr("vault-x"), None),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(matches!(
        h.engine
            .remove_members_from_group(&addr("bob"), group, vec![addr("alice")]),
        Err(MultisigError::Unauthorized(_))
    ));
    assert!(!h.engine.is_member(&addr("mallory")));
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[test]
fn expired_proposal_cannot_execute() {
    let mut h = Harness::install(&["alice", "bob", "carol"], 2);
    let draft = h.draft_ending("short window", Duration::days(1)).approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    h.advance(Duration::days(2));
    assert_eq!(h.engine.proposal_status(id).unwrap(), ProposalStatus::Expired);

    let err = h.engine.approve(&addr("bob"), id, true).unwrap_err();
    assert!(matches!(err, MultisigError::ApprovalCastForbidden { .. }));

    let err = h.engine.execute(id).unwrap_err();
    assert!(matches!(
        err,
        MultisigError::ProposalNotExecutable {
            reason: NotExecutableReason::Expired,
            ..
        }
    ));
    assert!(h.executor.batches().is_empty());
}

#[test]
fn proposal_before_start_is_pending() {
    let mut h = Harness::install(&["alice"], 1);
    let start = h.now() + Duration::days(1);
    let draft = h.draft("later").starting_at(start);
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    assert_eq!(h.engine.proposal_status(id).unwrap(), ProposalStatus::Pending);
    assert!(h.engine.approve(&addr("alice"), id, false).is_err());

    h.advance(Duration::days(1) + Duration::minutes(1));
    h.engine.approve(&addr("alice"), id, false).unwrap();
    h.engine.execute(id).unwrap();
}

#[test]
fn end_before_start_is_rejected() {
    let mut h = Harness::install(&["alice"], 1);
    let draft = h
        .draft_ending("backwards", Duration::hours(1))
        .starting_at(h.now() + Duration::hours(2));
    assert!(matches!(
        h.engine.create_proposal(&addr("alice"), draft),
        Err(MultisigError::DateOutOfBounds { .. })
    ));
}

// ---------------------------------------------------------------------------
// Failure maps
// ---------------------------------------------------------------------------

#[test]
fn tolerated_host_failure_is_reported() {
    let mut h = Harness::install(&["alice"], 1);
    h.executor.fail_target(addr("0xflaky"));
    let draft = h
        .draft("best effort")
        .with_action(Action::call(addr("0xok"), 0, vec![]))
        .with_action(Action::call(addr("0xflaky"), 0, vec![]))
        .with_failure_map(FailureMap::none().with(1))
        .approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();

    let report = h.engine.execute(id).unwrap();
    assert!(!report.all_succeeded());
    assert!(report.failure_map.allows(1));
    assert!(!report.failure_map.allows(0));

    let executed = h
        .engine
        .events()
        .iter()
        .find_map(|record| match &record.event {
            GovernanceEvent::ProposalExecuted { failure_map, .. } => Some(*failure_map),
            _ => None,
        });
    assert_eq!(executed, Some(0b10));
}

#[test]
fn untolerated_host_failure_leaves_proposal_open() {
    let mut h = Harness::install(&["alice"], 1);
    h.executor.fail_target(addr("0xbroken"));
    let draft = h
        .draft("all or nothing")
        .with_action(Action::call(addr("0xok"), 0, vec![]))
        .with_action(Action::call(addr("0xbroken"), 0, vec![]))
        .approved();
    let id = h.engine.create_proposal(&addr("alice"), draft).unwrap();
    let events_before = h.engine.events().len();

    assert!(matches!(
        h.engine.execute(id),
        Err(MultisigError::ActionFailed(_))
    ));
    assert!(!h.engine.proposal(id).unwrap().executed);
    assert_eq!(h.engine.events().len(), events_before);
    assert!(h.executor.batches().is_empty());

    h.executor.clear_failures();
    h.engine.execute(id).unwrap();
    assert_eq!(h.executor.dispatched_actions().len(), 2);
}

// ---------------------------------------------------------------------------
// Vaults
// ---------------------------------------------------------------------------

#[test]
fn group_member_withdraws_from_vault() {
    let (mut h, group) = with_group(&["alice", "bob"], 2);

    let outcome = h
        .engine
        .withdraw_from_vault(&addr("bob"), group, addr("usdc"), 250, addr("0xpayee"))
        .unwrap();
    assert!(outcome.succeeded);

    let batches = h.executor.batches();
    assert_eq!(batches[0].principal, addr("vault-core"));
    assert!(matches!(
        h.engine.events().last().map(|r| &r.event),
        Some(GovernanceEvent::VaultWithdrawal { amount: 250, .. })
    ));

    let err = h
        .engine
        .withdraw_from_vault(&addr("mallory"), group, addr("usdc"), 1, addr("mallory"))
        .unwrap_err();
    assert!(matches!(err, MultisigError::NotGroupMember { .. }));
}
