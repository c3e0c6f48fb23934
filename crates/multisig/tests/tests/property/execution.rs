//! Property tests: when execution is allowed, and what outranks what.

use chrono::Duration;
use multisig_tests::{addr, Harness};
use multisig_types::{MultisigError, ProposalId};
use proptest::prelude::*;

const MEMBERS: [&str; 6] = ["m0", "m1", "m2", "m3", "m4", "m5"];

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn child(min_approvals: u16) -> (Harness, ProposalId) {
    let mut h = Harness::install_child(&MEMBERS, min_approvals, "parent");
    let draft = h.draft_ending("property", Duration::days(1));
    let id = h.engine.create_proposal(&addr("m0"), draft).unwrap();
    (h, id)
}

/// Approver sets as indices into MEMBERS, in arrival order
fn arb_approvers() -> impl Strategy<Value = Vec<usize>> {
    prop::sample::subsequence((0..MEMBERS.len()).collect::<Vec<_>>(), 0..=MEMBERS.len())
        .prop_shuffle()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// execute succeeds iff threshold met, not denied, inside the window and not terminal.
    #[test]
    fn execute_iff_conditions_hold(
        min_approvals in 1u16..=6,
        approvers in arb_approvers(),
        denied in any::<bool>(),
        expired in any::<bool>(),
        cancelled in any::<bool>(),
    ) {
        let (mut h, id) = child(min_approvals);
        for index in &approvers {
            h.engine.approve(&addr(MEMBERS[*index]), id, false).unwrap();
        }
        if cancelled {
            h.engine.cancel_proposal(&addr("m0"), id).unwrap();
        }
        if denied {
            h.engine.intervene(&addr("parent"), id, true).unwrap();
        }
        if expired {
            h.advance(Duration::days(2));
        }

        let expected = approvers.len() >= min_approvals as usize && !denied && !expired && !cancelled;
        prop_assert_eq!(h.engine.can_execute(id).unwrap(), expected);
        prop_assert_eq!(h.engine.execute(id).is_ok(), expected);
        if expected {
            prop_assert!(h.engine.execute(id).is_err(), "second execution must fail");
        }
    }

    /// Only the set of approvers matters, never their arrival order.
    #[test]
    fn approval_order_is_irrelevant(min_approvals in 1u16..=6, approvers in arb_approvers()) {
        let (mut forward, a) = child(min_approvals);
        let (mut backward, b) = child(min_approvals);

        for index in &approvers {
            forward.engine.approve(&addr(MEMBERS[*index]), a, false).unwrap();
        }
        for index in approvers.iter().rev() {
            backward.engine.approve(&addr(MEMBERS[*index]), b, false).unwrap();
        }

        prop_assert_eq!(
            &forward.engine.proposal(a).unwrap().approvals,
            &backward.engine.proposal(b).unwrap().approvals
        );
        prop_assert_eq!(
            forward.engine.can_execute(a).unwrap(),
            backward.engine.can_execute(b).unwrap()
        );
    }

    /// A veto fails execution with Unauthorized wherever it lands among the approvals.
    #[test]
    fn veto_takes_precedence(
        min_approvals in 1u16..=3,
        approvers in arb_approvers(),
        veto_at in 0usize..=6,
    ) {
        let (mut h, id) = child(min_approvals);
        let veto_at = veto_at.min(approvers.len());

        for (position, index) in approvers.iter().enumerate() {
            if position == veto_at {
                h.engine.intervene(&addr("parent"), id, true).unwrap();
            }
            // Approvals after the veto are refused
            let result = h.engine.approve(&addr(MEMBERS[*index]), id, true);
            prop_assert_eq!(result.is_ok(), position < veto_at);
            if let Ok(Some(_)) = result {
                // Executed before the veto could land; nothing left to deny
                return Ok(());
            }
        }
        if veto_at == approvers.len() {
            h.engine.intervene(&addr("parent"), id, true).unwrap();
        }

        prop_assert!(matches!(h.engine.execute(id), Err(MultisigError::Unauthorized(_))));
        prop_assert!(!h.engine.proposal(id).unwrap().executed);
    }
}
