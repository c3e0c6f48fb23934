//! End-to-end test: proposal replication across domains.
//!
//! Verifies that:
//! - a multi-chain proposal is created locally and on every trusted remote
//! - sends to an unreachable domain wait in the outbox, in order
//! - a remote rejection is stored and can be retried later
//! - replicated proposals run independent lifecycles

use chrono::{Duration, Utc};
use multisig_relay::{DeliveryOutcome, DomainId, InMemoryNetwork, RelayNode};
use multisig_tests::{addr, Harness};
use multisig_types::{Capability, ContentRef, ProposalDraft, ProposalId, ProposalStatus};
use std::sync::Arc;
use tokio::sync::Mutex;

struct Domain {
    node: Arc<RelayNode>,
}

fn domain(id: u16, members: &[&str], network: Arc<InMemoryNetwork>) -> Domain {
    let h = Harness::install(members, 1);
    h.permissions
        .grant(&h.plugin(), &h.dao(), Capability::SetTrustedRemote);
    let node = RelayNode::new(DomainId(id), Arc::new(Mutex::new(h.engine)), network);
    Domain {
        node: Arc::new(node),
    }
}

/// Trust each other's plugin handle
async fn pair(a: &Domain, b: &Domain) {
    let dao = addr(multisig_tests::DAO);
    let plugin = addr(multisig_tests::PLUGIN);
    a.node
        .set_trusted_remote(&dao, b.node.domain(), plugin.clone())
        .await
        .unwrap();
    b.node
        .set_trusted_remote(&dao, a.node.domain(), plugin)
        .await
        .unwrap();
}

fn draft(title: &str) -> ProposalDraft {
    ProposalDraft::new(
        ContentRef::for_content(title.as_bytes()),
        Utc::now() + Duration::days(7),
    )
}

async fn proposal_count(node: &RelayNode) -> usize {
    node.engine().lock().await.state().proposals().len()
}

#[tokio::test]
async fn proposal_reaches_remote_through_run_loop() {
    let network = Arc::new(InMemoryNetwork::new());
    let inbox_b = network.register(DomainId(2)).await;
    let a = domain(1, &["alice"], network.clone());
    let b = domain(2, &["alice"], network.clone());
    pair(&a, &b).await;

    let listener = tokio::spawn(b.node.clone().run(inbox_b));

    let local = a
        .node
        .create_multi_chain_proposal(&addr("alice"), draft("both chains"))
        .await
        .unwrap();
    assert_eq!(local, ProposalId(0));
    assert_eq!(a.node.outbox_len().await, 0);

    for _ in 0..100 {
        if proposal_count(&b.node).await == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    let engine = b.node.engine();
    let engine = engine.lock().await;
    assert_eq!(engine.proposal(ProposalId(0)).unwrap().creator, addr("alice"));
    drop(engine);

    listener.abort();
}

#[tokio::test]
async fn unreachable_domain_keeps_messages_in_order() {
    let network = Arc::new(InMemoryNetwork::new());
    let mut inbox_b = network.register(DomainId(2)).await;
    let a = domain(1, &["alice"], network.clone());
    let b = domain(2, &["alice"], network.clone());
    pair(&a, &b).await;

    network.set_offline(DomainId(2), true).await;
    a.node
        .create_multi_chain_proposal(&addr("alice"), draft("first"))
        .await
        .unwrap();
    a.node
        .create_multi_chain_proposal(&addr("alice"), draft("second"))
        .await
        .unwrap();
    assert_eq!(a.node.outbox_len().await, 2);
    assert_eq!(proposal_count(&a.node).await, 2);

    network.set_offline(DomainId(2), false).await;
    assert_eq!(a.node.flush_outbox().await, 2);

    let first = inbox_b.recv().await.unwrap();
    let second = inbox_b.recv().await.unwrap();
    assert_eq!((first.nonce, second.nonce), (1, 2));
    assert_eq!(
        b.node.handle(first).await.unwrap(),
        DeliveryOutcome::Created(ProposalId(0))
    );
    assert_eq!(
        b.node.handle(second).await.unwrap(),
        DeliveryOutcome::Created(ProposalId(1))
    );
}

#[tokio::test]
async fn remote_rejection_is_stored_and_retried() {
    let network = Arc::new(InMemoryNetwork::new());
    let mut inbox_b = network.register(DomainId(2)).await;
    let a = domain(1, &["alice"], network.clone());
    // alice is not listed on domain 2 yet
    let b = domain(2, &["bob"], network.clone());
    pair(&a, &b).await;

    a.node
        .create_multi_chain_proposal(&addr("alice"), draft("early"))
        .await
        .unwrap();
    let message = inbox_b.recv().await.unwrap();
    assert_eq!(
        b.node.handle(message.clone()).await.unwrap(),
        DeliveryOutcome::Stored
    );
    assert_eq!(b.node.failed_messages().await.len(), 1);
    assert!(b.node.retry_failed().await.is_empty());

    // Redelivery of a stored message is still a duplicate
    assert_eq!(
        b.node.handle(message).await.unwrap(),
        DeliveryOutcome::Duplicate
    );

    {
        let engine = b.node.engine();
        let mut engine = engine.lock().await;
        engine
            .add_members(&addr(multisig_tests::DAO), vec![addr("alice")])
            .unwrap();
    }
    assert_eq!(b.node.retry_failed().await, vec![ProposalId(0)]);
    assert!(b.node.failed_messages().await.is_empty());
}

#[tokio::test]
async fn replicas_have_independent_lifecycles() {
    let network = Arc::new(InMemoryNetwork::new());
    let mut inbox_b = network.register(DomainId(2)).await;
    let a = domain(1, &["alice"], network.clone());
    let b = domain(2, &["alice"], network.clone());
    pair(&a, &b).await;

    let id = a
        .node
        .create_multi_chain_proposal(&addr("alice"), draft("diverge"))
        .await
        .unwrap();
    let message = inbox_b.recv().await.unwrap();
    b.node.handle(message).await.unwrap();

    {
        let engine = a.node.engine();
        let mut engine = engine.lock().await;
        engine.approve(&addr("alice"), id, true).unwrap();
        assert_eq!(engine.proposal_status(id).unwrap(), ProposalStatus::Executed);
    }

    let engine = b.node.engine();
    let engine = engine.lock().await;
    assert_eq!(engine.proposal_status(id).unwrap(), ProposalStatus::Open);
}
