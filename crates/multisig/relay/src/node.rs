//! Relay node: replicates proposal creation to trusted remote engines
//!
//! Local creation happens first; remote engines then run their own
//! `create_proposal` on receipt. There is no atomicity across domains: each
//! proposal's lifecycle is independent once created.
//!
//! Receiving is non-blocking: a message the local engine rejects is stored
//! as failed instead of stalling the channel, and can be retried later.

use crate::{DomainId, MessageChannel, RelayError, RelayMessage, RelayResult, ReplicatedProposal};
use multisig_runtime::GovernanceEngine;
use multisig_types::{Address, Capability, MultisigError, ProposalDraft, ProposalId};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// What happened to an inbound message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The local engine created this proposal
    Created(ProposalId),
    /// Already seen (same source and nonce); no effect
    Duplicate,
    /// Rejected by the local engine and kept for retry
    Stored,
}

/// An inbound message the local engine rejected
#[derive(Clone, Debug)]
pub struct FailedMessage {
    pub message: RelayMessage,
    pub reason: String,
}

/// Nonces seen from one source. Everything at or below `high_water` has
/// been delivered; only nonces that arrived early are kept individually.
#[derive(Debug, Default)]
struct DeliveryWindow {
    high_water: u64,
    ahead: BTreeSet<u64>,
}

impl DeliveryWindow {
    /// Mark `nonce` delivered. False if it was already seen.
    fn insert(&mut self, nonce: u64) -> bool {
        if nonce <= self.high_water || !self.ahead.insert(nonce) {
            return false;
        }
        while self.ahead.remove(&(self.high_water + 1)) {
            self.high_water += 1;
        }
        true
    }

    fn pending(&self) -> usize {
        self.ahead.len()
    }
}

#[derive(Default)]
struct RelayState {
    /// Remote domain -> plugin handle trusted on that domain
    trusted: BTreeMap<DomainId, Address>,
    next_nonce: BTreeMap<DomainId, u64>,
    delivered: BTreeMap<DomainId, DeliveryWindow>,
    failed: Vec<FailedMessage>,
    /// Messages waiting to be sent, in send order
    outbox: Vec<(DomainId, RelayMessage)>,
}

pub struct RelayNode {
    domain: DomainId,
    engine: Arc<Mutex<GovernanceEngine>>,
    channel: Arc<dyn MessageChannel>,
    state: Mutex<RelayState>,
}

impl RelayNode {
    pub fn new(
        domain: DomainId,
        engine: Arc<Mutex<GovernanceEngine>>,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            domain,
            engine,
            channel,
            state: Mutex::new(RelayState::default()),
        }
    }

    pub fn domain(&self) -> DomainId {
        self.domain
    }

    pub fn engine(&self) -> Arc<Mutex<GovernanceEngine>> {
        Arc::clone(&self.engine)
    }

    /// Trust `remote_plugin` as the engine on `domain`
    pub async fn set_trusted_remote(
        &self,
        caller: &Address,
        domain: DomainId,
        remote_plugin: Address,
    ) -> RelayResult<()> {
        {
            let engine = self.engine.lock().await;
            if !engine.has_capability(caller, Capability::SetTrustedRemote) {
                return Err(MultisigError::unauthorized(format!(
                    "{caller} lacks {} on {}",
                    Capability::SetTrustedRemote,
                    engine.plugin()
                ))
                .into());
            }
        }

        info!(domain = %domain, remote = %remote_plugin, "Trusted remote set");
        self.state.lock().await.trusted.insert(domain, remote_plugin);
        Ok(())
    }

    pub async fn trusted_remotes(&self) -> Vec<(DomainId, Address)> {
        self.state
            .lock()
            .await
            .trusted
            .iter()
            .map(|(domain, plugin)| (*domain, plugin.clone()))
            .collect()
    }

    /// Create the proposal locally, then queue it for every trusted remote.
    ///
    /// Returns the local proposal id. Remote sends that fail stay in the
    /// outbox.
    pub async fn create_multi_chain_proposal(
        &self,
        caller: &Address,
        draft: ProposalDraft,
    ) -> RelayResult<ProposalId> {
        if draft.group_id.is_some() {
            return Err(RelayError::GroupScoped);
        }

        let (proposal_id, plugin) = {
            let mut engine = self.engine.lock().await;
            let id = engine.create_proposal(caller, draft.clone())?;
            (id, engine.plugin().clone())
        };

        let payload = ReplicatedProposal {
            creator: caller.clone(),
            draft,
        }
        .encode()?;

        {
            let mut state = self.state.lock().await;
            let destinations: Vec<DomainId> = state.trusted.keys().copied().collect();
            for destination in destinations {
                let nonce = state.next_nonce.entry(destination).or_insert(0);
                *nonce += 1;
                let message = RelayMessage {
                    source: self.domain,
                    sender: plugin.clone(),
                    nonce: *nonce,
                    payload: payload.clone(),
                };
                state.outbox.push((destination, message));
            }
        }

        let sent = self.flush_outbox().await;
        info!(
            proposal_id = %proposal_id,
            domain = %self.domain,
            sent,
            "Multi-chain proposal created"
        );
        Ok(proposal_id)
    }

    /// Send queued messages in order. A failed send holds back the later
    /// messages for the same destination. Returns how many were sent.
    pub async fn flush_outbox(&self) -> usize {
        let mut state = self.state.lock().await;
        let pending = std::mem::take(&mut state.outbox);

        let mut blocked: HashSet<DomainId> = HashSet::new();
        let mut sent = 0;
        for (destination, message) in pending {
            if blocked.contains(&destination) {
                state.outbox.push((destination, message));
                continue;
            }
            match self.channel.send(destination, message.clone()).await {
                Ok(()) => {
                    debug!(destination = %destination, nonce = message.nonce, "Message sent");
                    sent += 1;
                }
                Err(err) => {
                    warn!(destination = %destination, nonce = message.nonce, error = %err, "Send failed, kept in outbox");
                    blocked.insert(destination);
                    state.outbox.push((destination, message));
                }
            }
        }
        sent
    }

    pub async fn outbox_len(&self) -> usize {
        self.state.lock().await.outbox.len()
    }

    /// Process one inbound message
    pub async fn handle(&self, message: RelayMessage) -> RelayResult<DeliveryOutcome> {
        let mut state = self.state.lock().await;

        if state.trusted.get(&message.source) != Some(&message.sender) {
            warn!(source = %message.source, sender = %message.sender, "Message from untrusted remote");
            return Err(RelayError::UntrustedRemote {
                domain: message.source,
                sender: message.sender,
            });
        }

        let window = state.delivered.entry(message.source).or_default();
        if !window.insert(message.nonce) {
            debug!(
                source = %message.source,
                nonce = message.nonce,
                pending = window.pending(),
                "Duplicate message ignored"
            );
            return Ok(DeliveryOutcome::Duplicate);
        }

        match self.replicate(&message).await {
            Ok(proposal_id) => {
                info!(
                    proposal_id = %proposal_id,
                    source = %message.source,
                    nonce = message.nonce,
                    "Replicated proposal created"
                );
                Ok(DeliveryOutcome::Created(proposal_id))
            }
            Err(err) => {
                warn!(source = %message.source, nonce = message.nonce, error = %err, "Replication failed, message stored");
                state.failed.push(FailedMessage {
                    message,
                    reason: err.to_string(),
                });
                Ok(DeliveryOutcome::Stored)
            }
        }
    }

    /// Retry every stored message. Returns the ids created this time;
    /// messages that fail again stay stored.
    pub async fn retry_failed(&self) -> Vec<ProposalId> {
        let mut state = self.state.lock().await;
        let failed = std::mem::take(&mut state.failed);

        let mut created = Vec::new();
        for mut entry in failed {
            match self.replicate(&entry.message).await {
                Ok(proposal_id) => created.push(proposal_id),
                Err(err) => {
                    entry.reason = err.to_string();
                    state.failed.push(entry);
                }
            }
        }
        created
    }

    pub async fn failed_messages(&self) -> Vec<FailedMessage> {
        self.state.lock().await.failed.clone()
    }

    /// Consume an inbox until its senders are gone
    pub async fn run(self: Arc<Self>, mut inbox: mpsc::UnboundedReceiver<RelayMessage>) {
        info!(domain = %self.domain, "Relay node listening");
        while let Some(message) = inbox.recv().await {
            if let Err(err) = self.handle(message).await {
                warn!(domain = %self.domain, error = %err, "Inbound message rejected");
            }
        }
        debug!(domain = %self.domain, "Relay inbox closed");
    }

    async fn replicate(&self, message: &RelayMessage) -> RelayResult<ProposalId> {
        let replicated = ReplicatedProposal::decode(&message.payload)?;
        let mut engine = self.engine.lock().await;
        Ok(engine.create_proposal(&replicated.creator, replicated.draft)?)
    }
}
