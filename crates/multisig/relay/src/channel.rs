//! Messaging channel between domains

use crate::{DomainId, RelayError, RelayMessage, RelayResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Delivery mechanics only. At-least-once: a message may arrive twice.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, destination: DomainId, message: RelayMessage) -> RelayResult<()>;
}

/// In-process network of domains, one unbounded inbox per domain
#[derive(Default)]
pub struct InMemoryNetwork {
    inboxes: RwLock<HashMap<DomainId, mpsc::UnboundedSender<RelayMessage>>>,
    offline: RwLock<HashSet<DomainId>>,
    duplicate_delivery: AtomicBool,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a domain and get its inbox
    pub async fn register(&self, domain: DomainId) -> mpsc::UnboundedReceiver<RelayMessage> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inboxes.write().await.insert(domain, sender);
        debug!(domain = %domain, "Domain registered on network");
        receiver
    }

    /// Make sends to `domain` fail until brought back online
    pub async fn set_offline(&self, domain: DomainId, offline: bool) {
        let mut set = self.offline.write().await;
        if offline {
            set.insert(domain);
        } else {
            set.remove(&domain);
        }
    }

    /// Deliver every message twice
    pub fn set_duplicate_delivery(&self, enabled: bool) {
        self.duplicate_delivery.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageChannel for InMemoryNetwork {
    async fn send(&self, destination: DomainId, message: RelayMessage) -> RelayResult<()> {
        if self.offline.read().await.contains(&destination) {
            return Err(RelayError::Delivery {
                domain: destination,
                reason: "domain offline".into(),
            });
        }

        let inboxes = self.inboxes.read().await;
        let inbox = inboxes.get(&destination).ok_or_else(|| RelayError::Delivery {
            domain: destination,
            reason: "unknown domain".into(),
        })?;

        let copies = if self.duplicate_delivery.load(Ordering::SeqCst) {
            2
        } else {
            1
        };
        for _ in 0..copies {
            inbox
                .send(message.clone())
                .map_err(|_| RelayError::Delivery {
                    domain: destination,
                    reason: "inbox closed".into(),
                })?;
        }
        Ok(())
    }
}
