//! Wire messages between domains

use crate::RelayResult;
use multisig_types::{Address, ProposalDraft};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a domain (chain, region, ...) hosting an engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub u16);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message on the relay channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub source: DomainId,
    /// Plugin handle of the sending engine
    pub sender: Address,
    /// Strictly increasing per (source, destination)
    pub nonce: u64,
    pub payload: Vec<u8>,
}

/// Payload of a replicated proposal creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatedProposal {
    pub creator: Address,
    pub draft: ProposalDraft,
}

impl ReplicatedProposal {
    pub fn encode(&self) -> RelayResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> RelayResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
