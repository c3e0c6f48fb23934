//! Cross-Domain Replicator
//!
//! Mirrors proposal creation from one engine into engines on other domains
//! over an at-least-once message channel. Consistency across domains is
//! eventual: remote proposals are created, approved and executed on their
//! own schedule.

#![deny(unsafe_code)]

mod channel;
mod error;
mod message;
mod node;

pub use channel::{InMemoryNetwork, MessageChannel};
pub use error::{RelayError, RelayResult};
pub use message::{DomainId, RelayMessage, ReplicatedProposal};
pub use node::{DeliveryOutcome, FailedMessage, RelayNode};
