use crate::DomainId;
use multisig_types::{Address, MultisigError};
use thiserror::Error;

/// Errors from cross-domain replication.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("untrusted remote {sender} on domain {domain}")]
    UntrustedRemote { domain: DomainId, sender: Address },

    #[error("delivery to domain {domain} failed: {reason}")]
    Delivery { domain: DomainId, reason: String },

    #[error("multi-chain proposals cannot be scoped to a group")]
    GroupScoped,

    #[error("payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] MultisigError),
}

pub type RelayResult<T> = Result<T, RelayError>;
