//! Error types for the governance engine

use crate::{Address, GroupId, ProposalId};
use chrono::{DateTime, Utc};

/// Coarse error classes surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ApprovalCastForbidden,
    ProposalNotExecutable,
    Unauthorized,
    ActionFailed,
    InvalidInput,
}

/// Why a proposal cannot be executed right now
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotExecutableReason {
    AlreadyExecuted,
    Cancelled,
    NotStarted,
    Expired,
    ThresholdNotMet { required: u16, current: usize },
}

impl std::fmt::Display for NotExecutableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExecuted => write!(f, "already executed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::NotStarted => write!(f, "voting window not started"),
            Self::Expired => write!(f, "voting window ended"),
            Self::ThresholdNotMet { required, current } => {
                write!(f, "threshold not met: required {required}, have {current}")
            }
        }
    }
}

/// Errors that can occur in governance operations.
///
/// A failed operation never leaves partial state behind.
#[derive(Debug, thiserror::Error)]
pub enum MultisigError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Approval cast forbidden: {approver} on proposal {proposal_id}")]
    ApprovalCastForbidden {
        proposal_id: ProposalId,
        approver: Address,
    },

    #[error("Proposal creation forbidden for {0}")]
    ProposalCreationForbidden(Address),

    #[error("Proposal {proposal_id} not executable: {reason}")]
    ProposalNotExecutable {
        proposal_id: ProposalId,
        reason: NotExecutableReason,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Proposal {0} is closed")]
    ProposalClosed(ProposalId),

    #[error("Invalid multisig settings: {0}")]
    InvalidSettings(String),

    #[error("Date out of bounds: end {end} precedes start {start}")]
    DateOutOfBounds {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Too many actions: {count} exceeds limit of {limit}")]
    TooManyActions { count: usize, limit: usize },

    #[error("Not a member of group {group_id}: {address}")]
    NotGroupMember { group_id: GroupId, address: Address },
}

impl MultisigError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn action_failed(reason: impl Into<String>) -> Self {
        Self::ActionFailed(reason.into())
    }

    /// The error class this variant belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GroupNotFound(_) | Self::ProposalNotFound(_) => ErrorKind::NotFound,
            Self::ApprovalCastForbidden { .. } | Self::ProposalCreationForbidden(_) => {
                ErrorKind::ApprovalCastForbidden
            }
            Self::ProposalNotExecutable { .. } | Self::ProposalClosed(_) => {
                ErrorKind::ProposalNotExecutable
            }
            Self::Unauthorized(_) | Self::NotGroupMember { .. } => ErrorKind::Unauthorized,
            Self::ActionFailed(_) => ErrorKind::ActionFailed,
            Self::InvalidSettings(_) | Self::DateOutOfBounds { .. } | Self::TooManyActions { .. } => {
                ErrorKind::InvalidInput
            }
        }
    }
}

/// Result type alias for governance operations
pub type MultisigResult<T> = Result<T, MultisigError>;
