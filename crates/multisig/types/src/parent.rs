//! Parent links and intervention policy

use crate::Address;
use serde::{Deserialize, Serialize};

/// Attachment of a child engine to a supervising parent.
///
/// Only the child stores the link; parents keep no back-pointer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub parent: Address,
    /// A hard link can only be dissolved by the parent
    pub hard_link: bool,
}

impl ParentLink {
    pub fn new(parent: Address, hard_link: bool) -> Self {
        Self { parent, hard_link }
    }

    pub fn soft(parent: Address) -> Self {
        Self::new(parent, false)
    }

    pub fn hard(parent: Address) -> Self {
        Self::new(parent, true)
    }
}

/// What `intervene(id, false)` does to an existing denial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionPolicy {
    /// A denial is permanent; `deny = false` never clears it
    #[default]
    Monotonic,
    /// `deny = false` lifts an earlier denial
    Revocable,
}
