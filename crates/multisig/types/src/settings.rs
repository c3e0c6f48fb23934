//! Multisig settings

use crate::{MultisigError, MultisigResult};
use serde::{Deserialize, Serialize};

/// Approval policy attached to an engine instance.
///
/// `min_approvals` is not checked against the current member count: shrinking
/// the list later can leave proposals unpassable, and that is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigSettings {
    /// Minimum number of distinct approvals required to execute
    pub min_approvals: u16,
    /// Restrict creation and approval to listed members
    pub only_listed: bool,
}

impl MultisigSettings {
    pub fn new(min_approvals: u16, only_listed: bool) -> Self {
        Self {
            min_approvals,
            only_listed,
        }
    }

    pub fn validate(&self) -> MultisigResult<()> {
        if self.min_approvals == 0 {
            return Err(MultisigError::InvalidSettings(
                "min_approvals must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MultisigSettings {
    fn default() -> Self {
        Self {
            min_approvals: 1,
            only_listed: true,
        }
    }
}
