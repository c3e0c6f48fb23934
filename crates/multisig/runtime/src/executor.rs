//! Host executor interface
//!
//! The ledger environment that actually applies approved actions. A batch is
//! atomic unless failures are tolerated through the failure map: the first
//! failing action whose bit is clear aborts the whole batch.

use multisig_types::{Action, ActionOutcome, Address, FailureMap, MultisigError, MultisigResult};
use std::collections::BTreeSet;
use std::sync::Mutex;
use tracing::debug;

pub trait HostExecutor: Send + Sync {
    /// Apply `actions` on behalf of `principal`.
    ///
    /// Returns one outcome per action, in order. A failure whose bit is not
    /// set in `allow_failure` must abort the batch with `ActionFailed` and
    /// leave the host unchanged.
    fn dispatch(
        &self,
        principal: &Address,
        actions: &[Action],
        allow_failure: FailureMap,
    ) -> MultisigResult<Vec<ActionOutcome>>;
}

/// A dispatched batch as seen by [`RecordingExecutor`]
#[derive(Clone, Debug)]
pub struct DispatchedBatch {
    pub principal: Address,
    pub actions: Vec<Action>,
    pub allow_failure: FailureMap,
    pub outcomes: Vec<ActionOutcome>,
}

#[derive(Debug, Default)]
struct RecorderState {
    failing: BTreeSet<Address>,
    batches: Vec<DispatchedBatch>,
}

/// Host double: records committed batches and fails actions aimed at
/// configured targets.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    state: Mutex<RecorderState>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every action aimed at `target` fail
    pub fn fail_target(&self, target: Address) {
        self.lock().failing.insert(target);
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Committed batches, oldest first
    pub fn batches(&self) -> Vec<DispatchedBatch> {
        self.lock().batches.clone()
    }

    /// Committed actions across all batches
    pub fn dispatched_actions(&self) -> Vec<Action> {
        self.lock()
            .batches
            .iter()
            .flat_map(|batch| batch.actions.iter().cloned())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecorderState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HostExecutor for RecordingExecutor {
    fn dispatch(
        &self,
        principal: &Address,
        actions: &[Action],
        allow_failure: FailureMap,
    ) -> MultisigResult<Vec<ActionOutcome>> {
        let mut state = self.lock();
        let mut outcomes = Vec::with_capacity(actions.len());

        for (index, action) in actions.iter().enumerate() {
            if !state.failing.contains(&action.target) {
                outcomes.push(ActionOutcome::success(index, action.target.clone()));
                continue;
            }
            if !allow_failure.allows(index) {
                debug!(index, target = %action.target, "Host batch aborted");
                return Err(MultisigError::action_failed(format!(
                    "action {index} to {} reverted",
                    action.target
                )));
            }
            outcomes.push(ActionOutcome::failure(
                index,
                action.target.clone(),
                "reverted",
            ));
        }

        state.batches.push(DispatchedBatch {
            principal: principal.clone(),
            actions: actions.to_vec(),
            allow_failure,
            outcomes: outcomes.clone(),
        });
        Ok(outcomes)
    }
}
