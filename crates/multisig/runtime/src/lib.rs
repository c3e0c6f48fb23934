//! Group Multisig Runtime
//!
//! Runs one governance engine instance: the membership and group registries,
//! the proposal store, the approval policy, the intervention subsystem and
//! the execution gate that composes them.
//!
//! Control flow: a caller submits a proposal, the store records it with a
//! snapshot of the approver scope, members approve, and once the threshold
//! is met inside the scheduling window the gate consults the intervention
//! state before handing actions to the host executor.
//!
//! The host environment is injected through four traits:
//! [`Clock`], [`PermissionManager`], [`HostExecutor`] and [`MetadataStore`].
//! In-memory implementations of each are provided for tests and the CLI.

#![deny(unsafe_code)]

pub mod approval;
pub mod clock;
pub mod config;
pub mod engine;
pub mod executor;
pub mod gate;
pub mod groups;
pub mod intervention;
pub mod membership;
pub mod metadata;
pub mod permissions;
pub mod proposals;
pub mod setup;
pub mod state;

pub use approval::ApprovalPolicy;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{Environment, GovernanceEngine};
pub use executor::{DispatchedBatch, HostExecutor, RecordingExecutor};
pub use gate::{AuthorizationPredicate, AuthorizationRequest, ExecutionGate};
pub use groups::GroupRegistry;
pub use intervention::InterventionState;
pub use membership::MembershipRegistry;
pub use metadata::{InMemoryMetadataStore, MetadataStore};
pub use permissions::{Grant, InMemoryPermissions, PermissionManager};
pub use proposals::ProposalStore;
pub use setup::{InstallationParams, PluginSetup, PreparedSetup};
pub use state::EngineState;
