//! Group Multisig Domain Types
//!
//! This crate defines the domain types for the hierarchical group multisig
//! engine: a policy layer that gates execution of state-changing actions
//! behind N-of-M member approval, optional group scoping, and the veto of
//! a supervising parent.
//!
//! # Key Concepts
//!
//! - **Proposal**: a batched, approvable set of [`Action`]s awaiting execution.
//! - **Threshold**: minimum number of distinct member approvals
//!   ([`MultisigSettings::min_approvals`]) before execution is eligible.
//! - **Group**: a named subset of members with its own vault and approval scope.
//! - **Parent link**: an attachment to a supervising entity that may veto
//!   (intervene on) individual proposals. A hard link cannot be dissolved by
//!   the child alone.
//! - **Checkpointed membership**: member lists are [`VersionedSet`]s so
//!   eligibility can be evaluated as of a proposal's creation.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime behavior beyond invariant
//! checks. All types implement `Clone`, `Debug`, `Serialize`, `Deserialize`.
//! IDs use the newtype pattern and implement `Display`.

#![deny(unsafe_code)]

mod action;
mod capability;
mod checkpoint;
mod errors;
mod events;
mod group;
mod ids;
mod metadata;
mod parent;
mod proposal;
mod settings;

pub use action::*;
pub use capability::*;
pub use checkpoint::*;
pub use errors::*;
pub use events::*;
pub use group::*;
pub use ids::*;
pub use metadata::*;
pub use parent::*;
pub use proposal::*;
pub use settings::*;
