//! Subcommand implementations

pub mod events;
pub mod group;
pub mod member;
pub mod parent;
pub mod proposal;

use multisig_types::Address;

pub(crate) fn addresses(raw: Vec<String>) -> Vec<Address> {
    raw.into_iter().map(Address::from).collect()
}
