#[path = "e2e/group_multisig.rs"]
mod group_multisig;

#[path = "e2e/parent_child.rs"]
mod parent_child;

#[path = "e2e/multi_chain.rs"]
mod multi_chain;
