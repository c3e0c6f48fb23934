#[path = "property/membership.rs"]
mod membership;

#[path = "property/execution.rs"]
mod execution;
