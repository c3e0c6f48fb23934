//! Group commands

use super::addresses;
use crate::error::CliResult;
use crate::output::{print_json, print_success};
use crate::session::Session;
use clap::Subcommand;
use multisig_types::{Address, GroupId};
use serde::Serialize;

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group; its members join the global list too
    Create {
        name: String,

        /// Initial member (repeatable)
        #[arg(short, long = "member")]
        members: Vec<String>,

        /// Vault holding the group's funds
        #[arg(long)]
        vault: String,

        /// Optional budget earmarked for the group
        #[arg(long)]
        allocation: Option<u128>,
    },

    /// Add members to a group
    Add {
        group_id: u64,
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Remove members from a group
    Remove {
        group_id: u64,
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Show a group
    Show { group_id: u64 },

    /// Move tokens out of the group's vault
    Withdraw {
        group_id: u64,

        #[arg(long)]
        token: String,

        #[arg(long)]
        amount: u128,

        #[arg(long)]
        to: String,
    },
}

pub fn execute(command: GroupCommands, session: &mut Session, caller: &Address) -> CliResult<bool> {
    match command {
        GroupCommands::Create {
            name,
            members,
            vault,
            allocation,
        } => {
            let id = session.engine_mut().create_group(
                caller,
                &name,
                addresses(members),
                Address::from(vault),
                allocation,
            )?;
            print_success(&format!("Created group {} ({})", id, name));
            Ok(true)
        }

        GroupCommands::Add {
            group_id,
            addresses: raw,
        } => {
            let added = session
                .engine_mut()
                .add_members_to_group(caller, GroupId(group_id), addresses(raw))?;
            print_success(&format!("Added {} member(s) to group {}", added.len(), group_id));
            Ok(true)
        }

        GroupCommands::Remove {
            group_id,
            addresses: raw,
        } => {
            let removed = session.engine_mut().remove_members_from_group(
                caller,
                GroupId(group_id),
                addresses(raw),
            )?;
            print_success(&format!(
                "Removed {} member(s) from group {}",
                removed.len(),
                group_id
            ));
            Ok(true)
        }

        GroupCommands::Show { group_id } => {
            let group = session.engine().group(GroupId(group_id))?;
            print_json(&GroupView {
                id: group.id,
                name: &group.name,
                vault: &group.vault,
                allocation: group.allocation,
                members: group.members.iter().collect(),
            });
            Ok(false)
        }

        GroupCommands::Withdraw {
            group_id,
            token,
            amount,
            to,
        } => {
            let outcome = session.engine_mut().withdraw_from_vault(
                caller,
                GroupId(group_id),
                Address::from(token),
                amount,
                Address::from(to),
            )?;
            print_success(&format!(
                "Withdrew {} from group {} vault ({})",
                amount, group_id, outcome.target
            ));
            Ok(true)
        }
    }
}

#[derive(Serialize)]
struct GroupView<'a> {
    id: GroupId,
    name: &'a str,
    vault: &'a Address,
    allocation: Option<u128>,
    members: Vec<&'a Address>,
}
