//! Global membership and settings commands

use super::addresses;
use crate::error::CliResult;
use crate::output::{print_info, print_json, print_success};
use crate::session::Session;
use clap::Subcommand;
use multisig_types::{Address, MultisigSettings};

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add addresses to the global member list
    Add {
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Remove addresses from the global member list
    Remove {
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// List current members
    List,

    /// Show or change the approval settings
    Settings {
        #[arg(long)]
        min_approvals: Option<u16>,

        #[arg(long)]
        only_listed: Option<bool>,
    },
}

pub fn execute(command: MemberCommands, session: &mut Session, caller: &Address) -> CliResult<bool> {
    match command {
        MemberCommands::Add { addresses: raw } => {
            let added = session.engine_mut().add_members(caller, addresses(raw))?;
            print_success(&format!("Added {} member(s)", added.len()));
            Ok(true)
        }

        MemberCommands::Remove { addresses: raw } => {
            let removed = session.engine_mut().remove_members(caller, addresses(raw))?;
            print_success(&format!("Removed {} member(s)", removed.len()));
            Ok(true)
        }

        MemberCommands::List => {
            let members = session.engine().members();
            if members.is_empty() {
                print_info("No members");
            }
            for member in members {
                println!("{}", member);
            }
            Ok(false)
        }

        MemberCommands::Settings {
            min_approvals,
            only_listed,
        } => {
            if min_approvals.is_none() && only_listed.is_none() {
                print_json(session.engine().settings());
                return Ok(false);
            }

            let current = *session.engine().settings();
            let settings = MultisigSettings {
                min_approvals: min_approvals.unwrap_or(current.min_approvals),
                only_listed: only_listed.unwrap_or(current.only_listed),
            };
            session
                .engine_mut()
                .update_multisig_settings(caller, settings)?;
            print_success(&format!(
                "Settings updated: min_approvals={} only_listed={}",
                settings.min_approvals, settings.only_listed
            ));
            Ok(true)
        }
    }
}
