//! Parent link and intervention commands

use crate::error::CliResult;
use crate::output::{print_info, print_success};
use crate::session::Session;
use clap::Subcommand;
use multisig_types::{Address, ProposalId};

#[derive(Subcommand)]
pub enum ParentCommands {
    /// Link this engine under a parent
    Set {
        parent: String,

        /// Only the parent may dissolve a hard link
        #[arg(long)]
        hard: bool,
    },

    /// Dissolve the parent link
    Unset,

    /// Show the current link
    Show,

    /// Veto a proposal, or lift a veto under a revocable policy
    Intervene {
        id: u64,

        /// Lift instead of veto
        #[arg(long)]
        allow: bool,
    },

    /// Deny a proposal (DENY_PROPOSAL holders)
    Deny { id: u64 },

    /// Permanently deactivate the engine
    Deactivate,
}

pub fn execute(command: ParentCommands, session: &mut Session, caller: &Address) -> CliResult<bool> {
    match command {
        ParentCommands::Set { parent, hard } => {
            session
                .engine_mut()
                .set_parent(caller, Address::from(parent.clone()), hard)?;
            let kind = if hard { "hard" } else { "soft" };
            print_success(&format!("Linked under {} ({} link)", parent, kind));
            Ok(true)
        }

        ParentCommands::Unset => {
            session.engine_mut().unset_parent(caller)?;
            print_success("Parent link removed");
            Ok(true)
        }

        ParentCommands::Show => {
            let engine = session.engine();
            match engine.parent() {
                Some(link) => {
                    let kind = if link.hard_link { "hard" } else { "soft" };
                    println!("parent: {} ({} link)", link.parent, kind);
                }
                None => print_info("No parent"),
            }
            if engine.is_deactivated() {
                print_info("Engine is deactivated");
            }
            Ok(false)
        }

        ParentCommands::Intervene { id, allow } => {
            session
                .engine_mut()
                .intervene(caller, ProposalId(id), !allow)?;
            let verb = if allow { "Lifted veto on" } else { "Vetoed" };
            print_success(&format!("{} proposal {}", verb, id));
            Ok(true)
        }

        ParentCommands::Deny { id } => {
            session.engine_mut().deny_proposal(caller, ProposalId(id))?;
            print_success(&format!("Denied proposal {}", id));
            Ok(true)
        }

        ParentCommands::Deactivate => {
            session.engine_mut().deactivate(caller)?;
            print_success("Engine deactivated");
            Ok(true)
        }
    }
}
