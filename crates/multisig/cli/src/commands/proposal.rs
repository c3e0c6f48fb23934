//! Proposal commands

use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_json, print_success, print_warning};
use crate::session::Session;
use chrono::{Duration, Utc};
use clap::Subcommand;
use multisig_types::{
    Action, Address, ExecutionReport, FailureMap, GovernanceCall, GroupId, Proposal,
    ProposalDraft, ProposalId, ProposalStatus,
};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ProposalCommands {
    /// Create a proposal
    Create {
        /// Description, published to the metadata store
        #[arg(long)]
        title: String,

        /// Voting window length
        #[arg(long, default_value = "24")]
        hours: i64,

        /// Delay before approvals open
        #[arg(long)]
        start_in_minutes: Option<i64>,

        /// Scope to a group
        #[arg(long)]
        group: Option<u64>,

        /// Host call to a target (repeatable)
        #[arg(long = "call")]
        calls: Vec<String>,

        /// Token transfer from the dao, as token:to:amount (repeatable)
        #[arg(long = "transfer")]
        transfers: Vec<String>,

        /// Add a global member through governance (repeatable)
        #[arg(long = "add-member")]
        add_members: Vec<String>,

        /// Remove a global member through governance (repeatable)
        #[arg(long = "remove-member")]
        remove_members: Vec<String>,

        /// Index of an action allowed to fail (repeatable)
        #[arg(long = "allow-failure")]
        allow_failure: Vec<usize>,

        /// Approve as the creator
        #[arg(long)]
        approve: bool,

        /// Execute immediately if the threshold is met
        #[arg(long)]
        execute: bool,
    },

    /// Approve a proposal
    Approve {
        id: u64,

        /// Execute if this approval meets the threshold
        #[arg(long)]
        execute: bool,
    },

    /// Execute a proposal that has met its threshold
    Execute { id: u64 },

    /// Cancel a proposal (creator only)
    Cancel { id: u64 },

    /// Show a proposal and its status
    Show { id: u64 },

    /// List proposals with their status
    List,
}

pub fn execute(
    command: ProposalCommands,
    session: &mut Session,
    caller: &Address,
) -> CliResult<bool> {
    match command {
        ProposalCommands::Create {
            title,
            hours,
            start_in_minutes,
            group,
            calls,
            transfers,
            add_members,
            remove_members,
            allow_failure,
            approve,
            execute,
        } => {
            let engine = session.engine();
            let dao = engine.dao().clone();
            let plugin = engine.plugin().clone();
            let metadata = engine.publish_metadata(title.as_bytes());

            let now = Utc::now();
            let mut draft = ProposalDraft::new(metadata, now + Duration::hours(hours));
            if let Some(minutes) = start_in_minutes {
                draft = draft.starting_at(now + Duration::minutes(minutes));
            }
            if let Some(group) = group {
                draft = draft.in_group(GroupId(group));
            }

            for target in calls {
                draft = draft.with_action(Action::call(Address::from(target), 0, Vec::new()));
            }
            for raw in transfers {
                let (token, to, amount) = parse_transfer(&raw)?;
                draft = draft.with_action(Action::transfer(token, dao.clone(), to, amount));
            }
            if !add_members.is_empty() {
                draft = draft.with_action(Action::governance(
                    plugin.clone(),
                    GovernanceCall::AddMembers(super::addresses(add_members)),
                ));
            }
            if !remove_members.is_empty() {
                draft = draft.with_action(Action::governance(
                    plugin,
                    GovernanceCall::RemoveMembers(super::addresses(remove_members)),
                ));
            }

            let failure_map = allow_failure
                .into_iter()
                .fold(FailureMap::none(), FailureMap::with);
            draft = draft.with_failure_map(failure_map);
            if approve {
                draft = draft.approved();
            }
            if execute {
                draft = draft.try_execution();
            }

            let id = session.engine_mut().create_proposal(caller, draft)?;
            print_success(&format!("Created proposal {}", id));
            if session.engine().proposal(id)?.executed {
                print_info(&format!("Proposal {} executed on creation", id));
            }
            Ok(true)
        }

        ProposalCommands::Approve { id, execute } => {
            let report = session
                .engine_mut()
                .approve(caller, ProposalId(id), execute)?;
            print_success(&format!("{} approved proposal {}", caller, id));
            match report {
                Some(report) => print_report(&report),
                None if execute => print_warning("Not executable yet"),
                None => {}
            }
            Ok(true)
        }

        ProposalCommands::Execute { id } => {
            let report = session.engine_mut().execute(ProposalId(id))?;
            print_report(&report);
            Ok(true)
        }

        ProposalCommands::Cancel { id } => {
            session
                .engine_mut()
                .cancel_proposal(caller, ProposalId(id))?;
            print_success(&format!("Cancelled proposal {}", id));
            Ok(true)
        }

        ProposalCommands::Show { id } => {
            let engine = session.engine();
            let proposal = engine.proposal(ProposalId(id))?;
            print_json(&ProposalView {
                status: engine.proposal_status(proposal.id)?,
                denied: engine.is_denied(proposal.id),
                can_execute: engine.can_execute(proposal.id)?,
                proposal,
            });
            Ok(false)
        }

        ProposalCommands::List => {
            let engine = session.engine();
            let proposals: Vec<_> = engine.state().proposals().iter().collect();
            if proposals.is_empty() {
                print_info("No proposals");
            }
            for proposal in proposals {
                let scope = match proposal.group_id {
                    Some(group) => format!("group {}", group),
                    None => "global".to_string(),
                };
                println!(
                    "#{:<4} {:<10} {}/{} approvals  {}  by {}",
                    proposal.id,
                    engine.proposal_status(proposal.id)?,
                    proposal.approval_count(),
                    proposal.parameters.min_approvals,
                    scope,
                    proposal.creator
                );
            }
            Ok(false)
        }
    }
}

#[derive(Serialize)]
struct ProposalView<'a> {
    status: ProposalStatus,
    denied: bool,
    can_execute: bool,
    proposal: &'a Proposal,
}

fn print_report(report: &ExecutionReport) {
    if report.all_succeeded() {
        print_success(&format!(
            "Executed proposal {} ({} action(s))",
            report.proposal_id,
            report.outcomes.len()
        ));
    } else {
        print_warning(&format!(
            "Executed proposal {} with tolerated failures (map {:#x})",
            report.proposal_id, report.failure_map.0
        ));
    }
    for outcome in &report.outcomes {
        let state = if outcome.succeeded { "ok" } else { "failed" };
        match &outcome.detail {
            Some(detail) => println!("  [{}] {} {}: {}", outcome.index, outcome.target, state, detail),
            None => println!("  [{}] {} {}", outcome.index, outcome.target, state),
        }
    }
}

/// Parse `token:to:amount`
fn parse_transfer(raw: &str) -> CliResult<(Address, Address, u128)> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [token, to, amount] = parts.as_slice() else {
        return Err(CliError::InvalidInput(format!(
            "transfer must be token:to:amount, got {:?}",
            raw
        )));
    };
    let amount = amount
        .parse::<u128>()
        .map_err(|e| CliError::InvalidInput(format!("bad amount {:?}: {}", amount, e)))?;
    Ok((Address::from(*token), Address::from(*to), amount))
}
