//! Multisig CLI - operate a group multisig engine from the terminal
//!
//! The engine lives in a local JSON snapshot. Every command loads it, acts
//! as the `--as` caller and writes it back when the state changed.

#![deny(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;
mod session;

use commands::{events, group, member, parent, proposal};
use config::CliConfig;
use error::CliResult;
use multisig_types::Address;
use session::Session;

/// Multisig CLI application
#[derive(Parser)]
#[command(name = "multisig")]
#[command(about = "Group multisig governance engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MULTISIG_CONFIG")]
    config: Option<String>,

    /// State snapshot path (overrides configuration)
    #[arg(short, long, env = "MULTISIG_STATE")]
    state: Option<String>,

    /// Address acting for this command (defaults to the dao)
    #[arg(long = "as", env = "MULTISIG_CALLER")]
    caller: Option<String>,

    /// Log level (overrides configuration)
    #[arg(long, env = "MULTISIG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output logs (and event listings) as JSON
    #[arg(long, env = "MULTISIG_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a fresh engine from configuration
    Init {
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Global members and approval settings
    Member {
        #[command(subcommand)]
        command: member::MemberCommands,
    },

    /// Groups and their vaults
    Group {
        #[command(subcommand)]
        command: group::GroupCommands,
    },

    /// Create, approve and execute proposals
    #[command(alias = "p")]
    Proposal {
        #[command(subcommand)]
        command: proposal::ProposalCommands,
    },

    /// Parent link and interventions
    Parent {
        #[command(subcommand)]
        command: parent::ParentCommands,
    },

    /// Move the plugin to a newer build
    Upgrade { build: u16 },

    /// Show the event log
    Events {
        /// Only events after this sequence number
        #[arg(long, default_value = "0")]
        since: u64,
    },

    /// List permission grants held in the snapshot
    Grants,

    /// Show effective configuration
    Config,
}

fn main() {
    if let Err(e) = run() {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(state) = cli.state {
        config.state_path = state;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let json = cli.json || config.logging.json;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }

    match cli.command {
        Commands::Init { force } => {
            let session = Session::install(&config, force)?;
            output::print_success(&format!(
                "Installed {} for {} at {}",
                session.engine().plugin(),
                session.engine().dao(),
                config.state_path
            ));
            session.save()?;
        }

        Commands::Config => {
            output::print_json(&config);
        }

        command => {
            let mut session = Session::open(&config.state_path)?;
            let caller = cli
                .caller
                .map(Address::from)
                .unwrap_or_else(|| session.engine().dao().clone());

            let changed = match command {
                Commands::Member { command } => member::execute(command, &mut session, &caller)?,
                Commands::Group { command } => group::execute(command, &mut session, &caller)?,
                Commands::Proposal { command } => {
                    proposal::execute(command, &mut session, &caller)?
                }
                Commands::Parent { command } => parent::execute(command, &mut session, &caller)?,
                Commands::Upgrade { build } => {
                    session.engine_mut().upgrade(&caller, build)?;
                    output::print_success(&format!("Upgraded to build {}", build));
                    true
                }
                Commands::Events { since } => events::execute(&session, since, json)?,
                Commands::Grants => {
                    for grant in session.grants() {
                        println!("{} -> {} on {}", grant.capability, grant.who, grant.scope);
                    }
                    false
                }
                Commands::Init { .. } | Commands::Config => false,
            };

            if changed {
                if session.dispatched() > 0 {
                    output::print_info(&format!(
                        "{} host action(s) dispatched",
                        session.dispatched()
                    ));
                }
                session.save()?;
            }
        }
    }

    Ok(())
}
