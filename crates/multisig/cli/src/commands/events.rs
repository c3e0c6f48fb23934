//! Event log commands

use crate::error::CliResult;
use crate::output::{print_info, print_json};
use crate::session::Session;
use colored::*;

/// Print events recorded after `since`
pub fn execute(session: &Session, since: u64, json: bool) -> CliResult<bool> {
    let records = session.engine().events().since(since);
    if records.is_empty() {
        print_info("No events");
        return Ok(false);
    }

    if json {
        print_json(&records);
        return Ok(false);
    }

    for record in records {
        println!(
            "{} {} {}",
            format!("#{}", record.sequence).dimmed(),
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.event.name().cyan()
        );
    }
    Ok(false)
}
