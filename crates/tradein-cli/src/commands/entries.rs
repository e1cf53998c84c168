use clap::Args;
use serde_json::{json, Value};
use tracing::info;

use tradein_core::session::{EntryLog, Session};

use super::{choice, load_reference};
use crate::input;

/// Arguments for month-to-date KPIs over a daily entry log
#[derive(Args, Debug)]
pub struct EntriesArgs {
    /// Entry log with daily entries and lost trade-in remarks (.json or
    /// .yaml). Read from stdin when omitted.
    #[arg(long)]
    pub log: Option<String>,

    /// Reference data supplying targets for entries that carry none
    #[arg(long)]
    pub reference: Option<String>,

    /// Report a single representative
    #[arg(long)]
    pub spoc: Option<String>,
}

pub fn run_entries(args: EntriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let log: EntryLog = match &args.log {
        Some(path) => input::file::read_structured(path)?,
        None => match input::stdin::read_stdin()? {
            Some(text) => input::file::parse_structured(&text, false)?,
            None => return Err("provide an entry log with --log or on stdin".into()),
        },
    };
    info!(
        entries = log.entries.len(),
        remarks = log.remarks.len(),
        "entry log read"
    );

    let mut session = Session::start(load_reference(args.reference.as_deref())?);
    session.replay(log)?;

    let result = match args.spoc.as_deref().and_then(choice) {
        Some(name) => serde_json::to_value(session.entry_kpis(name))?,
        None => serde_json::to_value(session.close())?,
    };
    Ok(json!({ "result": result }))
}
