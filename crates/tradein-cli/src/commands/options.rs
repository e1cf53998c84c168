use clap::Args;
use serde_json::{json, Value};

use tradein_core::filter::{cascade_options, period_options};

use super::{choice, DataArgs, SelectionArgs};

/// Arguments for listing selector values
#[derive(Args, Debug)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Restrict months to this year
    #[arg(long)]
    pub year: Option<i32>,

    /// List the days seen in this month
    #[arg(long, default_value = "All")]
    pub month: String,

    /// Narrow the location lists to this selection
    #[command(flatten)]
    pub selection: SelectionArgs,
}

pub fn run_options(args: OptionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.data.load()?;
    let periods = period_options(&data.maple, &data.cashify, args.year, choice(&args.month));
    let locations = cascade_options(&data.maple, &args.selection.selection());
    Ok(json!({
        "result": {
            "period": periods,
            "locations": locations,
        },
        "warnings": data.warnings,
    }))
}
