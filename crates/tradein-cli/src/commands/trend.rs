use serde_json::Value;
use tracing::info;

use tradein_core::dashboard::monthly_trend;

use super::ViewArgs;

/// The period flags mark the first month of the trend; later months follow.
pub fn run_trend(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.data.load()?;
    let reference = args.data.reference()?;
    let query = args.query()?;
    info!(from = %query.period.label(), "computing monthly trend");
    let result = monthly_trend(&data, &reference, &query)?;
    Ok(serde_json::to_value(result)?)
}
