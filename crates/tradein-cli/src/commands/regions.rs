use serde_json::Value;
use tracing::info;

use tradein_core::dashboard::region_overview;

use super::ViewArgs;

pub fn run_regions(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.data.load()?;
    let reference = args.data.reference()?;
    let query = args.query()?;
    info!(period = %query.period.label(), "computing region overview");
    let result = region_overview(&data, &reference, &query)?;
    Ok(serde_json::to_value(result)?)
}
