use serde_json::Value;
use tracing::info;

use tradein_core::dashboard::representative_summary;

use super::ViewArgs;

pub fn run_summary(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.data.load()?;
    let reference = args.data.reference()?;
    let query = args.query()?;
    info!(period = %query.period.label(), "computing representative summary");
    let result = representative_summary(&data, &reference, &query)?;
    Ok(serde_json::to_value(result)?)
}
