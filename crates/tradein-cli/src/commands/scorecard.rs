use serde_json::Value;
use tracing::info;

use tradein_core::dashboard::representative_scorecard;

use super::ViewArgs;

pub fn run_scorecard(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.data.load()?;
    let reference = args.data.reference()?;
    let query = args.query()?;
    info!(period = %query.period.label(), "computing representative scorecard");
    let result = representative_scorecard(&data, &reference, &query)?;
    Ok(serde_json::to_value(result)?)
}
