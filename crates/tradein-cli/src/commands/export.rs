use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use tradein_core::dashboard::{
    monthly_trend, region_overview, representative_summary, MonthTrend,
};
use tradein_core::DashboardView;

use super::ViewArgs;

/// Arguments for the CSV re-export
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Directory the CSV files are written to (created if missing)
    #[arg(long)]
    pub out_dir: String,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.view.data.load()?;
    let reference = args.view.data.reference()?;
    let query = args.view.query()?;

    let summary = representative_summary(&data, &reference, &query)?;
    let overview = region_overview(&data, &reference, &query)?;
    let trend = monthly_trend(&data, &reference, &query)?;

    let (summary_view, overview_view) = match (&summary.result, &overview.result) {
        (DashboardView::Ready(s), DashboardView::Ready(o)) => (s, o),
        (DashboardView::NoData { notice }, _) | (_, DashboardView::NoData { notice }) => {
            return Ok(json!({
                "result": { "written": [], "notice": notice },
                "warnings": summary.warnings,
            }));
        }
    };

    let dir = Path::new(&args.out_dir);
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create '{}': {}", dir.display(), e))?;

    let mut written = vec![
        write_rows(dir, "representative_summary.csv", &summary_view.rows)?,
        write_rows(dir, "top_performers.csv", &summary_view.top_performers)?,
        write_rows(dir, "bottom_performers.csv", &summary_view.bottom_performers)?,
        write_rows(dir, "region_market_share.csv", &overview_view.region_shares)?,
        write_rows(
            dir,
            "store_breakdown.csv",
            &overview_view.store_representative_shares,
        )?,
        write_rows(dir, "low_share.csv", &overview_view.low_share)?,
    ];
    if let DashboardView::Ready(t) = &trend.result {
        written.push(write_rows(dir, "monthly_trend.csv", &month_rows(&t.months))?);
    }

    let mut warnings = summary.warnings;
    for w in overview.warnings {
        if !warnings.contains(&w) {
            warnings.push(w);
        }
    }

    Ok(json!({
        "result": {
            "written": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "period": query.period.label(),
        },
        "warnings": warnings,
    }))
}

/// One flat CSV line per month; the nested splits stay in the JSON view.
#[derive(Debug, Serialize)]
struct MonthRow<'a> {
    year: i32,
    month: &'a str,
    maple_count: usize,
    cashify_count: usize,
    market_share: Decimal,
    share_change: Option<Decimal>,
}

fn month_rows(months: &[MonthTrend]) -> Vec<MonthRow<'_>> {
    months
        .iter()
        .map(|m| MonthRow {
            year: m.year,
            month: &m.month,
            maple_count: m.maple_count,
            cashify_count: m.cashify_count,
            market_share: m.market_share,
            share_change: m.share_change,
        })
        .collect()
}

fn write_rows<T: Serialize>(
    dir: &Path,
    name: &str,
    rows: &[T],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join(name);
    let mut wtr = csv::Writer::from_path(&path)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    info!(file = %path.display(), rows = rows.len(), "exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tradein_core::dashboard::RegionShare;
    use tradein_core::metrics::{CategoryContribution, GroupKey};

    #[test]
    fn test_write_rows_uses_field_names_as_header() {
        let dir = std::env::temp_dir().join("tradein-export-test");
        fs::create_dir_all(&dir).unwrap();
        let rows = vec![RegionShare {
            region: "South".into(),
            maple_count: 4,
            cashify_count: 3,
            market_share: dec!(57.14),
        }];
        let path = write_rows(&dir, "regions.csv", &rows).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("region,maple_count,cashify_count,market_share")
        );
        assert_eq!(lines.next(), Some("South,4,3,57.14"));
    }

    #[test]
    fn test_month_rows_leave_first_change_blank() {
        let month = |name: &str, share: Decimal, change: Option<Decimal>| MonthTrend {
            year: 2025,
            month: name.into(),
            maple_count: 2,
            cashify_count: 2,
            market_share: share,
            share_change: change,
            category_contribution: CategoryContribution {
                key: GroupKey::ProductCategory,
                combined_total: 4,
                categories: Vec::new(),
            },
            regions: Vec::new(),
        };
        let months = vec![month("May", dec!(40), None), month("June", dec!(50), Some(dec!(10)))];
        let dir = std::env::temp_dir().join("tradein-export-trend-test");
        fs::create_dir_all(&dir).unwrap();
        let path = write_rows(&dir, "trend.csv", &month_rows(&months)).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "year,month,maple_count,cashify_count,market_share,share_change"
        );
        assert_eq!(lines[1], "2025,May,2,2,40,");
        assert_eq!(lines[2], "2025,June,2,2,50,10");
    }
}
