use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::breakdown::RegionShare;
use super::{base_warnings, no_data, LoadedData, ViewQuery};
use crate::error::TradeInError;
use crate::filter::{apply_selection, month_label};
use crate::metrics::{category_contribution, market_share, CategoryContribution, GroupKey};
use crate::normalize::canonical_month;
use crate::records::TradeInRecord;
use crate::reference::ReferenceData;
use crate::types::{round_pct, with_metadata, ComputationOutput, DashboardView, Percent};
use crate::TradeInResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Both channels for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthTrend {
    pub year: i32,
    pub month: String,
    pub maple_count: usize,
    pub cashify_count: usize,
    pub market_share: Percent,
    /// Market share minus the previous listed month's; `None` for the first
    pub share_change: Option<Percent>,
    /// Product categories against the month's combined total
    pub category_contribution: CategoryContribution,
    /// Regions seen in either channel that month
    pub regions: Vec<RegionShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// First month the trend may cover
    pub from: String,
    /// Calendar order; months with no record in either channel are absent
    pub months: Vec<MonthTrend>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Month-by-month counts, market share, category split and region split
/// from the period's start onward.
///
/// The period's year (and month, when one is selected) marks where the
/// trend begins; every later month in the data follows. The day filter is
/// ignored. The location selection narrows both channels as usual.
pub fn monthly_trend(
    data: &LoadedData,
    reference: &ReferenceData,
    query: &ViewQuery,
) -> TradeInResult<ComputationOutput<DashboardView<MonthlyTrend>>> {
    let start = Instant::now();
    let mut warnings = base_warnings(data, reference, &query.period);

    query.period.validate()?;
    let start_month = match (&query.period.month, query.period.month_number()) {
        (None, _) => 1,
        (Some(_), Some(n)) => n,
        (Some(m), None) => {
            return Err(TradeInError::InvalidInput {
                field: "month".into(),
                reason: format!("'{}' is not a calendar month", m),
            })
        }
    };
    let from = (query.period.year, start_month);

    let maple = apply_selection(&data.maple, &query.selection);
    let cashify = apply_selection(&data.cashify, &query.selection);

    let mut buckets: BTreeMap<(i32, u32), (Vec<TradeInRecord>, Vec<TradeInRecord>)> =
        BTreeMap::new();
    let mut undated = 0usize;
    for (r, is_maple) in maple
        .iter()
        .map(|r| (r, true))
        .chain(cashify.iter().map(|r| (r, false)))
    {
        let Some(key) = month_key(r) else {
            undated += 1;
            continue;
        };
        if key < from {
            continue;
        }
        let bucket = buckets.entry(key).or_default();
        if is_maple {
            bucket.0.push(r.clone());
        } else {
            bucket.1.push(r.clone());
        }
    }
    if undated > 0 {
        warnings.push(format!(
            "{} records without a recognisable year and month left out of the trend",
            undated
        ));
    }
    debug!(months = buckets.len(), undated, "monthly trend buckets");

    let from_label = format!("{} {}", label_for(start_month), query.period.year);
    if buckets.is_empty() {
        let elapsed = start.elapsed().as_micros() as u64;
        return Ok(with_metadata(
            METHODOLOGY,
            query,
            warnings,
            elapsed,
            no_data(format!("No data available from {} onward", from_label)),
        ));
    }

    let mut months = Vec::with_capacity(buckets.len());
    let mut previous: Option<Percent> = None;
    for ((year, number), (m, c)) in buckets {
        let share = market_share(m.len(), c.len());
        months.push(MonthTrend {
            year,
            month: label_for(number).to_string(),
            maple_count: m.len(),
            cashify_count: c.len(),
            market_share: round_pct(share),
            share_change: previous.map(|p| round_pct(share - p)),
            category_contribution: category_contribution(&m, &c, GroupKey::ProductCategory)
                .rounded(),
            regions: region_rows(&m, &c),
        });
        previous = Some(share);
    }

    let trend = MonthlyTrend {
        from: from_label,
        months,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        query,
        warnings,
        elapsed,
        DashboardView::Ready(trend),
    ))
}

const METHODOLOGY: &str =
    "Monthly trend: per-month Maple / (Maple + Cashify) share with category and region splits";

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn month_key(r: &TradeInRecord) -> Option<(i32, u32)> {
    let year = r.year?;
    let month = canonical_month(r.month.as_deref()?)?;
    Some((year, month.number_from_month()))
}

fn label_for(number: u32) -> &'static str {
    month_label(number).unwrap_or("January")
}

fn region_rows(maple: &[TradeInRecord], cashify: &[TradeInRecord]) -> Vec<RegionShare> {
    let regions: BTreeSet<&str> = maple
        .iter()
        .chain(cashify.iter())
        .filter_map(|r| r.region.as_deref())
        .collect();
    regions
        .into_iter()
        .map(|region| {
            let m = maple.iter().filter(|r| r.is_in_region(region)).count();
            let c = cashify.iter().filter(|r| r.is_in_region(region)).count();
            RegionShare {
                region: region.to_string(),
                maple_count: m,
                cashify_count: c,
                market_share: round_pct(market_share(m, c)),
            }
        })
        .collect()
}
