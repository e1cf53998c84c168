use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::{base_warnings, no_data, scope_period, LoadedData, PeriodScope, ViewQuery};
use crate::metrics::{
    market_share, store_device_counts, stores_per_state, StateStoreCount, StoreDeviceCount,
};
use crate::reference::ReferenceData;
use crate::types::{round_pct, with_metadata, ComputationOutput, DashboardView, Percent};
use crate::TradeInResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShare {
    pub region: String,
    pub maple_count: usize,
    pub cashify_count: usize,
    pub market_share: Percent,
}

/// Market share of one representative at one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRepresentativeShare {
    pub region: String,
    pub store_state: String,
    pub store_name: String,
    pub representative: String,
    pub maple_count: usize,
    pub cashify_count: usize,
    pub market_share: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionOverview {
    pub region_shares: Vec<RegionShare>,
    /// Region the store breakdown covers; `None` means every region
    pub focus_region: Option<String>,
    pub store_representative_shares: Vec<StoreRepresentativeShare>,
    pub low_share_threshold: Percent,
    /// Breakdown rows strictly below the threshold
    pub low_share: Vec<StoreRepresentativeShare>,
    pub stores_per_state: Vec<StateStoreCount>,
    pub store_device_counts: Vec<StoreDeviceCount>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Region-level market share plus the store and representative breakdown
/// for the selected region. Only the region of the selection is used;
/// lower levels are ignored by this view.
pub fn region_overview(
    data: &LoadedData,
    reference: &ReferenceData,
    query: &ViewQuery,
) -> TradeInResult<ComputationOutput<DashboardView<RegionOverview>>> {
    let start = Instant::now();
    let warnings = base_warnings(data, reference, &query.period);

    let scope = match scope_period(data, &query.period)? {
        Ok(s) => s,
        Err(notice) => {
            let elapsed = start.elapsed().as_micros() as u64;
            return Ok(with_metadata(
                METHODOLOGY,
                query,
                warnings,
                elapsed,
                no_data(notice),
            ));
        }
    };

    let focus_region = query.selection.normalized().region;
    let threshold = reference.settings().low_share_threshold;

    let (store_representative_shares, low_share) =
        store_representative_breakdown(&scope, focus_region.as_deref(), threshold);

    let overview = RegionOverview {
        region_shares: region_shares(&scope),
        focus_region,
        store_representative_shares,
        low_share_threshold: threshold,
        low_share,
        stores_per_state: stores_per_state(&scope.maple.records, &scope.cashify.records),
        store_device_counts: store_device_counts(&scope.maple.records, &scope.cashify.records),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        query,
        warnings,
        elapsed,
        DashboardView::Ready(overview),
    ))
}

const METHODOLOGY: &str =
    "Region overview: market share by region and by store/representative, store coverage per state";

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// One row per region seen in Maple data.
fn region_shares(scope: &PeriodScope) -> Vec<RegionShare> {
    let regions: BTreeSet<&str> = scope.maple.iter().filter_map(|r| r.region.as_deref()).collect();
    regions
        .into_iter()
        .map(|region| {
            let m = scope.maple.count_matching(|r| r.is_in_region(region));
            let c = scope.cashify.count_matching(|r| r.is_in_region(region));
            RegionShare {
                region: region.to_string(),
                maple_count: m,
                cashify_count: c,
                market_share: round_pct(market_share(m, c)),
            }
        })
        .collect()
}

/// Rows for every (store, representative) pair in Maple data within the
/// region, with the representative's Cashify count at the same store.
fn store_representative_breakdown(
    scope: &PeriodScope,
    region: Option<&str>,
    threshold: Percent,
) -> (Vec<StoreRepresentativeShare>, Vec<StoreRepresentativeShare>) {
    let in_region: Vec<_> = scope
        .maple
        .iter()
        .filter(|r| region.map_or(true, |reg| r.is_in_region(reg)))
        .collect();
    let stores: BTreeSet<&str> = in_region
        .iter()
        .filter_map(|r| r.store_name.as_deref())
        .collect();

    let mut rows = Vec::new();
    let mut low = Vec::new();
    for store in stores {
        let at_store: Vec<_> = in_region.iter().filter(|r| r.is_at_store(store)).collect();
        // A store's state and region are taken from its first row.
        let first = at_store.first();
        let store_state = first
            .and_then(|r| r.store_state.clone())
            .unwrap_or_else(|| "Unknown".into());
        let store_region = first
            .and_then(|r| r.region.clone())
            .unwrap_or_else(|| "Unknown".into());
        let reps: BTreeSet<&str> = at_store
            .iter()
            .filter_map(|r| r.representative.as_deref())
            .collect();

        for rep in reps {
            let m = at_store.iter().filter(|r| r.is_attributed_to(rep)).count();
            let c = scope
                .cashify
                .count_matching(|r| r.is_at_store(store) && r.is_attributed_to(rep));
            let share = market_share(m, c);
            let row = StoreRepresentativeShare {
                region: store_region.clone(),
                store_state: store_state.clone(),
                store_name: store.to_string(),
                representative: rep.to_string(),
                maple_count: m,
                cashify_count: c,
                market_share: round_pct(share),
            };
            if share < threshold {
                low.push(row.clone());
            }
            rows.push(row);
        }
    }
    (rows, low)
}
