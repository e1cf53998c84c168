use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::records::TradeInRecord;

// ---------------------------------------------------------------------------
// Acquisition pace
// ---------------------------------------------------------------------------

/// Mean number of transactions per active day, ISO week and month.
///
/// Days and weeks come from the transaction date; months from the month
/// column, which is populated even where the date failed to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionAverages {
    pub daily: Decimal,
    pub weekly: Decimal,
    pub monthly: Decimal,
}

impl AcquisitionAverages {
    pub fn rounded(self, dp: u32) -> Self {
        Self {
            daily: self.daily.round_dp(dp),
            weekly: self.weekly.round_dp(dp),
            monthly: self.monthly.round_dp(dp),
        }
    }
}

fn mean_group_size<K: Ord>(keys: impl Iterator<Item = K>) -> Decimal {
    let mut groups: BTreeMap<K, u64> = BTreeMap::new();
    let mut total = 0u64;
    for k in keys {
        *groups.entry(k).or_insert(0) += 1;
        total += 1;
    }
    if groups.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(total) / Decimal::from(groups.len() as u64)
    }
}

/// Periods with no transactions are not counted.
pub fn acquisition_averages(records: &[TradeInRecord]) -> AcquisitionAverages {
    let dates = || records.iter().filter_map(|r| r.transaction_date);
    AcquisitionAverages {
        daily: mean_group_size(dates()),
        weekly: mean_group_size(dates().map(|d| {
            let w = d.iso_week();
            (w.year(), w.week())
        })),
        monthly: mean_group_size(
            records
                .iter()
                .filter_map(|r| r.month.as_deref().map(|m| (r.year, m))),
        ),
    }
}

// ---------------------------------------------------------------------------
// Store coverage
// ---------------------------------------------------------------------------

/// Distinct stores per state in each channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStoreCount {
    pub store_state: String,
    pub maple_stores: usize,
    pub cashify_stores: usize,
    /// Stores seen in either channel
    pub all_stores: usize,
}

fn stores_by_state(records: &[TradeInRecord]) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut out: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for r in records {
        if let (Some(state), Some(store)) = (r.store_state.as_deref(), r.store_name.as_deref()) {
            out.entry(state).or_default().insert(store);
        }
    }
    out
}

pub fn stores_per_state(maple: &[TradeInRecord], cashify: &[TradeInRecord]) -> Vec<StateStoreCount> {
    let m = stores_by_state(maple);
    let c = stores_by_state(cashify);
    let states: BTreeSet<&str> = m.keys().chain(c.keys()).copied().collect();
    states
        .into_iter()
        .map(|state| {
            let in_maple = m.get(state);
            let in_cashify = c.get(state);
            let all: BTreeSet<&str> = in_maple
                .into_iter()
                .chain(in_cashify)
                .flat_map(|s| s.iter().copied())
                .collect();
            StateStoreCount {
                store_state: state.to_string(),
                maple_stores: in_maple.map_or(0, BTreeSet::len),
                cashify_stores: in_cashify.map_or(0, BTreeSet::len),
                all_stores: all.len(),
            }
        })
        .collect()
}

/// Transactions per store in each channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDeviceCount {
    pub store_state: String,
    pub store_name: String,
    pub maple_count: usize,
    pub cashify_count: usize,
}

/// Device counts per (state, store), outer-joined: a store seen in only one
/// channel gets 0 in the other.
pub fn store_device_counts(
    maple: &[TradeInRecord],
    cashify: &[TradeInRecord],
) -> Vec<StoreDeviceCount> {
    let mut counts: BTreeMap<(&str, &str), (usize, usize)> = BTreeMap::new();
    for r in maple {
        if let (Some(state), Some(store)) = (r.store_state.as_deref(), r.store_name.as_deref()) {
            counts.entry((state, store)).or_default().0 += 1;
        }
    }
    for r in cashify {
        if let (Some(state), Some(store)) = (r.store_state.as_deref(), r.store_name.as_deref()) {
            counts.entry((state, store)).or_default().1 += 1;
        }
    }
    counts
        .into_iter()
        .map(|((state, store), (m, c))| StoreDeviceCount {
            store_state: state.to_string(),
            store_name: store.to_string(),
            maple_count: m,
            cashify_count: c,
        })
        .collect()
}
