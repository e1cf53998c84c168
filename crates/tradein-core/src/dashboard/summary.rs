use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{base_warnings, no_data, scope_period, LoadedData, ViewQuery};
use crate::metrics::share::checked_mean;
use crate::metrics::{market_share, shortfall, target_attainment};
use crate::reference::{ReferenceData, WeekOff};
use crate::types::{round_pct, with_metadata, ComputationOutput, DashboardView, Percent};
use crate::TradeInResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One representative at one store for the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeRow {
    pub store_name: String,
    pub store_state: String,
    pub representative: String,
    pub target: u32,
    pub achieved: usize,
    pub lost: usize,
    pub market_share: Percent,
    pub target_attainment: Percent,
    pub shortfall: i64,
    pub weekoff: WeekOff,
    /// Achieved at least a non-zero target
    pub met_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryKpis {
    pub representatives: usize,
    pub total_achieved: usize,
    pub total_lost: usize,
    pub avg_target_attainment: Percent,
    pub avg_market_share: Percent,
    pub met_target: usize,
}

/// Acquisitions and losses of every representative sharing a weekoff day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekoffGroup {
    pub weekoff: WeekOff,
    /// Distinct representatives, however many stores each covers
    pub representatives: usize,
    pub achieved: usize,
    pub lost: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepresentativeSummary {
    pub rows: Vec<RepresentativeRow>,
    pub kpis: SummaryKpis,
    pub achievers: Vec<RepresentativeRow>,
    pub top_performers: Vec<RepresentativeRow>,
    /// Fewest acquisitions first, same length as `top_performers`
    pub bottom_performers: Vec<RepresentativeRow>,
    /// State appearing most often among the top performers
    pub top_state: Option<String>,
    pub below_attainment_threshold: Vec<RepresentativeRow>,
    pub below_share_threshold: Vec<RepresentativeRow>,
    pub weekoff_groups: Vec<WeekoffGroup>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Review of every representative in the selected scope.
///
/// Rows cover each (store, representative) pair seen in either channel;
/// unattributed records and excluded placeholder names are left out.
pub fn representative_summary(
    data: &LoadedData,
    reference: &ReferenceData,
    query: &ViewQuery,
) -> TradeInResult<ComputationOutput<DashboardView<RepresentativeSummary>>> {
    let start = Instant::now();
    let warnings = base_warnings(data, reference, &query.period);

    let scope = match scope_period(data, &query.period)? {
        Ok(s) => s.select(&query.selection),
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

    // (store, representative) -> (state, achieved, lost)
    let mut pairs: BTreeMap<(String, String), (Option<String>, usize, usize)> = BTreeMap::new();
    for (r, is_maple) in scope
        .maple
        .iter()
        .map(|r| (r, true))
        .chain(scope.cashify.iter().map(|r| (r, false)))
    {
        let (Some(store), Some(rep)) = (r.store_name.as_ref(), r.representative.as_ref()) else {
            continue;
        };
        if reference.is_excluded(rep) {
            continue;
        }
        let entry = pairs
            .entry((store.clone(), rep.clone()))
            .or_insert((None, 0, 0));
        if entry.0.is_none() {
            entry.0 = r.store_state.clone();
        }
        if is_maple {
            entry.1 += 1;
        } else {
            entry.2 += 1;
        }
    }
    debug!(pairs = pairs.len(), "representative summary rows");

    let rows: Vec<RepresentativeRow> = pairs
        .into_iter()
        .map(|((store, rep), (state, achieved, lost))| {
            let target = reference.target_for(&rep);
            RepresentativeRow {
                store_state: state.unwrap_or_else(|| "Unknown".into()),
                target,
                achieved,
                lost,
                market_share: round_pct(market_share(achieved, lost)),
                target_attainment: round_pct(target_attainment(achieved, target)),
                shortfall: shortfall(target, achieved),
                weekoff: reference.weekoff_for(&rep),
                met_target: target > 0 && achieved >= target as usize,
                store_name: store,
                representative: rep,
            }
        })
        .collect();

    let settings = reference.settings();
    let achievers: Vec<_> = rows.iter().filter(|r| r.met_target).cloned().collect();

    let mut ranked = rows.clone();
    ranked.sort_by(|a, b| {
        b.achieved
            .cmp(&a.achieved)
            .then_with(|| a.representative.cmp(&b.representative))
    });
    ranked.truncate(settings.top_performers);

    let mut trailing = rows.clone();
    trailing.sort_by(|a, b| {
        a.achieved
            .cmp(&b.achieved)
            .then_with(|| a.representative.cmp(&b.representative))
    });
    trailing.truncate(settings.top_performers);

    let summary = RepresentativeSummary {
        kpis: kpis(&rows),
        bottom_performers: trailing,
        top_state: most_common_state(&ranked),
        below_attainment_threshold: rows
            .iter()
            .filter(|r| r.target_attainment < settings.low_attainment_threshold)
            .cloned()
            .collect(),
        below_share_threshold: rows
            .iter()
            .filter(|r| r.market_share < settings.low_share_threshold)
            .cloned()
            .collect(),
        weekoff_groups: weekoff_groups(&rows),
        achievers,
        top_performers: ranked,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        query,
        warnings,
        elapsed,
        DashboardView::Ready(summary),
    ))
}

const METHODOLOGY: &str =
    "Representative summary: per store/representative target attainment and market share";

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn mean(values: impl Iterator<Item = Decimal>) -> Decimal {
    checked_mean(values).unwrap_or(Decimal::ZERO)
}

fn kpis(rows: &[RepresentativeRow]) -> SummaryKpis {
    SummaryKpis {
        representatives: rows
            .iter()
            .map(|r| r.representative.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        total_achieved: rows.iter().map(|r| r.achieved).sum(),
        total_lost: rows.iter().map(|r| r.lost).sum(),
        // Averaged from unrounded figures, rounded once.
        avg_target_attainment: round_pct(mean(
            rows.iter().map(|r| target_attainment(r.achieved, r.target)),
        )),
        avg_market_share: round_pct(mean(rows.iter().map(|r| market_share(r.achieved, r.lost)))),
        met_target: rows.iter().filter(|r| r.met_target).count(),
    }
}

fn most_common_state(rows: &[RepresentativeRow]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in rows {
        *counts.entry(r.store_state.as_str()).or_insert(0) += 1;
    }
    // Ties go to the alphabetically first state.
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (state, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((state, n)),
        })
        .map(|(s, _)| s.to_string())
}

fn weekoff_groups(rows: &[RepresentativeRow]) -> Vec<WeekoffGroup> {
    let mut groups: Vec<(WeekoffGroup, BTreeSet<&str>)> = Vec::new();
    for r in rows {
        let idx = match groups.iter().position(|(g, _)| g.weekoff == r.weekoff) {
            Some(i) => i,
            None => {
                let empty = WeekoffGroup {
                    weekoff: r.weekoff,
                    representatives: 0,
                    achieved: 0,
                    lost: 0,
                };
                groups.push((empty, BTreeSet::new()));
                groups.len() - 1
            }
        };
        let (group, names) = &mut groups[idx];
        names.insert(r.representative.as_str());
        group.representatives = names.len();
        group.achieved += r.achieved;
        group.lost += r.lost;
    }
    let mut groups: Vec<WeekoffGroup> = groups.into_iter().map(|(g, _)| g).collect();
    groups.sort_by_key(|g| g.weekoff.weekday().map_or(7, |d| d.num_days_from_monday()));
    groups
}
