use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{base_warnings, no_data, scope_period, LoadedData, PeriodScope, ViewQuery};
use crate::filter::{apply_selection, LocationSelection};
use crate::metrics::{
    acquisition_averages, average_price_differential, category_contribution, group_counts,
    market_share, mean_device_value, shortfall, target_attainment, weekoff_loss,
    weekoff_records, working_day_loss, working_day_records, AcquisitionAverages,
    CategoryContribution, GroupKey, WeekoffCalendar, WorkingDayLoss,
};
use crate::reference::{ReferenceData, WeekOff};
use crate::types::{round_pct, with_metadata, ComputationOutput, DashboardView, Money, Percent};
use crate::TradeInResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Losses at a representative's store split by whether they were on
/// weekoff.
///
/// Every Cashify loss at the store counts, whoever it is attributed to, so
/// the split covers `store_losses` rather than the scorecard's
/// `devices_lost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekoffAnalysis {
    pub representative: String,
    /// Store the losses are counted at
    pub store_name: String,
    /// Cashify records at the store for the period; `weekoff_loss` plus
    /// `working_day_loss.count`
    pub store_losses: usize,
    pub weekoff: WeekOff,
    pub weekoff_dates: Vec<NaiveDate>,
    pub weekoff_loss: usize,
    pub weekoff_loss_by_category: BTreeMap<String, usize>,
    pub working_day_loss: WorkingDayLoss,
    pub working_day_loss_by_state: BTreeMap<String, usize>,
}

/// Figures for the selected scope, normally one representative at one
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scorecard {
    pub selection: LocationSelection,
    /// Maple acquisitions at the scope
    pub achievement: usize,
    /// Cashify transactions at the scope
    pub devices_lost: usize,
    pub market_share: Percent,
    /// Representative's monthly target; 0 without a representative
    pub target: u32,
    pub target_attainment: Percent,
    pub shortfall: i64,
    pub avg_maple_value: Option<Money>,
    pub avg_cashify_value: Option<Money>,
    /// Mean Maple value minus mean Cashify value
    pub price_differential: Money,
    /// Maple outbid Cashify on average yet the representative still lost
    /// devices
    pub priced_higher_but_lost: bool,
    /// Category split at the selected region, or every region if none
    pub category_contribution: CategoryContribution,
    pub weekoff_analysis: Option<WeekoffAnalysis>,
    pub maple_averages: AcquisitionAverages,
    pub cashify_averages: AcquisitionAverages,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scorecard for the current selection.
///
/// Counting scope is the period filter intersected with the location
/// selection, applied to each channel independently. The same formulas
/// apply when no representative is selected; only the target (0) and the
/// weekoff analysis (absent) depend on one.
pub fn representative_scorecard(
    data: &LoadedData,
    reference: &ReferenceData,
    query: &ViewQuery,
) -> TradeInResult<ComputationOutput<DashboardView<Scorecard>>> {
    let start = Instant::now();
    let mut warnings = base_warnings(data, reference, &query.period);

    let period_scope = match scope_period(data, &query.period)? {
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

    let selection = query.selection.normalized();
    let scoped = period_scope.select(&selection);
    let achievement = scoped.maple.len();
    let devices_lost = scoped.cashify.len();
    debug!(achievement, devices_lost, "scorecard scope counted");

    let target = selection
        .representative
        .as_deref()
        .map(|r| reference.target_for(r))
        .unwrap_or(0);

    let avg_maple_value = mean_device_value(scoped.maple.iter());
    let avg_cashify_value = mean_device_value(scoped.cashify.iter());
    let price_differential = average_price_differential(scoped.maple.iter(), scoped.cashify.iter());

    let region_scope = LocationSelection {
        region: selection.region.clone(),
        ..Default::default()
    };
    let category = category_contribution(
        &apply_selection(&period_scope.maple, &region_scope).records,
        &apply_selection(&period_scope.cashify, &region_scope).records,
        GroupKey::ProductCategory,
    )
    .rounded();

    let weekoff_analysis =
        weekoff_analysis(&period_scope, &selection, achievement, reference, query, &mut warnings)?;

    let card = Scorecard {
        achievement,
        devices_lost,
        market_share: round_pct(market_share(achievement, devices_lost)),
        target,
        target_attainment: round_pct(target_attainment(achievement, target)),
        shortfall: shortfall(target, achievement),
        avg_maple_value: avg_maple_value.map(|v| v.round_dp(2)),
        avg_cashify_value: avg_cashify_value.map(|v| v.round_dp(2)),
        price_differential: price_differential.round_dp(2),
        priced_higher_but_lost: selection.representative.is_some()
            && price_differential > Decimal::ZERO,
        category_contribution: category,
        weekoff_analysis,
        maple_averages: acquisition_averages(&scoped.maple.records).rounded(2),
        cashify_averages: acquisition_averages(&scoped.cashify.records).rounded(2),
        selection,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        query,
        warnings,
        elapsed,
        DashboardView::Ready(card),
    ))
}

const METHODOLOGY: &str = "Representative scorecard: Maple / (Maple + Cashify) market share, target attainment and weekoff loss split";

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn weekoff_analysis(
    period_scope: &PeriodScope,
    selection: &LocationSelection,
    achievement: usize,
    reference: &ReferenceData,
    query: &ViewQuery,
    warnings: &mut Vec<String>,
) -> TradeInResult<Option<WeekoffAnalysis>> {
    let Some(representative) = selection.representative.as_deref() else {
        return Ok(None);
    };
    let Some(month) = query.period.month_number() else {
        warnings.push(
            "Weekoff losses need a specific month; select one to see the weekoff split".into(),
        );
        return Ok(None);
    };

    // The selected store, else the first store the representative sold at.
    let store = match selection.store_name.as_deref() {
        Some(s) => s.to_string(),
        None => match period_scope
            .maple
            .iter()
            .find(|r| r.is_attributed_to(representative))
            .and_then(|r| r.store_name.clone())
        {
            Some(s) => s,
            None => {
                warnings.push(format!(
                    "No stores found for {} in the filtered Maple data; weekoff losses skipped",
                    representative
                ));
                return Ok(None);
            }
        },
    };

    let calendar = WeekoffCalendar::build(reference, query.period.year, month)?;
    let dates = calendar.dates_for(representative);
    let cashify = &period_scope.cashify.records;

    let by_category = group_counts(
        weekoff_records(cashify, &store, &dates),
        GroupKey::ProductCategory,
    );
    let by_state = group_counts(
        working_day_records(cashify, &store, &dates),
        GroupKey::StoreState,
    );
    let mut working = working_day_loss(achievement, cashify, &store, &dates);
    working.percent = round_pct(working.percent);
    let store_losses = period_scope.cashify.count_matching(|r| r.is_at_store(&store));

    Ok(Some(WeekoffAnalysis {
        representative: representative.to_string(),
        weekoff: reference.weekoff_for(representative),
        store_losses,
        weekoff_loss: weekoff_loss(cashify, &store, &dates),
        weekoff_dates: dates.into_iter().collect(),
        weekoff_loss_by_category: by_category,
        working_day_loss: working,
        working_day_loss_by_state: by_state,
        store_name: store,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PeriodFilter;
    use crate::records::{RecordSet, TradeInRecord};
    use crate::reference::{ReferenceFile, RepresentativeProfile};
    use crate::types::Channel;
    use chrono::Weekday;
    use rust_decimal_macros::dec;

    fn rec(store: &str, rep: Option<&str>, day: u32, value: Decimal) -> TradeInRecord {
        TradeInRecord {
            transaction_date: NaiveDate::from_ymd_opt(2025, 5, day),
            year: Some(2025),
            month: Some("May".into()),
            region: Some("South".into()),
            store_state: Some("Kerala".into()),
            store_name: Some(store.into()),
            representative: rep.map(String::from),
            device_value: Some(value),
            product_category: Some("Phone".into()),
            ..Default::default()
        }
    }

    fn reference() -> ReferenceData {
        ReferenceData::new(ReferenceFile {
            representatives: vec![RepresentativeProfile {
                name: "Ravi".into(),
                monthly_target: 10,
                weekoff: WeekOff::Day(Weekday::Fri),
            }],
            ..Default::default()
        })
        .unwrap()
    }

    fn data() -> LoadedData {
        // 2025-05-02 and 05-09 are Fridays.
        let maple = vec![
            rec("Lulu", Some("Ravi"), 5, dec!(1000)),
            rec("Lulu", Some("Ravi"), 6, dec!(1200)),
            rec("Lulu", Some("Ravi"), 7, dec!(1400)),
            rec("Lulu", Some("Anu"), 7, dec!(900)),
        ];
        let cashify = vec![
            rec("Lulu", Some("Ravi"), 2, dec!(1000)),
            rec("Lulu", None, 9, dec!(1000)),
            rec("Lulu", Some("Ravi"), 12, dec!(1000)),
            rec("Oberon", Some("Ravi"), 2, dec!(1000)),
        ];
        LoadedData::from_sets(
            RecordSet::new(Channel::Maple, maple),
            RecordSet::new(Channel::Cashify, cashify),
        )
    }

    fn query(month: Option<&str>, rep: Option<&str>) -> ViewQuery {
        let mut period = PeriodFilter::year(2025);
        if let Some(m) = month {
            period = period.with_month(m);
        }
        ViewQuery::new(period).with_selection(LocationSelection {
            representative: rep.map(String::from),
            ..Default::default()
        })
    }

    #[test]
    fn test_representative_counts_and_weekoff_split() {
        let out = representative_scorecard(&data(), &reference(), &query(Some("May"), Some("ravi")))
            .unwrap();
        let card = out.result.ready().unwrap();
        assert_eq!(card.achievement, 3);
        assert_eq!(card.devices_lost, 3);
        assert_eq!(card.market_share, dec!(50));
        assert_eq!(card.target, 10);
        assert_eq!(card.target_attainment, dec!(30));
        assert_eq!(card.shortfall, 7);
        assert_eq!(card.price_differential, dec!(200));
        assert!(card.priced_higher_but_lost);

        let w = card.weekoff_analysis.as_ref().unwrap();
        assert_eq!(w.store_name, "Lulu");
        assert_eq!(w.weekoff_dates.len(), 5);
        assert_eq!(w.weekoff_loss, 2);
        assert_eq!(w.working_day_loss.count, 1);
        assert_eq!(w.working_day_loss.percent, dec!(25));
        assert_eq!(w.weekoff_loss_by_category.get("Phone"), Some(&2));
    }

    #[test]
    fn test_weekoff_split_covers_whole_store() {
        let mut data = data();
        // Anu's loss at Lulu on a working day for Ravi
        data.cashify
            .records
            .push(rec("Lulu", Some("Anu"), 13, dec!(1000)));
        let out = representative_scorecard(&data, &reference(), &query(Some("May"), Some("Ravi")))
            .unwrap();
        let card = out.result.ready().unwrap();
        assert_eq!(card.devices_lost, 3);

        let w = card.weekoff_analysis.as_ref().unwrap();
        assert_eq!(w.store_losses, 4);
        assert_eq!(w.weekoff_loss, 2);
        assert_eq!(w.working_day_loss.count, 2);
        assert_eq!(w.weekoff_loss + w.working_day_loss.count, w.store_losses);
    }

    #[test]
    fn test_weekoff_needs_month() {
        let out =
            representative_scorecard(&data(), &reference(), &query(None, Some("Ravi"))).unwrap();
        let card = out.result.ready().unwrap();
        assert!(card.weekoff_analysis.is_none());
        assert!(out.warnings.iter().any(|w| w.contains("specific month")));
    }

    #[test]
    fn test_no_representative_uses_same_formula() {
        let out = representative_scorecard(&data(), &reference(), &query(Some("May"), None))
            .unwrap();
        let card = out.result.ready().unwrap();
        assert_eq!(card.achievement, 4);
        assert_eq!(card.devices_lost, 4);
        assert_eq!(card.market_share, dec!(50));
        assert_eq!(card.target, 0);
        assert_eq!(card.target_attainment, Decimal::ZERO);
        assert!(!card.priced_higher_but_lost);
        assert!(card.weekoff_analysis.is_none());
    }

    #[test]
    fn test_empty_period_is_no_data() {
        let out = representative_scorecard(&data(), &reference(), &query(Some("June"), Some("Ravi")))
            .unwrap();
        assert!(!out.result.is_ready());
    }
}
