use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tradein_core::dashboard::{
    monthly_trend, region_overview, representative_scorecard, representative_summary,
    DashboardRequest, LoadedData, ViewQuery,
};
use tradein_core::filter::{cascade_options, period_options, LocationSelection, PeriodFilter};
use tradein_core::records::RawTable;
use tradein_core::reference::ReferenceData;
use tradein_core::{DashboardView, TradeInError};

// ===========================================================================
// Fixtures
// ===========================================================================

const MAPLE_HEADERS: [&str; 10] = [
    "Created Date",
    "Month",
    "Year",
    "Store Name",
    "Spoc Name",
    "State Region",
    "Store State",
    "Maple Bid",
    "Old IMEI No",
    "Product Category",
];

// Drifted headers as seen in older Cashify exports.
const CASHIFY_HEADERS: [&str; 10] = [
    "Order Date",
    "Month",
    "Year",
    "Store Name",
    "Spocs",
    "Region",
    "Store State",
    "Initial Device Amount ",
    "Old Device IMEI",
    "Product Category",
];

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> RawTable {
    RawTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
}

fn row(date: &str, month: &str, store: &str, rep: &str, value: &str, cat: &str) -> Vec<String> {
    vec![
        date.into(),
        month.into(),
        "2025".into(),
        store.into(),
        rep.into(),
        "South".into(),
        "karnataka".into(),
        value.into(),
        "35000000000000".into(),
        cat.into(),
    ]
}

fn reference() -> ReferenceData {
    ReferenceData::from_json_str(
        r#"{
            "reporting_month": { "year": 2025, "month": "June" },
            "representatives": [
                { "name": "R", "monthly_target": 28, "weekoff": "Thursday" }
            ]
        }"#,
    )
    .unwrap()
}

/// June 2025 has four Thursdays: 5, 12, 19, 26.
///
/// 20 Maple acquisitions by R at "Iplanet @ Jp Nagar"; 10 Cashify losses
/// against R at the same store, 3 of them on Thursdays.
fn scenario() -> DashboardRequest {
    let maple_rows = (0..20)
        .map(|i| {
            let day = [2, 3, 4, 6, 7][i % 5];
            row(
                &format!("{:02}-06-2025", day),
                "6",
                "iplanet @ jp nagar",
                "r",
                "15,000",
                "Phone",
            )
        })
        .collect();
    let loss_days = [5, 12, 19, 2, 3, 4, 9, 10, 11, 13];
    let cashify_rows = loss_days
        .iter()
        .map(|d| {
            row(
                &format!("2025-06-{:02}", d),
                "Jun",
                "Iplanet @ Jp Nagar",
                "R",
                "14000",
                if *d == 5 { "Tablet" } else { "Phone" },
            )
        })
        .collect();

    DashboardRequest {
        maple: table(&MAPLE_HEADERS, maple_rows),
        cashify: table(&CASHIFY_HEADERS, cashify_rows),
        reference: reference(),
        query: ViewQuery::new(PeriodFilter::year(2025).with_month("June")).with_selection(
            LocationSelection {
                representative: Some("R".into()),
                ..Default::default()
            },
        ),
    }
}

// ===========================================================================
// Representative scorecard
// ===========================================================================

#[test]
fn test_end_to_end_scorecard() {
    let req = scenario();
    let data = req.load().unwrap();
    let out = representative_scorecard(&data, &req.reference, &req.query).unwrap();
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);

    let card = out.result.ready().unwrap();
    assert_eq!(card.achievement, 20);
    assert_eq!(card.devices_lost, 10);
    assert_eq!(card.market_share, dec!(66.67));
    assert_eq!(card.target_attainment, dec!(71.43));
    assert_eq!(card.shortfall, 8);
    assert_eq!(card.price_differential, dec!(1000));
    assert!(card.priced_higher_but_lost);

    let w = card.weekoff_analysis.as_ref().unwrap();
    assert_eq!(w.weekoff_dates.len(), 4);
    assert_eq!(w.weekoff_loss, 3);
    assert_eq!(w.working_day_loss.count, 7);
    assert_eq!(w.working_day_loss.percent, dec!(25.93));
    assert_eq!(w.store_losses, 10);
    assert_eq!(w.weekoff_loss + w.working_day_loss.count, w.store_losses);
    assert_eq!(w.weekoff_loss_by_category.get("Tablet"), Some(&1));
    assert_eq!(w.weekoff_loss_by_category.get("Phone"), Some(&2));
    assert_eq!(w.working_day_loss_by_state.get("Karnataka"), Some(&7));
}

#[test]
fn test_weekoff_split_counts_colleague_losses_at_store() {
    let mut req = scenario();
    // A colleague's loss at the same store on a Thursday
    req.cashify.rows.push(row(
        "2025-06-26",
        "Jun",
        "Iplanet @ Jp Nagar",
        "Q",
        "14000",
        "Phone",
    ));
    let data = req.load().unwrap();
    let out = representative_scorecard(&data, &req.reference, &req.query).unwrap();
    let card = out.result.ready().unwrap();
    assert_eq!(card.devices_lost, 10);

    let w = card.weekoff_analysis.as_ref().unwrap();
    assert_eq!(w.store_losses, 11);
    assert_eq!(w.weekoff_loss, 4);
    assert_eq!(w.working_day_loss.count, 7);
}

#[test]
fn test_category_contribution_shares_one_denominator() {
    let req = scenario();
    let data = req.load().unwrap();
    let out = representative_scorecard(&data, &req.reference, &req.query).unwrap();
    let cat = &out.result.ready().unwrap().category_contribution;
    assert_eq!(cat.combined_total, 30);
    let total: rust_decimal::Decimal = cat
        .categories
        .iter()
        .map(|c| c.maple_pct + c.cashify_pct)
        .sum();
    assert_eq!(total, dec!(100));
}

#[test]
fn test_year_only_period_skips_weekoff_split() {
    let mut req = scenario();
    req.query.period = PeriodFilter::year(2025);
    let data = req.load().unwrap();
    let out = representative_scorecard(&data, &req.reference, &req.query).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("specific month")));
    assert!(out.result.ready().unwrap().weekoff_analysis.is_none());
}

#[test]
fn test_filter_to_empty_period_is_no_data() {
    let mut req = scenario();
    req.query.period = PeriodFilter::year(2025).with_month("July");
    let data = req.load().unwrap();
    let out = representative_scorecard(&data, &req.reference, &req.query).unwrap();
    match out.result {
        DashboardView::NoData { notice } => assert!(notice.contains("July 2025"), "{notice}"),
        DashboardView::Ready(_) => panic!("expected no data"),
    }
    assert!(out.warnings.iter().any(|w| w.contains("June 2025")));
}

#[test]
fn test_missing_required_columns_is_schema_error() {
    let mut req = scenario();
    req.cashify.headers.truncate(7);
    let err = req.load().unwrap_err();
    match &err {
        TradeInError::MissingColumns { columns, .. } => {
            assert_eq!(
                columns,
                &vec![
                    "Initial Device Amount".to_string(),
                    "Old Device IMEI".to_string()
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Cashify"));
}

#[test]
fn test_request_round_trips_through_json() {
    let req = scenario();
    let json = serde_json::to_string(&req).unwrap();
    let back: DashboardRequest = serde_json::from_str(&json).unwrap();
    let data = back.load().unwrap();
    let out = representative_scorecard(&data, &back.reference, &back.query).unwrap();
    assert_eq!(out.result.ready().unwrap().market_share, dec!(66.67));
}

// ===========================================================================
// Region overview and selectors
// ===========================================================================

#[test]
fn test_region_overview_from_tables() {
    let req = scenario();
    let data = req.load().unwrap();
    let out = region_overview(&data, &req.reference, &ViewQuery::new(req.query.period.clone()))
        .unwrap();
    let view = out.result.ready().unwrap();
    assert_eq!(view.region_shares.len(), 1);
    assert_eq!(view.region_shares[0].market_share, dec!(66.67));
    assert_eq!(view.store_representative_shares.len(), 1);
    assert!(view.low_share.is_empty());
}

#[test]
fn test_region_spelling_variants_are_one_region() {
    let mut req = scenario();
    for (i, r) in req.maple.rows.iter_mut().enumerate() {
        let spelling = if i % 2 == 0 { "South" } else { "SOUTH " };
        r[5] = spelling.into();
    }
    for r in req.cashify.rows.iter_mut() {
        r[5] = "south".into();
    }
    let data = req.load().unwrap();

    let out = region_overview(&data, &req.reference, &ViewQuery::new(req.query.period.clone()))
        .unwrap();
    let view = out.result.ready().unwrap();
    assert_eq!(view.region_shares.len(), 1);
    assert_eq!(view.region_shares[0].region, "South");
    assert_eq!(view.region_shares[0].market_share, dec!(66.67));

    let mut query = req.query.clone();
    query.selection.region = Some("south".into());
    let out = representative_scorecard(&data, &req.reference, &query).unwrap();
    let card = out.result.ready().unwrap();
    assert_eq!((card.achievement, card.devices_lost), (20, 10));
    assert_eq!(card.market_share, dec!(66.67));
}

#[test]
fn test_selectors_follow_loaded_data() {
    let req = scenario();
    let LoadedData { maple, cashify, .. } = req.load().unwrap();
    let periods = period_options(&maple, &cashify, Some(2025), Some("June"));
    assert_eq!(periods.years, vec![2025]);
    assert_eq!(periods.months, vec!["June".to_string()]);
    assert_eq!(periods.days.len(), 12);

    let opts = cascade_options(&maple, &LocationSelection::default());
    assert_eq!(opts.regions, vec!["South".to_string()]);
    assert_eq!(opts.store_states, vec!["Karnataka".to_string()]);
    assert_eq!(opts.store_names, vec!["Iplanet @ Jp Nagar".to_string()]);
    assert_eq!(opts.representatives, vec!["R".to_string()]);
}

// ===========================================================================
// Monthly trend and representative summary
// ===========================================================================

#[test]
fn test_monthly_trend_from_tables() {
    let mut req = scenario();
    req.maple.rows.push(row("12-05-2025", "5", "Iplanet @ Jp Nagar", "R", "15000", "Phone"));
    req.cashify.rows.push(row("2025-05-14", "May", "Iplanet @ Jp Nagar", "R", "14000", "Tablet"));
    req.cashify.rows.push(row("2025-05-15", "May", "Iplanet @ Jp Nagar", "R", "14000", "Phone"));
    let data = req.load().unwrap();

    let query = ViewQuery::new(PeriodFilter::year(2025));
    let out = monthly_trend(&data, &req.reference, &query).unwrap();
    let trend = out.result.ready().unwrap();
    let months: Vec<&str> = trend.months.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["May", "June"]);

    let may = &trend.months[0];
    assert_eq!((may.maple_count, may.cashify_count), (1, 2));
    assert_eq!(may.market_share, dec!(33.33));
    let june = &trend.months[1];
    assert_eq!(june.market_share, dec!(66.67));
    assert_eq!(june.share_change, Some(dec!(33.33)));
    assert_eq!(june.category_contribution.combined_total, 30);
    assert_eq!(june.regions.len(), 1);
    assert_eq!(june.regions[0].market_share, dec!(66.67));
}

#[test]
fn test_summary_lists_bottom_performers() {
    let mut req = scenario();
    req.maple.rows.push(row("02-06-2025", "6", "Iplanet @ Omr", "Vani", "15000", "Phone"));
    req.cashify.rows.push(row("2025-06-03", "Jun", "Iplanet @ Omr", "Arun", "14000", "Phone"));
    let data = req.load().unwrap();
    let query = ViewQuery::new(req.query.period.clone());
    let out = representative_summary(&data, &req.reference, &query).unwrap();
    let summary = out.result.ready().unwrap();
    let bottom: Vec<&str> = summary
        .bottom_performers
        .iter()
        .map(|r| r.representative.as_str())
        .collect();
    assert_eq!(bottom, vec!["Arun", "Vani", "R"]);
    assert_eq!(summary.top_performers[0].representative, "R");
}
