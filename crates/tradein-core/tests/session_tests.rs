use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tradein_core::dashboard::{LoadedData, ViewQuery};
use tradein_core::filter::{LocationSelection, PeriodFilter};
use tradein_core::records::{RawTable, RecordSet};
use tradein_core::reference::{ReferenceData, WeekOff};
use tradein_core::session::{EntryLog, Session};
use tradein_core::Channel;

fn reference() -> ReferenceData {
    ReferenceData::from_json_str(
        r#"{
            "reporting_month": { "year": 2025, "month": "March" },
            "representatives": [
                { "name": "Gopi J", "monthly_target": 20, "weekoff": "Tuesday" },
                { "name": "Sanni Vishwakarma", "monthly_target": 25, "weekoff": "wed" }
            ],
            "excluded_representatives": ["No-spoc", "Joining on 14th April, 2025"],
            "settings": { "top_performers": 5 }
        }"#,
    )
    .unwrap()
}

fn sheet(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn loaded() -> LoadedData {
    let maple = sheet(
        &[
            "Date", "Month", "Year", "Store", "Spoc", "Zone", "State", "Maple Bid", "Old IMEI No",
        ],
        &[
            &["03-03-2025", "March", "2025", "Jp Nagar", "GOPI J", "South", "Karnataka", "9000", "1"],
            &["04-03-2025", "March", "2025", "Jp Nagar", "Gopi J", "South", "Karnataka", "9500", "2"],
            &["04-03-2025", "March", "2025", "Jp Nagar", "No-spoc", "South", "Karnataka", "8000", "3"],
        ],
    );
    let cashify = sheet(
        &[
            "Date",
            "Month",
            "Year",
            "Store",
            "Spoc",
            "Zone",
            "State",
            "Cashify Price",
            "Old Device IMEI",
        ],
        &[&["05-03-2025", "3", "2025", "Jp Nagar", "gopi j", "South", "Karnataka", "₹10,000", "9"]],
    );
    LoadedData::from_tables(&maple, &cashify).unwrap()
}

#[test]
fn test_session_views_over_loaded_sheets() {
    let mut session = Session::start(reference());
    session.load(loaded());

    let query = ViewQuery::new(PeriodFilter::year(2025).with_month("Mar")).with_selection(
        LocationSelection {
            representative: Some("gopi j".into()),
            ..Default::default()
        },
    );
    let card = session.scorecard(&query).unwrap();
    let card = card.result.ready().unwrap();
    assert_eq!(card.achievement, 2);
    assert_eq!(card.devices_lost, 1);
    assert_eq!(card.market_share, dec!(66.67));
    assert_eq!(card.target, 20);
    assert_eq!(card.target_attainment, dec!(10));
    assert_eq!(card.price_differential, dec!(-750));
    assert!(!card.priced_higher_but_lost);

    let summary = session
        .summary(&ViewQuery::new(PeriodFilter::year(2025).with_month("March")))
        .unwrap();
    let summary = summary.result.ready().unwrap();
    assert_eq!(summary.rows.len(), 1);
    assert_eq!(summary.rows[0].representative, "Gopi J");
    assert_eq!(summary.rows[0].weekoff, WeekOff::Day(chrono::Weekday::Tue));
    assert_eq!(summary.kpis.total_achieved, 2);
}

#[test]
fn test_session_replays_saved_log() {
    let log: EntryLog = serde_json::from_str(
        r#"{
            "entries": [
                { "date": "2025-04-01", "store_name": "Jp Nagar", "representative": "gopi j", "acquired": 2, "lost": 1 },
                { "date": "2025-04-02", "store_name": "Jp Nagar", "representative": "Gopi J", "acquired": 3, "lost": 0, "target": 24 }
            ],
            "remarks": [
                {
                    "date": "2025-04-01",
                    "store_name": "Jp Nagar",
                    "representative": "Gopi J",
                    "cashify_price": "12000",
                    "maple_price": "11000",
                    "device_condition": "Average",
                    "cashify_representative_present": true,
                    "device_dead": false
                }
            ]
        }"#,
    )
    .unwrap();

    let mut session = Session::start(reference());
    session.replay(log).unwrap();
    assert_eq!(session.entries()[0].target, Some(20));

    let kpis = session.entry_kpis("Gopi J");
    assert_eq!((kpis.acquired, kpis.lost, kpis.target), (5, 1, 24));
    assert_eq!(kpis.market_share, dec!(83.33));
    assert_eq!(kpis.target_attainment, dec!(20.83));

    let closed = session.close();
    assert_eq!(closed.remarks[0].price_gap(), dec!(-1000));
    assert_eq!(closed.kpis.len(), 1);
}

#[test]
fn test_session_without_sheets_rejects_views() {
    let mut session = Session::start(ReferenceData::default());
    let q = ViewQuery::new(PeriodFilter::year(2025));
    assert!(session.region_overview(&q).is_err());

    session.load(LoadedData::from_sets(
        RecordSet::empty(Channel::Maple),
        RecordSet::empty(Channel::Cashify),
    ));
    let out = session.region_overview(&q).unwrap();
    assert!(!out.result.is_ready());
}
