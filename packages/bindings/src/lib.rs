use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use tradein_core::dashboard::{self, DashboardRequest};
use tradein_core::filter::{self, LocationSelection};
use tradein_core::records::{load_records, RawTable};
use tradein_core::reference::ReferenceData;
use tradein_core::session::{EntryLog, Session};
use tradein_core::Channel;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<'a, T: Deserialize<'a>>(input_json: &'a str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dashboard views
// ---------------------------------------------------------------------------

#[napi]
pub fn representative_scorecard(request_json: String) -> NapiResult<String> {
    let req: DashboardRequest = parse(&request_json)?;
    let data = req.load().map_err(to_napi_error)?;
    let output = dashboard::representative_scorecard(&data, &req.reference, &req.query)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn region_overview(request_json: String) -> NapiResult<String> {
    let req: DashboardRequest = parse(&request_json)?;
    let data = req.load().map_err(to_napi_error)?;
    let output =
        dashboard::region_overview(&data, &req.reference, &req.query).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn representative_summary(request_json: String) -> NapiResult<String> {
    let req: DashboardRequest = parse(&request_json)?;
    let data = req.load().map_err(to_napi_error)?;
    let output = dashboard::representative_summary(&data, &req.reference, &req.query)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Trend from the request's period onward.
#[napi]
pub fn monthly_trend(request_json: String) -> NapiResult<String> {
    let req: DashboardRequest = parse(&request_json)?;
    let data = req.load().map_err(to_napi_error)?;
    let output =
        dashboard::monthly_trend(&data, &req.reference, &req.query).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PeriodOptionsInput {
    maple: RawTable,
    cashify: RawTable,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    month: Option<String>,
}

#[napi]
pub fn period_options(input_json: String) -> NapiResult<String> {
    let input: PeriodOptionsInput = parse(&input_json)?;
    let maple = load_records(&input.maple, Channel::Maple).map_err(to_napi_error)?;
    let cashify = load_records(&input.cashify, Channel::Cashify).map_err(to_napi_error)?;
    let options = filter::period_options(
        &maple.set,
        &cashify.set,
        input.year,
        input.month.as_deref(),
    );
    serde_json::to_string(&options).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct CascadeOptionsInput {
    maple: RawTable,
    #[serde(default)]
    selection: LocationSelection,
}

#[napi]
pub fn cascade_options(input_json: String) -> NapiResult<String> {
    let input: CascadeOptionsInput = parse(&input_json)?;
    let maple = load_records(&input.maple, Channel::Maple).map_err(to_napi_error)?;
    let options = filter::cascade_options(&maple.set, &input.selection);
    serde_json::to_string(&options).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Daily entry log
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EntryKpisInput {
    #[serde(default)]
    reference: ReferenceData,
    log: EntryLog,
    /// One representative's KPIs; the whole closed session when absent
    #[serde(default)]
    representative: Option<String>,
}

#[napi]
pub fn entry_kpis(input_json: String) -> NapiResult<String> {
    let input: EntryKpisInput = parse(&input_json)?;
    let mut session = Session::start(input.reference);
    session.replay(input.log).map_err(to_napi_error)?;
    let json = match input.representative {
        Some(name) => serde_json::to_string(&session.entry_kpis(&name)),
        None => serde_json::to_string(&session.close()),
    };
    json.map_err(to_napi_error)
}
