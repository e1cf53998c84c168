//! The views each dashboard variant displays, computed from loaded record
//! sets, reference data and the operator's filter choices.

pub mod breakdown;
pub mod scorecard;
#[cfg(feature = "summary")]
pub mod summary;
pub mod trend;

use serde::{Deserialize, Serialize};

use crate::filter::{apply_selection, filter_period, LocationSelection, PeriodFilter};
use crate::records::{load_records, RawTable, RecordSet};
use crate::reference::ReferenceData;
use crate::types::{Channel, DashboardView};
use crate::TradeInResult;

pub use breakdown::{region_overview, RegionOverview, RegionShare, StoreRepresentativeShare};
pub use scorecard::{representative_scorecard, Scorecard, WeekoffAnalysis};
#[cfg(feature = "summary")]
pub use summary::{
    representative_summary, RepresentativeRow, RepresentativeSummary, SummaryKpis, WeekoffGroup,
};
pub use trend::{monthly_trend, MonthTrend, MonthlyTrend};

/// Filter choices shared by every view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub period: PeriodFilter,
    #[serde(default)]
    pub selection: LocationSelection,
}

impl ViewQuery {
    pub fn new(period: PeriodFilter) -> Self {
        Self {
            period,
            selection: LocationSelection::default(),
        }
    }

    pub fn with_selection(mut self, selection: LocationSelection) -> Self {
        self.selection = selection;
        self
    }
}

/// Both channels loaded and normalized, ready for any number of views.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub maple: RecordSet,
    pub cashify: RecordSet,
    /// Soft parse failures from both loads
    pub warnings: Vec<String>,
}

impl LoadedData {
    pub fn from_tables(maple: &RawTable, cashify: &RawTable) -> TradeInResult<Self> {
        let m = load_records(maple, Channel::Maple)?;
        let c = load_records(cashify, Channel::Cashify)?;
        let mut warnings = m.warnings;
        warnings.extend(c.warnings);
        Ok(Self {
            maple: m.set,
            cashify: c.set,
            warnings,
        })
    }

    pub fn from_sets(maple: RecordSet, cashify: RecordSet) -> Self {
        Self {
            maple,
            cashify,
            warnings: Vec::new(),
        }
    }
}

/// Self-contained request: raw sheets plus everything a view needs. This
/// is the JSON shape accepted by the bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub maple: RawTable,
    pub cashify: RawTable,
    #[serde(default)]
    pub reference: ReferenceData,
    #[serde(flatten)]
    pub query: ViewQuery,
}

impl DashboardRequest {
    pub fn load(&self) -> TradeInResult<LoadedData> {
        LoadedData::from_tables(&self.maple, &self.cashify)
    }
}

/// Both channels narrowed to the reporting period.
pub(crate) struct PeriodScope {
    pub maple: RecordSet,
    pub cashify: RecordSet,
}

impl PeriodScope {
    /// Narrow further to a location selection.
    pub fn select(&self, selection: &LocationSelection) -> PeriodScope {
        PeriodScope {
            maple: apply_selection(&self.maple, selection),
            cashify: apply_selection(&self.cashify, selection),
        }
    }
}

/// Apply the period filter to both channels, or produce the "no data"
/// notice when either comes back empty.
pub(crate) fn scope_period(
    data: &LoadedData,
    period: &PeriodFilter,
) -> TradeInResult<Result<PeriodScope, String>> {
    period.validate()?;
    let maple = filter_period(&data.maple, period);
    let cashify = filter_period(&data.cashify, period);
    if maple.is_empty() || cashify.is_empty() {
        let empty: Vec<String> = [&maple, &cashify]
            .iter()
            .filter(|s| s.is_empty())
            .map(|s| s.channel.to_string())
            .collect();
        return Ok(Err(format!(
            "No data available for {} in the {} data",
            period.label(),
            empty.join(" and ")
        )));
    }
    Ok(Ok(PeriodScope { maple, cashify }))
}

pub(crate) fn no_data<T>(notice: String) -> DashboardView<T> {
    DashboardView::NoData { notice }
}

/// Warnings every view carries: load issues and reference period drift.
pub(crate) fn base_warnings(
    data: &LoadedData,
    reference: &ReferenceData,
    period: &PeriodFilter,
) -> Vec<String> {
    let mut warnings = data.warnings.clone();
    if let Some(w) = reference.period_mismatch(period.year, period.month.as_deref()) {
        tracing::warn!("{}", w);
        warnings.push(w);
    }
    warnings
}
