//! One operator's working session: the uploaded sheets plus the daily
//! entries and lost trade-in remarks keyed in during it.
//!
//! Both logs are append-only. Nothing outlives the session; `close`
//! hands back everything collected so the caller can export it.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dashboard::{
    monthly_trend, region_overview, representative_scorecard, LoadedData, MonthlyTrend,
    RegionOverview, Scorecard, ViewQuery,
};
use crate::error::TradeInError;
use crate::metrics::{market_share, target_attainment};
use crate::normalize::normalize_identity_field;
use crate::reference::{ReferenceData, WeekOff};
use crate::types::{round_pct, ComputationOutput, DashboardView, Money, Percent};
use crate::TradeInResult;

#[cfg(feature = "summary")]
use crate::dashboard::{representative_summary, RepresentativeSummary};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Counts keyed in by a store for one representative and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub region: Option<String>,
    pub store_name: String,
    pub representative: String,
    /// Monthly target; filled from reference data when omitted
    #[serde(default)]
    pub target: Option<u32>,
    /// Maple acquisitions for the day
    pub acquired: u32,
    /// Trade-ins lost to Cashify for the day
    pub lost: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceCondition {
    New,
    Good,
    Average,
    Poor,
    Dead,
}

/// Detail recorded for a single trade-in lost to Cashify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostTradeInRemark {
    pub date: NaiveDate,
    pub store_name: String,
    pub representative: String,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub model_variant: Option<String>,
    /// Where the representative was when the deal was lost
    #[serde(default)]
    pub lost_location: Option<String>,
    pub cashify_price: Money,
    pub maple_price: Money,
    #[serde(default)]
    pub representative_remarks: Option<String>,
    #[serde(default)]
    pub buyback_contact: Option<String>,
    #[serde(default)]
    pub buyback_remarks: Option<String>,
    pub device_condition: DeviceCondition,
    pub cashify_representative_present: bool,
    pub device_dead: bool,
}

impl LostTradeInRemark {
    /// Maple's offer minus Cashify's; negative when Maple was outbid.
    pub fn price_gap(&self) -> Money {
        self.maple_price.saturating_sub(self.cashify_price)
    }
}

/// Month-to-date figures for one representative over the entry log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryKpis {
    pub representative: String,
    pub entries: usize,
    pub acquired: u64,
    pub lost: u64,
    pub target: u32,
    pub target_attainment: Percent,
    pub market_share: Percent,
    pub weekoff: WeekOff,
}

/// Everything collected during a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub entries: Vec<DailyEntry>,
    pub remarks: Vec<LostTradeInRemark>,
    pub kpis: Vec<EntryKpis>,
}

/// Serialized entry / remark logs, as saved between runs by the operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryLog {
    #[serde(default)]
    pub entries: Vec<DailyEntry>,
    #[serde(default)]
    pub remarks: Vec<LostTradeInRemark>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Session {
    reference: ReferenceData,
    data: Option<LoadedData>,
    entries: Vec<DailyEntry>,
    remarks: Vec<LostTradeInRemark>,
}

impl Session {
    pub fn start(reference: ReferenceData) -> Self {
        info!(
            representatives = reference.profiles().len(),
            "session started"
        );
        Self {
            reference,
            data: None,
            entries: Vec::new(),
            remarks: Vec::new(),
        }
    }

    /// Hold a freshly uploaded pair of sheets, replacing any earlier load.
    pub fn load(&mut self, data: LoadedData) {
        debug!(
            maple = data.maple.len(),
            cashify = data.cashify.len(),
            "session data loaded"
        );
        self.data = Some(data);
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn data(&self) -> Option<&LoadedData> {
        self.data.as_ref()
    }

    fn loaded(&self) -> TradeInResult<&LoadedData> {
        self.data.as_ref().ok_or_else(|| TradeInError::InvalidInput {
            field: "data".into(),
            reason: "no Maple / Cashify sheets loaded in this session".into(),
        })
    }

    pub fn scorecard(
        &self,
        query: &ViewQuery,
    ) -> TradeInResult<ComputationOutput<DashboardView<Scorecard>>> {
        representative_scorecard(self.loaded()?, &self.reference, query)
    }

    pub fn region_overview(
        &self,
        query: &ViewQuery,
    ) -> TradeInResult<ComputationOutput<DashboardView<RegionOverview>>> {
        region_overview(self.loaded()?, &self.reference, query)
    }

    pub fn monthly_trend(
        &self,
        query: &ViewQuery,
    ) -> TradeInResult<ComputationOutput<DashboardView<MonthlyTrend>>> {
        monthly_trend(self.loaded()?, &self.reference, query)
    }

    #[cfg(feature = "summary")]
    pub fn summary(
        &self,
        query: &ViewQuery,
    ) -> TradeInResult<ComputationOutput<DashboardView<RepresentativeSummary>>> {
        representative_summary(self.loaded()?, &self.reference, query)
    }

    /// Append a daily entry. Names are normalized and a missing target is
    /// taken from the reference data.
    pub fn record_entry(&mut self, mut entry: DailyEntry) -> TradeInResult<()> {
        entry.store_name = required_name("store_name", &entry.store_name)?;
        entry.representative = required_name("representative", &entry.representative)?;
        if entry.target.is_none() {
            entry.target = Some(self.reference.target_for(&entry.representative));
        }
        debug!(
            representative = %entry.representative,
            date = %entry.date,
            "daily entry recorded"
        );
        self.entries.push(entry);
        Ok(())
    }

    pub fn record_remark(&mut self, mut remark: LostTradeInRemark) -> TradeInResult<()> {
        remark.store_name = required_name("store_name", &remark.store_name)?;
        remark.representative = required_name("representative", &remark.representative)?;
        if remark.cashify_price < Decimal::ZERO || remark.maple_price < Decimal::ZERO {
            return Err(TradeInError::InvalidInput {
                field: "price".into(),
                reason: "prices cannot be negative".into(),
            });
        }
        self.remarks.push(remark);
        Ok(())
    }

    /// Append every entry and remark of a saved log.
    pub fn replay(&mut self, log: EntryLog) -> TradeInResult<()> {
        for e in log.entries {
            self.record_entry(e)?;
        }
        for r in log.remarks {
            self.record_remark(r)?;
        }
        Ok(())
    }

    pub fn entries(&self) -> &[DailyEntry] {
        &self.entries
    }

    pub fn remarks(&self) -> &[LostTradeInRemark] {
        &self.remarks
    }

    /// Month-to-date KPIs for one representative. The target is the one on
    /// their latest entry, else the reference target.
    pub fn entry_kpis(&self, representative: &str) -> EntryKpis {
        let name = normalize_identity_field(representative);
        let mine: Vec<&DailyEntry> = self
            .entries
            .iter()
            .filter(|e| e.representative == name)
            .collect();

        let acquired: u64 = mine.iter().map(|e| u64::from(e.acquired)).sum();
        let lost: u64 = mine.iter().map(|e| u64::from(e.lost)).sum();
        let target = mine
            .last()
            .and_then(|e| e.target)
            .unwrap_or_else(|| self.reference.target_for(&name));

        EntryKpis {
            entries: mine.len(),
            acquired,
            lost,
            target,
            target_attainment: round_pct(target_attainment(acquired as usize, target)),
            market_share: round_pct(market_share(acquired as usize, lost as usize)),
            weekoff: self.reference.weekoff_for(&name),
            representative: name,
        }
    }

    /// End the session, returning the logs and per-representative KPIs.
    pub fn close(self) -> SessionSummary {
        let names: BTreeSet<&str> = self
            .entries
            .iter()
            .map(|e| e.representative.as_str())
            .collect();
        let kpis = names.into_iter().map(|n| self.entry_kpis(n)).collect();
        info!(
            entries = self.entries.len(),
            remarks = self.remarks.len(),
            "session closed"
        );
        SessionSummary {
            kpis,
            entries: self.entries,
            remarks: self.remarks,
        }
    }
}

fn required_name(field: &str, value: &str) -> TradeInResult<String> {
    let name = normalize_identity_field(value);
    if name.is_empty() {
        return Err(TradeInError::InvalidInput {
            field: field.into(),
            reason: "cannot be blank".into(),
        });
    }
    Ok(name)
}
