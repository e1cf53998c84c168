//! Losses to Cashify split by whether the representative was on weekoff.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::share::safe_pct;
use crate::error::TradeInError;
use crate::normalize::normalize_identity_field;
use crate::records::TradeInRecord;
use crate::reference::ReferenceData;
use crate::types::Percent;
use crate::TradeInResult;

/// Every date in `year`-`month` that falls on `day`.
pub fn weekoff_dates(day: Weekday, year: i32, month: u32) -> TradeInResult<BTreeSet<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        TradeInError::DateError(format!("no such month: {}-{:02}", year, month))
    })?;

    let offset = (7 + day.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let mut dates = BTreeSet::new();
    let mut current = first + chrono::Days::new(u64::from(offset));
    while current.month() == month {
        dates.insert(current);
        current = current + chrono::Days::new(7);
    }
    Ok(dates)
}

/// Weekoff dates of every reference representative for one reporting
/// month, enumerated once up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekoffCalendar {
    pub year: i32,
    pub month: u32,
    dates: HashMap<String, BTreeSet<NaiveDate>>,
}

impl WeekoffCalendar {
    pub fn build(reference: &ReferenceData, year: i32, month: u32) -> TradeInResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(TradeInError::DateError(format!(
                "no such month: {}-{:02}",
                year, month
            )));
        }
        let mut dates = HashMap::new();
        for profile in reference.profiles() {
            let set = match profile.weekoff.weekday() {
                Some(day) => weekoff_dates(day, year, month)?,
                None => BTreeSet::new(),
            };
            dates.insert(normalize_identity_field(&profile.name), set);
        }
        Ok(Self { year, month, dates })
    }

    /// Weekoff dates for a representative; empty for unknown or vacant.
    pub fn dates_for(&self, representative: &str) -> BTreeSet<NaiveDate> {
        self.dates
            .get(&normalize_identity_field(representative))
            .cloned()
            .unwrap_or_default()
    }
}

fn on_weekoff(r: &TradeInRecord, weekoff: &BTreeSet<NaiveDate>) -> bool {
    r.transaction_date.is_some_and(|d| weekoff.contains(&d))
}

/// Cashify records at the representative's store dated on one of their
/// weekoff dates.
pub fn weekoff_loss(cashify: &[TradeInRecord], store: &str, weekoff: &BTreeSet<NaiveDate>) -> usize {
    cashify
        .iter()
        .filter(|r| r.is_at_store(store) && on_weekoff(r, weekoff))
        .count()
}

/// Cashify losses at the representative's store on days they were working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingDayLoss {
    pub count: usize,
    /// count / (Maple acquisitions + count)
    pub percent: Percent,
}

/// Complement of [`weekoff_loss`] over the same store scope: every Cashify
/// record at the store not dated on a weekoff date (undated records
/// included). The percentage is taken against the representative's Maple
/// count plus this loss.
pub fn working_day_loss(
    maple_count: usize,
    cashify: &[TradeInRecord],
    store: &str,
    weekoff: &BTreeSet<NaiveDate>,
) -> WorkingDayLoss {
    let count = cashify
        .iter()
        .filter(|r| r.is_at_store(store) && !on_weekoff(r, weekoff))
        .count();
    WorkingDayLoss {
        count,
        percent: safe_pct(Decimal::from(count), Decimal::from(maple_count + count)),
    }
}

/// Cashify records at `store` that fell on weekoff dates, for breakdowns.
pub fn weekoff_records<'a>(
    cashify: &'a [TradeInRecord],
    store: &'a str,
    weekoff: &'a BTreeSet<NaiveDate>,
) -> impl Iterator<Item = &'a TradeInRecord> + 'a {
    cashify
        .iter()
        .filter(move |r| r.is_at_store(store) && on_weekoff(r, weekoff))
}

/// Cashify records at `store` that fell on working days, for breakdowns.
pub fn working_day_records<'a>(
    cashify: &'a [TradeInRecord],
    store: &'a str,
    weekoff: &'a BTreeSet<NaiveDate>,
) -> impl Iterator<Item = &'a TradeInRecord> + 'a {
    cashify
        .iter()
        .filter(move |r| r.is_at_store(store) && !on_weekoff(r, weekoff))
}
