pub mod cascade;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::TradeInError;
use crate::normalize::{canonical_month, month_name, normalize_month};
use crate::records::RecordSet;
use crate::TradeInResult;

pub use cascade::{apply_selection, cascade_options, CascadeOptions, LocationSelection};

/// Reporting period. `month` / `day` of `None` mean "All".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
    pub year: i32,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub day: Option<u32>,
}

impl PeriodFilter {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn with_month(mut self, month: &str) -> Self {
        self.month = Some(month.to_string());
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    /// Canonical month name of the filter, if one is selected.
    pub fn month_name(&self) -> Option<String> {
        self.month.as_deref().map(normalize_month)
    }

    /// Calendar month number, when the selected month is a real month.
    pub fn month_number(&self) -> Option<u32> {
        self.month
            .as_deref()
            .and_then(canonical_month)
            .map(|m| m.number_from_month())
    }

    pub fn validate(&self) -> TradeInResult<()> {
        if let Some(day) = self.day {
            if !(1..=31).contains(&day) {
                return Err(TradeInError::InvalidInput {
                    field: "day".into(),
                    reason: format!("day of month must be 1-31, got {}", day),
                });
            }
        }
        if let Some(m) = &self.month {
            if m.trim().is_empty() {
                return Err(TradeInError::InvalidInput {
                    field: "month".into(),
                    reason: "month must be a month name, a number, or omitted for all months"
                        .into(),
                });
            }
        }
        Ok(())
    }

    pub fn label(&self) -> String {
        match (self.month_name(), self.day) {
            (Some(m), Some(d)) => format!("{} {} {}", d, m, self.year),
            (Some(m), None) => format!("{} {}", m, self.year),
            (None, Some(d)) => format!("day {} of every month in {}", d, self.year),
            (None, None) => self.year.to_string(),
        }
    }
}

/// Narrow a channel to the reporting period.
///
/// Year is an exact match on the coerced year column; month on the
/// canonical month name; day on the day-of-month of the transaction date.
/// No match is an empty set, never an error.
pub fn filter_period(set: &RecordSet, period: &PeriodFilter) -> RecordSet {
    let month = period.month_name();
    set.retain_matching(|r| {
        r.year == Some(period.year)
            && month
                .as_deref()
                .map_or(true, |m| r.month.as_deref() == Some(m))
            && period.day.map_or(true, |d| r.day() == Some(d))
    })
}

/// Values offered in the period selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOptions {
    /// Years present in both channels
    pub years: Vec<i32>,
    /// Months present in both channels, calendar order first
    pub months: Vec<String>,
    /// Days of month seen in either channel for the chosen month
    pub days: Vec<u32>,
}

fn month_sort_key(name: &str) -> (u32, String) {
    match canonical_month(name) {
        Some(m) => (m.number_from_month(), String::new()),
        None => (13, name.to_string()),
    }
}

/// Selector values for year, month and day.
///
/// Months are restricted to `year` when one is given; days are only listed
/// once a month is chosen.
pub fn period_options(
    maple: &RecordSet,
    cashify: &RecordSet,
    year: Option<i32>,
    month: Option<&str>,
) -> PeriodOptions {
    let years_of = |set: &RecordSet| -> BTreeSet<i32> { set.iter().filter_map(|r| r.year).collect() };
    let years: Vec<i32> = years_of(maple)
        .intersection(&years_of(cashify))
        .copied()
        .collect();

    let months_of = |set: &RecordSet| -> BTreeSet<String> {
        set.iter()
            .filter(|r| year.map_or(true, |y| r.year == Some(y)))
            .filter_map(|r| r.month.clone())
            .collect()
    };
    let mut months: Vec<String> = months_of(maple)
        .intersection(&months_of(cashify))
        .cloned()
        .collect();
    months.sort_by_key(|m| month_sort_key(m));

    let days = match month.map(normalize_month) {
        Some(m) => maple
            .iter()
            .chain(cashify.iter())
            .filter(|r| year.map_or(true, |y| r.year == Some(y)))
            .filter(|r| r.month.as_deref() == Some(m.as_str()))
            .filter_map(|r| r.day())
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect(),
        None => Vec::new(),
    };

    PeriodOptions {
        years,
        months,
        days,
    }
}

/// Canonical name for a month number, for labels built from dates.
pub fn month_label(number: u32) -> Option<&'static str> {
    u8::try_from(number)
        .ok()
        .and_then(|n| chrono::Month::try_from(n).ok())
        .map(month_name)
}
