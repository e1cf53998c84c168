use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::schema::{resolve_columns, ColumnMap, Field};
use super::{RawTable, RecordSet, TradeInRecord};
use crate::normalize::{
    non_empty, normalize_identity_field, normalize_month, normalize_region, normalize_state,
    parse_year,
};
use crate::types::{Channel, Money};
use crate::TradeInResult;

const DATE_FORMATS: [&str; 6] = ["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d", "%d-%b-%Y"];

const DATETIME_FORMATS: [&str; 8] = [
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Per-column count of cells that could not be parsed and became missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssues {
    pub year: usize,
    pub transaction_date: usize,
    pub device_value: usize,
}

impl ParseIssues {
    pub fn total(&self) -> usize {
        self.year + self.transaction_date + self.device_value
    }
}

/// Result of loading one channel's sheet.
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    pub set: RecordSet,
    pub issues: ParseIssues,
    /// Operator-facing notices about soft failures
    pub warnings: Vec<String>,
}

/// Parse a date cell. Day-first forms are tried before ISO, matching how
/// the store teams type dates; a trailing time component is ignored.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = non_empty(value)?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a monetary cell, tolerating thousands separators and a leading
/// currency prefix ("₹12,500.00", "Rs. 900", "-₹50").
///
/// Everything before the first digit is prefix, except a `-` sign and a
/// decimal point directly in front of the digits.
pub fn parse_money(value: &str) -> Option<Money> {
    let trimmed = non_empty(value)?;
    let first_digit = trimmed.find(|c: char| c.is_ascii_digit())?;
    let (prefix, digits) = trimmed.split_at(first_digit);

    let before_point = prefix.trim_end_matches('.');
    let fraction = prefix.ends_with('.') && !before_point.ends_with(char::is_alphabetic);
    let sign = before_point.trim_end().ends_with('-') || prefix.trim_start().starts_with('-');

    let mut cleaned = String::with_capacity(trimmed.len());
    if sign {
        cleaned.push('-');
    }
    if fraction {
        cleaned.push_str("0.");
    }
    cleaned.extend(digits.chars().filter(|c| *c != ','));
    let cleaned = cleaned.trim();
    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .ok()
}

fn text(map: &ColumnMap, row: &[String], field: Field) -> Option<String> {
    non_empty(map.cell(row, field)).map(str::to_string)
}

fn build_record(map: &ColumnMap, row: &[String], issues: &mut ParseIssues) -> TradeInRecord {
    let year_cell = map.cell(row, Field::Year);
    let year = parse_year(year_cell);
    if year.is_none() {
        issues.year += 1;
    }

    let date_cell = map.cell(row, Field::TransactionDate);
    let transaction_date = parse_date(date_cell);
    if transaction_date.is_none() && non_empty(date_cell).is_some() {
        issues.transaction_date += 1;
    }

    let value_cell = map.cell(row, Field::DeviceValue);
    let device_value = parse_money(value_cell);
    if device_value.is_none() && non_empty(value_cell).is_some() {
        issues.device_value += 1;
    }

    TradeInRecord {
        transaction_date,
        year,
        month: non_empty(map.cell(row, Field::Month)).map(normalize_month),
        region: non_empty(map.cell(row, Field::Region)).map(normalize_region),
        store_state: non_empty(map.cell(row, Field::StoreState)).map(normalize_state),
        store_name: non_empty(map.cell(row, Field::StoreName)).map(normalize_identity_field),
        representative: non_empty(map.cell(row, Field::Representative))
            .map(normalize_identity_field),
        device_value,
        device_identifier: text(map, row, Field::DeviceIdentifier),
        product_category: text(map, row, Field::ProductCategory),
    }
}

/// Validate the sheet shape and turn every row into a normalized record.
///
/// A missing required column fails the whole load. Unparseable cells are
/// kept as missing values and summarised in `warnings`.
pub fn load_records(table: &RawTable, channel: Channel) -> TradeInResult<LoadedRecords> {
    let map = resolve_columns(&table.headers, channel)?;

    let mut issues = ParseIssues::default();
    let records: Vec<TradeInRecord> = table
        .rows
        .iter()
        .filter(|row| row.iter().any(|c| non_empty(c).is_some()))
        .map(|row| build_record(&map, row, &mut issues))
        .collect();

    let mut warnings = Vec::new();
    if issues.year > 0 {
        warnings.push(format!(
            "{} entries in the 'Year' column of {} data could not be converted to numbers and will be ignored",
            issues.year, channel
        ));
    }
    if issues.transaction_date > 0 {
        warnings.push(format!(
            "{} {} dates could not be parsed; those rows are excluded from day and weekoff filters",
            issues.transaction_date, channel
        ));
    }
    if issues.device_value > 0 {
        warnings.push(format!(
            "{} {} device values could not be parsed and are excluded from averages",
            issues.device_value, channel
        ));
    }
    for w in &warnings {
        warn!(channel = %channel, "{}", w);
    }
    debug!(channel = %channel, rows = records.len(), "loaded records");

    Ok(LoadedRecords {
        set: RecordSet::new(channel, records),
        issues,
        warnings,
    })
}
