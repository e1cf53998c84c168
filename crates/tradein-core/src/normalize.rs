//! Canonicalisation of hand-entered spreadsheet values.
//!
//! Every function here is lenient: values that cannot be recognised pass
//! through (title-cased) or become `None`, they never abort a load.

use chrono::Month;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Title-case text the way spreadsheet tooling does: the first letter of
/// every run of letters is upper-cased, the rest lower-cased.
///
/// "V.RAGHUL" => "V.Raghul", "iplanet @ jp nagar" => "Iplanet @ Jp Nagar"
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Resolve a month cell to its calendar month.
///
/// Accepts 1–12 (also "5.0"), three-letter abbreviations and full names,
/// case-insensitively.
pub fn canonical_month(value: &str) -> Option<Month> {
    let lowered = value.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if let Ok(n) = lowered.parse::<f64>() {
        let n = n.trunc();
        if (1.0..=12.0).contains(&n) {
            return month_from_number(n as u32);
        }
        return None;
    }

    MONTH_NAMES
        .iter()
        .position(|name| {
            let full = name.to_lowercase();
            lowered == full || lowered == full[..3]
        })
        .and_then(|idx| month_from_number(idx as u32 + 1))
}

/// Canonical capitalised month name, or the trimmed input title-cased when
/// it is not a recognisable month.
pub fn normalize_month(value: &str) -> String {
    match canonical_month(value) {
        Some(month) => month_name(month).to_string(),
        None => title_case(value.trim()),
    }
}

/// Canonical English name for a month.
pub fn month_name(month: Month) -> &'static str {
    MONTH_NAMES[month.number_from_month() as usize - 1]
}

fn month_from_number(n: u32) -> Option<Month> {
    u8::try_from(n).ok().and_then(|n| Month::try_from(n).ok())
}

/// Title-case a state name. No validation against a list of states.
pub fn normalize_state(value: &str) -> String {
    title_case(value.trim())
}

/// Title-case a state region (zone) so "SOUTH " and "south" are one region.
pub fn normalize_region(value: &str) -> String {
    title_case(value.trim())
}

/// Trim and title-case store / representative names so that the same
/// person or store entered with different casing joins to one key.
pub fn normalize_identity_field(value: &str) -> String {
    title_case(value.trim())
}

/// Parse a year cell. Numeric text with no fractional part is accepted
/// ("2025", "2025.0"); anything else is missing.
pub fn parse_year(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let n = trimmed.parse::<f64>().ok()?;
    if n.fract() != 0.0 || n < i32::MIN as f64 || n > i32::MAX as f64 {
        return None;
    }
    Some(n as i32)
}

/// A year column after coercion, with the number of entries that became
/// missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearColumn {
    pub values: Vec<Option<i32>>,
    pub missing: usize,
}

/// Coerce a whole year column to numbers; unparseable entries become `None`
/// and are counted so the operator can be told.
pub fn coerce_year<S: AsRef<str>>(column: &[S]) -> YearColumn {
    let values: Vec<Option<i32>> = column.iter().map(|v| parse_year(v.as_ref())).collect();
    let missing = values.iter().filter(|v| v.is_none()).count();
    YearColumn { values, missing }
}

/// `None` for blank cells, the trimmed text otherwise.
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed)
    }
}
