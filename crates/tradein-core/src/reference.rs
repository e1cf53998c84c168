//! Static representative reference data: monthly targets and weekoff days.
//!
//! Loaded once (YAML/JSON on the operator side) and passed into every
//! computation. Lookups are keyed by normalized name and never fail: an
//! unknown representative has target 0 and no weekoff.

use std::collections::HashMap;
use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::TradeInError;
use crate::normalize::{canonical_month, month_name, normalize_identity_field};
use crate::TradeInResult;

/// A representative's fixed non-working weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WeekOff {
    /// Vacant position or no fixed weekoff
    #[default]
    None,
    Day(Weekday),
}

impl WeekOff {
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            WeekOff::None => None,
            WeekOff::Day(d) => Some(*d),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl fmt::Display for WeekOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekOff::None => write!(f, "None"),
            WeekOff::Day(d) => write!(f, "{}", weekday_name(*d)),
        }
    }
}

impl TryFrom<String> for WeekOff {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "none" | "vacant" | "-" => Ok(WeekOff::None),
            _ => trimmed
                .parse::<Weekday>()
                .map(WeekOff::Day)
                .map_err(|_| format!("unknown weekoff day '{}'", trimmed)),
        }
    }
}

impl From<WeekOff> for String {
    fn from(value: WeekOff) -> Self {
        value.to_string()
    }
}

/// Reference entry for one representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeProfile {
    pub name: String,
    /// Expected Maple acquisitions for the reporting month; 0 marks a
    /// vacant position
    #[serde(default)]
    pub monthly_target: u32,
    #[serde(default)]
    pub weekoff: WeekOff,
}

/// Month the targets in a reference file were set for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingMonth {
    pub year: i32,
    /// Month name or number; normalized on comparison
    pub month: String,
}

impl ReportingMonth {
    /// Calendar month number, if the month text is recognisable.
    pub fn month_number(&self) -> Option<u32> {
        canonical_month(&self.month).map(|m| m.number_from_month())
    }

    pub fn label(&self) -> String {
        match canonical_month(&self.month) {
            Some(m) => format!("{} {}", month_name(m), self.year),
            None => format!("{} {}", self.month, self.year),
        }
    }
}

/// Thresholds and list sizes used by the overview and summary views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Market share (%) below which a store/representative is flagged
    #[serde(default = "default_threshold")]
    pub low_share_threshold: rust_decimal::Decimal,
    /// Target attainment (%) below which a representative is flagged
    #[serde(default = "default_threshold")]
    pub low_attainment_threshold: rust_decimal::Decimal,
    #[serde(default = "default_top_performers")]
    pub top_performers: usize,
}

fn default_threshold() -> rust_decimal::Decimal {
    rust_decimal::Decimal::from(50)
}

fn default_top_performers() -> usize {
    10
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            low_share_threshold: default_threshold(),
            low_attainment_threshold: default_threshold(),
            top_performers: default_top_performers(),
        }
    }
}

/// Serialized shape of a reference file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceFile {
    #[serde(default)]
    pub reporting_month: Option<ReportingMonth>,
    #[serde(default)]
    pub representatives: Vec<RepresentativeProfile>,
    #[serde(default)]
    pub excluded_representatives: Vec<String>,
    #[serde(default)]
    pub settings: ViewSettings,
}

/// Indexed, immutable reference data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "ReferenceFile", into = "ReferenceFile")]
pub struct ReferenceData {
    reporting_month: Option<ReportingMonth>,
    profiles: Vec<RepresentativeProfile>,
    index: HashMap<String, usize>,
    excluded: Vec<String>,
    settings: ViewSettings,
}

impl TryFrom<ReferenceFile> for ReferenceData {
    type Error = TradeInError;

    fn try_from(file: ReferenceFile) -> Result<Self, Self::Error> {
        ReferenceData::new(file)
    }
}

impl From<ReferenceData> for ReferenceFile {
    fn from(data: ReferenceData) -> Self {
        ReferenceFile {
            reporting_month: data.reporting_month,
            representatives: data.profiles,
            excluded_representatives: data.excluded,
            settings: data.settings,
        }
    }
}

impl ReferenceData {
    /// Index a reference file. Two profiles that normalize to the same
    /// name are rejected.
    pub fn new(file: ReferenceFile) -> TradeInResult<Self> {
        if let Some(rm) = &file.reporting_month {
            if rm.month_number().is_none() {
                return Err(TradeInError::ReferenceData(format!(
                    "reporting_month.month '{}' is not a month",
                    rm.month
                )));
            }
        }

        let mut index = HashMap::with_capacity(file.representatives.len());
        for (i, profile) in file.representatives.iter().enumerate() {
            let key = normalize_identity_field(&profile.name);
            if key.is_empty() {
                return Err(TradeInError::ReferenceData(format!(
                    "representative #{} has an empty name",
                    i + 1
                )));
            }
            if index.insert(key.clone(), i).is_some() {
                return Err(TradeInError::ReferenceData(format!(
                    "duplicate representative '{}'",
                    key
                )));
            }
        }

        Ok(Self {
            reporting_month: file.reporting_month,
            profiles: file.representatives,
            index,
            excluded: file
                .excluded_representatives
                .iter()
                .map(|n| normalize_identity_field(n))
                .collect(),
            settings: file.settings,
        })
    }

    pub fn from_json_str(s: &str) -> TradeInResult<Self> {
        let file: ReferenceFile = serde_json::from_str(s)?;
        Self::new(file)
    }

    pub fn profile(&self, name: &str) -> Option<&RepresentativeProfile> {
        self.index
            .get(&normalize_identity_field(name))
            .map(|&i| &self.profiles[i])
    }

    /// Monthly target, 0 when the representative is unknown.
    pub fn target_for(&self, name: &str) -> u32 {
        self.profile(name).map(|p| p.monthly_target).unwrap_or(0)
    }

    /// Weekoff day, `WeekOff::None` when the representative is unknown.
    pub fn weekoff_for(&self, name: &str) -> WeekOff {
        self.profile(name).map(|p| p.weekoff).unwrap_or_default()
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        let key = normalize_identity_field(name);
        self.excluded.iter().any(|e| *e == key)
    }

    pub fn profiles(&self) -> &[RepresentativeProfile] {
        &self.profiles
    }

    pub fn reporting_month(&self) -> Option<&ReportingMonth> {
        self.reporting_month.as_ref()
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Warning text when targets were set for a different month than the
    /// one being reported on.
    pub fn period_mismatch(&self, year: i32, month: Option<&str>) -> Option<String> {
        let rm = self.reporting_month.as_ref()?;
        let filter_month = month.and_then(canonical_month).map(|m| m.number_from_month());
        let same = rm.year == year && (filter_month.is_none() || filter_month == rm.month_number());
        if same {
            None
        } else {
            Some(format!(
                "Targets in the reference data are for {}; the report covers {}",
                rm.label(),
                match month {
                    Some(m) => format!("{} {}", m, year),
                    None => year.to_string(),
                }
            ))
        }
    }
}
