use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary device values (bid / initial device amount).
pub type Money = Decimal;

/// Percentages expressed on a 0–100 scale (66.67 = 66.67%).
pub type Percent = Decimal;

/// Decimal places used for every percentage shown in a view.
pub const PERCENT_DP: u32 = 2;

/// The two trade-in channels being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Internal acquisition program (channel A)
    Maple,
    /// Competing buyer the device was lost to (channel B)
    Cashify,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Maple => write!(f, "Maple"),
            Channel::Cashify => write!(f, "Cashify"),
        }
    }
}

/// Round a percentage for display.
pub fn round_pct(value: Percent) -> Percent {
    value.round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// A view result, or the terminal "no data" state reached when the active
/// filters leave nothing to compute over.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView<T> {
    Ready(T),
    NoData { notice: String },
}

impl<T> DashboardView<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, DashboardView::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            DashboardView::Ready(v) => Some(v),
            DashboardView::NoData { .. } => None,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
