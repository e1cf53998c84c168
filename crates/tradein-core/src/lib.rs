pub mod dashboard;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod normalize;
pub mod records;
pub mod reference;
pub mod types;

#[cfg(feature = "session")]
pub mod session;

pub use error::TradeInError;
pub use types::*;

/// Standard result type for all trade-in engine operations
pub type TradeInResult<T> = Result<T, TradeInError>;
