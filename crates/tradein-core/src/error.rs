use thiserror::Error;

use crate::types::Channel;

#[derive(Debug, Error)]
pub enum TradeInError {
    #[error("Missing columns in {channel} data: {}", .columns.join(", "))]
    MissingColumns {
        channel: Channel,
        columns: Vec<String>,
    },

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TradeInError {
    fn from(e: serde_json::Error) -> Self {
        TradeInError::SerializationError(e.to_string())
    }
}
