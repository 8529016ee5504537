use thiserror::Error;

use crate::types::Ssn;

#[derive(Debug, Error)]
pub enum ProfitShareError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Malformed remark on profit code {profit_code} for SSN {ssn}: {remark:?} is too short to classify")]
    MalformedRemark {
        ssn: Ssn,
        profit_code: u8,
        remark: Option<String>,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ProfitShareError {
    fn from(e: serde_json::Error) -> Self {
        ProfitShareError::SerializationError(e.to_string())
    }
}
