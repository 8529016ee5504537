pub mod error;
pub mod member;
pub mod params;
pub mod provider;
pub mod types;
pub mod update;

#[cfg(feature = "report")]
pub mod report;

pub use error::ProfitShareError;
pub use types::*;

/// Standard result type for all profit-share operations
pub type ProfitShareResult<T> = Result<T, ProfitShareError>;
