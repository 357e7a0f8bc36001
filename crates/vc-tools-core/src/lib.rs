pub mod error;
pub mod memo;
pub mod time_value;
pub mod types;

#[cfg(feature = "fund_fees")]
pub mod fund_fees;

#[cfg(feature = "j_curve")]
pub mod j_curve;

#[cfg(feature = "term_sheet")]
pub mod term_sheet;

#[cfg(feature = "valuation_nuances")]
pub mod valuation_nuances;

pub use error::VcToolsError;
pub use types::*;

/// Standard result type for all vc-tools operations
pub type VcToolsResult<T> = Result<T, VcToolsError>;
