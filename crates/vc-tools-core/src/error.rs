use thiserror::Error;

/// Errors raised by the calculators. Numeric edge cases that have a defined
/// answer (negative invested capital, founder residuals below zero) are
/// reported as warnings on the output instead.
#[derive(Debug, Error)]
pub enum VcToolsError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The deal cannot be priced, e.g. an investor needing 100% or more.
    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A denominator the model divides by is zero.
    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for VcToolsError {
    fn from(e: serde_json::Error) -> Self {
        VcToolsError::SerializationError(e.to_string())
    }
}
