//! Errors raised by the tariff calculation engine.

use thiserror::Error;

/// Failure of a bill calculation.
///
/// Calculations are all-or-nothing: the first error aborts the whole
/// 12-month run and no partial breakdown is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TariffError {
    /// Unrecognized month, unsupported battery capacity, or a malformed,
    /// negative or non-finite input figure.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Annual consumption above every demand-matrix bracket.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A computed amount came out non-finite.
    #[error("arithmetic indeterminate: {0}")]
    ArithmeticIndeterminate(String),
}

impl TariffError {
    /// Short machine-readable kind, e.g. `"InvalidInput"`.
    pub fn kind(&self) -> &'static str {
        match self {
            TariffError::InvalidInput(_) => "InvalidInput",
            TariffError::OutOfRange(_) => "OutOfRange",
            TariffError::ArithmeticIndeterminate(_) => "ArithmeticIndeterminate",
        }
    }
}

/// Checks that `value` is finite and non-negative.
///
/// # Errors
///
/// Returns `TariffError::InvalidInput` naming `field` otherwise.
pub(crate) fn ensure_non_negative(field: &str, value: f64) -> Result<f64, TariffError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TariffError::InvalidInput(format!(
            "{field} must be a finite, non-negative number, got {value}"
        )))
    }
}
