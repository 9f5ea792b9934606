//! Error types for recipe resolution and rate arithmetic

use thiserror::Error;

/// Errors raised by the calculation engine.
///
/// Every variant is terminal for the request that produced it: the inputs are
/// static definitions, so nothing here is worth retrying without fixing data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// An item or building name has no definition.
    #[error("no definition for '{0}'")]
    NotFound(String),

    /// The recipe graph loops back onto this item.
    #[error("recipe for '{0}' depends on itself")]
    CyclicRecipe(String),

    /// A rate, speed or stack height that must be positive was zero or negative.
    #[error("division by zero: a rate or stack height is not positive")]
    DivisionByZero,

    /// A caller-supplied rate or count is negative or not finite.
    #[error("invalid {what}: {value}")]
    InvalidRate { what: &'static str, value: f64 },

    /// A recipe definition violates the registry invariants.
    #[error("invalid recipe '{item}': {reason}")]
    InvalidRecipe { item: String, reason: String },
}

pub type CalcResult<T> = std::result::Result<T, CalcError>;
