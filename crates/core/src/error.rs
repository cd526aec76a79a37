//! Error types shared across the engine.

use thiserror::Error;

/// Failure modes of the balance-decomposition engine.
///
/// None of these are retried internally: every operation here is a
/// deterministic numerical computation, so retrying with identical inputs
/// cannot change the outcome.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// Invalid resolution, domain length, or physical-parameter combination.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Arithmetic between states or fields that do not share a grid,
    /// representation, or component set.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The linearized operator could not be diagonalized at a wavenumber.
    /// Should not occur for physically valid parameters, but is detected
    /// rather than silently producing NaNs downstream.
    #[error("singular eigenspace at wavenumber {wavenumber:?}: {reason}")]
    SingularEigenspace { wavenumber: Vec<f64>, reason: String },

    /// Non-finite values produced during time stepping.
    #[error("non-finite value in component '{component}' after step {step}")]
    NumericalInstability { component: String, step: usize },
}

impl BalanceError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        BalanceError::Config(msg.into())
    }

    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        BalanceError::DimensionMismatch(msg.into())
    }
}
