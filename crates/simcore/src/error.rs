//! Configuration errors raised while building models and simulators.

use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Discretization requires a strictly positive sample period.
    #[error("time step must be positive and finite, got {time_step} s")]
    NonPositiveTimeStep { time_step: f64 },

    /// A physical parameter is zero, negative or not finite where that makes the model meaningless.
    #[error("invalid parameter {what}: {value}")]
    InvalidParameter { what: &'static str, value: f64 },

    /// BᵀB is not invertible, so no input can cancel a constant disturbance.
    #[error("input matrix has no left pseudoinverse (BᵀB is singular)")]
    SingularInputMatrix,

    #[error("invalid tolerance {what}: {value}")]
    InvalidTolerance { what: &'static str, value: f64 },
}

/// Fails with [`SimError::InvalidParameter`] unless `value` is finite and strictly positive.
pub fn require_positive(what: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { what, value })
    }
}

/// Fails with [`SimError::InvalidParameter`] unless `value` is finite and not negative.
pub fn require_non_negative(what: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { what, value })
    }
}
