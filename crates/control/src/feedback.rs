//! State Feedback
//!
//! Fixed 1×2 gain row mapping a `[position, velocity]` error onto a voltage.
//! Gain synthesis happens elsewhere; the row is configuration.

use nalgebra::Matrix1x2;
use serde::{Deserialize, Serialize};
use simcore::PositionVelocityState;

/// Gain row `K = [kp, kd]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateFeedback {
    /// Position gain (V/m)
    pub kp: f64,
    /// Velocity gain (V/(m/s))
    pub kd: f64,
}

impl Default for StateFeedback {
    fn default() -> Self {
        Self::from_pd(0.0, 0.0)
    }
}

impl StateFeedback {
    /// Create a gain row from position and velocity gains
    pub fn from_pd(kp: f64, kd: f64) -> Self {
        Self { kp, kd }
    }

    pub fn gain(&self) -> Matrix1x2<f64> {
        Matrix1x2::new(self.kp, self.kd)
    }

    /// `K · error`, in volts
    pub fn compute(&self, error: &PositionVelocityState) -> f64 {
        (self.gain() * error.vector)[0]
    }
}
