//! Goal schedule that cycles through a list of positions, holding each for a
//! fixed period.

use serde::{Deserialize, Serialize};
use simcore::error::{require_positive, SimError, SimResult};
use simcore::PositionVelocityState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicSetpoints {
    /// Time each goal is held (s)
    pub period: f64,
    /// Goal positions, visited in order and then repeated
    pub goals: Vec<f64>,
}

impl PeriodicSetpoints {
    pub fn new(period: f64, goals: Vec<f64>) -> SimResult<Self> {
        require_positive("setpoint period", period)?;
        if goals.is_empty() {
            return Err(SimError::InvalidParameter {
                what: "setpoint goals",
                value: 0.0,
            });
        }
        Ok(Self { period, goals })
    }

    /// Up to `top` and back down to `bottom`, `period` seconds each.
    pub fn up_and_down(period: f64, bottom: f64, top: f64) -> SimResult<Self> {
        Self::new(period, vec![top, bottom])
    }

    /// Index into `goals` active at time `t`.
    pub fn index_at(&self, t: f64) -> usize {
        let cycles = (t.max(0.0) / self.period).floor() as usize;
        cycles % self.goals.len()
    }

    /// Goal, at rest, active at time `t`.
    pub fn goal_at(&self, t: f64) -> PositionVelocityState {
        PositionVelocityState::at_rest(self.goals[self.index_at(t)])
    }
}
