//! Trapezoidal velocity profile.
//!
//! Given the current reference and a goal, [`TrapezoidProfile::calculate`]
//! returns where the reference should be `time_step` seconds later when the
//! motion accelerates at `max_acceleration`, cruises at `max_velocity` and
//! decelerates to reach the goal exactly. Non-zero start and end velocities
//! are handled by extending the profile to a virtual rest point before the
//! start and after the end. Moves too short to reach cruise speed collapse to
//! a triangular profile.

use mechanics::MotorSystem;
use serde::{Deserialize, Serialize};
use simcore::error::{require_non_negative, SimResult};
use simcore::PositionVelocityState;

/// Phase boundaries of one profile, in seconds from the current reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileTiming {
    pub end_acceleration: f64,
    pub end_cruise: f64,
    pub end_deceleration: f64,
    /// Velocity held between `end_acceleration` and `end_cruise` (m/s)
    pub cruise_velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidProfile {
    /// Cruise velocity (m/s)
    pub max_velocity: f64,
    /// Acceleration and deceleration magnitude (m/s²)
    pub max_acceleration: f64,
}

impl TrapezoidProfile {
    pub fn new(max_velocity: f64, max_acceleration: f64) -> SimResult<Self> {
        require_non_negative("max_velocity", max_velocity)?;
        require_non_negative("max_acceleration", max_acceleration)?;
        Ok(TrapezoidProfile {
            max_velocity,
            max_acceleration,
        })
    }

    /// Limits taken from the mechanism's free-running velocity and peak acceleration.
    pub fn from_system<S: MotorSystem>(system: &S) -> SimResult<Self> {
        Self::new(system.maximum_velocity(), system.maximum_acceleration())
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> SimResult<Self> {
        self.max_velocity = require_non_negative("max_velocity", max_velocity)?;
        Ok(self)
    }

    /// A profile with no velocity or acceleration budget cannot move.
    pub fn is_degenerate(&self) -> bool {
        self.max_velocity <= 0.0 || self.max_acceleration <= 0.0
    }

    /// Reference state `time_step` seconds into the profile from `state` toward `goal`.
    pub fn calculate(
        &self,
        time_step: f64,
        state: PositionVelocityState,
        goal: PositionVelocityState,
    ) -> PositionVelocityState {
        if self.is_degenerate() {
            return state;
        }

        let (flip, state, goal) = self.normalize(state, goal);
        let timing = self.timing(&state, &goal);
        let max_acceleration = self.max_acceleration;

        let mut result = state;
        if time_step < timing.end_acceleration {
            let velocity = state.velocity() + 0.5 * time_step * max_acceleration;
            result.set_position(state.position() + velocity * time_step);
            result.set_velocity(state.velocity() + time_step * max_acceleration);
        } else if time_step <= timing.end_cruise {
            let end_acceleration = timing.end_acceleration;
            let ramp_velocity = state.velocity() + 0.5 * end_acceleration * max_acceleration;
            result.set_position(
                state.position()
                    + ramp_velocity * end_acceleration
                    + timing.cruise_velocity * (time_step - end_acceleration),
            );
            result.set_velocity(timing.cruise_velocity);
        } else if time_step <= timing.end_deceleration {
            let time_left = timing.end_deceleration - time_step;
            let velocity = goal.velocity() + 0.5 * time_left * max_acceleration;
            result.set_position(goal.position() - time_left * velocity);
            result.set_velocity(goal.velocity() + time_left * max_acceleration);
        } else {
            result = goal;
        }

        if flip { -result } else { result }
    }

    /// Mirrors a downward move into positive motion and caps the start
    /// velocity to the cruise velocity. The flag tells whether to mirror back.
    fn normalize(
        &self,
        state: PositionVelocityState,
        goal: PositionVelocityState,
    ) -> (bool, PositionVelocityState, PositionVelocityState) {
        let flip = goal.position() < state.position();
        let (mut state, goal) = if flip { (-state, -goal) } else { (state, goal) };
        if state.velocity() > self.max_velocity {
            state.set_velocity(self.max_velocity);
        }
        (flip, state, goal)
    }

    /// Phase boundaries for a move from `state` to `goal`, both already in
    /// positive-motion orientation and with the start velocity capped.
    fn timing(
        &self,
        state: &PositionVelocityState,
        goal: &PositionVelocityState,
    ) -> ProfileTiming {
        let max_velocity = self.max_velocity;
        let max_acceleration = self.max_acceleration;

        // Virtual ramp from rest up to the start velocity and down from the end velocity
        let start_time = state.velocity() / max_acceleration;
        let start_distance = 0.5 * start_time * start_time * max_acceleration;
        let end_time = goal.velocity() / max_acceleration;
        let end_distance = 0.5 * end_time * end_time * max_acceleration;

        let distance = start_distance + (goal.position() - state.position()) + end_distance;
        let mut acceleration_time = max_velocity / max_acceleration;
        let ramp_distance = acceleration_time * acceleration_time * max_acceleration;
        let mut cruise_distance = distance - ramp_distance;
        let mut cruise_velocity = max_velocity;
        if cruise_distance < 0.0 {
            // Triangular profile: the ramps meet before reaching cruise speed
            acceleration_time = (distance / max_acceleration).sqrt();
            cruise_distance = 0.0;
            cruise_velocity = acceleration_time * max_acceleration;
        }

        let end_acceleration = acceleration_time - start_time;
        let end_cruise = end_acceleration + cruise_distance / max_velocity;
        let end_deceleration = end_cruise + acceleration_time - end_time;
        ProfileTiming {
            end_acceleration,
            end_cruise,
            end_deceleration,
            cruise_velocity,
        }
    }

    /// Time (s) until a move from `state` settles on `goal`.
    pub fn total_time(&self, state: PositionVelocityState, goal: PositionVelocityState) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let (_, state, goal) = self.normalize(state, goal);
        self.timing(&state, &goal).end_deceleration
    }
}
