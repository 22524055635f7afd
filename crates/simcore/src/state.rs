//! Position/velocity state and voltage input of a single-axis actuator.
//!
//! Both are thin wrappers around nalgebra vectors so that the state-space
//! matrices can act on them directly. Units are SI: meters (or radians for
//! rotary mechanisms), meters per second and volts.

use std::ops::{Neg, Sub};

use nalgebra::{Vector1, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::units::{centimeters, centimeters_per_second};

/// Tolerance band used to decide whether a state has reached a goal.
///
/// Defaults to ±1 cm and ±1 cm/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Position band (m)
    pub position: f64,
    /// Velocity band (m/s)
    pub velocity: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            position: centimeters(1.0),
            velocity: centimeters_per_second(1.0),
        }
    }
}

impl Tolerance {
    pub fn new(position: f64, velocity: f64) -> SimResult<Self> {
        if !(position.is_finite() && position > 0.0) {
            return Err(SimError::InvalidTolerance { what: "position", value: position });
        }
        if !(velocity.is_finite() && velocity > 0.0) {
            return Err(SimError::InvalidTolerance { what: "velocity", value: velocity });
        }
        Ok(Tolerance { position, velocity })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionVelocityState {
    pub vector: Vector2<f64>,
}

impl PositionVelocityState {
    pub fn new(position: f64, velocity: f64) -> Self {
        PositionVelocityState {
            vector: Vector2::new(position, velocity),
        }
    }

    pub fn at_rest(position: f64) -> Self {
        Self::new(position, 0.0)
    }

    pub fn from_vector(vector: Vector2<f64>) -> Self {
        PositionVelocityState { vector }
    }

    pub fn position(&self) -> f64 {
        self.vector[0]
    }

    pub fn velocity(&self) -> f64 {
        self.vector[1]
    }

    pub fn set_position(&mut self, position: f64) {
        self.vector[0] = position;
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.vector[1] = velocity;
    }

    /// Clamps only the position into `[min, max]`; velocity is carried through untouched.
    pub fn position_clamped(&self, min: f64, max: f64) -> Self {
        let position = self.position();
        if position > max {
            Self::new(max, self.velocity())
        } else if position < min {
            Self::new(min, self.velocity())
        } else {
            *self
        }
    }

    pub fn within(&self, other: &PositionVelocityState, tolerance: &Tolerance) -> bool {
        let position_in_tolerance = (self.position() - other.position()).abs() < tolerance.position;
        let velocity_in_tolerance = (self.velocity() - other.velocity()).abs() < tolerance.velocity;
        position_in_tolerance && velocity_in_tolerance
    }

    /// Raw `[position, velocity]` in (m, m/s).
    pub fn to_array(&self) -> [f64; 2] {
        [self.position(), self.velocity()]
    }
}

impl Sub for PositionVelocityState {
    type Output = PositionVelocityState;

    fn sub(self, rhs: Self) -> Self::Output {
        PositionVelocityState::from_vector(self.vector - rhs.vector)
    }
}

impl Neg for PositionVelocityState {
    type Output = PositionVelocityState;

    fn neg(self) -> Self::Output {
        PositionVelocityState::from_vector(-self.vector)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoltageInput {
    pub vector: Vector1<f64>,
}

impl VoltageInput {
    pub fn new(voltage: f64) -> Self {
        VoltageInput {
            vector: Vector1::new(voltage),
        }
    }

    pub fn from_vector(vector: Vector1<f64>) -> Self {
        VoltageInput { vector }
    }

    pub fn voltage(&self) -> f64 {
        self.vector[0]
    }
}
