//! Rotary arm driven through a gearbox. Same motor physics as the elevator,
//! with angle (rad) and angular velocity (rad/s) as the native output units.

use electrical::Motor;
use log::debug;
use serde::{Deserialize, Serialize};
use simcore::error::{require_positive, SimResult};

use crate::motor_system::MotorSystem;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    /// Gear ratio, output over input
    pub gear_ratio: f64,
    /// Pivot to tip (m)
    pub length: f64,
    /// Moment of inertia about the pivot (kg·m²)
    pub moment_of_inertia: f64,
    /// Current limit (A)
    pub max_current: f64,
    pub motor: Motor,
}

impl Arm {
    pub fn new(
        gear_ratio: f64,
        length: f64,
        moment_of_inertia: f64,
        max_current: f64,
        motor: Motor,
    ) -> Self {
        Arm {
            gear_ratio,
            length,
            moment_of_inertia,
            max_current,
            motor,
        }
    }

    /// Output torque (N·m) at joint velocity `velocity` (rad/s) with `voltage` (V) applied.
    pub fn torque(&self, velocity: f64, voltage: f64) -> f64 {
        self.motor.torque(self.motor_velocity(velocity), voltage) * self.gear_ratio
    }

    /// Linear speed of the arm tip (m/s).
    pub fn tip_velocity(&self, velocity: f64) -> f64 {
        velocity * self.length
    }
}

impl MotorSystem for Arm {
    fn motor(&self) -> &Motor {
        &self.motor
    }

    fn max_current(&self) -> f64 {
        self.max_current
    }

    fn motor_velocity(&self, velocity: f64) -> f64 {
        velocity * self.gear_ratio
    }

    fn acceleration(&self, velocity: f64, voltage: f64) -> f64 {
        self.torque(velocity, voltage) / self.moment_of_inertia
    }

    fn velocity_coefficient(&self) -> f64 {
        -(self.gear_ratio * self.gear_ratio * self.motor.torque_constant())
            / (self.motor.velocity_constant() * self.motor.resistance() * self.moment_of_inertia)
    }

    fn voltage_coefficient(&self) -> f64 {
        self.gear_ratio * self.motor.torque_constant()
            / (self.motor.resistance() * self.moment_of_inertia)
    }

    fn validate(&self) -> SimResult<()> {
        self.motor.validate()?;
        require_positive("gear_ratio", self.gear_ratio)?;
        require_positive("length", self.length)?;
        require_positive("moment_of_inertia", self.moment_of_inertia)?;
        require_positive("max_current", self.max_current)?;
        debug!(
            "arm: G={} J={} kg·m², w_max={:.4} rad/s (tip {:.4} m/s)",
            self.gear_ratio,
            self.moment_of_inertia,
            self.maximum_velocity(),
            self.tip_velocity(self.maximum_velocity())
        );
        Ok(())
    }
}
