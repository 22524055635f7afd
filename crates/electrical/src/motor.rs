use std::ops::Mul;

use serde::{Deserialize, Serialize};
use simcore::error::{require_positive, SimError, SimResult};
use simcore::units::rpm;

/// Brushed/brushless DC motor described by its datasheet curve.
///
/// Inputs are the usual five datasheet numbers; the electrical constants are
/// derived once from them:
/// - torque constant `Kt = stall_torque / stall_current` (N·m/A)
/// - winding resistance `R = nominal_voltage / stall_current` (Ω)
/// - velocity constant `Kv = free_speed / (nominal_voltage - free_current·R)` (rad/s/V)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motor {
    /// Nominal supply voltage (V)
    pub nominal_voltage: f64,
    /// Torque at zero speed (N·m)
    pub stall_torque: f64,
    /// Current at zero speed (A)
    pub stall_current: f64,
    /// Unloaded speed at nominal voltage (rad/s)
    pub free_speed: f64,
    /// Current drawn at free speed (A)
    pub free_current: f64,
}

impl Motor {
    pub fn new(
        nominal_voltage: f64,
        stall_torque: f64,
        stall_current: f64,
        free_speed: f64,
        free_current: f64,
    ) -> Self {
        Motor {
            nominal_voltage,
            stall_torque,
            stall_current,
            free_speed,
            free_current,
        }
    }

    pub fn kraken_x60() -> Self {
        Motor::new(12.0, 7.09, 366.0, rpm(6000.0), 2.0)
    }

    pub fn kraken_x60_foc() -> Self {
        Motor::new(12.0, 9.37, 483.0, rpm(5800.0), 2.0)
    }

    pub fn neo() -> Self {
        Motor::new(12.0, 2.6, 105.0, rpm(5676.0), 1.8)
    }

    /// Equivalent single motor for `count` identical motors on one shaft.
    ///
    /// Torque and currents add up; voltage and free speed stay the same.
    pub fn scaled(&self, count: u32) -> Self {
        let count = f64::from(count);
        Motor {
            nominal_voltage: self.nominal_voltage,
            stall_torque: self.stall_torque * count,
            stall_current: self.stall_current * count,
            free_speed: self.free_speed,
            free_current: self.free_current * count,
        }
    }

    /// Torque constant (N·m/A)
    pub fn torque_constant(&self) -> f64 {
        self.stall_torque / self.stall_current
    }

    /// Winding resistance (Ω)
    pub fn resistance(&self) -> f64 {
        self.nominal_voltage / self.stall_current
    }

    /// Angular velocity per volt of back-EMF (rad/s/V)
    pub fn velocity_constant(&self) -> f64 {
        self.free_speed / (self.nominal_voltage - self.free_current * self.resistance())
    }

    /// Shaft torque (N·m) at `angular_velocity` (rad/s) with `voltage` (V) applied.
    pub fn torque(&self, angular_velocity: f64, voltage: f64) -> f64 {
        self.torque_constant() * self.current(angular_velocity, voltage)
    }

    /// Winding current (A) at `angular_velocity` (rad/s) with `voltage` (V) applied.
    pub fn current(&self, angular_velocity: f64, voltage: f64) -> f64 {
        (voltage - angular_velocity / self.velocity_constant()) / self.resistance()
    }

    /// Checks that every derived constant is finite and the model is not degenerate.
    pub fn validate(&self) -> SimResult<()> {
        require_positive("nominal_voltage", self.nominal_voltage)?;
        require_positive("stall_torque", self.stall_torque)?;
        require_positive("stall_current", self.stall_current)?;
        require_positive("free_speed", self.free_speed)?;
        if !(self.free_current.is_finite() && self.free_current >= 0.0) {
            return Err(SimError::InvalidParameter {
                what: "free_current",
                value: self.free_current,
            });
        }
        require_positive("velocity_constant", self.velocity_constant())?;
        Ok(())
    }
}

impl Mul<u32> for Motor {
    type Output = Motor;

    fn mul(self, count: u32) -> Self::Output {
        self.scaled(count)
    }
}
