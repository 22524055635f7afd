//! Per-tick record of the closed loop, in SI units, with a CSV formatter.

use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str = concat!(
    "time_s,position_m,velocity_mps,",
    "reference_position_m,reference_velocity_mps,",
    "voltage_v,current_a,at_goal"
);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    /// Time at the end of the tick (s)
    pub time: f64,
    pub position: f64,
    pub velocity: f64,
    pub reference_position: f64,
    pub reference_velocity: f64,
    /// Voltage applied during the tick (V)
    pub voltage: f64,
    /// Motor current drawn at the start of the tick (A)
    pub current: f64,
    pub at_goal: bool,
}

impl Telemetry {
    pub fn csv_row(&self) -> String {
        format!(
            "{:.4},{:.6},{:.6},{:.6},{:.6},{:.4},{:.3},{}",
            self.time,
            self.position,
            self.velocity,
            self.reference_position,
            self.reference_velocity,
            self.voltage,
            self.current,
            u8::from(self.at_goal)
        )
    }
}
