//! JSON run configuration. Every field has a default, so `{}` runs the
//! reference elevator: two Kraken X60 (FOC) motors lifting 30 lb up a
//! three-stage elevator and back down, three seconds each way.

use std::fs;
use std::path::{Path, PathBuf};

use electrical::Motor;
use mechanics::{Elevator, MotorSystem, StageTravel};
use serde::{Deserialize, Serialize};
use simcore::units::{milliseconds, STANDARD_GRAVITY};
use simcore::{SimResult, Tolerance};
use simplelog::LevelFilter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorPreset {
    KrakenX60,
    #[default]
    KrakenX60Foc,
    Neo,
}

impl MotorPreset {
    pub fn motor(self) -> Motor {
        match self {
            MotorPreset::KrakenX60 => Motor::kraken_x60(),
            MotorPreset::KrakenX60Foc => Motor::kraken_x60_foc(),
            MotorPreset::Neo => Motor::neo(),
        }
    }
}

/// Elevator parameters in SI units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevatorConfig {
    pub gear_ratio: f64,
    /// Drum radius (m)
    pub drum_radius: f64,
    /// Carried mass (kg)
    pub mass: f64,
    /// Current limit (A)
    pub max_current: f64,
    /// Travel (m); derived from `stages` when absent
    pub max_travel: Option<f64>,
    pub stages: StageTravel,
    pub motor: MotorPreset,
    pub motor_count: u32,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        let elevator = Elevator::default();
        Self {
            gear_ratio: elevator.gear_ratio,
            drum_radius: elevator.drum_radius,
            mass: elevator.mass,
            max_current: elevator.max_current,
            max_travel: None,
            stages: StageTravel::three_stage(),
            motor: MotorPreset::default(),
            motor_count: 2,
        }
    }
}

impl ElevatorConfig {
    pub fn build(&self) -> SimResult<Elevator> {
        let max_travel = self.max_travel.unwrap_or_else(|| self.stages.total_travel());
        let elevator = Elevator::new(
            self.gear_ratio,
            self.drum_radius,
            self.mass,
            self.max_current,
            max_travel,
            self.motor.motor() * self.motor_count,
        );
        elevator.validate()?;
        Ok(elevator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed simulation step (s)
    pub time_step: f64,
    /// Simulated time (s)
    pub duration: f64,
    /// Disturbance acceleration along the travel axis (m/s²)
    pub gravity: f64,
    /// Position gain (V/m)
    pub kp: f64,
    /// Velocity gain (V/(m/s))
    pub kd: f64,
    /// Profile cruise velocity (m/s); the elevator's free speed when absent
    pub max_velocity: Option<f64>,
    pub elevator: ElevatorConfig,
    /// Time each goal is held (s)
    pub setpoint_period: f64,
    /// Goal positions (m); top of travel then bottom when absent
    pub goals: Option<Vec<f64>>,
    pub tolerance: Tolerance,
    /// CSV trace destination
    pub output: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            time_step: milliseconds(1.0),
            duration: 6.0,
            gravity: STANDARD_GRAVITY,
            kp: 191.2215,
            kd: 4.811,
            max_velocity: None,
            elevator: ElevatorConfig::default(),
            setpoint_period: 3.0,
            goals: None,
            tolerance: Tolerance::default(),
            output: PathBuf::from("elevator_trace.csv"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    /// Configured goals, or the top and bottom of `max_travel`.
    pub fn goals(&self, max_travel: f64) -> Vec<f64> {
        self.goals.clone().unwrap_or_else(|| vec![max_travel, 0.0])
    }
}
