//! Batch elevator simulation.
//!
//! Usage: `elevator-sim [config.json]`. Runs the closed loop for the
//! configured duration, switching goals on a fixed period, writes one CSV row
//! per tick and logs a summary.

mod config;
mod summary;

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use control::{
    ClosedLoop, PeriodicSetpoints, StateFeedback, Telemetry, TrapezoidProfile, CSV_HEADER,
};
use log::{info, warn};
use mechanics::MotorSystem;
use simcore::units::{meters_to_inches, to_rpm};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::config::AppConfig;
use crate::summary::RunSummary;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => AppConfig::load(Path::new(&path))?,
        None => AppConfig::default(),
    };
    TermLogger::init(
        config.level_filter()?,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let samples = run(&config)?;
    write_csv(&config.output, &samples)?;
    info!("wrote {} samples to {}", samples.len(), config.output.display());

    match RunSummary::from_samples(&samples, config.time_step) {
        Some(summary) => log_summary(&summary),
        None => warn!("duration {} s produced no samples", config.duration),
    }
    Ok(())
}

fn run(config: &AppConfig) -> Result<Vec<Telemetry>, Box<dyn Error>> {
    let elevator = config.elevator.build()?;
    let mut profile = TrapezoidProfile::from_system(&elevator)?;
    if let Some(max_velocity) = config.max_velocity {
        profile = profile.with_max_velocity(max_velocity)?;
    }
    let free_speed = elevator.maximum_velocity();
    info!(
        "elevator: travel {:.4} m ({:.1} in), free speed {:.4} m/s ({:.0} rpm at the motor)",
        elevator.max_travel,
        meters_to_inches(elevator.max_travel),
        free_speed,
        to_rpm(elevator.motor_velocity(free_speed))
    );
    info!(
        "elevator: peak acceleration {:.3} m/s^2, hold {:.4} V",
        elevator.maximum_acceleration(),
        elevator.opposing_voltage(config.gravity)
    );
    info!(
        "profile: {:.4} m/s, {:.3} m/s^2; gains kP={} kD={}",
        profile.max_velocity, profile.max_acceleration, config.kp, config.kd
    );

    let goals = config.goals(elevator.max_travel);
    let setpoints = PeriodicSetpoints::new(config.setpoint_period, goals)?;
    let feedback = StateFeedback::from_pd(config.kp, config.kd);
    let mut sim = ClosedLoop::new(elevator, profile, feedback, config.gravity, config.time_step)?
        .with_tolerance(config.tolerance);

    Ok(sim.run_schedule(&setpoints, config.duration))
}

fn write_csv(path: &Path, samples: &[Telemetry]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{CSV_HEADER}")?;
    for sample in samples {
        writeln!(out, "{}", sample.csv_row())?;
    }
    out.flush()
}

fn log_summary(summary: &RunSummary) {
    let last = &summary.last;
    info!(
        "final state at t={:.3} s: {:.4} m, {:.4} m/s (reference {:.4} m), at goal: {}",
        last.time, last.position, last.velocity, last.reference_position, last.at_goal
    );
    info!(
        "peak current {:.1} A, {:.3} s inside goal tolerance",
        summary.peak_current, summary.time_at_goal
    );
    match summary.first_at_goal {
        Some(time) => info!("first settled on a goal at t={time:.3} s"),
        None => warn!("never settled on a goal"),
    }
}
