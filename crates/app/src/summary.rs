use control::Telemetry;

/// Aggregate figures logged after a batch run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub last: Telemetry,
    /// Highest motor current drawn (A)
    pub peak_current: f64,
    /// Total time spent inside the goal tolerance (s)
    pub time_at_goal: f64,
    /// First time the actuator settled on a goal (s)
    pub first_at_goal: Option<f64>,
}

impl RunSummary {
    pub fn from_samples(samples: &[Telemetry], time_step: f64) -> Option<Self> {
        let last = *samples.last()?;
        let peak_current = samples
            .iter()
            .map(|sample| sample.current)
            .fold(f64::NEG_INFINITY, f64::max);
        let ticks_at_goal = samples.iter().filter(|sample| sample.at_goal).count();
        let first_at_goal = samples
            .iter()
            .find(|sample| sample.at_goal)
            .map(|sample| sample.time);
        Some(Self {
            last,
            peak_current,
            time_at_goal: ticks_at_goal as f64 * time_step,
            first_at_goal,
        })
    }
}
