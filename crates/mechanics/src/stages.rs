//! Travel geometry of cascaded elevator stages.

use serde::{Deserialize, Serialize};
use simcore::units::inches;

/// One moving stage, described by its offset from the stage below at both ends of travel (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub offset_at_bottom: f64,
    pub offset_at_top: f64,
}

impl Stage {
    pub fn new(offset_at_bottom: f64, offset_at_top: f64) -> Self {
        Stage {
            offset_at_bottom,
            offset_at_top,
        }
    }

    pub fn travel(&self) -> f64 {
        (self.offset_at_top - self.offset_at_bottom).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTravel {
    pub stages: Vec<Stage>,
}

impl StageTravel {
    pub fn new(stages: Vec<Stage>) -> Self {
        StageTravel { stages }
    }

    /// Two telescoping stages plus a carriage, each riding 1 in to 23 in above the one below.
    pub fn three_stage() -> Self {
        let tube_width = inches(1.0);
        let top = inches(23.0);
        StageTravel::new(vec![
            Stage::new(tube_width, top), // stage two on stage one
            Stage::new(tube_width, top), // stage three on stage two
            Stage::new(tube_width, top), // carriage on stage three
        ])
    }

    /// Total carriage travel (m): the stages extend in series.
    pub fn total_travel(&self) -> f64 {
        self.stages.iter().map(Stage::travel).sum()
    }
}
