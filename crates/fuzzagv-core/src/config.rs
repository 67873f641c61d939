//! Engine configuration.

use serde::{Deserialize, Serialize};

use fuzzagv_logic::sensors::SensorArray;
use fuzzagv_logic::tracks::TrackPreset;
use fuzzagv_logic::vehicle::{ControlParams, Pose};

/// World size, starting track and the control constants shared by every
/// vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cols: usize,
    pub rows: usize,
    /// Cell side length in pixels.
    pub cell_size: f64,
    pub track: TrackPreset,
    pub control: ControlParams,
    pub sensors: SensorArray,
}

impl Default for EngineConfig {
    /// 1240 × 1000 px world at 10 px cells on the rectangle track.
    fn default() -> Self {
        Self {
            cols: 124,
            rows: 100,
            cell_size: 10.0,
            track: TrackPreset::Rectangle,
            control: ControlParams::default(),
            sensors: SensorArray::default(),
        }
    }
}

impl EngineConfig {
    pub fn width(&self) -> f64 {
        self.cols as f64 * self.cell_size
    }

    pub fn height(&self) -> f64 {
        self.rows as f64 * self.cell_size
    }

    /// Default spawn pose: a fifth of the way across, halfway down, facing east.
    pub fn start_pose(&self) -> Pose {
        Pose::new(self.width() * 0.2, self.height() * 0.5, 0.0)
    }

    /// Centre of the world, facing east.
    pub fn center(&self) -> (f64, f64) {
        (self.width() / 2.0, self.height() / 2.0)
    }
}
