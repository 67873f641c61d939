//! Component definitions for the ECS simulation.
//!
//! A vehicle entity carries a [`Vehicle`] (pose, steering, trail), a
//! [`VehicleName`] and a [`Telemetry`] record. Components are plain data; the
//! control loop lives in [`crate::systems`].

use serde::{Deserialize, Serialize};

use fuzzagv_logic::vehicle::{Readings, Side, TickReport};

pub use fuzzagv_logic::vehicle::{Pose, Vehicle};

/// Display name of a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleName(pub String);

impl VehicleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// What the vehicle sensed and decided on its latest tick, plus running totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub readings: Readings,
    pub raw_steering: f64,
    pub fallback_used: bool,
    pub emergency: Option<Side>,
    pub collided: bool,
    pub ticks: u64,
    pub collisions: u64,
    pub fallbacks: u64,
}

impl Telemetry {
    pub fn record(&mut self, report: &TickReport) {
        self.readings = report.readings;
        self.raw_steering = report.raw_steering;
        self.fallback_used = report.fallback_used;
        self.emergency = report.emergency;
        self.collided = report.collision.is_some();
        self.ticks += 1;
        if self.collided {
            self.collisions += 1;
        }
        if self.fallback_used {
            self.fallbacks += 1;
        }
    }
}

/// Per-vehicle operator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleCommand {
    /// Back to the spawn pose.
    Reset,
    /// Jump to the world centre.
    Center,
    Faster,
    Slower,
    TogglePause,
}

/// Read-only view of one vehicle for renderers and reports.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub entity: hecs::Entity,
    pub name: String,
    pub pose: Pose,
    pub steering: f64,
    pub speed: f64,
    pub paused: bool,
    pub telemetry: Telemetry,
    pub trail: Vec<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_counts_collisions_and_fallbacks() {
        let mut t = Telemetry::default();
        let mut report = TickReport {
            readings: Readings::new(10.0, 20.0, 30.0),
            raw_steering: 4.0,
            fallback_used: true,
            emergency: Some(Side::Right),
            collision: Some(Side::Left),
        };
        t.record(&report);
        report.collision = None;
        report.fallback_used = false;
        t.record(&report);

        assert_eq!(t.ticks, 2);
        assert_eq!(t.collisions, 1);
        assert_eq!(t.fallbacks, 1);
        assert!(!t.collided);
        assert_eq!(t.readings.right, 30.0);
    }
}
