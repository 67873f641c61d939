//! Systems - logic that operates on vehicle components

use hecs::World;

use fuzzagv_logic::grid::Occupancy;
use fuzzagv_logic::inference::InferenceSystem;
use fuzzagv_logic::sensors::SensorArray;
use fuzzagv_logic::vehicle::{ControlParams, Readings};

use crate::components::{Telemetry, Vehicle};

/// Totals over one pass of [`control_system`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    pub vehicles: usize,
    pub collisions: usize,
    pub fallbacks: usize,
    pub emergencies: usize,
}

/// Sense, infer, steer and move every vehicle once.
///
/// All vehicles read the same grid and share one controller; each keeps its
/// own steering state, so the order they are visited in does not matter.
pub fn control_system<G: Occupancy + ?Sized>(
    world: &mut World,
    controller: &InferenceSystem,
    grid: &G,
    sensors: &SensorArray,
    params: &ControlParams,
    dt: f64,
) -> TickStats {
    let mut stats = TickStats::default();
    for (_, (vehicle, telemetry)) in world.query_mut::<(&mut Vehicle, &mut Telemetry)>() {
        let report = vehicle.tick(controller, grid, sensors, params, dt);
        telemetry.record(&report);

        stats.vehicles += 1;
        stats.collisions += usize::from(report.collision.is_some());
        stats.fallbacks += usize::from(report.fallback_used);
        stats.emergencies += usize::from(report.emergency.is_some());
    }
    stats
}

/// Refresh every vehicle's readings without steering or moving it. Used while
/// the simulation is paused so walls edited meanwhile show up on the sensors.
pub fn sensing_system<G: Occupancy + ?Sized>(world: &mut World, grid: &G, sensors: &SensorArray) {
    for (_, (vehicle, telemetry)) in world.query_mut::<(&Vehicle, &mut Telemetry)>() {
        let distances = sensors.sense(&vehicle.pose, grid);
        telemetry.readings = Readings::from_distances(&distances, sensors.max_range);
    }
}
