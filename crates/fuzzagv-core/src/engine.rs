//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use rand::Rng;

use fuzzagv_logic::agv::agv_controller;
use fuzzagv_logic::error::ConfigError;
use fuzzagv_logic::grid::WallGrid;
use fuzzagv_logic::inference::InferenceSystem;
use fuzzagv_logic::tracks::TrackPreset;
use fuzzagv_logic::vehicle::DriveMode;

use crate::components::*;
use crate::config::EngineConfig;
use crate::placement::random_free_pose;
use crate::systems::{control_system, sensing_system, TickStats};

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all vehicles
    pub world: World,
    /// Steering controller shared by every vehicle
    controller: InferenceSystem,
    grid: WallGrid,
    config: EngineConfig,
    /// Simulation time in seconds since start
    sim_time: f64,
    time_scale: f64,
    mode: DriveMode,
    last_stats: TickStats,
}

impl SimulationEngine {
    /// Create an empty simulation on the configured track.
    pub fn new(config: EngineConfig, controller: InferenceSystem) -> Self {
        let grid = config.track.build(config.cols, config.rows, config.cell_size);
        log::info!(
            "engine ready: {}x{} cells, track '{}', {} rules",
            config.cols,
            config.rows,
            config.track.name(),
            controller.rules().len()
        );
        Self {
            world: World::new(),
            controller,
            grid,
            config,
            sim_time: 0.0,
            time_scale: 1.0,
            mode: DriveMode::Running,
            last_stats: TickStats::default(),
        }
    }

    /// Create a simulation driven by the built-in AGV controller.
    pub fn with_agv(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config, agv_controller()?))
    }

    /// Spawn a vehicle at `pose`. The pose also becomes its reset point.
    pub fn spawn_vehicle(&mut self, name: &str, pose: Pose) -> Entity {
        let entity = self.world.spawn((
            VehicleName::new(name),
            Vehicle::new(pose),
            Telemetry::default(),
        ));
        log::info!(
            "spawned '{}' at ({:.1}, {:.1}) heading {:.1}",
            name,
            pose.x,
            pose.y,
            pose.heading
        );
        entity
    }

    /// Spawn a vehicle on a random open cell. `None` if the grid has none.
    pub fn spawn_random(&mut self, name: &str, rng: &mut impl Rng) -> Option<Entity> {
        match random_free_pose(&self.grid, rng) {
            Some(pose) => Some(self.spawn_vehicle(name, pose)),
            None => {
                log::warn!("no free floor to place '{}'", name);
                None
            }
        }
    }

    pub fn despawn_vehicle(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity).is_ok()
    }

    /// Advance the simulation by `delta_seconds` of wall time.
    pub fn update(&mut self, delta_seconds: f64) {
        if self.mode == DriveMode::Paused {
            // Frozen in place, but the sensors still track grid edits
            self.last_stats = TickStats::default();
            sensing_system(&mut self.world, &self.grid, &self.config.sensors);
            return;
        }
        let delta = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            0.0
        };
        let scaled_delta = delta * self.time_scale;
        self.sim_time += scaled_delta;

        self.last_stats = control_system(
            &mut self.world,
            &self.controller,
            &self.grid,
            &self.config.sensors,
            &self.config.control,
            scaled_delta,
        );
    }

    /// Totals from the most recent [`update`](Self::update).
    pub fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    /// Pause or resume the whole simulation.
    pub fn toggle_pause(&mut self) {
        self.mode = match self.mode {
            DriveMode::Running => DriveMode::Paused,
            DriveMode::Paused => DriveMode::Running,
        };
        log::info!("simulation {:?}", self.mode);
    }

    pub fn is_paused(&self) -> bool {
        self.mode == DriveMode::Paused
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn grid(&self) -> &WallGrid {
        &self.grid
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn controller(&self) -> &InferenceSystem {
        &self.controller
    }

    pub fn vehicle_count(&self) -> usize {
        self.world.query::<&Vehicle>().iter().count()
    }

    /// Replace the grid with a preset track and send every vehicle back to
    /// its spawn pose.
    pub fn load_track(&mut self, track: TrackPreset) {
        self.grid = track.build(self.config.cols, self.config.rows, self.config.cell_size);
        self.config.track = track;
        for (_, vehicle) in self.world.query_mut::<&mut Vehicle>() {
            vehicle.reset();
        }
        log::info!(
            "loaded track '{}' ({} wall cells)",
            track.name(),
            self.grid.wall_count()
        );
    }

    /// Draw (`wall = true`) or erase the cell under a pixel coordinate.
    pub fn set_wall_at(&mut self, x: f64, y: f64, wall: bool) {
        self.grid.set_wall_at(x, y, wall);
    }

    /// Remove every wall.
    pub fn clear_walls(&mut self) {
        self.grid.clear();
    }

    /// Apply an operator command to one vehicle. `false` if `entity` is not
    /// a vehicle.
    pub fn command(&mut self, entity: Entity, command: VehicleCommand) -> bool {
        let (cx, cy) = self.config.center();
        let Ok(mut vehicle) = self.world.get::<&mut Vehicle>(entity) else {
            return false;
        };
        match command {
            VehicleCommand::Reset => vehicle.reset(),
            VehicleCommand::Center => vehicle.center(cx, cy),
            VehicleCommand::Faster => vehicle.faster(),
            VehicleCommand::Slower => vehicle.slower(),
            VehicleCommand::TogglePause => vehicle.toggle_pause(),
        }
        true
    }

    /// Apply a command to every vehicle.
    pub fn command_all(&mut self, command: VehicleCommand) {
        let entities: Vec<Entity> = self
            .world
            .query::<&Vehicle>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        for entity in entities {
            self.command(entity, command);
        }
    }

    /// Read-only copy of every vehicle, in spawn order.
    pub fn snapshots(&self) -> Vec<VehicleSnapshot> {
        let mut out: Vec<VehicleSnapshot> = self
            .world
            .query::<(&Vehicle, Option<&VehicleName>, Option<&Telemetry>)>()
            .iter()
            .map(|(entity, (vehicle, name, telemetry))| VehicleSnapshot {
                entity,
                name: name.map(|n| n.0.clone()).unwrap_or_default(),
                pose: vehicle.pose,
                steering: vehicle.steering,
                speed: vehicle.speed,
                paused: vehicle.is_paused(),
                telemetry: telemetry.copied().unwrap_or_default(),
                trail: vehicle.trail().iter().copied().collect(),
            })
            .collect();
        out.sort_by_key(|s| s.entity.id());
        out
    }

    /// Save simulation state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_simulation(
            writer,
            &self.world,
            self.sim_time,
            self.time_scale,
            self.mode,
            &self.config,
            &self.grid,
        )?;
        log::info!("saved {} vehicles at t={:.2}s", self.vehicle_count(), self.sim_time);
        Ok(())
    }

    /// Load simulation state from a reader. The controller is kept; world,
    /// grid, config and clock come from the save.
    pub fn load<R: std::io::Read>(
        &mut self,
        reader: R,
    ) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_simulation(reader)?;

        self.world = loaded.world;
        self.sim_time = loaded.sim_time;
        self.time_scale = loaded.time_scale;
        self.mode = loaded.mode;
        self.config = loaded.config;
        self.grid = loaded.grid;
        self.last_stats = TickStats::default();

        log::info!("loaded {} vehicles at t={:.2}s", self.vehicle_count(), self.sim_time);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzagv_logic::grid::Occupancy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> SimulationEngine {
        SimulationEngine::with_agv(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine();
        assert_eq!(engine.vehicle_count(), 0);
        assert_eq!(engine.sim_time(), 0.0);
        assert!(engine.grid().wall_count() > 0);
    }

    #[test]
    fn test_engine_update() {
        let mut engine = engine();
        let start = engine.config().start_pose();
        let e = engine.spawn_vehicle("agv", start);

        for _ in 0..60 {
            engine.update(1.0 / 60.0);
        }

        assert!((engine.sim_time() - 1.0).abs() < 1e-9);
        let snap = &engine.snapshots()[0];
        assert_eq!(snap.entity, e);
        assert_eq!(snap.telemetry.ticks, 60);
        assert_ne!(snap.pose, start);
        assert!(!engine.grid().is_blocked(snap.pose.x, snap.pose.y));
    }

    #[test]
    fn test_time_scale() {
        let mut engine = engine();
        engine.set_time_scale(2.0);
        engine.update(1.0);
        assert!((engine.sim_time() - 2.0).abs() < 1e-12);

        engine.set_time_scale(-3.0);
        assert_eq!(engine.time_scale(), 0.0);
        engine.set_time_scale(f64::NAN);
        assert_eq!(engine.time_scale(), 1.0);
    }

    #[test]
    fn paused_engine_freezes_everything() {
        let mut engine = engine();
        engine.spawn_vehicle("agv", engine.config().start_pose());
        engine.update(1.0 / 60.0);
        engine.toggle_pause();
        let before = engine.snapshots()[0].clone();
        assert!(before.telemetry.readings.front > 100.0);

        // paint a wall column 40 px ahead while paused
        let (x, y) = (before.pose.x + 40.0, before.pose.y);
        for dy in -5..=5 {
            engine.set_wall_at(x, y + dy as f64 * 10.0, true);
        }
        engine.update(0.5);
        assert_eq!(engine.sim_time(), 1.0 / 60.0);
        assert_eq!(engine.last_stats().vehicles, 0);
        let after = &engine.snapshots()[0];
        assert_eq!(after.pose, before.pose);
        assert_eq!(after.steering, before.steering);
        assert_eq!(after.telemetry.ticks, before.telemetry.ticks);
        assert!(after.telemetry.readings.front < 45.0, "{:?}", after.telemetry.readings);

        engine.toggle_pause();
        engine.update(0.5);
        assert_eq!(engine.last_stats().vehicles, 1);
    }

    #[test]
    fn paused_vehicle_keeps_sensing() {
        let mut engine = engine();
        let e = engine.spawn_vehicle("agv", engine.config().start_pose());
        assert!(engine.command(e, VehicleCommand::TogglePause));
        engine.update(1.0 / 60.0);
        let snap = &engine.snapshots()[0];
        assert!(snap.paused);
        assert_eq!(snap.pose, engine.config().start_pose());
        assert_eq!(snap.telemetry.ticks, 1);
        assert!(snap.telemetry.readings.front > 0.0);
    }

    #[test]
    fn commands_reach_the_vehicle() {
        let mut engine = engine();
        let e = engine.spawn_vehicle("agv", engine.config().start_pose());
        engine.command(e, VehicleCommand::Faster);
        assert_eq!(engine.snapshots()[0].speed, 100.0);
        engine.command(e, VehicleCommand::Center);
        let p = engine.snapshots()[0].pose;
        assert_eq!((p.x, p.y, p.heading), (620.0, 500.0, 0.0));
        engine.command(e, VehicleCommand::Reset);
        assert_eq!(engine.snapshots()[0].pose, engine.config().start_pose());

        assert!(engine.despawn_vehicle(e));
        assert!(!engine.command(e, VehicleCommand::Slower));
    }

    #[test]
    fn load_track_rebuilds_grid_and_resets_vehicles() {
        let mut engine = engine();
        let start = engine.config().start_pose();
        engine.spawn_vehicle("agv", start);
        for _ in 0..30 {
            engine.update(1.0 / 60.0);
        }
        engine.load_track(TrackPreset::FigureEight);
        assert_eq!(engine.config().track, TrackPreset::FigureEight);
        assert_eq!(
            engine.grid(),
            &TrackPreset::FigureEight.build(124, 100, 10.0)
        );
        let snap = &engine.snapshots()[0];
        assert_eq!(snap.pose, start);
        assert!(snap.trail.is_empty());
    }

    #[test]
    fn live_edits_are_seen_by_the_next_tick() {
        let mut engine = engine();
        engine.clear_walls();
        let e = engine.spawn_vehicle("agv", Pose::new(300.0, 305.0, 0.0));
        engine.update(1.0 / 60.0);
        assert_eq!(engine.snapshots()[0].telemetry.readings.front, 120.0);

        // wall column 50 px ahead
        for row in 0..100 {
            engine.set_wall_at(355.0, row as f64 * 10.0 + 5.0, true);
        }
        engine.update(1.0 / 60.0);
        let front = engine.snapshots()[0].telemetry.readings.front;
        assert!(front < 60.0, "front {front}");

        engine.set_wall_at(355.0, 305.0, false);
        assert!(!engine.grid().is_wall(35, 30));
        assert!(engine.command(e, VehicleCommand::Reset));
    }

    #[test]
    fn random_spawns_are_on_free_floor() {
        let mut engine = engine();
        let mut rng = StdRng::seed_from_u64(42);
        for i in 0..8 {
            assert!(engine.spawn_random(&format!("agv-{i}"), &mut rng).is_some());
        }
        assert_eq!(engine.vehicle_count(), 8);
        for _ in 0..120 {
            engine.update(1.0 / 60.0);
        }
        for snap in engine.snapshots() {
            assert!(snap.pose.is_finite());
            assert!(!engine.grid().is_blocked(snap.pose.x, snap.pose.y), "{}", snap.name);
        }
    }
}
