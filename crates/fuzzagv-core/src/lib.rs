//! FuzzAGV Core - Multi-Vehicle Simulation Engine
//!
//! A tick-driven simulation of autonomous ground vehicles steering through a
//! walled grid with a fuzzy controller.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Vehicles
//! - **Components**: Pure data attached to entities (Vehicle, VehicleName, Telemetry)
//! - **Systems**: Logic that queries and updates components
//!
//! The occupancy grid and the inference system live on the engine, outside
//! the world. Every vehicle reads the same grid and the same controller.
//!
//! # Example
//!
//! ```rust,no_run
//! use fuzzagv_core::prelude::*;
//!
//! let mut engine = SimulationEngine::with_agv(EngineConfig::default()).unwrap();
//! let start = engine.config().start_pose();
//! engine.spawn_vehicle("agv", start);
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod persistence;
pub mod placement;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::EngineConfig;
    pub use crate::engine::SimulationEngine;
    pub use fuzzagv_logic::tracks::TrackPreset;
}
