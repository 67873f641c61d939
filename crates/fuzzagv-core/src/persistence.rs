//! Save/Load functionality for persisting simulation state
//!
//! Uses bincode for compact binary serialization. Vehicles are serialized
//! component by component and respawned on load; entity ids are not kept.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use fuzzagv_logic::grid::WallGrid;
use fuzzagv_logic::vehicle::DriveMode;

use crate::components::{Telemetry, Vehicle, VehicleName};
use crate::config::EngineConfig;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in seconds
    pub sim_time: f64,
    pub time_scale: f64,
    /// Engine-wide run/pause state
    pub mode: DriveMode,
    pub config: EngineConfig,
    /// Occupancy grid including any live edits
    pub grid: WallGrid,
    pub vehicles: Vec<SerializableVehicle>,
}

/// All components of one vehicle entity
#[derive(Serialize, Deserialize)]
pub struct SerializableVehicle {
    pub name: Option<VehicleName>,
    pub vehicle: Vehicle,
    pub telemetry: Option<Telemetry>,
}

fn serialize_vehicles(world: &World) -> Vec<SerializableVehicle> {
    let mut vehicles: Vec<(u32, SerializableVehicle)> = world
        .query::<(&Vehicle, Option<&VehicleName>, Option<&Telemetry>)>()
        .iter()
        .map(|(entity, (vehicle, name, telemetry))| {
            (
                entity.id(),
                SerializableVehicle {
                    name: name.cloned(),
                    vehicle: vehicle.clone(),
                    telemetry: telemetry.copied(),
                },
            )
        })
        .collect();
    // spawn order
    vehicles.sort_by_key(|(id, _)| *id);
    vehicles.into_iter().map(|(_, v)| v).collect()
}

fn deserialize_vehicles(world: &mut World, vehicles: Vec<SerializableVehicle>) {
    for sv in vehicles {
        let entity = world.spawn((sv.vehicle,));
        if let Some(name) = sv.name {
            let _ = world.insert_one(entity, name);
        }
        if let Some(telemetry) = sv.telemetry {
            let _ = world.insert_one(entity, telemetry);
        }
    }
}

/// Save the complete simulation to a writer
pub fn save_simulation<W: Write>(
    writer: W,
    world: &World,
    sim_time: f64,
    time_scale: f64,
    mode: DriveMode,
    config: &EngineConfig,
    grid: &WallGrid,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time,
        time_scale,
        mode,
        config: config.clone(),
        grid: grid.clone(),
        vehicles: serialize_vehicles(world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a simulation from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    deserialize_vehicles(&mut world, save_data.vehicles);

    Ok(LoadedSimulation {
        world,
        sim_time: save_data.sim_time,
        time_scale: save_data.time_scale,
        mode: save_data.mode,
        config: save_data.config,
        grid: save_data.grid,
    })
}

/// Result of loading a simulation
pub struct LoadedSimulation {
    pub world: World,
    pub sim_time: f64,
    pub time_scale: f64,
    pub mode: DriveMode,
    pub config: EngineConfig,
    pub grid: WallGrid,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
