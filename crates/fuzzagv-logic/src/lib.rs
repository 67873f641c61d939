//! Pure fuzzy inference and vehicle control logic for FuzzAGV.
//!
//! This crate contains the fuzzy inference core and the sensing and control
//! loop of the autonomous vehicle, independent of any engine, window or
//! runtime. Functions take plain data and return results, so everything here
//! is unit-testable and can be driven headless, from the ECS engine in
//! `fuzzagv-core`, or from a renderer.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`agv`] | The 12-rule obstacle-avoiding steering controller |
//! | [`antecedent`] | Rule conditions: AND (min), OR (max), NOT (1 − x) expressions |
//! | [`combat`] | Flee/Defend/Attack stance controller for an enemy AI |
//! | [`defuzz`] | Centroid, bisector and mean-of-maximum defuzzification |
//! | [`error`] | Configuration and inference errors |
//! | [`grid`] | Occupancy grid queried from pixel coordinates |
//! | [`inference`] | Mamdani rule engine: fire, clip, aggregate, defuzzify |
//! | [`membership`] | Trapezoid/triangle membership functions |
//! | [`sensors`] | Ray-cast distance sensors |
//! | [`table`] | Serde description of a complete inference system |
//! | [`tipping`] | Tip suggestion from food and service quality |
//! | [`tracks`] | Preset track layouts |
//! | [`universe`] | Discretized variable domains |
//! | [`variable`] | Linguistic variables and their labelled terms |
//! | [`vehicle`] | Pose, steering law and the per-tick control loop |

pub mod agv;
pub mod antecedent;
pub mod combat;
pub mod defuzz;
pub mod error;
pub mod grid;
pub mod inference;
pub mod membership;
pub mod sensors;
pub mod table;
pub mod tipping;
pub mod tracks;
pub mod universe;
pub mod variable;
pub mod vehicle;
