//! The obstacle-avoiding AGV controller.
//!
//! Three distance inputs (front, left, right) over `0..=120` px and one
//! steering output `Angle` over `-50..=50` degrees, positive turning right.
//! Twelve rules, evaluated in the order listed in [`agv_controller_table`].

use crate::antecedent::{term, Antecedent};
use crate::error::ConfigError;
use crate::inference::InferenceSystem;
use crate::table::{RuleTable, SystemTable, VariableTable};

pub const FRONT: &str = "FrontalDistance";
pub const LEFT: &str = "LeftDistance";
pub const RIGHT: &str = "RightDistance";
pub const ANGLE: &str = "Angle";

/// Upper bound of the distance universes, pixels.
pub const DISTANCE_MAX: f64 = 120.0;

fn distance(name: &str) -> VariableTable {
    VariableTable::new(name, 0.0, DISTANCE_MAX, 0.5)
        .term("Near", [0.0, 0.0, 45.0, 85.0])
        .term("Medium", [45.0, 85.0, 95.0, 115.0])
        .term("Far", [85.0, 115.0, DISTANCE_MAX, DISTANCE_MAX])
}

fn front(label: &str) -> Antecedent {
    term(FRONT, label)
}

fn left(label: &str) -> Antecedent {
    term(LEFT, label)
}

fn right(label: &str) -> Antecedent {
    term(RIGHT, label)
}

/// Variables, shapes and rules of the AGV controller as plain data.
pub fn agv_controller_table() -> SystemTable {
    let output = VariableTable::new(ANGLE, -50.0, 50.0, 0.5)
        .term("VeryNegative", [-50.0, -50.0, -40.0, -35.0])
        .term("Negative", [-40.0, -35.0, -25.0, -20.0])
        .term("LittleNegative", [-25.0, -20.0, -10.0, -5.0])
        .triangle("Zero", -10.0, 0.0, 10.0)
        .term("LittlePositive", [5.0, 10.0, 20.0, 25.0])
        .term("Positive", [20.0, 25.0, 35.0, 40.0])
        .term("VeryPositive", [35.0, 40.0, 50.0, 50.0]);

    let rules = vec![
        // open road
        RuleTable::new(front("Far"), "Zero"),
        RuleTable::new(front("Far") & right("Far") & left("Far"), "Zero"),
        // hug neither wall
        RuleTable::new(right("Near") & !left("Near"), "LittleNegative"),
        RuleTable::new(!right("Near") & left("Near"), "LittlePositive"),
        // blocked ahead, turn toward the open side
        RuleTable::new(right("Far") & front("Near"), "Positive"),
        RuleTable::new(left("Far") & front("Near"), "Negative"),
        RuleTable::new(right("Far") & left("Far") & front("Near"), "Positive"),
        // approaching with a wall alongside
        RuleTable::new(front("Medium") & right("Near"), "LittleNegative"),
        RuleTable::new(front("Medium") & left("Near"), "LittlePositive"),
        // corners
        RuleTable::new(front("Near") & right("Near") & !left("Near"), "Negative"),
        RuleTable::new(front("Near") & left("Near") & !right("Near"), "Positive"),
        // dead end
        RuleTable::new(front("Near") & right("Near") & left("Near"), "VeryPositive"),
    ];

    SystemTable {
        inputs: vec![distance(FRONT), distance(LEFT), distance(RIGHT)],
        output,
        rules,
    }
}

/// Compiled AGV controller.
pub fn agv_controller() -> Result<InferenceSystem, ConfigError> {
    agv_controller_table().build()
}
