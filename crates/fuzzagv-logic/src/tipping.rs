//! Restaurant tip suggestion from food and service quality.

use crate::antecedent::term;
use crate::error::ConfigError;
use crate::inference::InferenceSystem;
use crate::table::{RuleTable, SystemTable, VariableTable};

pub const FOOD: &str = "Food";
pub const SERVICE: &str = "Service";
pub const TIP: &str = "Tip";

pub fn tipping_table() -> SystemTable {
    SystemTable {
        inputs: vec![
            VariableTable::new(FOOD, 0.0, 10.0, 1.0)
                .term("Rancid", [0.0, 0.0, 2.0, 4.0])
                .term("Fine", [3.0, 5.0, 6.0, 7.0])
                .term("Delicious", [6.0, 8.0, 10.0, 10.0]),
            VariableTable::new(SERVICE, 0.0, 10.0, 1.0)
                .term("Poor", [0.0, 0.0, 2.0, 5.0])
                .term("Good", [4.0, 5.0, 6.0, 7.0])
                .term("Excellent", [6.0, 8.0, 10.0, 10.0]),
        ],
        output: VariableTable::new(TIP, 0.0, 30.0, 1.0)
            .term("Low", [0.0, 0.0, 5.0, 10.0])
            .term("Medium", [8.0, 12.0, 18.0, 22.0])
            .term("High", [18.0, 25.0, 30.0, 30.0]),
        rules: vec![
            RuleTable::new(term(SERVICE, "Poor") | term(FOOD, "Rancid"), "Low"),
            RuleTable::new(term(SERVICE, "Good") | term(FOOD, "Fine"), "Medium"),
            RuleTable::new(term(SERVICE, "Excellent") | term(FOOD, "Delicious"), "High"),
        ],
    }
}

pub fn tipping_controller() -> Result<InferenceSystem, ConfigError> {
    tipping_table().build()
}

/// Suggested tip in percent, `None` if no rule fires for the inputs.
pub fn suggest_tip(system: &InferenceSystem, food: f64, service: f64) -> Option<f64> {
    let profile = system.infer_named(&[(FOOD, food), (SERVICE, service)]).ok()?;
    system.defuzzify(&profile).ok()
}
