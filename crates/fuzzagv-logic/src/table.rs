//! Static configuration tables for inference systems.
//!
//! A controller is described as plain data: variables with universe bounds
//! and `label → [a, b, c, d]` shapes, plus `(antecedent, consequent)` rules,
//! and compiled once at startup with [`SystemTable::build`]. The tables are
//! serde types, so the same description can ship as JSON:
//!
//! ```json
//! { "when": { "and": [ { "term": { "variable": "RightDistance", "label": "Far" } },
//!                      { "term": { "variable": "FrontalDistance", "label": "Near" } } ] },
//!   "then": "Positive" }
//! ```

use serde::{Deserialize, Serialize};

use crate::antecedent::Antecedent;
use crate::error::ConfigError;
use crate::inference::{InferenceSystem, Rule};
use crate::membership::MembershipFunction;
use crate::variable::{FuzzyVariable, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermTable {
    pub label: String,
    /// Trapezoid breakpoints `[a, b, c, d]`; a triangle repeats its peak.
    pub shape: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub terms: Vec<TermTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub when: Antecedent,
    pub then: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Complete description of a single-output inference system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemTable {
    pub inputs: Vec<VariableTable>,
    pub output: VariableTable,
    pub rules: Vec<RuleTable>,
}

impl VariableTable {
    pub fn new(name: &str, min: f64, max: f64, step: f64) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            step,
            terms: Vec::new(),
        }
    }

    pub fn term(mut self, label: &str, shape: [f64; 4]) -> Self {
        self.terms.push(TermTable {
            label: label.to_string(),
            shape,
        });
        self
    }

    /// Triangle `(left, peak, right)` stored as the trapezoid `[left, peak, peak, right]`.
    pub fn triangle(self, label: &str, left: f64, peak: f64, right: f64) -> Self {
        self.term(label, [left, peak, peak, right])
    }

    fn build(&self, role: Role) -> Result<FuzzyVariable, ConfigError> {
        let mut var = FuzzyVariable::new(self.name.clone(), role, self.min, self.max, self.step)?;
        for t in &self.terms {
            var.add_term(t.label.clone(), MembershipFunction::from_breakpoints(t.shape))?;
        }
        Ok(var)
    }
}

impl RuleTable {
    pub fn new(when: Antecedent, then: &str) -> Self {
        Self {
            when,
            then: then.to_string(),
            weight: 1.0,
        }
    }
}

impl SystemTable {
    /// Validate every variable and rule and compile the system.
    pub fn build(&self) -> Result<InferenceSystem, ConfigError> {
        let inputs = self
            .inputs
            .iter()
            .map(|v| v.build(Role::Antecedent))
            .collect::<Result<Vec<_>, _>>()?;
        let output = self.output.build(Role::Consequent)?;
        let rules = self
            .rules
            .iter()
            .map(|r| Rule::new(r.when.clone(), r.then.clone()).with_weight(r.weight))
            .collect();
        let system = InferenceSystem::new(inputs, output, rules)?;
        log::debug!(
            "built inference system: {} inputs, output '{}', {} rules",
            system.inputs().len(),
            system.output().name(),
            system.rules().len()
        );
        Ok(system)
    }
}
