//! Rule antecedent expressions.
//!
//! An antecedent is a tree of `Term(variable, label)` leaves combined with
//! Zadeh operators: AND = min, OR = max, NOT = 1 - x. Trees are written with
//! the usual operators:
//!
//! ```
//! use fuzzagv_logic::antecedent::term;
//!
//! // right is Near and left is not Near
//! let when = term("RightDistance", "Near") & !term("LeftDistance", "Near");
//! assert_eq!(when.variables(), vec!["RightDistance", "LeftDistance"]);
//! ```
//!
//! Names are resolved to indices once, when the inference system is built
//! (see [`CompiledAntecedent`]); evaluation never looks up strings.

use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::variable::FuzzyVariable;

/// Condition over fuzzified inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Antecedent {
    Term { variable: String, label: String },
    And(Box<Antecedent>, Box<Antecedent>),
    Or(Box<Antecedent>, Box<Antecedent>),
    Not(Box<Antecedent>),
}

/// Leaf: "`variable` is `label`".
pub fn term(variable: impl Into<String>, label: impl Into<String>) -> Antecedent {
    Antecedent::Term {
        variable: variable.into(),
        label: label.into(),
    }
}

impl Antecedent {
    pub fn and(self, other: Antecedent) -> Antecedent {
        Antecedent::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Antecedent) -> Antecedent {
        Antecedent::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Antecedent {
        Antecedent::Not(Box::new(self))
    }

    /// Variables referenced, in first-appearance order, without repeats.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Antecedent::Term { variable, .. } => {
                if !out.contains(&variable.as_str()) {
                    out.push(variable);
                }
            }
            Antecedent::And(l, r) | Antecedent::Or(l, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
            Antecedent::Not(e) => e.collect_variables(out),
        }
    }

    /// Resolve names against the input variables of a system.
    pub(crate) fn compile(
        &self,
        rule: usize,
        inputs: &[FuzzyVariable],
    ) -> Result<CompiledAntecedent, ConfigError> {
        Ok(match self {
            Antecedent::Term { variable, label } => {
                let var = inputs
                    .iter()
                    .position(|v| v.name() == variable)
                    .ok_or_else(|| ConfigError::UnknownVariable {
                        rule,
                        variable: variable.clone(),
                    })?;
                let term = inputs[var]
                    .term_index(label)
                    .ok_or_else(|| ConfigError::UnknownLabel {
                        rule,
                        variable: variable.clone(),
                        label: label.clone(),
                    })?;
                CompiledAntecedent::Term { var, term }
            }
            Antecedent::And(l, r) => CompiledAntecedent::And(
                Box::new(l.compile(rule, inputs)?),
                Box::new(r.compile(rule, inputs)?),
            ),
            Antecedent::Or(l, r) => CompiledAntecedent::Or(
                Box::new(l.compile(rule, inputs)?),
                Box::new(r.compile(rule, inputs)?),
            ),
            Antecedent::Not(e) => CompiledAntecedent::Not(Box::new(e.compile(rule, inputs)?)),
        })
    }
}

impl BitAnd for Antecedent {
    type Output = Antecedent;

    fn bitand(self, rhs: Antecedent) -> Antecedent {
        self.and(rhs)
    }
}

impl BitOr for Antecedent {
    type Output = Antecedent;

    fn bitor(self, rhs: Antecedent) -> Antecedent {
        self.or(rhs)
    }
}

impl Not for Antecedent {
    type Output = Antecedent;

    fn not(self) -> Antecedent {
        self.negate()
    }
}

/// Antecedent with names resolved to (input index, term index).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompiledAntecedent {
    Term { var: usize, term: usize },
    And(Box<CompiledAntecedent>, Box<CompiledAntecedent>),
    Or(Box<CompiledAntecedent>, Box<CompiledAntecedent>),
    Not(Box<CompiledAntecedent>),
}

impl CompiledAntecedent {
    /// Firing strength given per-input, per-term membership degrees.
    pub(crate) fn strength(&self, degrees: &[Vec<f64>]) -> f64 {
        match self {
            CompiledAntecedent::Term { var, term } => degrees[*var][*term],
            CompiledAntecedent::And(l, r) => l.strength(degrees).min(r.strength(degrees)),
            CompiledAntecedent::Or(l, r) => l.strength(degrees).max(r.strength(degrees)),
            CompiledAntecedent::Not(e) => 1.0 - e.strength(degrees),
        }
    }
}
