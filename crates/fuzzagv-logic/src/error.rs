//! Configuration and inference errors.

use std::fmt;

use crate::defuzz::DefuzzError;

/// Invalid controller configuration. Fatal at startup: an inference system
/// is never built from a table that produces one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Universe bounds with `min >= max` (or non-finite).
    InvalidUniverse { variable: String, min: f64, max: f64 },
    /// Universe step that is not strictly positive and finite.
    InvalidStep { variable: String, step: f64 },
    /// Membership shape not ordered `a ≤ b ≤ c ≤ d`, or non-finite.
    InvalidShape { variable: String, label: String },
    DuplicateLabel { variable: String, label: String },
    DuplicateVariable { name: String },
    /// Rule antecedent names a variable that is not an input.
    UnknownVariable { rule: usize, variable: String },
    /// Rule antecedent names a label the input variable does not have.
    UnknownLabel {
        rule: usize,
        variable: String,
        label: String,
    },
    /// Rule consequent names a label the output variable does not have.
    UnknownConsequentLabel { rule: usize, label: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUniverse { variable, min, max } => write!(
                f,
                "variable '{}': invalid universe bounds [{}, {}] (min must be < max)",
                variable, min, max
            ),
            ConfigError::InvalidStep { variable, step } => {
                write!(f, "variable '{}': invalid universe step {}", variable, step)
            }
            ConfigError::InvalidShape { variable, label } => write!(
                f,
                "variable '{}': label '{}' has a shape not ordered a <= b <= c <= d",
                variable, label
            ),
            ConfigError::DuplicateLabel { variable, label } => {
                write!(f, "variable '{}': label '{}' registered twice", variable, label)
            }
            ConfigError::DuplicateVariable { name } => {
                write!(f, "variable '{}' declared twice", name)
            }
            ConfigError::UnknownVariable { rule, variable } => {
                write!(f, "rule #{}: unknown input variable '{}'", rule, variable)
            }
            ConfigError::UnknownLabel {
                rule,
                variable,
                label,
            } => write!(
                f,
                "rule #{}: variable '{}' has no label '{}'",
                rule, variable, label
            ),
            ConfigError::UnknownConsequentLabel { rule, label } => write!(
                f,
                "rule #{}: consequent label '{}' does not exist on the output variable",
                rule, label
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Bad crisp input vector handed to an inference system.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    MissingInput { variable: String },
    UnknownInput { name: String },
    InputCount { expected: usize, found: usize },
    NonFiniteInput { variable: String },
    /// Defuzzification failed for a reason other than no rule firing.
    Defuzz(DefuzzError),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::MissingInput { variable } => {
                write!(f, "no crisp value supplied for input '{}'", variable)
            }
            InferenceError::UnknownInput { name } => {
                write!(f, "'{}' is not an input variable of this system", name)
            }
            InferenceError::InputCount { expected, found } => {
                write!(f, "expected {} crisp inputs, got {}", expected, found)
            }
            InferenceError::NonFiniteInput { variable } => {
                write!(f, "crisp input for '{}' is not finite", variable)
            }
            InferenceError::Defuzz(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InferenceError {}

impl From<DefuzzError> for InferenceError {
    fn from(e: DefuzzError) -> Self {
        InferenceError::Defuzz(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = ConfigError::DuplicateLabel {
            variable: "FrontalDistance".into(),
            label: "Near".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("FrontalDistance") && msg.contains("Near"), "{msg}");

        let e = ConfigError::UnknownConsequentLabel {
            rule: 4,
            label: "Sideways".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("#4") && msg.contains("Sideways"), "{msg}");
    }
}
