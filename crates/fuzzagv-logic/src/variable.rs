//! Linguistic variables: a universe plus labeled membership shapes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::membership::MembershipFunction;
use crate::universe::Universe;

/// Whether a variable is fuzzified from a crisp input or used as the
/// aggregation target of a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Antecedent,
    Consequent,
}

/// A labeled membership shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub label: String,
    pub shape: MembershipFunction,
}

/// A named input or output axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyVariable {
    name: String,
    role: Role,
    universe: Universe,
    terms: Vec<Term>,
}

impl FuzzyVariable {
    /// Create a variable with no labels yet.
    pub fn new(
        name: impl Into<String>,
        role: Role,
        min: f64,
        max: f64,
        step: f64,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigError::InvalidUniverse {
                variable: name,
                min,
                max,
            });
        }
        let universe = Universe::new(min, max, step).ok_or_else(|| ConfigError::InvalidStep {
            variable: name.clone(),
            step,
        })?;
        Ok(Self {
            name,
            role,
            universe,
            terms: Vec::new(),
        })
    }

    pub fn antecedent(
        name: impl Into<String>,
        min: f64,
        max: f64,
        step: f64,
    ) -> Result<Self, ConfigError> {
        Self::new(name, Role::Antecedent, min, max, step)
    }

    pub fn consequent(
        name: impl Into<String>,
        min: f64,
        max: f64,
        step: f64,
    ) -> Result<Self, ConfigError> {
        Self::new(name, Role::Consequent, min, max, step)
    }

    /// Register a label. Labels are unique per variable.
    pub fn add_term(
        &mut self,
        label: impl Into<String>,
        shape: MembershipFunction,
    ) -> Result<(), ConfigError> {
        let label = label.into();
        if self.term_index(&label).is_some() {
            return Err(ConfigError::DuplicateLabel {
                variable: self.name.clone(),
                label,
            });
        }
        if !shape.is_well_formed() {
            return Err(ConfigError::InvalidShape {
                variable: self.name.clone(),
                label,
            });
        }
        self.terms.push(Term { label, shape });
        Ok(())
    }

    /// Builder-style [`add_term`](Self::add_term).
    pub fn with_term(
        mut self,
        label: impl Into<String>,
        shape: MembershipFunction,
    ) -> Result<Self, ConfigError> {
        self.add_term(label, shape)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Registered labels in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.label.as_str())
    }

    pub fn term_index(&self, label: &str) -> Option<usize> {
        self.terms.iter().position(|t| t.label == label)
    }

    pub fn shape(&self, label: &str) -> Option<&MembershipFunction> {
        self.terms.iter().find(|t| t.label == label).map(|t| &t.shape)
    }

    /// Degree of `x` in the labeled set, or `None` for an unknown label.
    pub fn fuzzify(&self, label: &str, x: f64) -> Option<f64> {
        self.shape(label).map(|s| s.evaluate(x))
    }

    /// Degree of `x` in every label, in registration order.
    pub fn fuzzify_all(&self, x: f64) -> Vec<(&str, f64)> {
        self.terms
            .iter()
            .map(|t| (t.label.as_str(), t.shape.evaluate(x)))
            .collect()
    }

    /// Label with the highest degree for `x`. Ties go to the label
    /// registered first.
    pub fn dominant_label(&self, x: f64) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, degree) in self.fuzzify_all(x) {
            match best {
                Some((_, d)) if d >= degree => {}
                _ => best = Some((label, degree)),
            }
        }
        best
    }

    /// Each term's curve sampled over this variable's universe.
    pub(crate) fn sampled_curves(&self) -> Vec<Vec<f64>> {
        self.terms
            .iter()
            .map(|t| t.shape.sample(self.universe.points()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance() -> FuzzyVariable {
        FuzzyVariable::antecedent("FrontalDistance", 0.0, 120.0, 0.5)
            .and_then(|v| v.with_term("Near", MembershipFunction::trapezoid(0.0, 0.0, 45.0, 85.0)))
            .and_then(|v| {
                v.with_term("Medium", MembershipFunction::trapezoid(45.0, 85.0, 95.0, 115.0))
            })
            .and_then(|v| {
                v.with_term("Far", MembershipFunction::trapezoid(85.0, 115.0, 120.0, 120.0))
            })
            .unwrap()
    }

    #[test]
    fn fuzzify_delegates_to_label() {
        let v = distance();
        assert_eq!(v.fuzzify("Near", 10.0), Some(1.0));
        assert_eq!(v.fuzzify("Far", 10.0), Some(0.0));
        assert_eq!(v.fuzzify("Medium", 65.0), Some(0.5));
        assert_eq!(v.fuzzify("Sideways", 10.0), None);
    }

    #[test]
    fn labels_keep_registration_order() {
        let v = distance();
        let labels: Vec<_> = v.labels().collect();
        assert_eq!(labels, vec!["Near", "Medium", "Far"]);
        assert_eq!(v.role(), Role::Antecedent);
    }

    #[test]
    fn duplicate_label_is_config_error() {
        let mut v = distance();
        let err = v
            .add_term("Near", MembershipFunction::triangle(0.0, 1.0, 2.0))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateLabel {
                variable: "FrontalDistance".into(),
                label: "Near".into()
            }
        );
    }

    #[test]
    fn invalid_bounds_are_config_errors() {
        assert!(matches!(
            FuzzyVariable::antecedent("x", 10.0, 10.0, 1.0),
            Err(ConfigError::InvalidUniverse { .. })
        ));
        assert!(matches!(
            FuzzyVariable::antecedent("x", 10.0, 0.0, 1.0),
            Err(ConfigError::InvalidUniverse { .. })
        ));
        assert!(matches!(
            FuzzyVariable::antecedent("x", 0.0, 10.0, 0.0),
            Err(ConfigError::InvalidStep { .. })
        ));
        assert!(matches!(
            FuzzyVariable::antecedent("x", 0.0, 120.0, 1e-9),
            Err(ConfigError::InvalidStep { .. })
        ));
    }

    #[test]
    fn malformed_shape_rejected() {
        let mut v = FuzzyVariable::consequent("Angle", -50.0, 50.0, 0.5).unwrap();
        let err = v
            .add_term("Bent", MembershipFunction::trapezoid(0.0, 10.0, 5.0, 20.0))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidShape { .. }));
    }

    #[test]
    fn dominant_label_picks_strongest() {
        let v = distance();
        assert_eq!(v.dominant_label(10.0), Some(("Near", 1.0)));
        assert_eq!(v.dominant_label(118.0), Some(("Far", 1.0)));
        // 65: Near = 0.5, Medium = 0.5 -> first registered wins
        assert_eq!(v.dominant_label(65.0).map(|(l, _)| l), Some("Near"));
    }
}
