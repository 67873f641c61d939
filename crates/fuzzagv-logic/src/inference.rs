//! Mamdani rule engine.
//!
//! Algorithm per call:
//! 1. Clamp each crisp input into its variable's universe and fuzzify it
//!    against every label of that variable.
//! 2. Evaluate each rule's antecedent → firing strength `s_i ∈ [0, 1]`
//!    (scaled by the rule weight).
//! 3. Clip the consequent label's curve at `s_i` (pointwise min) over the
//!    output universe. This is the rule's contribution.
//! 4. Aggregate all contributions pointwise by max.
//!
//! An all-zero aggregate is not special-cased here; defuzzification reports
//! it as [`DefuzzError::Undefined`] and the caller picks the fallback.
//!
//! The system is built once and never mutated afterwards. Every call works on
//! fresh buffers, so one `InferenceSystem` can be shared by any number of
//! vehicles (or threads) at once.

use serde::{Deserialize, Serialize};

use crate::antecedent::{Antecedent, CompiledAntecedent};
use crate::defuzz::{defuzzify_with, DefuzzError, DefuzzMethod};
use crate::error::{ConfigError, InferenceError};
use crate::universe::Universe;
use crate::variable::FuzzyVariable;

/// `IF antecedent THEN output IS consequent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub antecedent: Antecedent,
    pub consequent: String,
    pub weight: f64,
}

impl Rule {
    pub fn new(antecedent: Antecedent, consequent: impl Into<String>) -> Self {
        Self {
            antecedent,
            consequent: consequent.into(),
            weight: 1.0,
        }
    }

    /// Scale the firing strength. Clamped to `[0, 1]`.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = if weight.is_finite() {
            weight.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    antecedent: CompiledAntecedent,
    consequent: usize,
    weight: f64,
}

/// Output membership profile after aggregation, one degree per point of the
/// output universe.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedProfile {
    degrees: Vec<f64>,
}

impl AggregatedProfile {
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    pub fn peak(&self) -> f64 {
        self.degrees.iter().copied().fold(0.0, f64::max)
    }

    /// True when no rule contributed anything.
    pub fn is_zero(&self) -> bool {
        self.degrees.iter().all(|&d| d == 0.0)
    }
}

/// Crisp result of a full inference pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrispOutput {
    pub value: f64,
    /// Set when defuzzification was undefined and the fallback was returned.
    pub fallback_used: bool,
}

impl CrispOutput {
    /// Substitute `fallback` when no rule fired. Any other defuzzification
    /// failure is an error.
    pub fn or_fallback(
        defuzzified: Result<f64, DefuzzError>,
        fallback: f64,
    ) -> Result<Self, InferenceError> {
        match defuzzified {
            Ok(value) => Ok(CrispOutput {
                value,
                fallback_used: false,
            }),
            Err(DefuzzError::Undefined) => Ok(CrispOutput {
                value: fallback,
                fallback_used: true,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Immutable rule set over zero or more inputs and one output variable.
#[derive(Debug, Clone)]
pub struct InferenceSystem {
    inputs: Vec<FuzzyVariable>,
    output: FuzzyVariable,
    rules: Vec<Rule>,
    compiled: Vec<CompiledRule>,
    /// Output term curves sampled over the output universe, by term index.
    output_curves: Vec<Vec<f64>>,
    method: DefuzzMethod,
}

impl InferenceSystem {
    /// Validate names and compile the rules. Fails on duplicate input names
    /// and on any rule that references a variable or label that does not
    /// exist.
    pub fn new(
        inputs: Vec<FuzzyVariable>,
        output: FuzzyVariable,
        rules: Vec<Rule>,
    ) -> Result<Self, ConfigError> {
        for (i, v) in inputs.iter().enumerate() {
            let clash =
                inputs[..i].iter().any(|p| p.name() == v.name()) || v.name() == output.name();
            if clash {
                return Err(ConfigError::DuplicateVariable {
                    name: v.name().to_string(),
                });
            }
        }

        let mut compiled = Vec::with_capacity(rules.len());
        for (idx, rule) in rules.iter().enumerate() {
            let antecedent = rule.antecedent.compile(idx, &inputs)?;
            let consequent = output.term_index(&rule.consequent).ok_or_else(|| {
                ConfigError::UnknownConsequentLabel {
                    rule: idx,
                    label: rule.consequent.clone(),
                }
            })?;
            compiled.push(CompiledRule {
                antecedent,
                consequent,
                weight: rule.weight,
            });
        }

        let output_curves = output.sampled_curves();
        Ok(Self {
            inputs,
            output,
            rules,
            compiled,
            output_curves,
            method: DefuzzMethod::Centroid,
        })
    }

    /// Use a different defuzzification method (centroid by default).
    pub fn with_method(mut self, method: DefuzzMethod) -> Self {
        self.method = method;
        self
    }

    pub fn inputs(&self) -> &[FuzzyVariable] {
        &self.inputs
    }

    pub fn output(&self) -> &FuzzyVariable {
        &self.output
    }

    pub fn output_universe(&self) -> &Universe {
        self.output.universe()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn method(&self) -> DefuzzMethod {
        self.method
    }

    /// Order crisp inputs given by name to match the input declaration order.
    pub fn order_inputs(&self, named: &[(&str, f64)]) -> Result<Vec<f64>, InferenceError> {
        if let Some((name, _)) = named
            .iter()
            .find(|(n, _)| !self.inputs.iter().any(|v| v.name() == *n))
        {
            return Err(InferenceError::UnknownInput {
                name: name.to_string(),
            });
        }
        self.inputs
            .iter()
            .map(|v| {
                named
                    .iter()
                    .find(|(n, _)| *n == v.name())
                    .map(|&(_, x)| x)
                    .ok_or_else(|| InferenceError::MissingInput {
                        variable: v.name().to_string(),
                    })
            })
            .collect()
    }

    /// Firing strength of every rule, in rule order. `crisp` follows input
    /// declaration order.
    pub fn firing_strengths(&self, crisp: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let degrees = self.fuzzify(crisp)?;
        Ok(self
            .compiled
            .iter()
            .map(|r| (r.antecedent.strength(&degrees) * r.weight).clamp(0.0, 1.0))
            .collect())
    }

    /// Strongest firing per output label (max over the rules concluding it),
    /// in output label order.
    pub fn label_strengths(&self, crisp: &[f64]) -> Result<Vec<(&str, f64)>, InferenceError> {
        let strengths = self.firing_strengths(crisp)?;
        let mut per_label = vec![0.0_f64; self.output.terms().len()];
        for (rule, s) in self.compiled.iter().zip(&strengths) {
            per_label[rule.consequent] = per_label[rule.consequent].max(*s);
        }
        Ok(self.output.labels().zip(per_label).collect())
    }

    /// Clip-and-max aggregation of the given per-rule strengths.
    ///
    /// Exposed separately from [`infer`](Self::infer) so the aggregation can
    /// be driven directly; it is monotonic in every strength.
    pub fn aggregate(&self, strengths: &[f64]) -> AggregatedProfile {
        let mut degrees = vec![0.0_f64; self.output.universe().len()];
        for (rule, &s) in self.compiled.iter().zip(strengths) {
            if s <= 0.0 {
                continue;
            }
            let curve = &self.output_curves[rule.consequent];
            for (agg, &mu) in degrees.iter_mut().zip(curve) {
                *agg = agg.max(mu.min(s));
            }
        }
        AggregatedProfile { degrees }
    }

    /// Aggregated output profile for crisp inputs in declaration order.
    pub fn infer(&self, crisp: &[f64]) -> Result<AggregatedProfile, InferenceError> {
        let strengths = self.firing_strengths(crisp)?;
        Ok(self.aggregate(&strengths))
    }

    /// Same as [`infer`](Self::infer), inputs given by variable name.
    pub fn infer_named(&self, named: &[(&str, f64)]) -> Result<AggregatedProfile, InferenceError> {
        let crisp = self.order_inputs(named)?;
        self.infer(&crisp)
    }

    /// Defuzzify a profile over this system's output universe.
    pub fn defuzzify(&self, profile: &AggregatedProfile) -> Result<f64, DefuzzError> {
        defuzzify_with(self.method, profile.degrees(), self.output.universe())
    }

    /// Full pass: infer then defuzzify, substituting `fallback` when no rule
    /// fired.
    pub fn compute_or(&self, crisp: &[f64], fallback: f64) -> Result<CrispOutput, InferenceError> {
        let profile = self.infer(crisp)?;
        CrispOutput::or_fallback(self.defuzzify(&profile), fallback)
    }

    fn fuzzify(&self, crisp: &[f64]) -> Result<Vec<Vec<f64>>, InferenceError> {
        if crisp.len() != self.inputs.len() {
            return Err(InferenceError::InputCount {
                expected: self.inputs.len(),
                found: crisp.len(),
            });
        }
        self.inputs
            .iter()
            .zip(crisp)
            .map(|(var, &x)| {
                if !x.is_finite() {
                    return Err(InferenceError::NonFiniteInput {
                        variable: var.name().to_string(),
                    });
                }
                let x = var.universe().clamp(x);
                Ok(var.terms().iter().map(|t| t.shape.evaluate(x)).collect())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::antecedent::term;
    use crate::membership::MembershipFunction;

    fn tipping_like() -> InferenceSystem {
        let food = FuzzyVariable::antecedent("food", 0.0, 10.0, 1.0)
            .and_then(|v| v.with_term("bad", MembershipFunction::trapezoid(0.0, 0.0, 2.0, 4.0)))
            .and_then(|v| v.with_term("good", MembershipFunction::trapezoid(6.0, 8.0, 10.0, 10.0)))
            .unwrap();
        let tip = FuzzyVariable::consequent("tip", 0.0, 30.0, 1.0)
            .and_then(|v| v.with_term("low", MembershipFunction::trapezoid(0.0, 0.0, 5.0, 10.0)))
            .and_then(|v| {
                v.with_term("high", MembershipFunction::trapezoid(18.0, 25.0, 30.0, 30.0))
            })
            .unwrap();
        InferenceSystem::new(
            vec![food],
            tip,
            vec![
                Rule::new(term("food", "bad"), "low"),
                Rule::new(term("food", "good"), "high"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn firing_strengths_follow_membership() {
        let sys = tipping_like();
        assert_eq!(sys.firing_strengths(&[1.0]).unwrap(), vec![1.0, 0.0]);
        assert_eq!(sys.firing_strengths(&[3.0]).unwrap(), vec![0.5, 0.0]);
        assert_eq!(sys.firing_strengths(&[9.0]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn contribution_is_clipped_at_strength() {
        let sys = tipping_like();
        let profile = sys.infer(&[3.0]).unwrap();
        assert_eq!(profile.peak(), 0.5);
        // tip = 0 lies in low's plateau, clipped to 0.5
        assert_eq!(profile.degrees()[0], 0.5);
        // tip = 20 is only in high, which did not fire
        assert_eq!(profile.degrees()[20], 0.0);
    }

    #[test]
    fn aggregation_is_monotonic_in_each_strength() {
        let sys = tipping_like();
        let base = [0.3, 0.6];
        let before = sys.aggregate(&base);
        for i in 0..base.len() {
            for bump in [0.1, 0.4, 0.7] {
                let mut raised = base;
                raised[i] = (raised[i] + bump).min(1.0);
                let after = sys.aggregate(&raised);
                for (b, a) in before.degrees().iter().zip(after.degrees()) {
                    assert!(a >= b, "raising rule {i} by {bump} lowered a point");
                }
            }
        }
    }

    #[test]
    fn no_rule_fires_gives_fallback() {
        let sys = tipping_like();
        // food = 5: neither bad nor good
        let profile = sys.infer(&[5.0]).unwrap();
        assert!(profile.is_zero());
        assert_eq!(sys.defuzzify(&profile), Err(DefuzzError::Undefined));
        let out = sys.compute_or(&[5.0], -1.0).unwrap();
        assert_eq!(
            out,
            CrispOutput {
                value: -1.0,
                fallback_used: true
            }
        );
        assert!(!out.value.is_nan());
    }

    #[test]
    fn only_undefined_falls_back() {
        let out = CrispOutput::or_fallback(Err(DefuzzError::Undefined), 3.0).unwrap();
        assert!(out.fallback_used);
        assert_eq!(out.value, 3.0);

        let mismatch = DefuzzError::LengthMismatch {
            profile: 3,
            universe: 11,
        };
        assert_eq!(
            CrispOutput::or_fallback(Err(mismatch), 3.0),
            Err(InferenceError::Defuzz(mismatch))
        );

        let out = CrispOutput::or_fallback(Ok(12.5), 3.0).unwrap();
        assert!(!out.fallback_used);
        assert_eq!(out.value, 12.5);
    }

    #[test]
    fn inputs_are_clamped_into_universe() {
        let sys = tipping_like();
        assert_eq!(sys.firing_strengths(&[-50.0]).unwrap(), vec![1.0, 0.0]);
        assert_eq!(sys.firing_strengths(&[500.0]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn bad_input_vectors_are_rejected() {
        let sys = tipping_like();
        assert_eq!(
            sys.infer(&[]).unwrap_err(),
            InferenceError::InputCount {
                expected: 1,
                found: 0
            }
        );
        assert!(matches!(
            sys.infer(&[f64::NAN]),
            Err(InferenceError::NonFiniteInput { .. })
        ));
        assert!(matches!(
            sys.infer_named(&[("service", 3.0)]),
            Err(InferenceError::UnknownInput { .. })
        ));
        assert!(matches!(
            sys.infer_named(&[]),
            Err(InferenceError::MissingInput { .. })
        ));
        assert!(sys.infer_named(&[("food", 3.0)]).is_ok());
    }

    #[test]
    fn dangling_consequent_is_config_error() {
        let food = FuzzyVariable::antecedent("food", 0.0, 10.0, 1.0)
            .and_then(|v| v.with_term("bad", MembershipFunction::trapezoid(0.0, 0.0, 2.0, 4.0)))
            .unwrap();
        let tip = FuzzyVariable::consequent("tip", 0.0, 30.0, 1.0)
            .and_then(|v| v.with_term("low", MembershipFunction::trapezoid(0.0, 0.0, 5.0, 10.0)))
            .unwrap();
        let err = InferenceSystem::new(
            vec![food],
            tip,
            vec![
                Rule::new(term("food", "bad"), "low"),
                Rule::new(term("food", "bad"), "generous"),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownConsequentLabel {
                rule: 1,
                label: "generous".into()
            }
        );
    }

    #[test]
    fn duplicate_input_names_rejected() {
        let mk = || FuzzyVariable::antecedent("food", 0.0, 10.0, 1.0).unwrap();
        let out = FuzzyVariable::consequent("tip", 0.0, 30.0, 1.0).unwrap();
        assert!(matches!(
            InferenceSystem::new(vec![mk(), mk()], out, vec![]),
            Err(ConfigError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn weight_scales_strength() {
        let sys = InferenceSystem::new(
            tipping_like().inputs().to_vec(),
            tipping_like().output().clone(),
            vec![Rule::new(term("food", "bad"), "low").with_weight(0.5)],
        )
        .unwrap();
        assert_eq!(sys.firing_strengths(&[0.0]).unwrap(), vec![0.5]);
    }

    #[test]
    fn label_strengths_take_max_per_label() {
        let sys = tipping_like();
        let strengths = sys.label_strengths(&[3.0]).unwrap();
        assert_eq!(strengths, vec![("low", 0.5), ("high", 0.0)]);
    }
}
