//! Defuzzification: reduce an aggregated output profile to one crisp value.
//!
//! All methods work on the discretized universe. An all-zero profile has no
//! defined result and yields [`DefuzzError::Undefined`]; callers pick their
//! own fallback instead of receiving `NaN`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::universe::Universe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefuzzMethod {
    /// `Σ x·μ(x) / Σ μ(x)`.
    #[default]
    Centroid,
    /// Point splitting the area under the profile into two equal halves.
    Bisector,
    /// Mean of the points where the profile reaches its maximum.
    MeanOfMaximum,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefuzzError {
    /// No rule fired: the profile is identically zero.
    Undefined,
    LengthMismatch { profile: usize, universe: usize },
}

impl fmt::Display for DefuzzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefuzzError::Undefined => {
                write!(f, "defuzzification undefined: aggregated profile is all zero")
            }
            DefuzzError::LengthMismatch { profile, universe } => write!(
                f,
                "profile has {} samples but universe has {} points",
                profile, universe
            ),
        }
    }
}

impl std::error::Error for DefuzzError {}

/// Centroid-of-area defuzzification.
pub fn defuzzify(profile: &[f64], universe: &Universe) -> Result<f64, DefuzzError> {
    defuzzify_with(DefuzzMethod::Centroid, profile, universe)
}

pub fn defuzzify_with(
    method: DefuzzMethod,
    profile: &[f64],
    universe: &Universe,
) -> Result<f64, DefuzzError> {
    let xs = universe.points();
    if profile.len() != xs.len() {
        return Err(DefuzzError::LengthMismatch {
            profile: profile.len(),
            universe: xs.len(),
        });
    }
    let area: f64 = profile.iter().sum();
    if area <= 0.0 {
        return Err(DefuzzError::Undefined);
    }
    Ok(match method {
        DefuzzMethod::Centroid => centroid(profile, xs, area),
        DefuzzMethod::Bisector => bisector(profile, xs, area),
        DefuzzMethod::MeanOfMaximum => mean_of_maximum(profile, xs),
    })
}

fn centroid(profile: &[f64], xs: &[f64], area: f64) -> f64 {
    let moment: f64 = xs.iter().zip(profile).map(|(x, m)| x * m).sum();
    moment / area
}

fn bisector(profile: &[f64], xs: &[f64], area: f64) -> f64 {
    let half = area / 2.0;
    let mut running = 0.0_f64;
    for (x, m) in xs.iter().zip(profile) {
        running += m;
        if running >= half {
            return *x;
        }
    }
    // Unreachable for a positive area, but keep the last point as a bound
    xs[xs.len() - 1]
}

fn mean_of_maximum(profile: &[f64], xs: &[f64]) -> f64 {
    let peak = profile.iter().copied().fold(0.0_f64, f64::max);
    let (sum, count) = xs
        .iter()
        .zip(profile)
        .filter(|(_, m)| (**m - peak).abs() <= 1e-12)
        .fold((0.0_f64, 0usize), |(s, n), (x, _)| (s + x, n + 1));
    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipFunction;

    fn angle() -> Universe {
        Universe::new(-50.0, 50.0, 0.5).unwrap()
    }

    #[test]
    fn all_zero_profile_is_undefined_not_nan() {
        let u = angle();
        let profile = vec![0.0; u.len()];
        for method in [
            DefuzzMethod::Centroid,
            DefuzzMethod::Bisector,
            DefuzzMethod::MeanOfMaximum,
        ] {
            assert_eq!(
                defuzzify_with(method, &profile, &u),
                Err(DefuzzError::Undefined)
            );
        }
    }

    #[test]
    fn symmetric_triangle_centroid_is_its_peak() {
        let u = angle();
        let profile = MembershipFunction::triangle(-10.0, 0.0, 10.0).sample(u.points());
        let c = defuzzify(&profile, &u).unwrap();
        assert!(c.abs() < 1e-9, "centroid {c}");
    }

    #[test]
    fn shifted_plateau_centroid() {
        let u = angle();
        let profile = MembershipFunction::trapezoid(20.0, 25.0, 35.0, 40.0).sample(u.points());
        let c = defuzzify(&profile, &u).unwrap();
        assert!((c - 30.0).abs() < 1e-9, "centroid {c}");
    }

    #[test]
    fn mean_of_maximum_on_plateau() {
        let u = angle();
        let profile = MembershipFunction::trapezoid(5.0, 10.0, 20.0, 25.0).sample(u.points());
        let m = defuzzify_with(DefuzzMethod::MeanOfMaximum, &profile, &u).unwrap();
        assert!((m - 15.0).abs() < 1e-9);
    }

    #[test]
    fn bisector_of_symmetric_shape() {
        let u = angle();
        let profile = MembershipFunction::trapezoid(-40.0, -35.0, -25.0, -20.0).sample(u.points());
        let b = defuzzify_with(DefuzzMethod::Bisector, &profile, &u).unwrap();
        assert!((b + 30.0).abs() <= u.step());
    }

    #[test]
    fn length_mismatch_is_reported() {
        let u = angle();
        assert_eq!(
            defuzzify(&[1.0, 0.5], &u),
            Err(DefuzzError::LengthMismatch {
                profile: 2,
                universe: 201
            })
        );
    }
}
