//! Membership function library: trapezoids and their triangular degeneracy.
//!
//! A shape is `Trapezoid(a, b, c, d)` with `a ≤ b ≤ c ≤ d`:
//!
//! ```text
//!  1 |      b______c
//!    |     /        \
//!    |    /          \
//!  0 |___a            d___
//! ```
//!
//! Evaluation is total over every real `x`: outside `[a, d]` the degree is 0,
//! the edges interpolate linearly, and the plateau `[b, c]` is 1. A collapsed
//! edge (`a == b` or `c == d`) becomes a step. Triangles are trapezoids with
//! `b == c`.
//!
//! ```
//! use fuzzagv_logic::membership::MembershipFunction;
//!
//! let zero = MembershipFunction::triangle(-10.0, 0.0, 10.0);
//! assert_eq!(zero.evaluate(0.0), 1.0);
//! assert_eq!(zero.evaluate(5.0), 0.5);
//! assert_eq!(zero.evaluate(42.0), 0.0);
//! ```

use serde::{Deserialize, Serialize};

/// A membership shape over a scalar input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MembershipFunction {
    /// Rising on `(a, b)`, plateau on `[b, c]`, falling on `(c, d)`.
    Trapezoid { a: f64, b: f64, c: f64, d: f64 },
}

impl MembershipFunction {
    pub fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> Self {
        MembershipFunction::Trapezoid { a, b, c, d }
    }

    /// Triangle peaking at `peak`, the degenerate trapezoid `b == c`.
    pub fn triangle(left: f64, peak: f64, right: f64) -> Self {
        MembershipFunction::Trapezoid {
            a: left,
            b: peak,
            c: peak,
            d: right,
        }
    }

    /// Build from the `[a, b, c, d]` breakpoint array used by the config tables.
    pub fn from_breakpoints(points: [f64; 4]) -> Self {
        let [a, b, c, d] = points;
        Self::trapezoid(a, b, c, d)
    }

    pub fn breakpoints(&self) -> [f64; 4] {
        match *self {
            MembershipFunction::Trapezoid { a, b, c, d } => [a, b, c, d],
        }
    }

    /// True when every breakpoint is finite and ordered `a ≤ b ≤ c ≤ d`.
    pub fn is_well_formed(&self) -> bool {
        let [a, b, c, d] = self.breakpoints();
        [a, b, c, d].iter().all(|v| v.is_finite()) && a <= b && b <= c && c <= d
    }

    /// Degree of membership of `x`, always within `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let [a, b, c, d] = self.breakpoints();
        let degree = if x >= b && x <= c {
            1.0
        } else if x <= a || x >= d {
            0.0
        } else if x < b {
            // a < x < b, so b > a here
            (x - a) / (b - a)
        } else {
            // c < x < d
            (d - x) / (d - c)
        };
        degree.clamp(0.0, 1.0)
    }

    /// Sample the shape at every point of `xs`.
    pub fn sample(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Interval where the degree is exactly 1.
    pub fn core(&self) -> (f64, f64) {
        let [_, b, c, _] = self.breakpoints();
        (b, c)
    }

    /// Interval outside of which the degree is 0.
    pub fn support(&self) -> (f64, f64) {
        let [a, _, _, d] = self.breakpoints();
        (a, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(lo: f64, hi: f64, n: usize) -> impl Iterator<Item = f64> {
        (0..=n).map(move |i| lo + (hi - lo) * i as f64 / n as f64)
    }

    #[test]
    fn degree_always_in_unit_interval() {
        let shapes = [
            MembershipFunction::trapezoid(0.0, 0.0, 45.0, 85.0),
            MembershipFunction::trapezoid(45.0, 85.0, 95.0, 115.0),
            MembershipFunction::trapezoid(85.0, 115.0, 120.0, 120.0),
            MembershipFunction::triangle(-10.0, 0.0, 10.0),
        ];
        for shape in &shapes {
            for x in sweep(-500.0, 500.0, 4000) {
                let m = shape.evaluate(x);
                assert!((0.0..=1.0).contains(&m), "{shape:?} at {x} gave {m}");
            }
        }
    }

    #[test]
    fn plateau_is_one_and_outside_is_zero() {
        let t = MembershipFunction::trapezoid(45.0, 85.0, 95.0, 115.0);
        for x in sweep(85.0, 95.0, 100) {
            assert_eq!(t.evaluate(x), 1.0, "x={x}");
        }
        for x in sweep(-100.0, 45.0, 100).chain(sweep(115.0, 300.0, 100)) {
            assert_eq!(t.evaluate(x), 0.0, "x={x}");
        }
    }

    #[test]
    fn linear_edges() {
        let t = MembershipFunction::trapezoid(45.0, 85.0, 95.0, 115.0);
        assert!((t.evaluate(65.0) - 0.5).abs() < 1e-12);
        assert!((t.evaluate(105.0) - 0.5).abs() < 1e-12);
        assert!((t.evaluate(55.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn triangle_peak_is_one() {
        let tri = MembershipFunction::trapezoid(-10.0, 3.0, 3.0, 10.0);
        assert_eq!(tri.evaluate(3.0), 1.0);
        assert_eq!(MembershipFunction::triangle(0.0, 0.0, 1.0).evaluate(0.0), 1.0);
    }

    #[test]
    fn collapsed_edges_are_steps() {
        // a == b: step up at a
        let left_shoulder = MembershipFunction::trapezoid(0.0, 0.0, 45.0, 85.0);
        assert_eq!(left_shoulder.evaluate(0.0), 1.0);
        assert_eq!(left_shoulder.evaluate(-0.001), 0.0);

        // c == d: step down at d
        let right_shoulder = MembershipFunction::trapezoid(85.0, 115.0, 120.0, 120.0);
        assert_eq!(right_shoulder.evaluate(120.0), 1.0);
        assert_eq!(right_shoulder.evaluate(120.001), 0.0);
    }

    #[test]
    fn well_formed_checks_order_and_finiteness() {
        assert!(MembershipFunction::trapezoid(0.0, 1.0, 2.0, 3.0).is_well_formed());
        assert!(MembershipFunction::trapezoid(1.0, 1.0, 1.0, 1.0).is_well_formed());
        assert!(!MembershipFunction::trapezoid(0.0, 2.0, 1.0, 3.0).is_well_formed());
        assert!(!MembershipFunction::trapezoid(f64::NAN, 0.0, 1.0, 2.0).is_well_formed());
    }

    #[test]
    fn core_and_support() {
        let t = MembershipFunction::from_breakpoints([5.0, 10.0, 20.0, 25.0]);
        assert_eq!(t.core(), (10.0, 20.0));
        assert_eq!(t.support(), (5.0, 25.0));
        assert_eq!(t.breakpoints(), [5.0, 10.0, 20.0, 25.0]);
    }
}
