//! Discretized universe of discourse.

use serde::{Deserialize, Serialize};

/// Largest number of sample points a universe may hold.
pub const MAX_POINTS: usize = 1_000_000;

/// Evenly spaced sample points over `[min, max]`.
///
/// Points are `min + i * step` for `i = 0..n`, with the last point pinned to
/// `max` so the upper bound is always sampled (same as `arange(min, max + ε, step)`
/// when `step` divides the range). Strictly increasing and never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
    points: Vec<f64>,
}

impl Universe {
    /// Returns `None` when the bounds are not finite with `min < max`, or the
    /// step is not strictly positive or so small that the universe would
    /// exceed [`MAX_POINTS`]. Callers map that to a `ConfigError`
    /// naming the variable.
    pub fn new(min: f64, max: f64, step: f64) -> Option<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return None;
        }
        if !step.is_finite() || step <= 0.0 {
            return None;
        }
        let span = max - min;
        if !(span / step < MAX_POINTS as f64) {
            return None;
        }
        // Tolerate float noise so 0..120 by 0.5 gives exactly 241 points
        let intervals = (span / step + 1e-9).floor() as usize;
        let mut points: Vec<f64> = (0..=intervals).map(|i| min + i as f64 * step).collect();
        match points.last() {
            Some(&last) if (max - last).abs() <= step * 1e-6 => {
                if let Some(p) = points.last_mut() {
                    *p = max;
                }
            }
            _ => points.push(max),
        }
        Some(Self {
            min,
            max,
            step,
            points,
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Clamp a crisp value into `[min, max]`.
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}
