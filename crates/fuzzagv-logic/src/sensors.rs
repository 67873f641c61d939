//! Ray-cast distance sensors against an occupancy grid.
//!
//! A ray marches from the sensor origin in fixed steps. Sample `i` is taken at
//! exactly `i * step` along the ray (never by accumulating increments), so the
//! hit distance depends only on the geometry and the step size, not on frame
//! rate or summation order. A ray stops at the first sample that lands on a
//! wall or outside the grid, or once the distance reaches `max_range`.

use serde::{Deserialize, Serialize};

use crate::grid::Occupancy;
use crate::vehicle::Pose;

/// Default march step in pixels.
pub const DEFAULT_STEP: f64 = 2.0;
/// Default sensor range in pixels (matches the distance universe).
pub const DEFAULT_MAX_RANGE: f64 = 120.0;

/// Fixed set of sensors mounted at headings relative to the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorArray {
    /// Relative headings in degrees. Negative is to the vehicle's left.
    pub angles: Vec<f64>,
    pub max_range: f64,
    pub step: f64,
}

impl Default for SensorArray {
    /// Front, left and right sensors at 0°, -45° and +45°.
    fn default() -> Self {
        Self {
            angles: vec![0.0, -45.0, 45.0],
            max_range: DEFAULT_MAX_RANGE,
            step: DEFAULT_STEP,
        }
    }
}

impl SensorArray {
    /// One distance per sensor, in `angles` order.
    pub fn sense<G: Occupancy + ?Sized>(&self, pose: &Pose, grid: &G) -> Vec<f64> {
        sense(pose, &self.angles, self.max_range, self.step, grid)
    }

    /// Upper bound on samples taken by a single ray.
    pub fn max_samples(&self) -> usize {
        if self.step > 0.0 && self.max_range > 0.0 {
            (self.max_range / self.step).ceil() as usize
        } else {
            1
        }
    }
}

/// Distance from `(x, y)` to the first blocked sample along `angle_deg`,
/// clamped to `max_range`.
pub fn raycast<G: Occupancy + ?Sized>(
    grid: &G,
    x: f64,
    y: f64,
    angle_deg: f64,
    max_range: f64,
    step: f64,
) -> f64 {
    if !(max_range > 0.0) {
        return 0.0;
    }
    let step = if step > 0.0 && step.is_finite() {
        step
    } else {
        max_range
    };
    let (dy, dx) = angle_deg.to_radians().sin_cos();
    let samples = (max_range / step).ceil() as usize;
    for i in 0..samples {
        let dist = i as f64 * step;
        if dist >= max_range {
            break;
        }
        if grid.is_blocked(x + dx * dist, y + dy * dist) {
            return dist;
        }
    }
    max_range
}

/// Cast one ray per relative angle from the pose, returning distances in the
/// same order as `relative_angles`.
pub fn sense<G: Occupancy + ?Sized>(
    pose: &Pose,
    relative_angles: &[f64],
    max_range: f64,
    step: f64,
    grid: &G,
) -> Vec<f64> {
    relative_angles
        .iter()
        .map(|rel| {
            raycast(grid, pose.x, pose.y, pose.heading + rel, max_range, step).min(max_range)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WallGrid;

    fn pose(x: f64, y: f64, heading: f64) -> Pose {
        Pose { x, y, heading }
    }

    #[test]
    fn empty_grid_reads_max_range_everywhere() {
        let grid = WallGrid::new(60, 60, 10.0);
        let sensors = SensorArray::default();
        for heading in [0.0, 33.0, 90.0, -135.0, 180.0] {
            let d = sensors.sense(&pose(300.0, 300.0, heading), &grid);
            assert_eq!(d, vec![120.0, 120.0, 120.0], "heading {heading}");
        }
    }

    #[test]
    fn wall_ahead_at_exact_distance() {
        let mut grid = WallGrid::new(40, 40, 10.0);
        // wall column at x = 150..160
        grid.fill(0..40, 15..16, true);
        let d = raycast(&grid, 100.0, 105.0, 0.0, 120.0, 2.0);
        assert!((d - 50.0).abs() <= 2.0, "d={d}");
    }

    #[test]
    fn wall_hit_within_one_step_for_odd_offsets() {
        let mut grid = WallGrid::new(40, 40, 10.0);
        grid.fill(0..40, 15..16, true);
        for start in [101.0, 103.3, 127.9, 149.0] {
            let expected = 150.0 - start;
            let d = raycast(&grid, start, 105.0, 0.0, 120.0, 2.0);
            assert!(d >= expected && d < expected + 2.0, "start={start} d={d}");
        }
    }

    #[test]
    fn grid_edge_terminates_ray() {
        let grid = WallGrid::new(20, 20, 10.0);
        // 30 px from the left edge, looking left (180°)
        let d = raycast(&grid, 30.0, 100.0, 180.0, 120.0, 2.0);
        assert!(d > 28.0 && d <= 32.0, "d={d}");
    }

    #[test]
    fn order_follows_relative_angles() {
        let mut grid = WallGrid::new(40, 40, 10.0);
        // wall row above the vehicle (screen y decreases to the left of east)
        grid.fill(5..6, 0..40, true);
        let p = pose(200.0, 100.0, 0.0);
        let d = sense(&p, &[0.0, -45.0, 45.0], 120.0, 2.0, &grid);
        assert_eq!(d[0], 120.0);
        assert!(d[1] < 120.0, "left sensor should see the wall, got {}", d[1]);
        assert_eq!(d[2], 120.0);
    }

    #[test]
    fn starting_inside_wall_reads_zero() {
        let mut grid = WallGrid::new(10, 10, 10.0);
        grid.set(5, 5, true);
        assert_eq!(raycast(&grid, 55.0, 55.0, 0.0, 120.0, 2.0), 0.0);
    }

    #[test]
    fn samples_are_bounded() {
        let s = SensorArray::default();
        assert_eq!(s.max_samples(), 60);
    }
}
