//! Vehicle pose, steering control law and the per-tick control loop.
//!
//! Coordinates are screen pixels with y pointing down. Heading is in degrees,
//! 0 = east, and grows clockwise on screen. **Positive steering turns right**
//! (heading increases); negative turns left. The fuzzy output universe, the
//! emergency override and the collision correction all use this convention.
//!
//! Per tick, while running:
//! 1. Sense front / left / right distances.
//! 2. Infer a raw steering command; `undefined_fallback` when no rule fires.
//! 3. Low-pass: `steering = a * prev + (1 - a) * raw`.
//! 4. Emergency override: front below `near_threshold` adds a fixed nudge
//!    toward the freer side (ties go right). Applied after smoothing, unsmoothed.
//! 5. Integrate heading (wrapped to [-180, 180)) then position along it.
//! 6. If the move crosses a blocked cell, reject it, back off along the
//!    reverse heading and turn away from the nearer side wall. The move is
//!    swept in half-cell sub-steps, so a large `dt` cannot tunnel through a
//!    thin wall. A vehicle already inside a wall jumps to the nearest free
//!    floor instead of backing off.
//!
//! While paused the vehicle still senses but steering and pose are frozen.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::Occupancy;
use crate::inference::{CrispOutput, InferenceSystem};
use crate::sensors::SensorArray;

/// Sign of a right turn. Heading increases, clockwise on a y-down screen.
pub const STEER_RIGHT: f64 = 1.0;
/// Sign of a left turn.
pub const STEER_LEFT: f64 = -1.0;

/// Default cruising speed, pixels per second.
pub const DEFAULT_SPEED: f64 = 90.0;
pub const MIN_SPEED: f64 = 10.0;
pub const MAX_SPEED: f64 = 240.0;
pub const SPEED_STEP: f64 = 10.0;

/// Rings searched around a vehicle buried in a wall, each half a cell apart.
const ESCAPE_RINGS: usize = 32;
/// Bearings per ring, evenly spaced.
const ESCAPE_BEARINGS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Degrees, 0 = east, clockwise positive.
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading: wrap_degrees(heading),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }

    /// Unit vector along the heading.
    pub fn direction(&self) -> (f64, f64) {
        let (sin, cos) = self.heading.to_radians().sin_cos();
        (cos, sin)
    }
}

/// Wrap an angle in degrees into `[-180, 180)`.
pub fn wrap_degrees(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Steering sign for turning toward this side.
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => STEER_LEFT,
            Side::Right => STEER_RIGHT,
        }
    }
}

/// Side with more clearance. Equal clearance goes right.
pub fn freer_side(left: f64, right: f64) -> Side {
    if left > right {
        Side::Left
    } else {
        Side::Right
    }
}

/// Front, left and right sensor distances.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Readings {
    pub front: f64,
    pub left: f64,
    pub right: f64,
}

impl Readings {
    pub fn new(front: f64, left: f64, right: f64) -> Self {
        Self { front, left, right }
    }

    /// Take the first three distances as front, left, right. Missing sensors
    /// read as `clear`.
    pub fn from_distances(distances: &[f64], clear: f64) -> Self {
        let at = |i: usize| distances.get(i).copied().unwrap_or(clear);
        Self::new(at(0), at(1), at(2))
    }

    /// Crisp input vector in controller input order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.front, self.left, self.right]
    }
}

/// Tunable constants of the control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlParams {
    /// Weight of the previous steering in the low-pass filter.
    pub smoothing: f64,
    /// Front distance below which the emergency nudge kicks in.
    pub near_threshold: f64,
    /// Emergency nudge, degrees of steering.
    pub emergency_nudge: f64,
    /// Heading change per second per degree of steering.
    pub turn_gain: f64,
    /// Back-off distance after a rejected move, pixels.
    pub collision_backoff: f64,
    /// Heading correction after a rejected move, degrees.
    pub collision_nudge: f64,
    /// Steering used when no rule fires.
    pub undefined_fallback: f64,
    pub trail_capacity: usize,
    /// Minimum Manhattan distance between breadcrumbs, pixels.
    pub trail_spacing: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            smoothing: 0.7,
            near_threshold: 25.0,
            emergency_nudge: 20.0,
            turn_gain: 1.6,
            collision_backoff: 4.0,
            collision_nudge: 25.0,
            undefined_fallback: 0.0,
            trail_capacity: 2000,
            trail_spacing: 4.0,
        }
    }
}

/// Result of steps 2–4 of the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringDecision {
    /// Defuzzified steering (or the fallback).
    pub raw: f64,
    pub fallback_used: bool,
    /// After the low-pass filter.
    pub smoothed: f64,
    /// Side of the emergency nudge, if one was applied.
    pub emergency: Option<Side>,
    /// Final steering command.
    pub steering: f64,
}

/// Steering command from sensor readings and the previous steering value.
pub fn decide_steering(
    system: &InferenceSystem,
    readings: &Readings,
    prev_steering: f64,
    params: &ControlParams,
) -> SteeringDecision {
    let out = match system.compute_or(&readings.as_array(), params.undefined_fallback) {
        Ok(out) => out,
        Err(e) => {
            log::warn!("steering inference failed ({}), using fallback", e);
            CrispOutput {
                value: params.undefined_fallback,
                fallback_used: true,
            }
        }
    };
    if out.fallback_used {
        log::debug!(
            "no steering rule fired for {:?}, fallback {}",
            readings,
            params.undefined_fallback
        );
    }

    let a = params.smoothing;
    let smoothed = a * prev_steering + (1.0 - a) * out.value;

    let emergency = if readings.front < params.near_threshold {
        Some(freer_side(readings.left, readings.right))
    } else {
        None
    };
    let steering = match emergency {
        Some(side) => {
            log::debug!(
                "front {:.1} below {:.1}, emergency nudge {:?}",
                readings.front,
                params.near_threshold,
                side
            );
            smoothed + side.sign() * params.emergency_nudge
        }
        None => smoothed,
    };

    SteeringDecision {
        raw: out.value,
        fallback_used: out.fallback_used,
        smoothed,
        emergency,
        steering,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveMode {
    #[default]
    Running,
    Paused,
}

/// What one tick saw and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub readings: Readings,
    /// Raw inferred steering; 0 while paused.
    pub raw_steering: f64,
    pub fallback_used: bool,
    pub emergency: Option<Side>,
    /// Turn applied by collision resolution, if the move was rejected.
    pub collision: Option<Side>,
}

/// A simulated vehicle. Owns its pose, steering state and trail; the
/// controller and the grid are borrowed per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub pose: Pose,
    /// Pose restored by [`reset`](Self::reset).
    pub start: Pose,
    /// Pixels per second.
    pub speed: f64,
    /// Smoothed steering, degrees.
    pub steering: f64,
    pub mode: DriveMode,
    trail: VecDeque<(f64, f64)>,
}

impl Vehicle {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            start: pose,
            speed: DEFAULT_SPEED,
            steering: 0.0,
            mode: DriveMode::Running,
            trail: VecDeque::new(),
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self
    }

    /// Breadcrumbs, oldest first.
    pub fn trail(&self) -> &VecDeque<(f64, f64)> {
        &self.trail
    }

    pub fn is_paused(&self) -> bool {
        self.mode == DriveMode::Paused
    }

    pub fn toggle_pause(&mut self) {
        self.mode = match self.mode {
            DriveMode::Running => DriveMode::Paused,
            DriveMode::Paused => DriveMode::Running,
        };
    }

    /// Back to the start pose with zero steering and no trail.
    pub fn reset(&mut self) {
        self.pose = self.start;
        self.steering = 0.0;
        self.trail.clear();
    }

    /// Move to `(x, y)` facing east with zero steering and no trail.
    pub fn center(&mut self, x: f64, y: f64) {
        self.pose = Pose::new(x, y, 0.0);
        self.steering = 0.0;
        self.trail.clear();
    }

    pub fn faster(&mut self) {
        self.speed = (self.speed + SPEED_STEP).min(MAX_SPEED);
    }

    pub fn slower(&mut self) {
        self.speed = (self.speed - SPEED_STEP).max(MIN_SPEED);
    }

    /// Advance one tick of `dt` seconds.
    pub fn tick<G: Occupancy + ?Sized>(
        &mut self,
        system: &InferenceSystem,
        grid: &G,
        sensors: &SensorArray,
        params: &ControlParams,
        dt: f64,
    ) -> TickReport {
        let distances = sensors.sense(&self.pose, grid);
        let readings = Readings::from_distances(&distances, sensors.max_range);

        if self.mode == DriveMode::Paused {
            return TickReport {
                readings,
                raw_steering: 0.0,
                fallback_used: false,
                emergency: None,
                collision: None,
            };
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let decision = decide_steering(system, &readings, self.steering, params);
        self.steering = decision.steering;

        self.pose.heading = wrap_degrees(self.pose.heading + self.steering * dt * params.turn_gain);
        let (dx, dy) = self.pose.direction();
        let nx = self.pose.x + dx * self.speed * dt;
        let ny = self.pose.y + dy * self.speed * dt;

        let collision = if path_blocked(grid, (self.pose.x, self.pose.y), (nx, ny)) {
            Some(self.resolve_collision(grid, &readings, params))
        } else {
            self.pose.x = nx;
            self.pose.y = ny;
            None
        };

        self.drop_breadcrumb(params);

        TickReport {
            readings,
            raw_steering: decision.raw,
            fallback_used: decision.fallback_used,
            emergency: decision.emergency,
            collision,
        }
    }

    /// Reject the move: back off along the reverse heading onto a free cell
    /// and turn away from the nearer side. When the vehicle sits inside a
    /// wall and the back-off point is blocked too, it moves to the nearest
    /// free point instead, so it never stays buried.
    fn resolve_collision<G: Occupancy + ?Sized>(
        &mut self,
        grid: &G,
        readings: &Readings,
        params: &ControlParams,
    ) -> Side {
        let (dx, dy) = self.pose.direction();
        let bx = self.pose.x - dx * params.collision_backoff;
        let by = self.pose.y - dy * params.collision_backoff;
        if !grid.is_blocked(bx, by) {
            self.pose.x = bx;
            self.pose.y = by;
        } else if grid.is_blocked(self.pose.x, self.pose.y) {
            let (ex, ey) = nearest_free_point(grid, &self.pose).unwrap_or((bx, by));
            log::debug!(
                "vehicle buried at ({:.1}, {:.1}), escaping to ({:.1}, {:.1})",
                self.pose.x,
                self.pose.y,
                ex,
                ey
            );
            self.pose.x = ex;
            self.pose.y = ey;
        }
        let turn = freer_side(readings.left, readings.right);
        self.pose.heading = wrap_degrees(self.pose.heading + turn.sign() * params.collision_nudge);
        log::debug!(
            "collision ahead of ({:.1}, {:.1}), backed off, turning {:?}",
            self.pose.x,
            self.pose.y,
            turn
        );
        turn
    }

    fn drop_breadcrumb(&mut self, params: &ControlParams) {
        let far_enough = match self.trail.back() {
            None => true,
            Some(&(lx, ly)) => {
                (self.pose.x - lx).abs() + (self.pose.y - ly).abs() > params.trail_spacing
            }
        };
        if far_enough && params.trail_capacity > 0 {
            if self.trail.len() >= params.trail_capacity {
                self.trail.pop_front();
            }
            self.trail.push_back((self.pose.x, self.pose.y));
        }
    }
}

/// Whether any sample on the segment `from -> to` is blocked. Samples are at
/// most half a cell apart; the start point itself is not tested.
fn path_blocked<G: Occupancy + ?Sized>(grid: &G, from: (f64, f64), to: (f64, f64)) -> bool {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = dx.hypot(dy);
    let max_step = grid.cell_size() * 0.5;
    let steps = if max_step > 0.0 && len.is_finite() {
        ((len / max_step).ceil() as usize).max(1)
    } else {
        1
    };
    (1..=steps).any(|i| {
        let t = i as f64 / steps as f64;
        grid.is_blocked(from.0 + dx * t, from.1 + dy * t)
    })
}

/// Closest free point around `pose`, searched ring by ring at half-cell
/// spacing. Bearings start from the reverse heading and alternate sides.
fn nearest_free_point<G: Occupancy + ?Sized>(grid: &G, pose: &Pose) -> Option<(f64, f64)> {
    let spacing = grid.cell_size() * 0.5;
    if !(spacing > 0.0) {
        return None;
    }
    let slice = 360.0 / ESCAPE_BEARINGS as f64;
    for ring in 1..=ESCAPE_RINGS {
        let r = ring as f64 * spacing;
        for k in 0..ESCAPE_BEARINGS {
            // 0, -1, +1, -2, +2, ... slices away from straight back
            let offset = ((k + 1) / 2) as f64 * slice * if k % 2 == 0 { 1.0 } else { -1.0 };
            let (sin, cos) = (pose.heading + 180.0 + offset).to_radians().sin_cos();
            let (x, y) = (pose.x + cos * r, pose.y + sin * r);
            if !grid.is_blocked(x, y) {
                return Some((x, y));
            }
        }
    }
    None
}
