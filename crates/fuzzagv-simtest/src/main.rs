//! FuzzAGV Headless Simulation Harness
//!
//! Validates the fuzzy controllers, the sensing and control loop and the
//! multi-vehicle engine without a window.
//! Runs entirely in-process with no rendering and no input polling.
//!
//! Usage:
//!   cargo run -p fuzzagv-simtest
//!   cargo run -p fuzzagv-simtest -- --verbose
//!
//! `RUST_LOG` is honoured; `--verbose` raises the default level to debug.

use fuzzagv_core::prelude::*;
use fuzzagv_logic::agv::{agv_controller_table, DISTANCE_MAX};
use fuzzagv_logic::combat::{self, Stance};
use fuzzagv_logic::grid::{Occupancy, WallGrid};
use fuzzagv_logic::inference::InferenceSystem;
use fuzzagv_logic::sensors::{raycast, SensorArray};
use fuzzagv_logic::table::SystemTable;
use fuzzagv_logic::tipping;
use fuzzagv_logic::vehicle::{decide_steering, ControlParams, Readings, Side};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Controller description (same JSON a front end would load) ──────────
const CONTROLLER_JSON: &str = include_str!("../../../data/agv_controller.json");

const DT: f64 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    env_logger::Builder::from_default_env()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    println!("=== FuzzAGV Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Controller table
    let system = match validate_controller_table(&mut results) {
        Some(sys) => sys,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Membership shapes
    results.extend(validate_membership(&system));

    // 3. Steering sweep
    results.extend(validate_steering(&system, verbose));

    // 4. Ray-cast sensing
    results.extend(validate_sensors());

    // 5. Closed loop on every track
    results.extend(validate_tracks(&system, verbose));

    // 6. Engine fleet and persistence
    results.extend(validate_engine(verbose));

    // 7. Other controllers on the same core
    results.extend(validate_presets());

    report(&results, verbose);
}

fn report(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Controller Table ─────────────────────────────────────────────────

fn validate_controller_table(results: &mut Vec<TestResult>) -> Option<InferenceSystem> {
    println!("--- Controller Table ---");

    let table: SystemTable = match serde_json::from_str(CONTROLLER_JSON) {
        Ok(t) => t,
        Err(e) => {
            results.push(TestResult {
                name: "table_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "table_shape".into(),
        passed: table.inputs.len() == 3 && table.rules.len() == 12,
        detail: format!(
            "{} inputs, {} output labels, {} rules",
            table.inputs.len(),
            table.output.terms.len(),
            table.rules.len()
        ),
    });

    let builtin = agv_controller_table();
    results.push(TestResult {
        name: "table_matches_builtin".into(),
        passed: table == builtin,
        detail: if table == builtin {
            "JSON and built-in controller agree".into()
        } else {
            "JSON controller differs from the built-in table".into()
        },
    });

    match table.build() {
        Ok(sys) => {
            results.push(TestResult {
                name: "table_builds".into(),
                passed: true,
                detail: format!("{} rules compiled", sys.rules().len()),
            });
            Some(sys)
        }
        Err(e) => {
            results.push(TestResult {
                name: "table_builds".into(),
                passed: false,
                detail: e.to_string(),
            });
            None
        }
    }
}

// ── 2. Membership ───────────────────────────────────────────────────────

fn validate_membership(system: &InferenceSystem) -> Vec<TestResult> {
    println!("--- Membership ---");
    let mut results = Vec::new();

    let mut out_of_range = Vec::new();
    let mut plateau_misses = Vec::new();
    for var in system.inputs().iter().chain(std::iter::once(system.output())) {
        for term in var.terms() {
            for &x in var.universe().points() {
                let mu = term.shape.evaluate(x);
                if !(0.0..=1.0).contains(&mu) {
                    out_of_range.push(format!("{}.{}({})={}", var.name(), term.label, x, mu));
                }
            }
            let (b, c) = term.shape.core();
            if term.shape.evaluate(b) != 1.0 || term.shape.evaluate(c) != 1.0 {
                plateau_misses.push(format!("{}.{}", var.name(), term.label));
            }
        }
    }

    results.push(TestResult {
        name: "membership_bounded".into(),
        passed: out_of_range.is_empty(),
        detail: if out_of_range.is_empty() {
            "every degree in [0, 1]".into()
        } else {
            out_of_range.join(", ")
        },
    });
    results.push(TestResult {
        name: "membership_plateau".into(),
        passed: plateau_misses.is_empty(),
        detail: if plateau_misses.is_empty() {
            "every term reaches 1 on its core".into()
        } else {
            plateau_misses.join(", ")
        },
    });

    results
}

// ── 3. Steering ─────────────────────────────────────────────────────────

fn validate_steering(system: &InferenceSystem, verbose: bool) -> Vec<TestResult> {
    println!("--- Steering ---");
    let mut results = Vec::new();
    let params = ControlParams::default();

    let samples: Vec<f64> = (0..=12).map(|i| i as f64 * 10.0).collect();
    let mut evaluated = 0;
    let mut fallbacks = 0;
    let mut bad = Vec::new();
    for &f in &samples {
        for &l in &samples {
            for &r in &samples {
                evaluated += 1;
                match system.compute_or(&[f, l, r], params.undefined_fallback) {
                    Ok(out) => {
                        if out.fallback_used {
                            fallbacks += 1;
                        }
                        if !out.value.is_finite() || !(-50.0..=50.0).contains(&out.value) {
                            bad.push(format!("({f},{l},{r})->{}", out.value));
                        }
                    }
                    Err(e) => bad.push(format!("({f},{l},{r}): {e}")),
                }
            }
        }
    }
    if verbose {
        println!("  {} input triples, {} with no rule firing", evaluated, fallbacks);
    }
    results.push(TestResult {
        name: "steering_sweep_bounded".into(),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            format!("{} triples, {} fallbacks, all within ±50°", evaluated, fallbacks)
        } else {
            bad.join(", ")
        },
    });

    let open = decide_steering(
        system,
        &Readings::new(DISTANCE_MAX, DISTANCE_MAX, DISTANCE_MAX),
        0.0,
        &params,
    );
    results.push(TestResult {
        name: "steering_open_road_straight".into(),
        passed: open.steering.abs() < 1e-9 && !open.fallback_used,
        detail: format!("steering {:.6}", open.steering),
    });

    let away_right = system
        .compute_or(&[DISTANCE_MAX, DISTANCE_MAX, 10.0], 0.0)
        .map(|o| o.value)
        .unwrap_or(f64::NAN);
    let away_left = system
        .compute_or(&[DISTANCE_MAX, 10.0, DISTANCE_MAX], 0.0)
        .map(|o| o.value)
        .unwrap_or(f64::NAN);
    results.push(TestResult {
        name: "steering_avoids_side_walls".into(),
        passed: away_right < 0.0 && away_left > 0.0,
        detail: format!(
            "right wall -> {:.2}, left wall -> {:.2}",
            away_right, away_left
        ),
    });

    let emergency = decide_steering(system, &Readings::new(10.0, 5.0, 80.0), 0.0, &params);
    results.push(TestResult {
        name: "steering_emergency_right".into(),
        passed: emergency.emergency == Some(Side::Right) && emergency.steering > 0.0,
        detail: format!(
            "raw {:.2}, smoothed {:.2}, final {:.2}",
            emergency.raw, emergency.smoothed, emergency.steering
        ),
    });

    results
}

// ── 4. Sensors ──────────────────────────────────────────────────────────

fn validate_sensors() -> Vec<TestResult> {
    println!("--- Sensors ---");
    let mut results = Vec::new();
    let sensors = SensorArray::default();

    let empty = WallGrid::new(60, 60, 10.0);
    let mut wrong = Vec::new();
    for heading in (0..360).step_by(15) {
        let d = sensors.sense(&Pose::new(300.0, 300.0, heading as f64), &empty);
        if d.iter().any(|&v| v != sensors.max_range) {
            wrong.push(format!("{}°: {:?}", heading, d));
        }
    }
    results.push(TestResult {
        name: "sensors_empty_grid_max_range".into(),
        passed: wrong.is_empty(),
        detail: if wrong.is_empty() {
            "24 headings read max range".into()
        } else {
            wrong.join("; ")
        },
    });

    let mut walled = WallGrid::new(60, 60, 10.0);
    walled.fill(0..60, 40..41, true); // x = 400..410
    let mut misses = Vec::new();
    for offset in [5.0, 17.5, 33.3, 64.0, 99.9, 118.0] {
        let d = raycast(&walled, 400.0 - offset, 305.0, 0.0, sensors.max_range, sensors.step);
        if (d - offset).abs() > sensors.step {
            misses.push(format!("wall at {offset} read {d}"));
        }
    }
    results.push(TestResult {
        name: "sensors_wall_within_one_step".into(),
        passed: misses.is_empty(),
        detail: if misses.is_empty() {
            "6 distances within one step".into()
        } else {
            misses.join(", ")
        },
    });

    results
}

// ── 5. Tracks ───────────────────────────────────────────────────────────

fn validate_tracks(system: &InferenceSystem, verbose: bool) -> Vec<TestResult> {
    println!("--- Tracks ---");
    let mut results = Vec::new();
    let config = EngineConfig::default();
    let ticks = 1800;

    for preset in TrackPreset::all() {
        let grid = preset.build(config.cols, config.rows, config.cell_size);
        let start = config.start_pose();
        if grid.is_blocked(start.x, start.y) {
            results.push(TestResult {
                name: format!("track_{}", preset.name()),
                passed: false,
                detail: "start pose is inside a wall".into(),
            });
            continue;
        }

        let mut vehicle = Vehicle::new(start);
        let mut collisions = 0;
        let mut emergencies = 0;
        let mut failure = None;
        for tick in 0..ticks {
            let report = vehicle.tick(system, &grid, &config.sensors, &config.control, DT);
            collisions += usize::from(report.collision.is_some());
            emergencies += usize::from(report.emergency.is_some());
            if !vehicle.pose.is_finite() || grid.is_blocked(vehicle.pose.x, vehicle.pose.y) {
                failure = Some(format!("tick {}: invalid pose {:?}", tick, vehicle.pose));
                break;
            }
        }
        if verbose {
            println!(
                "  {:<12} collisions {:>4}  emergencies {:>4}  trail {:>4}",
                preset.name(),
                collisions,
                emergencies,
                vehicle.trail().len()
            );
        }
        results.push(TestResult {
            name: format!("track_{}", preset.name()),
            passed: failure.is_none(),
            detail: failure.unwrap_or_else(|| {
                format!(
                    "{} ticks, {} collisions, {} emergencies",
                    ticks, collisions, emergencies
                )
            }),
        });
    }

    results
}

// ── 6. Engine ───────────────────────────────────────────────────────────

fn validate_engine(verbose: bool) -> Vec<TestResult> {
    println!("--- Engine ---");
    let mut results = Vec::new();

    let config = EngineConfig {
        track: TrackPreset::BorderMaze,
        ..EngineConfig::default()
    };
    let mut engine = match SimulationEngine::with_agv(config) {
        Ok(e) => e,
        Err(e) => {
            results.push(TestResult {
                name: "engine_create".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let mut rng = StdRng::seed_from_u64(2024);
    let fleet = 16;
    let spawned = (0..fleet)
        .filter(|i| engine.spawn_random(&format!("agv-{i}"), &mut rng).is_some())
        .count();
    results.push(TestResult {
        name: "engine_spawn_fleet".into(),
        passed: spawned == fleet,
        detail: format!("{}/{} vehicles placed", spawned, fleet),
    });

    let mut collisions = 0;
    for _ in 0..600 {
        engine.update(DT);
        collisions += engine.last_stats().collisions;
    }
    let stranded: Vec<String> = engine
        .snapshots()
        .into_iter()
        .filter(|s| !s.pose.is_finite() || engine.grid().is_blocked(s.pose.x, s.pose.y))
        .map(|s| s.name)
        .collect();
    if verbose {
        println!(
            "  {} vehicles, t={:.1}s, {} collision corrections",
            engine.vehicle_count(),
            engine.sim_time(),
            collisions
        );
    }
    results.push(TestResult {
        name: "engine_fleet_stays_on_floor".into(),
        passed: stranded.is_empty(),
        detail: if stranded.is_empty() {
            format!("{} vehicles after 600 ticks", engine.vehicle_count())
        } else {
            format!("in walls: {}", stranded.join(", "))
        },
    });

    let mut buf = Vec::new();
    let roundtrip = engine.save(&mut buf).and_then(|_| {
        let mut restored = SimulationEngine::with_agv(EngineConfig::default())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        restored.load(&buf[..])?;
        Ok(restored)
    });
    let (passed, detail) = match roundtrip {
        Ok(restored) => {
            let same = restored.grid() == engine.grid()
                && restored
                    .snapshots()
                    .iter()
                    .zip(engine.snapshots().iter())
                    .all(|(a, b)| a.pose == b.pose && a.trail == b.trail);
            (
                same && restored.vehicle_count() == engine.vehicle_count(),
                format!("{} bytes, state restored: {}", buf.len(), same),
            )
        }
        Err(e) => (false, e.to_string()),
    };
    results.push(TestResult {
        name: "engine_save_load".into(),
        passed,
        detail,
    });

    results
}

// ── 7. Preset Controllers ───────────────────────────────────────────────

fn validate_presets() -> Vec<TestResult> {
    println!("--- Preset Controllers ---");
    let mut results = Vec::new();

    match combat::combat_controller() {
        Ok(sys) => {
            let cases = [
                ((1.0, 2.0, 2.0), Stance::Flee),
                ((1.0, 9.0, 9.0), Stance::Attack),
                ((5.5, 5.5, 5.5), Stance::Defend),
            ];
            let wrong: Vec<String> = cases
                .iter()
                .filter_map(|&((d, p, e), want)| {
                    match combat::decide_stance(&sys, d, p, e) {
                        Ok(got) if got == want => None,
                        Ok(got) => Some(format!("({d},{p},{e}) -> {:?}, want {:?}", got, want)),
                        Err(err) => Some(err.to_string()),
                    }
                })
                .collect();
            results.push(TestResult {
                name: "combat_stances".into(),
                passed: wrong.is_empty(),
                detail: if wrong.is_empty() {
                    "flee, attack and defend cases agree".into()
                } else {
                    wrong.join("; ")
                },
            });
        }
        Err(e) => results.push(TestResult {
            name: "combat_stances".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    match tipping::tipping_controller() {
        Ok(sys) => {
            let tips: Vec<Option<f64>> = [(1.0, 1.0), (5.5, 5.5), (9.0, 9.0)]
                .iter()
                .map(|&(food, service)| tipping::suggest_tip(&sys, food, service))
                .collect();
            let ordered = match tips.as_slice() {
                [Some(a), Some(b), Some(c)] => a < b && b < c,
                _ => false,
            };
            results.push(TestResult {
                name: "tipping_monotonic".into(),
                passed: ordered,
                detail: format!("{:?}", tips),
            });
        }
        Err(e) => results.push(TestResult {
            name: "tipping_monotonic".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzagv_logic::agv::agv_controller;

    #[test]
    fn controller_json_parses() {
        let mut results = Vec::new();
        assert!(validate_controller_table(&mut results).is_some());
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn sensor_checks_pass() {
        assert!(validate_sensors().iter().all(|r| r.passed));
    }

    #[test]
    fn built_in_controller_passes_steering_checks() {
        let sys = agv_controller().unwrap();
        let results = validate_steering(&sys, false);
        for r in &results {
            assert!(r.passed, "{}: {}", r.name, r.detail);
        }
    }
}
