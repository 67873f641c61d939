//! Enemy combat stance: flee, defend or attack.
//!
//! Same rule engine as the steering controller, but the result is a discrete
//! choice. The crisp output is never defuzzified; instead the stance whose
//! rules fire strongest wins.

use serde::{Deserialize, Serialize};

use crate::antecedent::term;
use crate::error::{ConfigError, InferenceError};
use crate::inference::InferenceSystem;
use crate::table::{RuleTable, SystemTable, VariableTable};

pub const DISTANCE: &str = "Distance";
pub const PLAYER_HEALTH: &str = "PlayerHealth";
pub const ENEMY_HEALTH: &str = "EnemyHealth";
pub const ACTION: &str = "Action";

/// Pixels per unit of fuzzy distance.
pub const PIXELS_PER_UNIT: f64 = 40.0;
/// Enemy speed while attacking or fleeing, pixels per second.
pub const ENEMY_SPEED: f64 = 140.0;
/// Distance a defending enemy tries to hold, pixels.
pub const DEFEND_RANGE: f64 = 160.0;
const DEFEND_GAIN: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    Flee,
    Defend,
    Attack,
}

impl Stance {
    pub fn label(self) -> &'static str {
        match self {
            Stance::Flee => "Flee",
            Stance::Defend => "Defend",
            Stance::Attack => "Attack",
        }
    }

    /// Signed speed toward the player for this stance at `distance_px`.
    /// Negative moves away.
    pub fn approach_speed(self, distance_px: f64) -> f64 {
        match self {
            Stance::Attack => ENEMY_SPEED,
            Stance::Flee => -ENEMY_SPEED,
            Stance::Defend => (distance_px - DEFEND_RANGE) * DEFEND_GAIN,
        }
    }
}

/// Map a pixel distance onto the `Distance` universe.
pub fn distance_from_pixels(px: f64) -> f64 {
    (px / PIXELS_PER_UNIT).min(10.0)
}

fn scale(name: &str, low: &str, mid: &str, high: &str, shapes: [[f64; 4]; 3]) -> VariableTable {
    VariableTable::new(name, 0.0, 10.0, 1.0)
        .term(low, shapes[0])
        .term(mid, shapes[1])
        .term(high, shapes[2])
}

pub fn combat_table() -> SystemTable {
    let health = [
        [0.0, 0.0, 3.0, 5.0],
        [4.0, 5.0, 6.0, 7.0],
        [6.0, 7.0, 10.0, 10.0],
    ];
    let distance = scale(
        DISTANCE,
        "Near",
        "Medium",
        "Far",
        [
            [0.0, 0.0, 2.0, 5.0],
            [3.0, 5.0, 6.0, 8.0],
            [6.0, 8.0, 10.0, 10.0],
        ],
    );

    let d = |l: &str| term(DISTANCE, l);
    let p = |l: &str| term(PLAYER_HEALTH, l);
    let e = |l: &str| term(ENEMY_HEALTH, l);

    let rules = vec![
        RuleTable::new(d("Near") & e("Low"), "Flee"),
        RuleTable::new(d("Near") & p("Low"), "Flee"),
        RuleTable::new(d("Medium") & e("Medium"), "Defend"),
        RuleTable::new(d("Far") & e("Medium"), "Defend"),
        RuleTable::new(d("Medium") & p("Medium"), "Defend"),
        RuleTable::new(d("Near") & p("High") & e("High"), "Attack"),
        RuleTable::new(d("Near") & p("Low") & e("High"), "Attack"),
        RuleTable::new(d("Medium") & p("High") & e("High"), "Attack"),
        RuleTable::new(d("Far") & p("High") & e("High"), "Attack"),
    ];

    SystemTable {
        inputs: vec![
            distance,
            scale(PLAYER_HEALTH, "Low", "Medium", "High", health),
            scale(ENEMY_HEALTH, "Low", "Medium", "High", health),
        ],
        output: VariableTable::new(ACTION, 0.0, 2.0, 1.0)
            .term("Flee", [0.0, 0.0, 0.0, 1.0])
            .term("Defend", [0.0, 1.0, 1.0, 2.0])
            .term("Attack", [1.0, 2.0, 2.0, 2.0]),
        rules,
    }
}

pub fn combat_controller() -> Result<InferenceSystem, ConfigError> {
    combat_table().build()
}

/// Strongest stance for the given situation.
///
/// Ties resolve Attack first, then Flee, then Defend, so a situation where
/// no rule fires at all yields Attack.
pub fn decide_stance(
    system: &InferenceSystem,
    distance: f64,
    player_health: f64,
    enemy_health: f64,
) -> Result<Stance, InferenceError> {
    let strengths = system.label_strengths(&[distance, player_health, enemy_health])?;
    let of = |label: &str| {
        strengths
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(0.0, |&(_, s)| s)
    };
    let (flee, defend, attack) = (of("Flee"), of("Defend"), of("Attack"));
    Ok(if attack >= defend && attack >= flee {
        Stance::Attack
    } else if flee >= defend {
        Stance::Flee
    } else {
        Stance::Defend
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(d: f64, p: f64, e: f64) -> Stance {
        decide_stance(&combat_controller().unwrap(), d, p, e).unwrap()
    }

    #[test]
    fn weak_and_close_flees() {
        assert_eq!(decide(1.0, 2.0, 2.0), Stance::Flee);
    }

    #[test]
    fn strong_and_close_attacks() {
        assert_eq!(decide(1.0, 9.0, 9.0), Stance::Attack);
    }

    #[test]
    fn middling_at_medium_range_defends() {
        assert_eq!(decide(5.5, 5.5, 5.5), Stance::Defend);
    }

    #[test]
    fn nothing_fires_resolves_to_attack() {
        let sys = combat_controller().unwrap();
        let s = sys.label_strengths(&[10.0, 2.0, 9.0]).unwrap();
        assert!(s.iter().all(|&(_, v)| v == 0.0), "{s:?}");
        assert_eq!(decide(10.0, 2.0, 9.0), Stance::Attack);
    }

    #[test]
    fn pixel_distance_is_capped() {
        assert_eq!(distance_from_pixels(80.0), 2.0);
        assert_eq!(distance_from_pixels(4000.0), 10.0);
    }

    #[test]
    fn defend_holds_range() {
        assert_eq!(Stance::Defend.approach_speed(DEFEND_RANGE), 0.0);
        assert!(Stance::Defend.approach_speed(300.0) > 0.0);
        assert!(Stance::Defend.approach_speed(50.0) < 0.0);
        assert_eq!(Stance::Flee.approach_speed(50.0), -ENEMY_SPEED);
    }
}
