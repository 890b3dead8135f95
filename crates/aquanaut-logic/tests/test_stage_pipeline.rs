//! Integration tests for the stage pipeline.
//!
//! Exercises: level JSON → Level → HydroConfig → Stage (controller + mission)
//! → HUD, using the bundled data files.
//!
//! All tests are pure logic, no renderer and no real input devices.

use aquanaut_logic::campaign::StageId;
use aquanaut_logic::collision::Aabb;
use aquanaut_logic::config::{validate_config, HydroConfig};
use aquanaut_logic::controller::constants::{PLAYER_HEIGHT, PLAYER_RADIUS};
use aquanaut_logic::input::Key;
use aquanaut_logic::level::Level;
use aquanaut_logic::mission::MissionStatus;
use aquanaut_logic::repair_drill::constants::RING_POS;
use aquanaut_logic::stage::Stage;
use glam::{Vec2, Vec3};

const LEVEL_JSON: &str = include_str!("../../../data/pool_level.json");
const CONFIG_JSON: &str = include_str!("../../../data/hydro_config.json");
const DT: f32 = 1.0 / 60.0;

// ── Helpers ────────────────────────────────────────────────────────────

fn bundled_level() -> Level {
    Level::from_json(LEVEL_JSON, PLAYER_HEIGHT * 0.5).expect("bundled level parses")
}

fn bundled_config() -> HydroConfig {
    HydroConfig::from_json(CONFIG_JSON).expect("bundled config parses")
}

fn expanded_hazards(level: &Level) -> Vec<Aabb> {
    level
        .hazards
        .iter()
        .map(|b| b.expand(PLAYER_RADIUS, PLAYER_HEIGHT * 0.5))
        .collect()
}

/// Steer toward `goal` (X, Z) on the water plane with a simple speed
/// controller: W to speed up, S to brake.
fn steer(stage: &mut Stage, goal: Vec2) -> Vec3 {
    let head = stage.controller().head();
    let to = goal - Vec2::new(head.x, head.z);
    let dist = to.length();
    if dist < 1e-3 {
        stage.key_up(Key::KeyW);
        stage.key_up(Key::KeyS);
        return Vec3::NEG_Z;
    }
    let dir = to / dist;
    let along = stage.controller().velocity().dot(dir);
    let desired = (0.6 * dist).min(1.2);
    if along < desired - 0.05 {
        stage.key_up(Key::KeyS);
        stage.key_down(Key::KeyW);
    } else if along > desired + 0.05 {
        stage.key_up(Key::KeyW);
        stage.key_down(Key::KeyS);
    } else {
        stage.key_up(Key::KeyW);
        stage.key_up(Key::KeyS);
    }
    Vec3::new(dir.x, 0.0, dir.y)
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

// ── Bundled data ───────────────────────────────────────────────────────

#[test]
fn bundled_level_has_water_and_hazards() {
    let level = bundled_level();
    assert!(level.has_water);
    assert!((level.xz.min_x - (-17.99)).abs() < 1e-4);
    assert!((level.xz.max_z - 21.99).abs() < 1e-4);
    assert!((level.head.max_y - 11.95).abs() < 1e-4);
    assert_eq!(level.hazards.len(), 3, "hull, side panel, antenna");
    assert_eq!(level.colliders, vec!["col_pool_edge", "Hull_Collider"]);
}

#[test]
fn bundled_config_matches_defaults() {
    let config = bundled_config();
    assert_eq!(config, HydroConfig::default());
    assert!(validate_config(&config).is_empty());
}

#[test]
fn spawn_points_are_clear_of_hazards() {
    let level = bundled_level();
    let hazards = expanded_hazards(&level);
    for id in StageId::ALL {
        let stage = Stage::new(id, &bundled_config(), level.clone(), 1);
        let center = stage.controller().center();
        assert!(
            !hazards.iter().any(|b| b.contains_strict(center)),
            "{id} spawns inside a hazard"
        );
    }
}

// ── Physics through the stage ──────────────────────────────────────────

#[test]
fn default_ballast_floats_up() {
    let mut stage = Stage::new(StageId::BuoyancyTraining, &bundled_config(), bundled_level(), 3);
    let start = stage.controller().head().y;
    for _ in 0..600 {
        stage.frame(DT, Vec3::NEG_Z);
    }
    assert!(stage.controller().head().y > start + 0.5);
}

#[test]
fn heavy_ballast_rests_on_camera_floor() {
    let mut stage = Stage::new(StageId::ExternalRepair, &bundled_config(), bundled_level(), 3);
    for _ in 0..10 {
        stage.key_down(Key::KeyR);
        stage.key_up(Key::KeyR);
    }
    assert_eq!(stage.session().ballast, 5);
    for _ in 0..600 {
        stage.frame(DT, Vec3::NEG_Z);
        assert!(stage.controller().head().y >= 1.75);
    }
    assert_eq!(stage.controller().head().y, 1.75);
    assert_eq!(stage.controller().vy(), 0.0);
}

#[test]
fn random_swimming_respects_walls_and_hull() {
    let level = bundled_level();
    let hazards = expanded_hazards(&level);
    let mut stage = Stage::new(StageId::BuoyancyTraining, &bundled_config(), level.clone(), 11);
    let keys = [Key::KeyW, Key::KeyA, Key::KeyD, Key::ShiftLeft];

    for i in 0..6000u32 {
        if i % 90 == 0 {
            let key = keys[(i / 90) as usize % keys.len()];
            stage.clear_keys();
            stage.key_down(key);
            stage.key_down(Key::KeyW);
            if i % 360 == 0 {
                stage.key_down(Key::KeyR);
            }
        }
        let yaw = i as f32 * 0.004;
        stage.frame(DT, Vec3::new(yaw.sin(), 0.2, -yaw.cos()));

        let head = stage.controller().head();
        let center = stage.controller().center();
        assert!(head.x >= level.xz.min_x + PLAYER_RADIUS - 1e-4);
        assert!(head.x <= level.xz.max_x - PLAYER_RADIUS + 1e-4);
        assert!(head.z >= level.xz.min_z + PLAYER_RADIUS - 1e-4);
        assert!(head.z <= level.xz.max_z - PLAYER_RADIUS + 1e-4);
        assert!(head.y >= 1.75 && head.y <= level.head.max_y);
        assert!(!hazards.iter().any(|b| b.contains_strict(center)));
    }
}

// ── Missions through the stage ─────────────────────────────────────────

#[test]
fn repair_stage_runs_to_completion() {
    let mut stage = Stage::new(StageId::ExternalRepair, &bundled_config(), bundled_level(), 5);
    for _ in 0..10 {
        stage.key_down(Key::KeyR);
        stage.key_up(Key::KeyR);
    }

    // Up the east side, clear of the hull, then across to the ring.
    let waypoints = [Vec2::new(14.5, 8.0), Vec2::new(RING_POS.x, RING_POS.z)];
    let mut wp = 0;
    let mut started = false;
    let mut status = MissionStatus::InProgress;

    for _ in 0..(180 * 60) {
        let head = stage.controller().head();
        if wp == 0 && Vec2::new(head.x, head.z).distance(waypoints[0]) < 1.0 {
            wp = 1;
        }
        let forward = steer(&mut stage, waypoints[wp]);
        if !started && wp == 1 && horizontal_distance(head, RING_POS) < 0.8 {
            stage.key_down(Key::KeyF);
            stage.key_up(Key::KeyF);
            started = stage.phase_name() == "repairing";
        }
        status = stage.frame(DT, forward);
        if status == MissionStatus::Complete {
            break;
        }
    }

    assert!(started, "never reached the ring");
    assert_eq!(status, MissionStatus::Complete);
    assert!(stage.is_complete());
    assert_eq!(StageId::ExternalRepair.next(), Some(StageId::HatchIngress));
}

#[test]
fn hatch_stage_hold_opens_portal() {
    use aquanaut_logic::hatch_drill::constants::PORTAL_POS;

    let mut stage = Stage::new(StageId::HatchIngress, &bundled_config(), bundled_level(), 6);
    for _ in 0..10 {
        stage.key_down(Key::KeyR);
        stage.key_up(Key::KeyR);
    }
    let goal = Vec2::new(PORTAL_POS.x, PORTAL_POS.z);
    let mut status = MissionStatus::InProgress;
    let mut holding = false;

    for _ in 0..(180 * 60) {
        let head = stage.controller().head();
        let forward = steer(&mut stage, goal);
        let near = horizontal_distance(head, PORTAL_POS) < 1.2;
        match stage.phase_name() {
            "idle" | "purpose" | "context" | "checklist" if near => {
                stage.key_down(Key::KeyF);
                stage.key_up(Key::KeyF);
            }
            "handle" if near && !holding => {
                stage.key_down(Key::KeyF);
                holding = true;
            }
            "opening" if holding => {
                stage.key_up(Key::KeyF);
                holding = false;
            }
            _ => {}
        }
        status = stage.frame(DT, forward);
        if status == MissionStatus::Complete {
            break;
        }
    }

    assert_eq!(status, MissionStatus::Complete);
    assert!(stage.session().stage_text.starts_with("【INGRESS】"));
    assert_eq!(StageId::HatchIngress.next(), None);
}

#[test]
fn hud_tracks_session_state() {
    let mut stage = Stage::new(StageId::BuoyancyTraining, &bundled_config(), bundled_level(), 8);
    stage.key_down(Key::KeyE);
    stage.frame(DT, Vec3::NEG_Z);
    let hud = stage.hud();
    assert_eq!(hud.ballast, -6);
    assert_eq!(hud.position, stage.session().position);
    assert!(hud.depth_m > 0.0);
    assert!(hud.target_distance.is_some());
    assert!(hud.lines().iter().any(|l| l == "Ballast: -6"));
}
