//! Aquanaut Headless Simulation Harness
//!
//! Validates the swimming physics and runs every training stage with a
//! scripted pilot. Runs entirely in-process, no renderer and no input devices.
//!
//! Usage:
//!   cargo run -p aquanaut-simtest
//!   cargo run -p aquanaut-simtest -- --verbose
//!   cargo run -p aquanaut-simtest -- --config my_config.json --level my_level.json
//!   cargo run -p aquanaut-simtest -- --stage stage2 --seed 7
//!   cargo run -p aquanaut-simtest -- --preset emu
//!
//! `RUST_LOG=info` shows mission phase changes as they happen.

use aquanaut_logic::campaign::StageId;
use aquanaut_logic::collision::{block_by_hazards, Aabb, VerticalBounds};
use aquanaut_logic::config::{validate_config, CurrentConfig, HydroConfig, MotionConfig};
use aquanaut_logic::controller::constants::{PLAYER_HEIGHT, PLAYER_RADIUS};
use aquanaut_logic::hatch_drill::constants::PORTAL_POS;
use aquanaut_logic::horizontal::{HorizontalInput, HorizontalIntegrator};
use aquanaut_logic::input::{Key, MoveKeys};
use aquanaut_logic::level::Level;
use aquanaut_logic::mission::MissionStatus;
use aquanaut_logic::presets::{emu_nbl_hydro_config, EmuNblOptions};
use aquanaut_logic::repair_drill::constants::RING_POS;
use aquanaut_logic::stage::Stage;
use aquanaut_logic::vertical::{VerticalInput, VerticalIntegrator};
use clap::{Parser, ValueEnum};
use glam::{Vec2, Vec3};
use std::path::{Path, PathBuf};

// ── Bundled data (overridable with --config / --level) ──────────────────
const CONFIG_JSON: &str = include_str!("../../../data/hydro_config.json");
const LEVEL_JSON: &str = include_str!("../../../data/pool_level.json");

const DT: f32 = 1.0 / 60.0;
const HEAD_OFFSET: f32 = PLAYER_HEIGHT * 0.5;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Parser, Debug)]
#[command(version, about = "Headless validation harness for the aquanaut trainer", long_about = None)]
struct Args {
    /// Print every check, phase changes and the final HUD of each stage.
    #[arg(short, long)]
    verbose: bool,

    /// Hydro config JSON; defaults to the bundled data/hydro_config.json.
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Level mesh JSON; defaults to the bundled data/pool_level.json.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Run only this stage (stage1, stage2 or stage3).
    #[arg(long, value_parser = parse_stage)]
    stage: Option<StageId>,

    /// Seed for breathing, micro-current and drill targets.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Use a built-in config preset instead of a JSON file.
    #[arg(long, value_enum)]
    preset: Option<Preset>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// EMU suit in the NBL pool.
    Emu,
}

fn parse_stage(name: &str) -> Result<StageId, String> {
    StageId::from_name(name)
        .ok_or_else(|| format!("unknown stage '{name}', expected stage1, stage2 or stage3"))
}

fn read_or_bundled(path: Option<&Path>, bundled: &str) -> Result<String, String> {
    match path {
        Some(p) => std::fs::read_to_string(p).map_err(|e| format!("{}: {e}", p.display())),
        None => Ok(bundled.to_string()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = Args::parse();
    println!("=== Aquanaut Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    let config = load_config(&opts, &mut results);

    // 2. Level geometry
    let level = load_level(&opts, &mut results);

    if let (Some(config), Some(level)) = (config, level) {
        // 3. Horizontal integrator sweeps
        results.extend(validate_horizontal(&config, opts.verbose));

        // 4. Vertical integrator sweeps
        results.extend(validate_vertical(&config, opts.verbose));

        // 5. Hazard blocking
        results.extend(validate_collision(&level, opts.verbose));

        // 6. Scripted stage runs
        results.extend(run_campaign(&config, &level, &opts));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
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

// ── 1. Configuration ────────────────────────────────────────────────────

fn load_config(opts: &Args, results: &mut Vec<TestResult>) -> Option<HydroConfig> {
    println!("--- Configuration ---");

    if opts.preset == Some(Preset::Emu) {
        let config = emu_nbl_hydro_config(&EmuNblOptions::default());
        let errors = validate_config(&config);
        results.push(TestResult {
            name: "config_emu_preset_valid".into(),
            passed: errors.is_empty(),
            detail: format!(
                "rho {} kg/m³, base mass {:.1} kg, {} errors",
                config.vertical.rho,
                config.vertical.base_mass(),
                errors.len()
            ),
        });
        return errors.is_empty().then_some(config);
    }

    let json = match read_or_bundled(opts.config.as_deref(), CONFIG_JSON) {
        Ok(j) => j,
        Err(e) => {
            results.push(TestResult {
                name: "config_read".into(),
                passed: false,
                detail: e,
            });
            return None;
        }
    };

    match HydroConfig::from_json(&json) {
        Ok(config) => {
            results.push(TestResult {
                name: "config_valid".into(),
                passed: true,
                detail: format!(
                    "thrust {} N, vmax {}/{} m/s, initial ballast {}",
                    config.motion.thrust_n,
                    config.motion.vmax_fwd,
                    config.motion.vmax_side,
                    config.initial_ballast
                ),
            });
            if opts.config.is_none() {
                results.push(TestResult {
                    name: "config_bundled_matches_defaults".into(),
                    passed: config == HydroConfig::default(),
                    detail: "data/hydro_config.json vs HydroConfig::default()".into(),
                });
            }
            Some(config)
        }
        Err(e) => {
            results.push(TestResult {
                name: "config_valid".into(),
                passed: false,
                detail: e.to_string(),
            });
            None
        }
    }
}

// ── 2. Level ────────────────────────────────────────────────────────────

fn load_level(opts: &Args, results: &mut Vec<TestResult>) -> Option<Level> {
    println!("--- Level ---");

    let level = read_or_bundled(opts.level.as_deref(), LEVEL_JSON)
        .and_then(|json| Level::from_json(&json, HEAD_OFFSET).map_err(|e| e.to_string()));
    let level = match level {
        Ok(l) => l,
        Err(e) => {
            results.push(TestResult {
                name: "level_parse".into(),
                passed: false,
                detail: e,
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "level_has_water".into(),
        passed: level.has_water,
        detail: format!(
            "x [{:.2}, {:.2}] z [{:.2}, {:.2}] head [{:.3}, {:.3}]",
            level.xz.min_x,
            level.xz.max_x,
            level.xz.min_z,
            level.xz.max_z,
            level.head.min_y,
            level.head.max_y
        ),
    });

    results.push(TestResult {
        name: "level_head_range_ordered".into(),
        passed: level.head.min_y < level.head.max_y,
        detail: format!("{:.3} < {:.3}", level.head.min_y, level.head.max_y),
    });

    results.push(TestResult {
        name: "level_hazards".into(),
        passed: !level.hazards.is_empty(),
        detail: format!(
            "{} hazard boxes, {} colliders hidden",
            level.hazards.len(),
            level.colliders.len()
        ),
    });

    Some(level)
}

// ── 3. Horizontal ───────────────────────────────────────────────────────

fn calm_motion(config: &HydroConfig) -> MotionConfig {
    MotionConfig {
        current: CurrentConfig::still(),
        ..config.motion
    }
}

fn validate_horizontal(config: &HydroConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Horizontal Integrator ---");
    let mut results = Vec::new();

    // Speed caps under full boosted thrust while turning.
    let mut swim = HorizontalIntegrator::new(config.motion);
    let keys = MoveKeys::with(&[Key::KeyW, Key::KeyD, Key::ShiftLeft]);
    let mut worst_fwd = 0.0f32;
    let mut worst_side = 0.0f32;
    for i in 0..3600 {
        let yaw = i as f32 * 0.01;
        let forward = Vec3::new(yaw.sin(), 0.0, -yaw.cos());
        swim.step(&HorizontalInput {
            dt: DT,
            forward,
            position: Vec2::new(yaw.cos() * 5.0, yaw.sin() * 5.0),
            keys: &keys,
            eff_mass: None,
            t: i as f32 * DT,
            bounds: None,
        });
        let fwd = Vec2::new(forward.x, forward.z);
        let right = Vec2::new(-forward.z, forward.x);
        worst_fwd = worst_fwd.max(swim.velocity().dot(fwd).abs());
        worst_side = worst_side.max(swim.velocity().dot(right).abs());
    }
    results.push(TestResult {
        name: "horizontal_speed_caps".into(),
        passed: worst_fwd <= config.motion.vmax_fwd + 1e-4
            && worst_side <= config.motion.vmax_side + 1e-4,
        detail: format!("max fwd {:.3} m/s, max side {:.3} m/s", worst_fwd, worst_side),
    });

    // Coasting without current settles to exactly zero.
    let mut swim = HorizontalIntegrator::new(calm_motion(config));
    swim.set_velocity(Vec2::new(config.motion.vmax_side, 0.0));
    let idle = MoveKeys::new();
    let mut steps = 0u32;
    while swim.velocity() != Vec2::ZERO && steps < 200_000 {
        swim.step(&HorizontalInput {
            dt: DT,
            forward: Vec3::NEG_Z,
            position: Vec2::ZERO,
            keys: &idle,
            eff_mass: None,
            t: 0.0,
            bounds: None,
        });
        steps += 1;
    }
    if verbose {
        println!("  dead-band reached after {} steps", steps);
    }
    results.push(TestResult {
        name: "horizontal_deadband_stop".into(),
        passed: swim.velocity() == Vec2::ZERO,
        detail: format!(
            "stopped after {} steps ({:.0} s simulated)",
            steps,
            steps as f32 * DT
        ),
    });

    // Degenerate camera and bad dt never produce NaN.
    let mut swim = HorizontalIntegrator::new(config.motion);
    let w = MoveKeys::with(&[Key::KeyW]);
    let bad = [
        (Vec3::Y, DT),
        (Vec3::ZERO, 0.0),
        (Vec3::new(f32::NAN, 0.0, 1.0), -1.0),
        (Vec3::NEG_Y, f32::INFINITY),
    ];
    let all_finite = bad.iter().all(|&(forward, dt)| {
        swim.step(&HorizontalInput {
            dt,
            forward,
            position: Vec2::ZERO,
            keys: &w,
            eff_mass: Some(0.0),
            t: 0.0,
            bounds: None,
        })
        .is_finite()
    });
    results.push(TestResult {
        name: "horizontal_degenerate_inputs".into(),
        passed: all_finite,
        detail: "vertical camera, zero/negative/infinite dt, zero mass".into(),
    });

    results
}

// ── 4. Vertical ─────────────────────────────────────────────────────────

fn validate_vertical(config: &HydroConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Vertical Integrator ---");
    let mut results = Vec::new();
    let bounds = VerticalBounds {
        min_y: 1.75,
        max_y: 11.95,
    };

    // Reference scenario: default trim at the surface barely moves.
    let mut v = VerticalIntegrator::new(config.vertical, 1);
    let s = v.step_y(&VerticalInput {
        dt: DT,
        y: 6.0,
        vy: 0.0,
        ballast: -5,
        bounds,
        speed_xz: 0.0,
        t: 0.0,
    });
    results.push(TestResult {
        name: "vertical_reference_scenario".into(),
        passed: (s.new_y - 6.0).abs() < 0.005 && s.new_vy.abs() < 0.02,
        detail: format!(
            "y {:.5}, vy {:+.5}, B {:.1} N, W {:.1} N",
            s.new_y, s.new_vy, s.buoyancy, s.weight
        ),
    });

    // Bounds hold and vy is zero at a bound, over a ballast sweep.
    let mut violations = 0;
    let mut nonzero_at_bound = 0;
    for ballast in (-20..=40).step_by(5) {
        let mut y = bounds.mid();
        let mut vy = 0.0;
        for i in 0..1200 {
            let s = v.step_y(&VerticalInput {
                dt: DT,
                y,
                vy,
                ballast,
                bounds,
                speed_xz: 0.0,
                t: i as f32 * DT,
            });
            if s.new_y < bounds.min_y || s.new_y > bounds.max_y {
                violations += 1;
            }
            if (s.new_y == bounds.min_y || s.new_y == bounds.max_y) && s.new_vy != 0.0 {
                nonzero_at_bound += 1;
            }
            y = s.new_y;
            vy = s.new_vy;
        }
        if verbose {
            println!("  ballast {:+3}: settled at y = {:.2}", ballast, y);
        }
    }
    results.push(TestResult {
        name: "vertical_bounds_sweep".into(),
        passed: violations == 0 && nonzero_at_bound == 0,
        detail: format!(
            "{} out-of-range, {} non-zero vy at a bound",
            violations, nonzero_at_bound
        ),
    });

    // Heavy ballast sinks from rest.
    let s = v.step_y(&VerticalInput {
        dt: DT,
        y: 6.0,
        vy: 0.0,
        ballast: 20,
        bounds,
        speed_xz: 0.0,
        t: 0.0,
    });
    results.push(TestResult {
        name: "vertical_heavy_sinks".into(),
        passed: s.new_vy < 0.0,
        detail: format!("ballast +20: vy {:+.4} m/s", s.new_vy),
    });

    // Trimmed neutral holds still.
    let mut quiet = config.vertical;
    quiet.lung_tidal_liters = 0.0;
    quiet.lung_reserve_liters = 0.0;
    quiet.micro_current_n = 0.0;
    let probe = VerticalIntegrator::new(quiet, 0).step_y(&VerticalInput {
        dt: DT,
        y: 4.0,
        vy: 0.0,
        ballast: 0,
        bounds,
        speed_xz: 0.0,
        t: 0.0,
    });
    quiet.neutral_trim_n = -probe.net_force;
    let mut v = VerticalIntegrator::new(quiet, 0);
    let (mut y, mut vy, mut max_vy) = (4.0f32, 0.0f32, 0.0f32);
    for i in 0..600 {
        let s = v.step_y(&VerticalInput {
            dt: DT,
            y,
            vy,
            ballast: 0,
            bounds,
            speed_xz: 0.0,
            t: i as f32 * DT,
        });
        y = s.new_y;
        vy = s.new_vy;
        max_vy = max_vy.max(vy.abs());
    }
    results.push(TestResult {
        name: "vertical_neutral_trim_holds".into(),
        passed: max_vy < quiet.neutral_speed_eps,
        detail: format!("trim {:+.2} N, max |vy| {:.2e} m/s", quiet.neutral_trim_n, max_vy),
    });

    results
}

// ── 5. Collision ────────────────────────────────────────────────────────

fn validate_collision(level: &Level, verbose: bool) -> Vec<TestResult> {
    println!("--- Hazard Blocking ---");
    let mut results = Vec::new();

    let expanded: Vec<Aabb> = level
        .hazards
        .iter()
        .map(|b| b.expand(PLAYER_RADIUS, HEAD_OFFSET))
        .collect();

    // March straight at every hazard face, one axis at a time.
    let mut trials = 0;
    let mut inside = 0;
    for (hazard, grown) in level.hazards.iter().zip(&expanded) {
        let c = hazard.center();
        for axis in 0..3 {
            for sign in [-1.0f32, 1.0] {
                let mut dir = Vec3::ZERO;
                dir[axis] = sign;
                let mut start = c;
                start[axis] = if sign < 0.0 {
                    grown.max[axis] + 0.5
                } else {
                    grown.min[axis] - 0.5
                };
                if expanded.iter().any(|b| b.contains_strict(start)) {
                    continue;
                }
                let mut cur = start;
                for _ in 0..100 {
                    let proposed = cur + dir * 0.05;
                    cur = block_by_hazards(cur, proposed, &level.hazards, PLAYER_RADIUS, HEAD_OFFSET);
                    trials += 1;
                    if expanded.iter().any(|b| b.contains_strict(cur)) {
                        inside += 1;
                    }
                }
            }
        }
    }
    if verbose {
        println!("  {} blocked steps checked", trials);
    }
    results.push(TestResult {
        name: "collision_single_axis_never_inside".into(),
        passed: inside == 0,
        detail: format!("{} of {} steps ended inside a hazard", inside, trials),
    });

    results
}

// ── 6. Scripted stage runs ──────────────────────────────────────────────

/// Press E/R toward `goal` one unit per frame.
fn trim_ballast(stage: &mut Stage, goal: i32) {
    let ballast = stage.session().ballast;
    if goal < ballast {
        stage.key_down(Key::KeyE);
        stage.key_up(Key::KeyE);
    } else if goal > ballast {
        stage.key_down(Key::KeyR);
        stage.key_up(Key::KeyR);
    }
}

/// Ballast that would bring vy to `desired_vy` within about a second.
fn ballast_for(stage: &Stage, config: &HydroConfig, desired_vy: f32) -> Option<i32> {
    let tick = stage.last_tick()?;
    let v = &config.vertical;
    let vy = stage.controller().vy();
    let m_eff = tick.vertical.total_mass + v.ca_vert * v.rho * v.rigid_volume;
    let drag = 0.5 * v.rho * v.cd_vert * v.area_vert * vy.abs() * vy;
    let weight = tick.vertical.buoyancy - drag - m_eff * (desired_vy - vy);
    let units = (weight / v.g - v.base_mass()) / v.ballast_step_kg.max(1e-3);
    Some(units.round().clamp(-10.0, 60.0) as i32)
}

/// Steer toward `goal` on the water plane: W to speed up, S to brake.
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

/// Fly the buoyancy drill with ballast alone, holding station on X/Z.
fn pilot_buoyancy(stage: &mut Stage, config: &HydroConfig) -> Vec3 {
    let station = stage.id().spawn();
    let forward = steer(stage, Vec2::new(station.x, station.z));

    let y = stage.controller().head().y;
    let target = stage.session().target.map_or(y, |t| t.y);
    let desired = match stage.phase_name() {
        "ascend" if y < target - 0.5 => 0.3,
        "ascend" if y < target + 0.25 => 0.12,
        "ascend" => -0.3,
        "descend" if y > target + 0.5 => -0.3,
        "descend" if y > target - 0.25 => -0.12,
        "descend" => 0.3,
        _ => (0.8 * (target - y)).clamp(-0.15, 0.15),
    };
    if let Some(goal) = ballast_for(stage, config, desired) {
        trim_ballast(stage, goal);
    }
    forward
}

/// Sink to the floor, swim the east lane past the hull, repair at the ring.
fn pilot_repair(stage: &mut Stage, waypoint: &mut usize) -> Vec3 {
    trim_ballast(stage, 5);
    let route = [Vec2::new(14.5, 8.0), Vec2::new(RING_POS.x, RING_POS.z)];
    let head = stage.controller().head();
    if *waypoint == 0 && Vec2::new(head.x, head.z).distance(route[0]) < 1.0 {
        *waypoint = 1;
    }
    let forward = steer(stage, route[*waypoint]);
    if *waypoint == 1
        && stage.phase_name() == "approach"
        && horizontal_distance(head, RING_POS) < 0.8
    {
        stage.key_down(Key::KeyF);
        stage.key_up(Key::KeyF);
    }
    forward
}

/// Sink to the floor, hold near the portal, page the briefing, hold F.
fn pilot_hatch(stage: &mut Stage, holding: &mut bool) -> Vec3 {
    trim_ballast(stage, 5);
    let head = stage.controller().head();
    let forward = steer(stage, Vec2::new(PORTAL_POS.x, PORTAL_POS.z));
    let near = horizontal_distance(head, PORTAL_POS) < 1.2;
    match stage.phase_name() {
        "idle" | "purpose" | "context" | "checklist" if near => {
            stage.key_down(Key::KeyF);
            stage.key_up(Key::KeyF);
        }
        "handle" if near && !*holding => {
            stage.key_down(Key::KeyF);
            *holding = true;
        }
        "opening" | "ingress" if *holding => {
            stage.key_up(Key::KeyF);
            *holding = false;
        }
        _ => {}
    }
    forward
}

fn run_stage(id: StageId, config: &HydroConfig, level: &Level, seed: u64, verbose: bool) -> TestResult {
    let mut stage = Stage::new(id, config, level.clone(), seed);
    let limit = 600.0;
    let mut waypoint = 0;
    let mut holding = false;
    let mut last_phase = stage.phase_name();
    let mut status = MissionStatus::InProgress;
    let mut frames = 0u32;

    while (frames as f32) * DT < limit {
        let forward = match id {
            StageId::BuoyancyTraining => pilot_buoyancy(&mut stage, config),
            StageId::ExternalRepair => pilot_repair(&mut stage, &mut waypoint),
            StageId::HatchIngress => pilot_hatch(&mut stage, &mut holding),
        };
        status = stage.frame(DT, forward);
        frames += 1;

        if verbose && stage.phase_name() != last_phase {
            let hud = stage.hud();
            println!(
                "  [{:7.2} s] {} → {} at ({:.2}, {:.2}, {:.2}) ballast {}",
                hud.elapsed,
                last_phase,
                hud.phase,
                hud.position.x,
                hud.position.y,
                hud.position.z,
                hud.ballast
            );
            last_phase = stage.phase_name();
        }
        if status == MissionStatus::Complete {
            break;
        }
    }

    if verbose {
        let hud = stage.hud();
        for line in hud.lines() {
            println!("    | {}", line);
        }
        match serde_json::to_string(&hud) {
            Ok(json) => println!("    {}", json),
            Err(e) => log::warn!("hud snapshot not serializable: {e}"),
        }
    }

    TestResult {
        name: format!("{}_complete", id.name()),
        passed: status == MissionStatus::Complete,
        detail: format!(
            "{} in phase '{}' after {:.1} s simulated",
            id.title(),
            stage.phase_name(),
            frames as f32 * DT
        ),
    }
}

fn run_campaign(config: &HydroConfig, level: &Level, opts: &Args) -> Vec<TestResult> {
    println!("--- Training Stages ---");
    let mut results = Vec::new();

    let mut next = Some(opts.stage.unwrap_or(StageId::BuoyancyTraining));
    while let Some(id) = next {
        if opts.verbose {
            println!(" {}: {}", id.name(), id.title());
        }
        let result = run_stage(id, config, level, opts.seed, opts.verbose);
        let passed = result.passed;
        results.push(result);
        next = match (opts.stage, passed) {
            (None, true) => id.next(),
            _ => None,
        };
    }

    results
}
