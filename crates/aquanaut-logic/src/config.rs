//! Physical constants for the hydrodynamic movement model.
//!
//! A stage builds one [`HydroConfig`] when it starts and never mutates it.
//! The defaults describe a suited astronaut in a training pool; every field
//! can be overridden from a partial JSON document, since all structs use
//! `#[serde(default)]`.
//!
//! ```
//! use aquanaut_logic::config::{validate_config, HydroConfig};
//!
//! let config = HydroConfig::from_json(r#"{ "motion": { "thrust_n": 150.0 } }"#).unwrap();
//! assert_eq!(config.motion.thrust_n, 150.0);
//! assert_eq!(config.motion.vmax_fwd, 1.5);
//! assert!(validate_config(&config).is_empty());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fresh water density used by the training pool (kg/m³).
pub const WATER_DENSITY: f32 = 998.2;
/// Standard gravity (m/s²).
pub const GRAVITY: f32 = 9.81;
/// Sea-level atmospheric pressure (Pa).
pub const SURFACE_PRESSURE: f32 = 101_325.0;
/// Ballast values below this are treated as this value.
pub const BALLAST_FLOOR: i32 = -10;

/// Parameters of the procedural ambient current.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConfig {
    /// Steady current speed (m/s).
    pub base: f32,
    /// Amplitude of the sinusoidal gust added to `base` (m/s).
    pub gust: f32,
    /// Gust frequency (Hz).
    pub freq: f32,
    /// Spatial scale applied to world coordinates before sampling noise.
    pub noise_scale: f32,
    /// Amplitude of the perpendicular swirl term (m/s).
    pub swirl: f32,
    /// Distance from a wall over which the current fades out (world units).
    pub wall_dampen_dist: f32,
}

impl Default for CurrentConfig {
    fn default() -> Self {
        Self {
            base: 0.12,
            gust: 0.1,
            freq: 0.03,
            noise_scale: 0.18,
            swirl: 0.07,
            wall_dampen_dist: 1.0,
        }
    }
}

impl CurrentConfig {
    /// A current field that is zero everywhere.
    pub fn still() -> Self {
        Self {
            base: 0.0,
            gust: 0.0,
            swirl: 0.0,
            ..Default::default()
        }
    }
}

/// Constants for the horizontal (X/Z) integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub rho: f32,
    pub g: f32,
    /// Reference mass when the caller supplies no override (kg).
    pub mass: f32,
    /// Displaced volume used for added mass (m³).
    pub vol: f32,
    pub cd_fwd: f32,
    pub area_fwd: f32,
    pub cd_side: f32,
    pub area_side: f32,
    pub ca_fwd: f32,
    pub ca_side: f32,
    /// Peak propulsion force (N).
    pub thrust_n: f32,
    /// Thrust multiplier while the boost key is held.
    pub accel_boost: f32,
    /// Time constant of the thrust spool-up (s).
    pub thrust_rise_tau: f32,
    /// Speeds below this are snapped to zero (m/s).
    pub deadband_v: f32,
    pub current: CurrentConfig,
    /// Extra drag per rad/s of yaw rate.
    pub turn_damp_k: f32,
    pub vmax_fwd: f32,
    pub vmax_side: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rho: WATER_DENSITY,
            g: GRAVITY,
            mass: 114.0,
            vol: 0.09,
            cd_fwd: 0.9,
            area_fwd: 0.35,
            cd_side: 1.2,
            area_side: 0.55,
            ca_fwd: 0.15,
            ca_side: 0.25,
            thrust_n: 200.0,
            accel_boost: 1.6,
            thrust_rise_tau: 0.05,
            deadband_v: 0.001,
            current: CurrentConfig::default(),
            turn_damp_k: 0.6,
            vmax_fwd: 1.5,
            vmax_side: 1.1,
        }
    }
}

/// Constants for the vertical (buoyancy) integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalConfig {
    pub rho: f32,
    pub g: f32,
    pub astronaut_mass: f32,
    pub suit_mass: f32,
    pub equipment_mass: f32,
    /// Mass added per ballast unit (kg).
    pub ballast_step_kg: f32,
    /// Volume of the body and suit shell (m³).
    pub rigid_volume: f32,
    /// Buoyancy-compensator gas volume at the surface (L).
    pub bc_gas_liters_surface: f32,
    pub lung_tidal_liters: f32,
    pub lung_reserve_liters: f32,
    /// Upper bound of the random reserve contribution, as a fraction of `lung_reserve_liters`.
    pub lung_reserve_fraction: f32,
    pub breath_hz: f32,
    pub breath_var: f32,
    pub breath_amplitude_neutral: f32,
    pub breath_amplitude_moving: f32,
    /// Horizontal speed at which breathing switches to the moving amplitude (m/s).
    pub breath_moving_speed: f32,
    /// Pressure at the water surface (Pa).
    pub p_surface: f32,
    pub water_surface_y: f32,
    pub meters_per_world_unit: f32,
    pub pool_depth_m: f32,
    pub cd_vert: f32,
    pub area_vert: f32,
    pub ca_vert: f32,
    /// Static force band treated as neutrally buoyant (N).
    pub neutral_force_n: f32,
    /// Speed below which neutral settling applies (m/s).
    pub neutral_speed_eps: f32,
    /// Velocity multiplier applied while settling at neutral trim.
    pub neutral_settle: f32,
    /// Amplitude of the micro-current disturbance (N).
    pub micro_current_n: f32,
    /// Constant trim force added to the net force (N).
    pub neutral_trim_n: f32,
}

impl Default for VerticalConfig {
    fn default() -> Self {
        Self {
            rho: WATER_DENSITY,
            g: GRAVITY,
            astronaut_mass: 78.0,
            suit_mass: 127.0,
            equipment_mass: 6.0,
            ballast_step_kg: 1.0,
            rigid_volume: 0.195,
            bc_gas_liters_surface: 25.0,
            lung_tidal_liters: 0.6,
            lung_reserve_liters: 2.0,
            lung_reserve_fraction: 0.15,
            breath_hz: 0.25,
            breath_var: 0.05,
            breath_amplitude_neutral: 1.0,
            breath_amplitude_moving: 0.55,
            breath_moving_speed: 0.15,
            p_surface: SURFACE_PRESSURE,
            water_surface_y: 6.0,
            meters_per_world_unit: 1.0,
            pool_depth_m: 12.2,
            cd_vert: 1.0,
            area_vert: 0.35,
            ca_vert: 0.18,
            neutral_force_n: 3.0,
            neutral_speed_eps: 0.01,
            neutral_settle: 0.3,
            micro_current_n: 0.08,
            neutral_trim_n: 0.0,
        }
    }
}

impl VerticalConfig {
    /// Body, suit and equipment mass without ballast (kg).
    pub fn base_mass(&self) -> f32 {
        self.astronaut_mass + self.suit_mass + self.equipment_mass
    }

    /// Mass including `ballast` units, with the ballast floor applied (kg).
    pub fn total_mass(&self, ballast: i32) -> f32 {
        self.base_mass() + ballast.max(BALLAST_FLOOR) as f32 * self.ballast_step_kg
    }
}

/// Full configuration for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydroConfig {
    pub motion: MotionConfig,
    pub vertical: VerticalConfig,
    /// Ballast units the session starts with.
    pub initial_ballast: i32,
}

impl Default for HydroConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            vertical: VerticalConfig::default(),
            initial_ballast: -5,
        }
    }
}

impl HydroConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: HydroConfig =
            serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))?;
        let errors = validate_config(&config);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(LoadError::Invalid(errors))
        }
    }

    /// Set fluid density and gravity on both integrators at once.
    pub fn with_fluid(mut self, rho: f32, g: f32) -> Self {
        self.motion.rho = rho;
        self.motion.g = g;
        self.vertical.rho = rho;
        self.vertical.g = g;
        self
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A constant that must be strictly positive is not (field name, value).
    NotPositive(&'static str, f32),
    /// A constant that must be zero or greater is negative (field name, value).
    Negative(&'static str, f32),
    /// A constant is NaN or infinite.
    NotFinite(&'static str),
    /// Horizontal and vertical configs disagree on fluid density or gravity.
    FluidMismatch,
    /// Ballast floor would drive total mass to zero or below.
    MassNotPositive(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPositive(name, v) => write!(f, "{name} must be > 0 (got {v})"),
            ConfigError::Negative(name, v) => write!(f, "{name} must be >= 0 (got {v})"),
            ConfigError::NotFinite(name) => write!(f, "{name} is not finite"),
            ConfigError::FluidMismatch => {
                write!(f, "motion and vertical configs use different rho/g")
            }
            ConfigError::MassNotPositive(m) => {
                write!(f, "minimum total mass is {m} kg at the ballast floor")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure to load a configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The document is not valid JSON for [`HydroConfig`].
    Parse(String),
    /// The document parsed but failed validation.
    Invalid(Vec<ConfigError>),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(msg) => write!(f, "config parse error: {msg}"),
            LoadError::Invalid(errors) => {
                write!(f, "invalid config:")?;
                for e in errors {
                    write!(f, " {e};")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LoadError {}

fn check_positive(errors: &mut Vec<ConfigError>, name: &'static str, v: f32) {
    if !v.is_finite() {
        errors.push(ConfigError::NotFinite(name));
    } else if v <= 0.0 {
        errors.push(ConfigError::NotPositive(name, v));
    }
}

fn check_non_negative(errors: &mut Vec<ConfigError>, name: &'static str, v: f32) {
    if !v.is_finite() {
        errors.push(ConfigError::NotFinite(name));
    } else if v < 0.0 {
        errors.push(ConfigError::Negative(name, v));
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &HydroConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let m = &config.motion;
    let v = &config.vertical;

    check_positive(&mut errors, "motion.rho", m.rho);
    check_positive(&mut errors, "motion.g", m.g);
    check_positive(&mut errors, "motion.mass", m.mass);
    check_non_negative(&mut errors, "motion.vol", m.vol);
    check_non_negative(&mut errors, "motion.cd_fwd", m.cd_fwd);
    check_non_negative(&mut errors, "motion.area_fwd", m.area_fwd);
    check_non_negative(&mut errors, "motion.cd_side", m.cd_side);
    check_non_negative(&mut errors, "motion.area_side", m.area_side);
    check_non_negative(&mut errors, "motion.ca_fwd", m.ca_fwd);
    check_non_negative(&mut errors, "motion.ca_side", m.ca_side);
    check_non_negative(&mut errors, "motion.thrust_n", m.thrust_n);
    check_positive(&mut errors, "motion.accel_boost", m.accel_boost);
    check_positive(&mut errors, "motion.thrust_rise_tau", m.thrust_rise_tau);
    check_non_negative(&mut errors, "motion.deadband_v", m.deadband_v);
    check_non_negative(&mut errors, "motion.turn_damp_k", m.turn_damp_k);
    check_positive(&mut errors, "motion.vmax_fwd", m.vmax_fwd);
    check_positive(&mut errors, "motion.vmax_side", m.vmax_side);
    check_non_negative(&mut errors, "motion.current.base", m.current.base);
    check_non_negative(&mut errors, "motion.current.gust", m.current.gust);
    check_non_negative(&mut errors, "motion.current.freq", m.current.freq);
    check_positive(&mut errors, "motion.current.noise_scale", m.current.noise_scale);
    check_non_negative(&mut errors, "motion.current.swirl", m.current.swirl);
    check_non_negative(
        &mut errors,
        "motion.current.wall_dampen_dist",
        m.current.wall_dampen_dist,
    );

    check_positive(&mut errors, "vertical.rho", v.rho);
    check_positive(&mut errors, "vertical.g", v.g);
    check_non_negative(&mut errors, "vertical.astronaut_mass", v.astronaut_mass);
    check_non_negative(&mut errors, "vertical.suit_mass", v.suit_mass);
    check_non_negative(&mut errors, "vertical.equipment_mass", v.equipment_mass);
    check_non_negative(&mut errors, "vertical.ballast_step_kg", v.ballast_step_kg);
    check_positive(&mut errors, "vertical.rigid_volume", v.rigid_volume);
    check_non_negative(&mut errors, "vertical.bc_gas_liters_surface", v.bc_gas_liters_surface);
    check_non_negative(&mut errors, "vertical.lung_tidal_liters", v.lung_tidal_liters);
    check_non_negative(&mut errors, "vertical.lung_reserve_liters", v.lung_reserve_liters);
    check_non_negative(&mut errors, "vertical.lung_reserve_fraction", v.lung_reserve_fraction);
    check_non_negative(&mut errors, "vertical.breath_hz", v.breath_hz);
    check_non_negative(&mut errors, "vertical.breath_var", v.breath_var);
    check_positive(&mut errors, "vertical.p_surface", v.p_surface);
    check_positive(&mut errors, "vertical.meters_per_world_unit", v.meters_per_world_unit);
    check_non_negative(&mut errors, "vertical.pool_depth_m", v.pool_depth_m);
    check_non_negative(&mut errors, "vertical.cd_vert", v.cd_vert);
    check_non_negative(&mut errors, "vertical.area_vert", v.area_vert);
    check_non_negative(&mut errors, "vertical.ca_vert", v.ca_vert);
    check_non_negative(&mut errors, "vertical.neutral_force_n", v.neutral_force_n);
    check_non_negative(&mut errors, "vertical.neutral_speed_eps", v.neutral_speed_eps);
    check_non_negative(&mut errors, "vertical.neutral_settle", v.neutral_settle);

    if m.rho != v.rho || m.g != v.g {
        errors.push(ConfigError::FluidMismatch);
    }

    let min_mass = v.total_mass(BALLAST_FLOOR);
    if min_mass.is_finite() && min_mass <= 0.0 {
        errors.push(ConfigError::MassNotPositive(min_mass));
    }

    errors
}
