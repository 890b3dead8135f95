//! Suit presets for the Neutral Buoyancy Laboratory.
//!
//! Masses follow published EMU figures; the rigid volume defaults to the
//! volume that would make the unballasted suit exactly neutral.

use serde::{Deserialize, Serialize};

use crate::config::{HydroConfig, VerticalConfig, GRAVITY};

/// Density of the NBL pool water (kg/m³).
pub const NBL_WATER_DENSITY: f32 = 996.5;
/// Reference male astronaut mass (kg).
pub const MALE_MASS_KG: f32 = 82.9;
/// ISS EMU with SAFER pack attached (kg).
pub const EMU_ISS_WITH_SAFER_KG: f32 = 145.0;

/// Overrides for [`build_emu_nbl_config`]; `None` keeps the preset value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmuNblOptions {
    pub astronaut_mass: Option<f32>,
    pub suit_mass: Option<f32>,
    pub equipment_mass: Option<f32>,
    pub ballast_step_kg: Option<f32>,
    pub rho: Option<f32>,
    pub g: Option<f32>,
    pub rigid_volume: Option<f32>,
}

/// Build a vertical config for an EMU suit in the NBL pool.
pub fn build_emu_nbl_config(options: &EmuNblOptions) -> VerticalConfig {
    let astronaut_mass = options.astronaut_mass.unwrap_or(MALE_MASS_KG);
    let suit_mass = options.suit_mass.unwrap_or(EMU_ISS_WITH_SAFER_KG);
    let rho = options.rho.unwrap_or(NBL_WATER_DENSITY);

    VerticalConfig {
        rho,
        g: options.g.unwrap_or(GRAVITY),
        astronaut_mass,
        suit_mass,
        equipment_mass: options.equipment_mass.unwrap_or(0.0),
        ballast_step_kg: options.ballast_step_kg.unwrap_or(1.0),
        rigid_volume: options
            .rigid_volume
            .unwrap_or((astronaut_mass + suit_mass) / rho),
        cd_vert: 1.0,
        area_vert: 0.35,
        ca_vert: 0.18,
        ..Default::default()
    }
}

/// Full stage config using the EMU preset, zero initial ballast and the
/// matching fluid constants on the horizontal integrator.
pub fn emu_nbl_hydro_config(options: &EmuNblOptions) -> HydroConfig {
    let vertical = build_emu_nbl_config(options);
    HydroConfig {
        vertical,
        initial_ballast: 0,
        ..Default::default()
    }
    .with_fluid(vertical.rho, vertical.g)
}
