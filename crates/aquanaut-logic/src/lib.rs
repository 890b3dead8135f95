//! Pure simulation logic for the aquanaut neutral-buoyancy trainer.
//!
//! This crate contains the swimming physics and training-stage logic,
//! independent of any renderer, scene graph, or input system. The host feeds
//! it camera direction, key events and frame time; it returns positions,
//! velocities and HUD text.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`buoyancy_drill`] | Stage 1 mission: ascend, descend, hold neutral |
//! | [`campaign`] | Stage ids, order, spawn points and ballast policies |
//! | [`collision`] | Water-box clamping and axis-separated hazard blocking |
//! | [`config`] | Physical constants, JSON loading, validation |
//! | [`controller`] | Aquatic player controller shared by every stage |
//! | [`current`] | Procedural ambient current with wall damping |
//! | [`hatch_drill`] | Stage 3 mission: briefing, handle hold, hatch ingress |
//! | [`horizontal`] | X/Z thrust, drag, added mass and speed caps |
//! | [`hud`] | HUD snapshot and plain-text rendering |
//! | [`input`] | Key codes and movement commands |
//! | [`level`] | Water bounds, hazard and collider classification from meshes |
//! | [`mission`] | Mission trait and instruction-text helpers |
//! | [`noise`] | Deterministic 2D value noise |
//! | [`presets`] | EMU suit / NBL pool vertical configuration |
//! | [`repair_drill`] | Stage 2 mission: reach the ring, repair, countdown |
//! | [`session`] | Per-stage mutable state read by the HUD |
//! | [`stage`] | Running stage: controller + mission + session |
//! | [`vertical`] | Buoyancy, breathing, pressure and vertical drag |

pub mod buoyancy_drill;
pub mod campaign;
pub mod collision;
pub mod config;
pub mod controller;
pub mod current;
pub mod hatch_drill;
pub mod horizontal;
pub mod hud;
pub mod input;
pub mod level;
pub mod mission;
pub mod noise;
pub mod presets;
pub mod repair_drill;
pub mod session;
pub mod stage;
pub mod vertical;
