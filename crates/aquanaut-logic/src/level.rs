//! Level geometry: water bounds and hazard boxes derived from mesh descriptions.
//!
//! The host exports each mesh of the loaded scene as a [`LevelMesh`]
//! (name, material, user-data tags, world AABB). [`Level::from_meshes`]
//! classifies them once when a stage starts:
//! - the mesh named `water` gives the swim rectangle and head-height range
//! - meshes tagged as spaceship become hazard boxes
//! - collider helper meshes are listed so the host can hide them

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{Aabb, HorizontalBounds, VerticalBounds};

/// Inset applied to the water box on every side.
pub const PAD: f32 = 0.01;

const WATER_NAME: &str = "water";
const HAZARD_TAG: &str = "spaceship";

/// One mesh of the level scene, in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMesh {
    pub name: String,
    #[serde(default)]
    pub material: Option<String>,
    /// Free-form user-data string (`userData.uv`).
    #[serde(default)]
    pub uv: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Explicit collider flag from user data.
    #[serde(default)]
    pub collider: bool,
    pub min: Vec3,
    pub max: Vec3,
}

impl LevelMesh {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }

    pub fn is_collider(&self) -> bool {
        let name = self.name.to_lowercase();
        self.collider
            || name.contains("collision")
            || name.contains("collider")
            || name.starts_with("col_")
    }

    pub fn is_water(&self) -> bool {
        self.name.eq_ignore_ascii_case(WATER_NAME)
    }

    pub fn is_hazard(&self) -> bool {
        let tagged = |s: &Option<String>| {
            s.as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(HAZARD_TAG))
        };
        self.name.to_lowercase().contains(HAZARD_TAG)
            || self
                .material
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains(HAZARD_TAG))
            || tagged(&self.uv)
            || tagged(&self.tag)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    /// The mesh list is empty, so no bounds can be derived.
    Empty,
    /// The level document could not be parsed.
    Parse(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Empty => write!(f, "level has no meshes"),
            LevelError::Parse(msg) => write!(f, "level parse error: {msg}"),
        }
    }
}

impl std::error::Error for LevelError {}

/// Read-only geometry for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub xz: HorizontalBounds,
    pub head: VerticalBounds,
    pub hazards: Vec<Aabb>,
    /// Names of collider helper meshes the host should hide.
    pub colliders: Vec<String>,
    /// False when the water mesh was missing and the scene union was used.
    pub has_water: bool,
}

impl Level {
    /// Classify `meshes`; `head_offset` is the distance from capsule
    /// center to head.
    pub fn from_meshes(meshes: &[LevelMesh], head_offset: f32) -> Result<Level, LevelError> {
        let first = meshes.first().ok_or(LevelError::Empty)?;

        let water = meshes.iter().find(|m| m.is_water());
        let water_box = match water {
            Some(mesh) => mesh.aabb(),
            None => {
                log::warn!("no 'water' mesh in level; using scene bounds");
                meshes
                    .iter()
                    .skip(1)
                    .fold(first.aabb(), |acc, m| acc.union(&m.aabb()))
            }
        };

        let xz = HorizontalBounds {
            min_x: water_box.min.x + PAD,
            max_x: water_box.max.x - PAD,
            min_z: water_box.min.z + PAD,
            max_z: water_box.max.z - PAD,
        };
        let head = VerticalBounds {
            min_y: water_box.min.y + PAD + head_offset,
            max_y: water_box.max.y - PAD,
        };

        let hazards: Vec<Aabb> = meshes
            .iter()
            .filter(|m| m.is_hazard())
            .map(LevelMesh::aabb)
            .collect();
        let colliders: Vec<String> = meshes
            .iter()
            .filter(|m| m.is_collider())
            .map(|m| m.name.clone())
            .collect();

        log::debug!(
            "level: {} meshes, {} hazards, {} colliders",
            meshes.len(),
            hazards.len(),
            colliders.len()
        );

        Ok(Level {
            xz,
            head,
            hazards,
            colliders,
            has_water: water.is_some(),
        })
    }

    /// Parse a JSON array of [`LevelMesh`] and classify it.
    pub fn from_json(json: &str, head_offset: f32) -> Result<Level, LevelError> {
        let meshes: Vec<LevelMesh> =
            serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))?;
        Level::from_meshes(&meshes, head_offset)
    }

    /// Open rectangular pool with no hazards; handy for tests and demos.
    pub fn open_pool(xz: HorizontalBounds, head: VerticalBounds) -> Level {
        Level {
            xz,
            head,
            hazards: Vec::new(),
            colliders: Vec::new(),
            has_water: true,
        }
    }
}
