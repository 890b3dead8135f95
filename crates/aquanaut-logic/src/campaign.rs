//! Training stages in campaign order and their fixed parameters.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::buoyancy_drill::BuoyancyDrill;
use crate::controller::BallastPolicy;
use crate::hatch_drill::HatchDrill;
use crate::mission::Mission;
use crate::repair_drill::RepairDrill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    BuoyancyTraining,
    ExternalRepair,
    HatchIngress,
}

impl StageId {
    pub const ALL: [StageId; 3] = [
        StageId::BuoyancyTraining,
        StageId::ExternalRepair,
        StageId::HatchIngress,
    ];

    /// The stage that follows this one, or `None` after the last.
    pub fn next(self) -> Option<StageId> {
        match self {
            StageId::BuoyancyTraining => Some(StageId::ExternalRepair),
            StageId::ExternalRepair => Some(StageId::HatchIngress),
            StageId::HatchIngress => None,
        }
    }

    /// Parse `"stage1"`, `"stage2"` or `"stage3"`.
    pub fn from_name(name: &str) -> Option<StageId> {
        match name {
            "stage1" => Some(StageId::BuoyancyTraining),
            "stage2" => Some(StageId::ExternalRepair),
            "stage3" => Some(StageId::HatchIngress),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageId::BuoyancyTraining => "stage1",
            StageId::ExternalRepair => "stage2",
            StageId::HatchIngress => "stage3",
        }
    }

    /// HUD heading.
    pub fn title(self) -> &'static str {
        match self {
            StageId::BuoyancyTraining => "Training Stage",
            StageId::ExternalRepair => "External Wall Repair Training",
            StageId::HatchIngress => "Hatch Ingress Training",
        }
    }

    /// Spawn head position.
    pub fn spawn(self) -> Vec3 {
        match self {
            StageId::BuoyancyTraining | StageId::HatchIngress => Vec3::new(-1.02, 1.75, 15.06),
            StageId::ExternalRepair => Vec3::new(14.98, 1.75, -29.99),
        }
    }

    pub fn ballast_policy(self) -> BallastPolicy {
        match self {
            StageId::BuoyancyTraining => BallastPolicy::Unbounded,
            StageId::ExternalRepair | StageId::HatchIngress => BallastPolicy::FloorAtZero,
        }
    }

    /// Fresh mission state machine for this stage.
    pub fn mission(self, seed: u64) -> Box<dyn Mission> {
        match self {
            StageId::BuoyancyTraining => Box::new(BuoyancyDrill::new(seed)),
            StageId::ExternalRepair => Box::new(RepairDrill::default()),
            StageId::HatchIngress => Box::new(HatchDrill::default()),
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
