//! Wire snapshots of registry state.
//!
//! Field names are camelCase and milestone tags SCREAMING_SNAKE, matching
//! what the universe-list UI reads (`matterDensity`, `createdAt`,
//! `milestones[].type`). Snapshots are derived fresh per request.

use serde::{Deserialize, Serialize};

use cosma::milestone::MilestoneType;
use cosma::registry::UniverseId;
use cosma::universe::SimulatedUniverse;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseSnapshot {
    pub id: UniverseId,
    pub name: String,
    pub matter_density: f64,
    pub dark_energy_density: f64,
    pub hubble_constant: f64,
    pub matter_antimatter_ratio: f64,
    pub dark_energy_w: f64,
    pub created_at: u64,
    pub milestones: Vec<MilestoneSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneSnapshot {
    #[serde(rename = "type")]
    pub kind: MilestoneType,
    pub timestamp: Option<f64>,
    pub description: String,
}

impl UniverseSnapshot {
    pub fn capture(id: UniverseId, universe: &SimulatedUniverse) -> Self {
        let p = universe.params();
        let milestones = universe
            .generate_timeline()
            .milestones()
            .iter()
            .map(|m| MilestoneSnapshot {
                kind: m.kind,
                timestamp: m.timestamp,
                description: m.description.clone(),
            })
            .collect();

        Self {
            id,
            name: universe.name().to_string(),
            matter_density: p.matter_density,
            dark_energy_density: p.dark_energy_density,
            hubble_constant: p.hubble_constant,
            matter_antimatter_ratio: p.matter_antimatter_ratio,
            dark_energy_w: p.dark_energy_w,
            created_at: universe.created_at_ms(),
            milestones,
        }
    }
}
