use std::time::{SystemTime, UNIX_EPOCH};

use crate::milestone::{Milestone, MilestoneType};
use crate::params::UniverseParameters;

#[cfg(feature = "serde")]
use std::io;
#[cfg(feature = "serde")]
use std::path::Path;

/// An ordered sequence of milestones, as generated for one universe.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    milestones: Vec<Milestone>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_milestone(&mut self, milestone: Milestone) {
        self.milestones.push(milestone);
    }

    pub fn clear(&mut self) {
        self.milestones.clear();
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "milestones": self.milestones })
    }

    /// Write the timeline as pretty JSON. Export artifact only; nothing is
    /// read back.
    #[cfg(feature = "serde")]
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, json)
    }
}

/// A named universe with fixed parameters. The timeline is derived from the
/// parameters on demand; nothing about the universe mutates after creation.
#[derive(Debug, Clone)]
pub struct SimulatedUniverse {
    name: String,
    params: UniverseParameters,
    created_at_ms: u64,
}

impl SimulatedUniverse {
    pub fn new(name: impl Into<String>, params: UniverseParameters) -> Self {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::with_created_at(name, params, created_at_ms)
    }

    /// Constructor with an explicit creation instant (unix milliseconds).
    pub fn with_created_at(
        name: impl Into<String>,
        params: UniverseParameters,
        created_at_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            created_at_ms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &UniverseParameters {
        &self.params
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn will_undergo_acceleration(&self) -> bool {
        self.params.dark_energy_density > 0.0
    }

    pub fn will_undergo_rip(&self) -> bool {
        self.params.dark_energy_density > 0.0 && self.params.dark_energy_w < -1.0
    }

    pub fn will_undergo_collapse(&self) -> bool {
        self.params.matter_density + self.params.dark_energy_density > 1.0
            || self.params.dark_energy_density < 0.0
    }

    /// Build the milestone sequence for these parameters, in chronological
    /// construction order, ending in exactly one fate.
    pub fn generate_timeline(&self) -> Timeline {
        let p = &self.params;
        let mut timeline = Timeline::new();

        timeline.add_milestone(Milestone::compute(MilestoneType::BigBang, p));
        timeline.add_milestone(Milestone::compute(MilestoneType::Inflation, p));
        timeline.add_milestone(Milestone::compute(MilestoneType::ParticleEra, p));

        // Nucleosynthesis needs enough surviving baryons.
        if p.matter_antimatter_ratio >= 1e-11 {
            timeline.add_milestone(Milestone::compute(MilestoneType::Nucleosynthesis, p));
        }

        timeline.add_milestone(Milestone::compute(MilestoneType::Recombination, p));
        timeline.add_milestone(Milestone::compute(MilestoneType::DarkAges, p));

        if p.matter_antimatter_ratio >= 1e-11 {
            timeline.add_milestone(Milestone::compute(MilestoneType::FirstStars, p));
        }

        if p.matter_density >= 0.05 {
            timeline.add_milestone(Milestone::compute(MilestoneType::GalaxyFormation, p));
        }

        if self.will_undergo_acceleration() {
            timeline.add_milestone(Milestone::compute(MilestoneType::AcceleratedExpansion, p));
        }

        // Exactly one final fate.
        if self.will_undergo_rip() {
            timeline.add_milestone(Milestone::compute(MilestoneType::BigRip, p));
        } else if self.will_undergo_collapse() {
            timeline.add_milestone(Milestone::compute(MilestoneType::BigCrunch, p));
        } else {
            timeline.add_milestone(Milestone::compute(MilestoneType::HeatDeath, p));
        }

        timeline
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "parameters": self.params,
            "createdAt": self.created_at_ms,
            "milestones": self.generate_timeline().milestones(),
        })
    }

    /// Two-section CSV: a parameter row, then one row per milestone.
    pub fn to_csv(&self) -> String {
        let p = &self.params;
        let mut out = String::new();

        out.push_str(
            "name,matter_density,dark_energy_density,hubble_constant,\
             matter_antimatter_ratio,dark_energy_w,created_at_ms\n",
        );
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_field(&self.name),
            p.matter_density,
            p.dark_energy_density,
            p.hubble_constant,
            p.matter_antimatter_ratio,
            p.dark_energy_w,
            self.created_at_ms,
        ));

        out.push_str("type,timestamp_gyr,description\n");
        for m in self.generate_timeline().milestones() {
            let timestamp = match m.timestamp {
                Some(t) => t.to_string(),
                None => String::new(),
            };
            out.push_str(&format!(
                "{},{},{}\n",
                m.kind.tag(),
                timestamp,
                csv_field(&m.description),
            ));
        }

        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
