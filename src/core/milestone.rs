use crate::params::UniverseParameters;
use crate::timefmt::{BILLION, SECONDS_PER_YEAR};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sentinel timestamp for events that never happen in a given universe.
pub const DOES_NOT_OCCUR: f64 = -1.0;

/// Nominal heat-death epoch in Gyr.
pub const HEAT_DEATH_GYR: f64 = 1e100;

/// The closed set of cosmological events a timeline can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MilestoneType {
    BigBang,
    Inflation,
    ParticleEra,
    Nucleosynthesis,
    Recombination,
    DarkAges,
    FirstStars,
    GalaxyFormation,
    AcceleratedExpansion,
    BigRip,
    HeatDeath,
    BigCrunch,
}

impl MilestoneType {
    pub const ALL: [MilestoneType; 12] = [
        MilestoneType::BigBang,
        MilestoneType::Inflation,
        MilestoneType::ParticleEra,
        MilestoneType::Nucleosynthesis,
        MilestoneType::Recombination,
        MilestoneType::DarkAges,
        MilestoneType::FirstStars,
        MilestoneType::GalaxyFormation,
        MilestoneType::AcceleratedExpansion,
        MilestoneType::BigRip,
        MilestoneType::HeatDeath,
        MilestoneType::BigCrunch,
    ];

    /// Wire tag, as emitted to and accepted from clients.
    pub fn tag(self) -> &'static str {
        match self {
            MilestoneType::BigBang => "BIG_BANG",
            MilestoneType::Inflation => "INFLATION",
            MilestoneType::ParticleEra => "PARTICLE_ERA",
            MilestoneType::Nucleosynthesis => "NUCLEOSYNTHESIS",
            MilestoneType::Recombination => "RECOMBINATION",
            MilestoneType::DarkAges => "DARK_AGES",
            MilestoneType::FirstStars => "FIRST_STARS",
            MilestoneType::GalaxyFormation => "GALAXY_FORMATION",
            MilestoneType::AcceleratedExpansion => "ACCELERATED_EXPANSION",
            MilestoneType::BigRip => "BIG_RIP",
            MilestoneType::HeatDeath => "HEAT_DEATH",
            MilestoneType::BigCrunch => "BIG_CRUNCH",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        MilestoneType::ALL.iter().copied().find(|t| t.tag() == tag)
    }

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            MilestoneType::BigBang => "Big Bang",
            MilestoneType::Inflation => "Inflation",
            MilestoneType::ParticleEra => "Particle Era",
            MilestoneType::Nucleosynthesis => "Nucleosynthesis",
            MilestoneType::Recombination => "Recombination",
            MilestoneType::DarkAges => "Dark Ages",
            MilestoneType::FirstStars => "First Stars",
            MilestoneType::GalaxyFormation => "Galaxy Formation",
            MilestoneType::AcceleratedExpansion => "Accelerated Expansion",
            MilestoneType::BigRip => "Big Rip",
            MilestoneType::HeatDeath => "Heat Death",
            MilestoneType::BigCrunch => "Big Crunch",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MilestoneType::BigBang => "The universe begins in an incredibly hot, dense state",
            MilestoneType::Inflation => "The universe undergoes rapid exponential expansion",
            MilestoneType::ParticleEra => "Formation of quarks and leptons",
            MilestoneType::Nucleosynthesis => {
                "Formation of light elements during Big Bang Nucleosynthesis"
            }
            MilestoneType::Recombination => {
                "The universe becomes transparent as electrons bind to nuclei"
            }
            MilestoneType::DarkAges => {
                "Period before the first stars, universe is dark and filled with hydrogen"
            }
            MilestoneType::FirstStars => {
                "The first stars begin to shine, ending the cosmic dark ages"
            }
            MilestoneType::GalaxyFormation => "Galaxies begin to form and cluster",
            MilestoneType::AcceleratedExpansion => {
                "Dark energy becomes dominant, accelerating cosmic expansion"
            }
            MilestoneType::BigRip => "Universe undergoes a Big Rip due to phantom dark energy",
            MilestoneType::HeatDeath => "Universe approaches heat death",
            MilestoneType::BigCrunch => "Universe collapses in a Big Crunch",
        }
    }

    pub fn asset_id(self) -> &'static str {
        match self {
            MilestoneType::BigBang => "big_bang_01",
            MilestoneType::Inflation => "inflation_01",
            MilestoneType::ParticleEra => "particle_era_01",
            MilestoneType::Nucleosynthesis => "nucleosynthesis_01",
            MilestoneType::Recombination => "recombination_01",
            MilestoneType::DarkAges => "dark_ages_01",
            MilestoneType::FirstStars => "first_stars_01",
            MilestoneType::GalaxyFormation => "galaxy_formation_01",
            MilestoneType::AcceleratedExpansion => "acceleration_01",
            MilestoneType::BigRip => "big_rip_01",
            MilestoneType::HeatDeath => "heat_death_01",
            MilestoneType::BigCrunch => "big_crunch_01",
        }
    }

    /// When this event happens in a universe with the given parameters,
    /// in Gyr. Returns [`DOES_NOT_OCCUR`] when the parameters rule it out.
    pub fn timestamp_gyr(self, p: &UniverseParameters) -> f64 {
        match self {
            MilestoneType::BigBang => 0.0,

            // Inflation ends at ~1e-49 Gyr regardless of parameters.
            MilestoneType::Inflation => 1e-49,

            // Quarks and leptons condense around 1e-6 s after the Big Bang.
            MilestoneType::ParticleEra => 1e-6 / (SECONDS_PER_YEAR * BILLION),

            // BBN at roughly three minutes, ~1e-13 Gyr.
            MilestoneType::Nucleosynthesis => 1e-13,

            MilestoneType::Recombination => {
                // Baseline 380,000 years, shifted by matter density with a
                // weak quarter-power dependence.
                let base_years = 380_000.0;
                let matter_density = p.matter_density.max(0.01);
                let scale = (0.3 / matter_density).powf(0.25);
                base_years * scale / BILLION
            }

            // The dark ages begin right after recombination.
            MilestoneType::DarkAges => MilestoneType::Recombination.timestamp_gyr(p),

            MilestoneType::FirstStars => {
                if p.matter_antimatter_ratio < 1e-15 {
                    // Too little surviving baryonic matter for stars.
                    return DOES_NOT_OCCUR;
                }

                let base_gyr = 0.2;
                let dark_matter_effect = if p.dark_matter_ratio < 0.01 {
                    // Without dark matter halos, collapse is badly delayed.
                    2.5
                } else {
                    (p.dark_matter_ratio / 0.25).powf(-0.3)
                };
                let matter_density_effect = (p.matter_density / 0.3).powf(-0.3);
                base_gyr * dark_matter_effect * matter_density_effect
            }

            MilestoneType::GalaxyFormation => {
                // No galaxies without stars.
                if MilestoneType::FirstStars.timestamp_gyr(p) < 0.0 {
                    return DOES_NOT_OCCUR;
                }

                let base_gyr = 0.4;
                let dark_matter_effect = if p.dark_matter_ratio < 0.01 {
                    2.5
                } else {
                    (p.dark_matter_ratio / 0.25).powf(-0.2)
                };
                let matter_density_effect = (p.matter_density / 0.3).powf(-0.2);
                base_gyr * dark_matter_effect * matter_density_effect
            }

            MilestoneType::AcceleratedExpansion => {
                if p.dark_energy_density <= 0.0 {
                    return DOES_NOT_OCCUR;
                }
                let base_gyr = 3.0;
                let density_effect = (0.7 / p.dark_energy_density).powf(0.2);
                base_gyr * density_effect
            }

            MilestoneType::BigRip => {
                // Requires phantom dark energy: w < -1 with positive density.
                if p.dark_energy_w >= -1.0 || p.dark_energy_density <= 0.0 {
                    return DOES_NOT_OCCUR;
                }
                let base_gyr = 20.0;
                let w_effect = (-p.dark_energy_w / 1.2).powf(-0.5);
                base_gyr * w_effect
            }

            MilestoneType::BigCrunch => {
                let total_density = p.matter_density + p.dark_energy_density;
                let has_dark_energy = p.dark_energy_density > 0.0;
                let is_closed = total_density > 1.0;

                // Strongly matter-dominated universes recollapse on a fixed
                // nominal timescale.
                if p.dark_energy_density < 0.3 && p.matter_density > 1.0 {
                    return 50.0;
                }

                if is_closed && !has_dark_energy {
                    let h0 = p.hubble_constant * 0.001;
                    let density_parameter = total_density - 1.0;
                    return std::f64::consts::PI / (2.0 * h0 * density_parameter.sqrt());
                }

                DOES_NOT_OCCUR
            }

            MilestoneType::HeatDeath => {
                // Only if the universe does not end some other way first.
                if MilestoneType::BigRip.timestamp_gyr(p) > 0.0
                    || MilestoneType::BigCrunch.timestamp_gyr(p) > 0.0
                {
                    return DOES_NOT_OCCUR;
                }
                HEAT_DEATH_GYR
            }
        }
    }
}

/// Resolve an arbitrary wire tag to a display title.
///
/// Total over every input string; tags outside the closed set resolve to
/// "Unknown Milestone" so renderers never fail on unexpected data.
pub fn milestone_title(tag: &str) -> &'static str {
    match MilestoneType::from_tag(tag) {
        Some(t) => t.title(),
        None => "Unknown Milestone",
    }
}

/// One timestamped event in a universe's history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Milestone {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: MilestoneType,
    pub timestamp: Option<f64>,
    pub description: String,
    #[cfg_attr(feature = "serde", serde(rename = "assetId"))]
    pub asset_id: String,
}

impl Milestone {
    /// Build the milestone of `kind` for a concrete universe.
    pub fn compute(kind: MilestoneType, params: &UniverseParameters) -> Self {
        Self {
            kind,
            timestamp: Some(kind.timestamp_gyr(params)),
            description: kind.description().to_string(),
            asset_id: kind.asset_id().to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn occurs(&self) -> bool {
        timestamp_occurs(self.timestamp)
    }
}

/// The validity predicate shared by every renderer: a timestamp counts only
/// when it is present, not NaN and non-negative.
pub fn timestamp_occurs(timestamp: Option<f64>) -> bool {
    matches!(timestamp, Some(t) if !t.is_nan() && t >= 0.0)
}

/// Stable filter over a milestone sequence, keeping only events that occur.
/// Order is preserved; the result is built fresh on every call.
pub fn valid_milestones(milestones: &[Milestone]) -> Vec<&Milestone> {
    milestones.iter().filter(|m| m.occurs()).collect()
}
