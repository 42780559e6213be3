use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The knobs a universe is created with.
///
/// Densities are in units of the critical density, the Hubble constant in
/// km/s/Mpc. The last two fields are not exposed on the creation form and
/// keep their defaults unless set explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct UniverseParameters {
    /// Ω_m, total matter density.
    pub matter_density: f64,
    /// Ω_Λ, dark energy density.
    pub dark_energy_density: f64,
    /// H₀ in km/s/Mpc.
    pub hubble_constant: f64,
    /// η, baryon-to-photon ratio.
    pub matter_antimatter_ratio: f64,
    /// w, dark energy equation of state. -1 is a cosmological constant.
    pub dark_energy_w: f64,
    /// Fraction of matter that is dark.
    pub dark_matter_ratio: f64,
    pub initial_energy_density: f64,
}

impl Default for UniverseParameters {
    fn default() -> Self {
        Self {
            matter_density: 0.3,
            dark_energy_density: 0.7,
            hubble_constant: 70.0,
            matter_antimatter_ratio: 1e-9,
            dark_energy_w: -1.0,
            dark_matter_ratio: 0.25,
            initial_energy_density: 1.0,
        }
    }
}

impl UniverseParameters {
    pub fn new(
        matter_density: f64,
        dark_energy_density: f64,
        hubble_constant: f64,
        matter_antimatter_ratio: f64,
        dark_energy_w: f64,
    ) -> Self {
        Self {
            matter_density,
            dark_energy_density,
            hubble_constant,
            matter_antimatter_ratio,
            dark_energy_w,
            ..Self::default()
        }
    }

    /// Check the creation-form parameters against their physical ranges.
    /// First violation wins.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.matter_density < 0.1 || self.matter_density > 2.0 {
            return Err(ParameterError::MatterDensity);
        }
        if self.dark_energy_density < 0.0 || self.dark_energy_density > 1.0 {
            return Err(ParameterError::DarkEnergyDensity);
        }
        if self.hubble_constant < 50.0 || self.hubble_constant > 80.0 {
            return Err(ParameterError::HubbleConstant);
        }
        if self.matter_antimatter_ratio < 1e-11 || self.matter_antimatter_ratio > 1e-7 {
            return Err(ParameterError::MatterAntimatterRatio);
        }
        if self.dark_energy_w < -2.0 || self.dark_energy_w > -0.5 {
            return Err(ParameterError::DarkEnergyW);
        }

        // Allow 10% deviation from a flat universe.
        let total_density = self.matter_density + self.dark_energy_density;
        if (total_density - 1.0).abs() > 0.1 {
            return Err(ParameterError::TotalDensity);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Matter density must be between 0.1 and 2.0")]
    MatterDensity,
    #[error("Dark energy density must be between 0.0 and 1.0")]
    DarkEnergyDensity,
    #[error("Hubble constant must be between 50 and 80 km/s/Mpc")]
    HubbleConstant,
    #[error("Matter/antimatter ratio must be between 1e-11 and 1e-7")]
    MatterAntimatterRatio,
    #[error("Dark energy w must be between -2.0 and -0.5")]
    DarkEnergyW,
    #[error("Total density (matter + dark energy) should be approximately 1.0")]
    TotalDensity,
}
