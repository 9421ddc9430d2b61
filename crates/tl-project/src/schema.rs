//! Run configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current configuration format version.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub version: u32,
    pub name: String,
    pub parameters: LakeParametersDef,
    /// Presence selects the oxygen variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen: Option<OxygenDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypsography: Option<HypsographyDef>,
    pub forcing: ForcingDef,
    pub initial_state: InitialStateDef,
    pub time_grid: TimeGridDef,
    #[serde(default)]
    pub ice: bool,
    #[serde(default)]
    pub state_check: StateCheckDef,
    #[serde(default)]
    pub diagnostics: DiagnosticsDef,
}

/// The 19 thermal parameters, CGS-day units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LakeParametersDef {
    pub epi_volume_cm3: f64,
    pub hypo_volume_cm3: f64,
    pub thermocline_area_cm2: f64,
    pub thermocline_thickness_cm: f64,
    pub surface_area_cm2: f64,
    pub inflow_temp_c: f64,
    pub inflow_discharge_cm3_per_day: f64,
    pub longwave_reflection: f64,
    pub atm_emissivity_coeff: f64,
    pub stefan_boltzmann: f64,
    pub water_emissivity: f64,
    pub water_density_g_per_cm3: f64,
    pub specific_heat_cal_per_g_c: f64,
    pub bowen_coeff: f64,
    pub richardson_a: f64,
    pub entrainment_c: f64,
    pub gravity: f64,
    pub thermocline_depth_cm: f64,
    #[serde(default = "default_calibration")]
    pub calibration: f64,
}

fn default_calibration() -> f64 {
    1.0
}

impl LakeParametersDef {
    /// Positional parameter vector in model order.
    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.epi_volume_cm3,
            self.hypo_volume_cm3,
            self.thermocline_area_cm2,
            self.thermocline_thickness_cm,
            self.surface_area_cm2,
            self.inflow_temp_c,
            self.inflow_discharge_cm3_per_day,
            self.longwave_reflection,
            self.atm_emissivity_coeff,
            self.stefan_boltzmann,
            self.water_emissivity,
            self.water_density_g_per_cm3,
            self.specific_heat_cal_per_g_c,
            self.bowen_coeff,
            self.richardson_a,
            self.entrainment_c,
            self.gravity,
            self.thermocline_depth_cm,
            self.calibration,
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OxygenDef {
    /// Net ecosystem production (g cm⁻³ d⁻¹ at 20 °C)
    pub nep_rate: f64,
    /// Sediment oxygen demand (g cm⁻² d⁻¹ at 20 °C)
    pub sediment_flux_rate: f64,
    pub sediment_area_cm2: f64,
    pub diffusion_reduction: f64,
    #[serde(default)]
    pub altitude_m: f64,
    pub initial_epi_mg_per_l: f64,
    pub initial_hypo_mg_per_l: f64,
}

impl OxygenDef {
    /// The four oxygen entries that extend the thermal vector.
    pub fn to_vector(&self) -> [f64; 4] {
        [
            self.nep_rate,
            self.sediment_flux_rate,
            self.sediment_area_cm2,
            self.diffusion_reduction,
        ]
    }
}

/// Depth/area curve of the basin. Depths in m from the surface, areas in m².
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HypsographyDef {
    pub depths_m: Vec<f64>,
    pub areas_m2: Vec<f64>,
    pub thermocline_depth_m: f64,
    pub thermocline_thickness_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForcingDef {
    /// CSV file, relative to the configuration file.
    pub path: PathBuf,
    #[serde(default)]
    pub shortwave_units: ShortwaveUnits,
    #[serde(default)]
    pub wind_units: WindUnits,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShortwaveUnits {
    #[default]
    WPerM2,
    CalPerCm2Day,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindUnits {
    #[default]
    MPerS,
    KmPerH,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InitialStateDef {
    pub epilimnion_temp_c: f64,
    pub hypolimnion_temp_c: f64,
}

/// Output times (days).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TimeGridDef {
    Uniform { start: f64, end: f64, step: f64 },
    Explicit { times: Vec<f64> },
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StateCheckDef {
    Off,
    #[default]
    Warn,
    Strict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticsDef {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for DiagnosticsDef {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

impl RunConfig {
    pub fn is_oxygen(&self) -> bool {
        self.oxygen.is_some()
    }

    /// Thermal parameters with any hypsography-derived geometry applied.
    pub fn effective_parameters(&self) -> LakeParametersDef {
        match &self.hypsography {
            Some(h) => h.geometry().apply(self.parameters),
            None => self.parameters,
        }
    }

    /// Full positional parameter vector (19 entries, or 23 with oxygen).
    pub fn parameter_vector(&self) -> Vec<f64> {
        let mut v = self.effective_parameters().to_vector();
        if let Some(o) = &self.oxygen {
            v.extend(o.to_vector());
        }
        v
    }
}
