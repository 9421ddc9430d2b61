//! Parameter vectors of the thermal and oxygen variants.
//!
//! Units follow the model's centimetre-gram-day convention: volumes in cm³,
//! areas in cm², heat in calories, time in days.

use crate::error::{LakeError, LakeResult};

/// The 19 constants of the thermal variant, in parameter-vector order.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalParams {
    /// Epilimnion volume (cm³)
    pub epi_volume: f64,
    /// Hypolimnion volume (cm³)
    pub hypo_volume: f64,
    /// Thermocline area (cm²)
    pub thermocline_area: f64,
    /// Thermocline thickness (cm)
    pub thermocline_thickness: f64,
    /// Lake surface area (cm²)
    pub surface_area: f64,
    /// Inflow water temperature (°C)
    pub inflow_temp: f64,
    /// Inflow discharge (cm³/d)
    pub inflow_discharge: f64,
    /// Longwave reflection coefficient
    pub longwave_reflection: f64,
    /// Atmospheric emissivity coefficient (0.5 to 0.7)
    pub atm_emissivity_coeff: f64,
    /// Stefan-Boltzmann constant (cal cm⁻² d⁻¹ K⁻⁴)
    pub stefan_boltzmann: f64,
    /// Emissivity of water
    pub water_emissivity: f64,
    /// Reference water density (g/cm³)
    pub water_density: f64,
    /// Specific heat of water (cal g⁻¹ °C⁻¹)
    pub specific_heat: f64,
    /// Bowen coefficient (mmHg/°C)
    pub bowen_coeff: f64,
    /// Richardson-number constant
    pub richardson_a: f64,
    /// Neutral entrainment constant
    pub entrainment_c: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Thermocline depth (cm)
    pub thermocline_depth: f64,
    /// Entrainment calibration multiplier
    pub calibration: f64,
}

impl ThermalParams {
    pub const LEN: usize = 19;

    pub fn from_vector(v: &[f64]) -> LakeResult<Self> {
        check_len(v, Self::LEN, "thermal")?;
        let params = Self {
            epi_volume: v[0],
            hypo_volume: v[1],
            thermocline_area: v[2],
            thermocline_thickness: v[3],
            surface_area: v[4],
            inflow_temp: v[5],
            inflow_discharge: v[6],
            longwave_reflection: v[7],
            atm_emissivity_coeff: v[8],
            stefan_boltzmann: v[9],
            water_emissivity: v[10],
            water_density: v[11],
            specific_heat: v[12],
            bowen_coeff: v[13],
            richardson_a: v[14],
            entrainment_c: v[15],
            gravity: v[16],
            thermocline_depth: v[17],
            calibration: v[18],
        };
        params.validate()?;
        Ok(params)
    }

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.epi_volume,
            self.hypo_volume,
            self.thermocline_area,
            self.thermocline_thickness,
            self.surface_area,
            self.inflow_temp,
            self.inflow_discharge,
            self.longwave_reflection,
            self.atm_emissivity_coeff,
            self.stefan_boltzmann,
            self.water_emissivity,
            self.water_density,
            self.specific_heat,
            self.bowen_coeff,
            self.richardson_a,
            self.entrainment_c,
            self.gravity,
            self.thermocline_depth,
            self.calibration,
        ]
    }

    /// Reject values that would make the flux balance divide by zero.
    pub fn validate(&self) -> LakeResult<()> {
        check_finite(&self.to_vector())?;
        require_positive(self.epi_volume, "epilimnion volume")?;
        require_positive(self.hypo_volume, "hypolimnion volume")?;
        require_positive(self.thermocline_thickness, "thermocline thickness")?;
        require_positive(self.thermocline_depth, "thermocline depth")?;
        require_positive(self.water_density, "water density")?;
        require_positive(self.specific_heat, "specific heat")?;
        Ok(())
    }

    /// Heating rate (°C/d) produced by a unit surface heat flux.
    #[inline]
    pub fn surface_heating_factor(&self) -> f64 {
        self.surface_area / (self.epi_volume * self.water_density * self.specific_heat)
    }
}

/// The 23 constants of the oxygen variant: the thermal ones followed by the
/// four oxygen-budget terms.
#[derive(Clone, Debug, PartialEq)]
pub struct OxygenParams {
    pub thermal: ThermalParams,
    /// Net ecosystem production at 20 °C (g cm⁻³ d⁻¹)
    pub nep_rate: f64,
    /// Sediment oxygen demand at 20 °C (g cm⁻² d⁻¹)
    pub sediment_flux_rate: f64,
    /// Sediment area (cm²)
    pub sediment_area: f64,
    /// Divides the heat entrainment rate to give the oxygen exchange rate
    pub diffusion_reduction: f64,
}

impl OxygenParams {
    pub const LEN: usize = 23;

    pub fn from_vector(v: &[f64]) -> LakeResult<Self> {
        check_len(v, Self::LEN, "oxygen")?;
        let thermal = ThermalParams::from_vector(&v[..ThermalParams::LEN])?;
        let params = Self {
            thermal,
            nep_rate: v[19],
            sediment_flux_rate: v[20],
            sediment_area: v[21],
            diffusion_reduction: v[22],
        };
        params.validate()?;
        Ok(params)
    }

    pub fn to_vector(&self) -> Vec<f64> {
        let mut v = self.thermal.to_vector();
        v.extend([
            self.nep_rate,
            self.sediment_flux_rate,
            self.sediment_area,
            self.diffusion_reduction,
        ]);
        v
    }

    pub fn validate(&self) -> LakeResult<()> {
        self.thermal.validate()?;
        check_finite(&[
            self.nep_rate,
            self.sediment_flux_rate,
            self.sediment_area,
            self.diffusion_reduction,
        ])?;
        require_positive(self.diffusion_reduction, "diffusion reduction factor")
    }
}

fn check_len(v: &[f64], expected: usize, variant: &str) -> LakeResult<()> {
    if v.len() != expected {
        return Err(LakeError::InvalidParameters {
            reason: format!(
                "{variant} model takes {expected} parameters, got {}",
                v.len()
            ),
        });
    }
    Ok(())
}

fn check_finite(v: &[f64]) -> LakeResult<()> {
    match v.iter().position(|x| !x.is_finite()) {
        Some(i) => Err(LakeError::InvalidParameters {
            reason: format!("parameter {} is not finite ({})", i + 1, v[i]),
        }),
        None => Ok(()),
    }
}

fn require_positive(v: f64, what: &str) -> LakeResult<()> {
    if v > 0.0 {
        Ok(())
    } else {
        Err(LakeError::InvalidParameters {
            reason: format!("{what} must be positive, got {v}"),
        })
    }
}
