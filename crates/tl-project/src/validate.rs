//! Run configuration validation.

use crate::schema::{
    CONFIG_VERSION, HypsographyDef, LakeParametersDef, OxygenDef, RunConfig, TimeGridDef,
};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, v, "must be finite"))
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    finite(field, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<(), ValidationError> {
    finite(field, v)?;
    if v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must not be negative"))
    }
}

fn strictly_increasing(field: &str, values: &[f64]) -> Result<(), ValidationError> {
    for (i, w) in values.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(invalid(
                &format!("{field}[{}]", i + 1),
                w[1],
                "must be strictly increasing",
            ));
        }
    }
    Ok(())
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    if config.version != CONFIG_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    if config.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }

    validate_parameters(&config.parameters)?;
    if let Some(oxygen) = &config.oxygen {
        validate_oxygen(oxygen)?;
    }
    if let Some(hypsography) = &config.hypsography {
        validate_hypsography(hypsography)?;
    }

    if config.forcing.path.as_os_str().is_empty() {
        return Err(invalid("forcing.path", "", "must not be empty"));
    }

    finite(
        "initial_state.epilimnion_temp_c",
        config.initial_state.epilimnion_temp_c,
    )?;
    finite(
        "initial_state.hypolimnion_temp_c",
        config.initial_state.hypolimnion_temp_c,
    )?;

    validate_time_grid(&config.time_grid)?;

    if config.diagnostics.delimiter.is_ascii_digit() || config.diagnostics.delimiter == '.' {
        return Err(invalid(
            "diagnostics.delimiter",
            config.diagnostics.delimiter,
            "would be ambiguous with numeric values",
        ));
    }
    Ok(())
}

fn validate_parameters(p: &LakeParametersDef) -> Result<(), ValidationError> {
    positive("parameters.epi_volume_cm3", p.epi_volume_cm3)?;
    positive("parameters.hypo_volume_cm3", p.hypo_volume_cm3)?;
    non_negative("parameters.thermocline_area_cm2", p.thermocline_area_cm2)?;
    positive("parameters.thermocline_thickness_cm", p.thermocline_thickness_cm)?;
    non_negative("parameters.surface_area_cm2", p.surface_area_cm2)?;
    finite("parameters.inflow_temp_c", p.inflow_temp_c)?;
    non_negative(
        "parameters.inflow_discharge_cm3_per_day",
        p.inflow_discharge_cm3_per_day,
    )?;
    non_negative("parameters.longwave_reflection", p.longwave_reflection)?;
    finite("parameters.atm_emissivity_coeff", p.atm_emissivity_coeff)?;
    non_negative("parameters.stefan_boltzmann", p.stefan_boltzmann)?;
    non_negative("parameters.water_emissivity", p.water_emissivity)?;
    positive("parameters.water_density_g_per_cm3", p.water_density_g_per_cm3)?;
    positive(
        "parameters.specific_heat_cal_per_g_c",
        p.specific_heat_cal_per_g_c,
    )?;
    finite("parameters.bowen_coeff", p.bowen_coeff)?;
    non_negative("parameters.richardson_a", p.richardson_a)?;
    non_negative("parameters.entrainment_c", p.entrainment_c)?;
    positive("parameters.gravity", p.gravity)?;
    positive("parameters.thermocline_depth_cm", p.thermocline_depth_cm)?;
    non_negative("parameters.calibration", p.calibration)?;
    Ok(())
}

fn validate_oxygen(o: &OxygenDef) -> Result<(), ValidationError> {
    finite("oxygen.nep_rate", o.nep_rate)?;
    non_negative("oxygen.sediment_flux_rate", o.sediment_flux_rate)?;
    non_negative("oxygen.sediment_area_cm2", o.sediment_area_cm2)?;
    positive("oxygen.diffusion_reduction", o.diffusion_reduction)?;
    finite("oxygen.altitude_m", o.altitude_m)?;
    if o.altitude_m >= 44_000.0 {
        return Err(invalid("oxygen.altitude_m", o.altitude_m, "above the barometric formula range"));
    }
    non_negative("oxygen.initial_epi_mg_per_l", o.initial_epi_mg_per_l)?;
    non_negative("oxygen.initial_hypo_mg_per_l", o.initial_hypo_mg_per_l)?;
    Ok(())
}

fn validate_hypsography(h: &HypsographyDef) -> Result<(), ValidationError> {
    if h.depths_m.len() < 2 {
        return Err(invalid(
            "hypsography.depths_m",
            h.depths_m.len(),
            "needs at least two depths",
        ));
    }
    if h.areas_m2.len() != h.depths_m.len() {
        return Err(invalid(
            "hypsography.areas_m2",
            h.areas_m2.len(),
            "must have one area per depth",
        ));
    }
    for (i, &d) in h.depths_m.iter().enumerate() {
        finite(&format!("hypsography.depths_m[{i}]"), d)?;
    }
    for (i, &a) in h.areas_m2.iter().enumerate() {
        non_negative(&format!("hypsography.areas_m2[{i}]"), a)?;
    }
    if h.depths_m[0] != 0.0 {
        return Err(invalid(
            "hypsography.depths_m[0]",
            h.depths_m[0],
            "must start at the surface (0)",
        ));
    }
    strictly_increasing("hypsography.depths_m", &h.depths_m)?;
    positive("hypsography.areas_m2[0]", h.areas_m2[0])?;

    positive("hypsography.thermocline_depth_m", h.thermocline_depth_m)?;
    if h.thermocline_depth_m >= h.max_depth_m() {
        return Err(invalid(
            "hypsography.thermocline_depth_m",
            h.thermocline_depth_m,
            "must lie above the deepest tabulated depth",
        ));
    }
    positive(
        "hypsography.thermocline_thickness_m",
        h.thermocline_thickness_m,
    )?;
    Ok(())
}

fn validate_time_grid(grid: &TimeGridDef) -> Result<(), ValidationError> {
    match grid {
        TimeGridDef::Uniform { start, end, step } => {
            finite("time_grid.start", *start)?;
            finite("time_grid.end", *end)?;
            positive("time_grid.step", *step)?;
            if end < start {
                return Err(invalid("time_grid.end", end, "must not precede start"));
            }
        }
        TimeGridDef::Explicit { times } => {
            if times.is_empty() {
                return Err(invalid("time_grid.times", "[]", "must not be empty"));
            }
            for (i, &t) in times.iter().enumerate() {
                finite(&format!("time_grid.times[{i}]"), t)?;
            }
            strictly_increasing("time_grid.times", times)?;
        }
    }
    Ok(())
}
