//! tl-project: run configuration format, validation and input files.

pub mod forcing_csv;
pub mod hypsography;
pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};

pub use forcing_csv::{ForcingSeries, load_forcing_csv, parse_forcing_csv};
pub use hypsography::LakeGeometry;
pub use schema::*;
pub use validate::{ValidationError, validate_config};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Forcing file, line {line}: {reason}")]
    ForcingCsv { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<RunConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RunConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_yaml(path: &Path, config: &RunConfig) -> ProjectResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<RunConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RunConfig = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_json(path: &Path, config: &RunConfig) -> ProjectResult<()> {
    validate_config(config)?;
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load_config(path: &Path) -> ProjectResult<RunConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

/// Forcing file location; relative paths are taken from the config's directory.
pub fn resolve_forcing_path(config_path: &Path, config: &RunConfig) -> PathBuf {
    if config.forcing.path.is_absolute() {
        return config.forcing.path.clone();
    }
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&config.forcing.path)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::schema::*;
    use std::path::PathBuf;

    pub fn sample_config() -> RunConfig {
        RunConfig {
            version: CONFIG_VERSION,
            name: "Mendota summer".to_string(),
            parameters: LakeParametersDef {
                epi_volume_cm3: 5e12,
                hypo_volume_cm3: 1e13,
                thermocline_area_cm2: 8e9,
                thermocline_thickness_cm: 100.0,
                surface_area_cm2: 1e10,
                inflow_temp_c: 10.0,
                inflow_discharge_cm3_per_day: 0.0,
                longwave_reflection: 0.03,
                atm_emissivity_coeff: 0.6,
                stefan_boltzmann: 11.7e-8,
                water_emissivity: 0.97,
                water_density_g_per_cm3: 0.9982,
                specific_heat_cal_per_g_c: 0.99,
                bowen_coeff: 0.47,
                richardson_a: 7.0,
                entrainment_c: 9e4,
                gravity: 9.81,
                thermocline_depth_cm: 500.0,
                calibration: 1.0,
            },
            oxygen: Some(OxygenDef {
                nep_rate: 1e-9,
                sediment_flux_rate: 1e-7,
                sediment_area_cm2: 8e9,
                diffusion_reduction: 1.5,
                altitude_m: 259.0,
                initial_epi_mg_per_l: 9.0,
                initial_hypo_mg_per_l: 9.0,
            }),
            hypsography: None,
            forcing: ForcingDef {
                path: PathBuf::from("forcing.csv"),
                shortwave_units: ShortwaveUnits::WPerM2,
                wind_units: WindUnits::MPerS,
            },
            initial_state: InitialStateDef {
                epilimnion_temp_c: 4.0,
                hypolimnion_temp_c: 4.0,
            },
            time_grid: TimeGridDef::Uniform {
                start: 1.0,
                end: 10.0,
                step: 1.0,
            },
            ice: false,
            state_check: StateCheckDef::Warn,
            diagnostics: DiagnosticsDef::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_config;
    use super::*;

    #[test]
    fn parameter_vector_lengths() {
        let mut c = sample_config();
        assert_eq!(c.parameter_vector().len(), 23);
        c.oxygen = None;
        assert_eq!(c.parameter_vector().len(), 19);
        assert_eq!(c.parameter_vector()[17], 500.0);
    }

    #[test]
    fn hypsography_overrides_geometry() {
        let mut c = sample_config();
        c.hypsography = Some(HypsographyDef {
            depths_m: vec![0.0, 20.0],
            areas_m2: vec![1e6, 1e6],
            thermocline_depth_m: 5.0,
            thermocline_thickness_m: 2.0,
        });
        let p = c.effective_parameters();
        assert!((p.epi_volume_cm3 - 5e12).abs() < 1.0);
        assert!((p.hypo_volume_cm3 - 1.5e13).abs() < 1.0);
        assert!((p.thermocline_thickness_cm - 200.0).abs() < 1e-9);
        assert_eq!(p.bowen_coeff, c.parameters.bowen_coeff);
    }

    #[test]
    fn forcing_path_is_relative_to_config() {
        let c = sample_config();
        let resolved = resolve_forcing_path(Path::new("/data/lakes/run.yaml"), &c);
        assert_eq!(resolved, PathBuf::from("/data/lakes/forcing.csv"));
        let bare = resolve_forcing_path(Path::new("run.yaml"), &c);
        assert_eq!(bare, PathBuf::from("forcing.csv"));
    }
}
