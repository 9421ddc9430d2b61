//! Configuration loading, saving and introspection.

use std::path::{Path, PathBuf};

use tl_project::schema::{RunConfig, TimeGridDef};
use tl_project::{ForcingSeries, load_forcing_csv, resolve_forcing_path};
use tl_results::ModelVariant;

use crate::error::{AppError, AppResult};

/// Summary of a configuration for listing.
#[derive(Debug, Clone)]
pub struct ConfigSummary {
    pub name: String,
    pub variant: ModelVariant,
    pub ice: bool,
    pub grid_points: usize,
    pub forcing_path: PathBuf,
    pub uses_hypsography: bool,
}

/// Load and validate a run configuration (`.json` or YAML).
pub fn load_config(path: &Path) -> AppResult<RunConfig> {
    Ok(tl_project::load_config(path)?)
}

pub fn save_config(path: &Path, config: &RunConfig) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => tl_project::save_json(path, config)?,
        _ => tl_project::save_yaml(path, config)?,
    }
    Ok(())
}

/// Read the forcing CSV named by `config`, relative to `config_path`.
pub fn load_forcing(config_path: &Path, config: &RunConfig) -> AppResult<ForcingSeries> {
    let path = resolve_forcing_path(config_path, config);
    load_forcing_csv(&path, &config.forcing).map_err(|err| AppError::ForcingFile {
        path: path.clone(),
        message: err.to_string(),
    })
}

pub fn variant_of(config: &RunConfig) -> ModelVariant {
    if config.is_oxygen() {
        ModelVariant::Oxygen
    } else {
        ModelVariant::Thermal
    }
}

pub fn summarize(config_path: &Path, config: &RunConfig) -> ConfigSummary {
    let grid_points = match &config.time_grid {
        TimeGridDef::Uniform { start, end, step } => ((end - start) / step + 1e-9).floor() as usize + 1,
        TimeGridDef::Explicit { times } => times.len(),
    };
    ConfigSummary {
        name: config.name.clone(),
        variant: variant_of(config),
        ice: config.ice,
        grid_points,
        forcing_path: resolve_forcing_path(config_path, config),
        uses_hypsography: config.hypsography.is_some(),
    }
}
