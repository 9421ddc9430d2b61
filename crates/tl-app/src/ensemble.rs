//! Calibration ensembles.
//!
//! Members differ only in the entrainment calibration multiplier. They share
//! the compiled forcing read-only and each owns its state and its own
//! diagnostics sink, so members run in parallel.

use std::path::Path;

use rayon::prelude::*;
use tl_lake::MemorySink;
use tl_results::TrajectoryRecord;
use tracing::info;

use crate::compile::{self, CompiledRun};
use crate::error::{AppError, AppResult};
use crate::project_service;

#[derive(Debug, Clone)]
pub struct SweepMember {
    pub calibration: f64,
    pub trajectory: Vec<TrajectoryRecord>,
    pub diagnostics: MemorySink,
}

/// Run one member per calibration multiplier; results keep input order.
pub fn run_calibration_sweep(
    base: &CompiledRun,
    calibrations: &[f64],
) -> AppResult<Vec<SweepMember>> {
    if calibrations.is_empty() {
        return Err(AppError::InvalidInput(
            "calibration sweep needs at least one multiplier".to_string(),
        ));
    }

    let members = calibrations
        .par_iter()
        .map(|&calibration| -> AppResult<SweepMember> {
            let run = base.with_calibration(calibration)?;
            let (trajectory, diagnostics) = run.simulate(MemorySink::new(), None)?;
            Ok(SweepMember {
                calibration,
                trajectory,
                diagnostics,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    info!(
        name = %base.name,
        members = members.len(),
        "calibration sweep completed"
    );
    Ok(members)
}

/// Load, compile and sweep the run described by a configuration file.
pub fn sweep_config(config_path: &Path, calibrations: &[f64]) -> AppResult<Vec<SweepMember>> {
    let config = project_service::load_config(config_path)?;
    let forcing = project_service::load_forcing(config_path, &config)?;
    let base = compile::compile(&config, &forcing)?;
    run_calibration_sweep(&base, calibrations)
}
