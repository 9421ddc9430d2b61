//! Run configuration → runnable lake model.

use tl_lake::{
    DiagnosticsSink, Forcing, ForcingRecord, ForcingTable, OxygenModel, OxygenParams,
    OxygenState, ThermalModel, ThermalParams, ThermalState, initial_masses,
    wind_shear_from_speed,
};
use tl_project::ForcingSeries;
use tl_project::schema::{RunConfig, StateCheckDef, TimeGridDef};
use tl_results::{GridSummary, ModelVariant, TrajectoryRecord};
use tl_sim::{SimOptions, SimProgress, StateCheck, TimeGrid, run_on_grid_with_progress};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Identifies the integration scheme in run ids and manifests.
pub const SOLVER_VERSION: &str = concat!("rk4-", env!("CARGO_PKG_VERSION"));

/// Forcing table in model units; the wind function is derived from wind
/// speed when the file has no `wind_shear` column.
pub fn forcing_table(series: &ForcingSeries) -> ForcingTable {
    let records = (0..series.len())
        .map(|i| ForcingRecord {
            time: series.time[i],
            shortwave: series.shortwave[i],
            air_temp: series.air_temp[i],
            dew_point: series.dew_point[i],
            wind_speed: series.wind_speed[i],
            wind_shear: series
                .wind_shear
                .as_ref()
                .map_or_else(|| wind_shear_from_speed(series.wind_speed[i]), |s| s[i]),
        })
        .collect();
    ForcingTable::new(records)
}

pub fn time_grid(def: &TimeGridDef) -> AppResult<TimeGrid> {
    let grid = match def {
        TimeGridDef::Uniform { start, end, step } => TimeGrid::uniform(*start, *end, *step)?,
        TimeGridDef::Explicit { times } => TimeGrid::new(times.clone())?,
    };
    Ok(grid)
}

pub fn sim_options(check: StateCheckDef) -> SimOptions {
    SimOptions {
        state_check: match check {
            StateCheckDef::Off => StateCheck::Off,
            StateCheckDef::Warn => StateCheck::Warn,
            StateCheckDef::Strict => StateCheck::Strict,
        },
    }
}

#[derive(Debug, Clone)]
pub enum LakeSetup {
    Thermal {
        params: ThermalParams,
        initial: ThermalState,
    },
    Oxygen {
        params: OxygenParams,
        initial: OxygenState,
        altitude_m: f64,
    },
}

impl LakeSetup {
    pub fn thermal_params(&self) -> &ThermalParams {
        match self {
            LakeSetup::Thermal { params, .. } => params,
            LakeSetup::Oxygen { params, .. } => &params.thermal,
        }
    }

    fn thermal_params_mut(&mut self) -> &mut ThermalParams {
        match self {
            LakeSetup::Thermal { params, .. } => params,
            LakeSetup::Oxygen { params, .. } => &mut params.thermal,
        }
    }
}

/// Everything one run needs, validated and converted to model units.
#[derive(Debug, Clone)]
pub struct CompiledRun {
    pub name: String,
    pub setup: LakeSetup,
    pub forcing: Forcing,
    pub grid: TimeGrid,
    pub ice: bool,
    pub options: SimOptions,
}

pub fn compile(config: &RunConfig, series: &ForcingSeries) -> AppResult<CompiledRun> {
    let forcing = Forcing::new(&forcing_table(series))?;
    let grid = time_grid(&config.time_grid)?;
    if !forcing.covers(grid.start(), grid.end()) {
        let (f0, f1) = forcing.time_range();
        warn!(
            forcing_start = f0,
            forcing_end = f1,
            grid_start = grid.start(),
            grid_end = grid.end(),
            "time grid extends past the forcing record; boundary values are held"
        );
    }

    let temps = [
        config.initial_state.epilimnion_temp_c,
        config.initial_state.hypolimnion_temp_c,
    ];
    let setup = match &config.oxygen {
        None => LakeSetup::Thermal {
            params: ThermalParams::from_vector(&config.parameter_vector())?,
            initial: temps,
        },
        Some(oxygen) => {
            let params = OxygenParams::from_vector(&config.parameter_vector())?;
            let [oe, oh] = initial_masses(
                &params,
                oxygen.initial_epi_mg_per_l,
                oxygen.initial_hypo_mg_per_l,
            );
            LakeSetup::Oxygen {
                params,
                initial: [temps[0], temps[1], oe, oh],
                altitude_m: oxygen.altitude_m,
            }
        }
    };

    debug!(
        name = %config.name,
        oxygen = config.is_oxygen(),
        grid_points = grid.len(),
        forcing_rows = series.len(),
        "compiled run"
    );

    Ok(CompiledRun {
        name: config.name.clone(),
        setup,
        forcing,
        grid,
        ice: config.ice,
        options: sim_options(config.state_check),
    })
}

impl CompiledRun {
    pub fn variant(&self) -> ModelVariant {
        match self.setup {
            LakeSetup::Thermal { .. } => ModelVariant::Thermal,
            LakeSetup::Oxygen { .. } => ModelVariant::Oxygen,
        }
    }

    pub fn grid_summary(&self) -> GridSummary {
        GridSummary {
            start: self.grid.start(),
            end: self.grid.end(),
            points: self.grid.len(),
        }
    }

    /// Copy of this run with the entrainment calibration multiplier replaced.
    pub fn with_calibration(&self, calibration: f64) -> AppResult<Self> {
        if !calibration.is_finite() || calibration < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "calibration multiplier must be finite and non-negative, got {calibration}"
            )));
        }
        let mut run = self.clone();
        run.setup.thermal_params_mut().calibration = calibration;
        Ok(run)
    }

    /// Integrate over the grid, streaming diagnostics into `sink`.
    pub fn simulate<S: DiagnosticsSink>(
        &self,
        sink: S,
        progress: Option<&mut dyn FnMut(SimProgress)>,
    ) -> AppResult<(Vec<TrajectoryRecord>, S)> {
        match &self.setup {
            LakeSetup::Thermal { params, initial } => {
                let mut model =
                    ThermalModel::new(params.clone(), &self.forcing, *initial, sink).with_ice(self.ice);
                let rec = run_on_grid_with_progress(&mut model, &self.grid, &self.options, progress)?;
                let rows = rec
                    .t
                    .iter()
                    .zip(&rec.x)
                    .map(|(&t, &x)| TrajectoryRecord::thermal(t, x))
                    .collect();
                Ok((rows, model.into_sink()))
            }
            LakeSetup::Oxygen {
                params,
                initial,
                altitude_m,
            } => {
                let mut model = OxygenModel::new(params.clone(), &self.forcing, *initial, sink)
                    .with_ice(self.ice)
                    .with_altitude(*altitude_m);
                let rec = run_on_grid_with_progress(&mut model, &self.grid, &self.options, progress)?;
                let rows = rec
                    .t
                    .iter()
                    .zip(&rec.x)
                    .map(|(&t, &x)| TrajectoryRecord::oxygen(t, x))
                    .collect();
                Ok((rows, model.into_sink()))
            }
        }
    }
}
