//! Shared application service layer for twolayer.
//!
//! Loads run configurations, compiles them into lake models, executes or
//! reuses cached runs, runs calibration ensembles and queries stored results.
//! The CLI is a thin front-end over this crate.

pub mod compile;
pub mod ensemble;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use compile::{CompiledRun, LakeSetup, SOLVER_VERSION, compile, forcing_table, time_grid};
pub use ensemble::{SweepMember, run_calibration_sweep, sweep_config};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, SimulationProgress};
pub use project_service::{ConfigSummary, load_config, load_forcing, save_config, summarize};
pub use query::{RunSummary, extract_series, get_run_summary, series_variables};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    list_runs, load_run, load_run_diagnostics,
};
