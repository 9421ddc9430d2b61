//! Run execution and caching service.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use tl_lake::{DelimitedSink, DiagnosticsSink, NullSink};
use tl_results::store::DIAGNOSTICS_FILE;
use tl_results::{RunManifest, RunStore, TrajectoryRecord, compute_run_id};
use tl_sim::SimProgress;
use tracing::info;

use crate::compile::{self, CompiledRun, SOLVER_VERSION};
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage, SimulationProgress};
use crate::project_service;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: SOLVER_VERSION.to_string(),
        }
    }
}

/// Request to execute the run described by a configuration file.
pub struct RunRequest<'a> {
    pub config_path: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub compile_time_s: f64,
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
    pub diagnostics_rows: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: &str,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            Some(message.to_string()),
        ));
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(&mut progress_cb, RunStage::LoadingConfig, started, "Loading configuration");
    let config = project_service::load_config(request.config_path)?;
    let forcing = project_service::load_forcing(request.config_path, &config)?;
    timing.load_time_s = started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, RunStage::CheckingCache, started, "Checking run cache");
    let run_id = compute_run_id(&config, &forcing, &request.options.solver_version);
    let store = RunStore::for_config(request.config_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            "Loading cached run",
        );
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();
        timing.diagnostics_rows = manifest.diagnostics_rows;
        info!(run_id = %run_id, name = %manifest.name, "loaded cached run");

        emit_progress(&mut progress_cb, RunStage::Completed, started, "Loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(&mut progress_cb, RunStage::Compiling, started, "Compiling model");
    let compile_started = Instant::now();
    let compiled = compile::compile(&config, &forcing)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, RunStage::Simulating, started, "Integrating");
    let simulate_started = Instant::now();
    let mut manifest = RunManifest::new(
        run_id.clone(),
        config.name.clone(),
        compiled.variant(),
        compiled.grid_summary(),
        request.options.solver_version.clone(),
    );
    let records = if config.diagnostics.enabled {
        let path = store.diagnostics_path(&run_id)?;
        let writer = BufWriter::new(File::create(&path)?);
        let sink = DelimitedSink::with_delimiter(writer, config.diagnostics.delimiter);
        let (records, sink) = simulate(&compiled, sink, &mut progress_cb, started)?;
        manifest.diagnostics_rows = sink.rows_written();
        manifest.diagnostics_file = Some(DIAGNOSTICS_FILE.to_string());
        sink.into_inner()?;
        records
    } else {
        simulate(&compiled, NullSink, &mut progress_cb, started)?.0
    };
    timing.simulate_time_s = simulate_started.elapsed().as_secs_f64();
    timing.steps = compiled.grid.len().saturating_sub(1);
    timing.diagnostics_rows = manifest.diagnostics_rows;

    emit_progress(&mut progress_cb, RunStage::SavingResults, started, "Saving results");
    let save_started = Instant::now();
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        name = %manifest.name,
        variant = manifest.variant.as_str(),
        steps = timing.steps,
        diagnostics_rows = manifest.diagnostics_rows,
        elapsed_s = timing.total_time_s,
        "run completed"
    );
    emit_progress(&mut progress_cb, RunStage::Completed, started, "Run completed");

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

fn simulate<S: DiagnosticsSink>(
    compiled: &CompiledRun,
    sink: S,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<(Vec<TrajectoryRecord>, S)> {
    let t_end = compiled.grid.end();
    let mut forward = |p: SimProgress| {
        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(RunProgressEvent {
                stage: RunStage::Simulating,
                elapsed_wall_s: started.elapsed().as_secs_f64(),
                message: None,
                simulation: Some(SimulationProgress {
                    sim_time_d: p.t,
                    t_end_d: t_end,
                    fraction_complete: p.fraction_complete,
                    step: p.step,
                    steps: p.steps,
                }),
            });
        }
    };
    compiled.simulate(sink, Some(&mut forward))
}

/// List all stored runs for a configuration, oldest first.
pub fn list_runs(config_path: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_config(config_path)?;
    Ok(store.list_runs()?)
}

/// Load a run's manifest and trajectory.
pub fn load_run(
    config_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TrajectoryRecord>)> {
    let store = RunStore::for_config(config_path)?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_trajectory(run_id)?;
    Ok((manifest, records))
}

/// Load a run's diagnostics rows using the configuration's delimiter.
pub fn load_run_diagnostics(config_path: &Path, run_id: &str) -> AppResult<Vec<Vec<f64>>> {
    let config = project_service::load_config(config_path)?;
    let store = RunStore::for_config(config_path)?;
    Ok(store.load_diagnostics(run_id, config.diagnostics.delimiter)?)
}
