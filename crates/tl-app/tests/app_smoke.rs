use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tl_app::{
    AppError, RunOptions, RunProgressEvent, RunRequest, RunStage, ensure_run,
    ensure_run_with_progress, extract_series, get_run_summary, list_runs, load_run,
    load_run_diagnostics, summarize, sweep_config,
};
use tl_results::ModelVariant;

const PARAMETERS: &str = r#"
parameters:
  epi_volume_cm3: 5.0e12
  hypo_volume_cm3: 1.0e13
  thermocline_area_cm2: 8.0e9
  thermocline_thickness_cm: 100.0
  surface_area_cm2: 1.0e10
  inflow_temp_c: 10.0
  inflow_discharge_cm3_per_day: 0.0
  longwave_reflection: 0.03
  atm_emissivity_coeff: 0.6
  stefan_boltzmann: 1.17e-7
  water_emissivity: 0.97
  water_density_g_per_cm3: 0.9982
  specific_heat_cal_per_g_c: 0.99
  bowen_coeff: 0.47
  richardson_a: 7.0
  entrainment_c: 9.0e4
  gravity: 9.81
  thermocline_depth_cm: 500.0
forcing:
  path: met.csv
initial_state:
  epilimnion_temp_c: 3.0
  hypolimnion_temp_c: 3.0
time_grid:
  start: 1.0
  end: 10.0
  step: 1.0
"#;

const OXYGEN: &str = r#"
oxygen:
  nep_rate: 1.0e-9
  sediment_flux_rate: 1.0e-7
  sediment_area_cm2: 8.0e9
  diffusion_reduction: 1.5
  initial_epi_mg_per_l: 8.0
  initial_hypo_mg_per_l: 8.0
"#;

const FORCING: &str = "time,shortwave,air_temp,dew_point,wind_speed\n\
                       0,200,20,15,3\n\
                       20,200,20,15,3\n";

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_case(dir: &Path, name: &str, extra: &str) -> PathBuf {
    fs::write(dir.join("met.csv"), FORCING).unwrap();
    let path = dir.join(format!("{name}.yaml"));
    let yaml = format!("version: 1\nname: {name}\n{PARAMETERS}{extra}");
    fs::write(&path, yaml).unwrap();
    path
}

fn request(path: &Path, use_cache: bool) -> RunRequest<'_> {
    RunRequest {
        config_path: path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    }
}

#[test]
fn thermal_run_is_cached_and_queryable() {
    let dir = unique_temp_dir("tl_app_thermal");
    let path = write_case(&dir, "summer", "");

    let first = ensure_run(&request(&path, true)).unwrap();
    assert!(!first.loaded_from_cache);
    assert_eq!(first.manifest.variant, ModelVariant::Thermal);
    assert_eq!(first.manifest.grid.points, 10);
    assert_eq!(first.manifest.diagnostics_rows, 36);
    assert_eq!(first.timing.steps, 9);

    let second = ensure_run(&request(&path, true)).unwrap();
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);

    let (manifest, records) = load_run(&path, &first.run_id).unwrap();
    assert_eq!(manifest.run_id, first.run_id);
    assert_eq!(records.len(), 10);

    let te = extract_series(&records, "te").unwrap();
    assert!(te.windows(2).all(|w| w[1].1 > w[0].1));
    let summary = get_run_summary(&records).unwrap();
    assert_eq!(summary.time_range, (1.0, 10.0));
    assert!((summary.final_record.te - 13.06).abs() < 0.05);
    assert!(summary.final_record.te > summary.final_record.th);

    let rows = load_run_diagnostics(&path, &first.run_id).unwrap();
    assert_eq!(rows.len(), 36);
    assert!(rows.iter().all(|r| r.len() == 14));

    assert_eq!(list_runs(&path).unwrap().len(), 1);
}

#[test]
fn rerun_without_cache_reproduces_trajectory() {
    let dir = unique_temp_dir("tl_app_rerun");
    let path = write_case(&dir, "rerun", "");

    let first = ensure_run(&request(&path, true)).unwrap();
    let (_, before) = load_run(&path, &first.run_id).unwrap();
    let again = ensure_run(&request(&path, false)).unwrap();
    assert!(!again.loaded_from_cache);
    assert_eq!(again.run_id, first.run_id);
    let (_, after) = load_run(&path, &again.run_id).unwrap();
    assert_eq!(before, after);
}

#[test]
fn oxygen_run_writes_extended_diagnostics() {
    let dir = unique_temp_dir("tl_app_oxygen");
    let path = write_case(&dir, "oxic", OXYGEN);

    let summary = summarize(&path, &tl_app::load_config(&path).unwrap());
    assert_eq!(summary.variant, ModelVariant::Oxygen);
    assert_eq!(summary.grid_points, 10);

    let response = ensure_run(&request(&path, true)).unwrap();
    assert_eq!(response.manifest.variant, ModelVariant::Oxygen);
    let (_, records) = load_run(&path, &response.run_id).unwrap();
    assert!(records.iter().all(|r| r.oe.is_some_and(|o| o > 0.0)));
    assert_eq!(extract_series(&records, "oh").unwrap().len(), 10);

    let rows = load_run_diagnostics(&path, &response.run_id).unwrap();
    assert!(rows.iter().all(|r| r.len() == 21));
}

#[test]
fn progress_events_cover_every_step() {
    let dir = unique_temp_dir("tl_app_progress");
    let path = write_case(&dir, "progress", "");

    let mut events: Vec<RunProgressEvent> = Vec::new();
    let mut cb = |e: RunProgressEvent| events.push(e);
    ensure_run_with_progress(&request(&path, true), Some(&mut cb)).unwrap();

    let steps: Vec<usize> = events
        .iter()
        .filter_map(|e| e.simulation.as_ref().map(|s| s.step))
        .collect();
    assert_eq!(steps, (1..=9).collect::<Vec<_>>());
    assert_eq!(events[0].stage, RunStage::LoadingConfig);
    assert_eq!(events[events.len() - 1].stage, RunStage::Completed);
    assert!(events.iter().any(|e| e.stage == RunStage::SavingResults));
}

#[test]
fn calibration_sweep_keeps_member_order() {
    let dir = unique_temp_dir("tl_app_sweep");
    let path = write_case(&dir, "sweep", "");

    let members = sweep_config(&path, &[2.0, 1.0, 0.5]).unwrap();
    let cals: Vec<f64> = members.iter().map(|m| m.calibration).collect();
    assert_eq!(cals, vec![2.0, 1.0, 0.5]);
    assert!(members.iter().all(|m| m.trajectory.len() == 10));
    assert!(members.iter().all(|m| m.diagnostics.len() == 36));

    let single = ensure_run(&request(&path, false)).unwrap();
    let (_, records) = load_run(&path, &single.run_id).unwrap();
    assert_eq!(members[1].trajectory, records);

    assert!(matches!(
        sweep_config(&path, &[]),
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        sweep_config(&path, &[1.0, -1.0]),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn missing_forcing_file_is_reported() {
    let dir = unique_temp_dir("tl_app_missing_forcing");
    let path = write_case(&dir, "dry", "");
    fs::remove_file(dir.join("met.csv")).unwrap();
    assert!(matches!(
        ensure_run(&request(&path, true)),
        Err(AppError::ForcingFile { .. })
    ));
}

#[test]
fn invalid_config_is_a_validation_error() {
    let dir = unique_temp_dir("tl_app_invalid");
    let path = write_case(&dir, "broken", "");
    let text = fs::read_to_string(&path).unwrap().replace("gravity: 9.81", "gravity: -9.81");
    fs::write(&path, text).unwrap();
    assert!(matches!(
        ensure_run(&request(&path, true)),
        Err(AppError::Validation(_))
    ));
}
