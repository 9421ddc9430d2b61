//! Query helpers for extracting data from loaded runs.

use tl_results::TrajectoryRecord;

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and final state.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub has_oxygen: bool,
    pub final_record: TrajectoryRecord,
}

pub fn get_run_summary(records: &[TrajectoryRecord]) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(AppError::InvalidInput("No records in run".to_string()));
    };

    Ok(RunSummary {
        time_range: (first.t, last.t),
        record_count: records.len(),
        has_oxygen: first.oe.is_some(),
        final_record: *last,
    })
}

/// Variables available in a run's records.
pub fn series_variables(records: &[TrajectoryRecord]) -> Vec<&'static str> {
    match records.first() {
        Some(r) if r.oe.is_some() => vec!["te", "th", "oe", "oh"],
        Some(_) => vec!["te", "th"],
        None => Vec::new(),
    }
}

/// Time series `(t, value)` of one state variable.
pub fn extract_series(records: &[TrajectoryRecord], variable: &str) -> AppResult<Vec<(f64, f64)>> {
    let pick: fn(&TrajectoryRecord) -> Option<f64> = match variable {
        "te" | "epilimnion_temp" => |r| Some(r.te),
        "th" | "hypolimnion_temp" => |r| Some(r.th),
        "oe" | "epilimnion_oxygen" => |r| r.oe,
        "oh" | "hypolimnion_oxygen" => |r| r.oh,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Unknown variable: {}",
                variable
            )));
        }
    };

    let series: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| pick(r).map(|v| (r.t, v)))
        .collect();
    if series.is_empty() && !records.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Variable {} is not present in this run",
            variable
        )));
    }
    Ok(series)
}
