//! Meteorological forcing from delimited text.
//!
//! The first non-comment line is a header naming the columns. Required:
//! `time, shortwave, air_temp, dew_point, wind_speed`; `wind_shear` is
//! optional. Column order is free and unknown columns are ignored. Lines
//! starting with `#` and blank lines are skipped.

use std::collections::HashMap;
use std::path::Path;

use tl_core::units::{km_per_h_to_m_per_s, w_per_m2_to_cal_per_cm2_day};

use crate::schema::{ForcingDef, ShortwaveUnits, WindUnits};
use crate::{ProjectError, ProjectResult};

const REQUIRED: [&str; 5] = ["time", "shortwave", "air_temp", "dew_point", "wind_speed"];
const WIND_SHEAR: &str = "wind_shear";

/// Forcing columns in model units: days, cal cm⁻² d⁻¹, °C, °C, m/s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForcingSeries {
    pub time: Vec<f64>,
    pub shortwave: Vec<f64>,
    pub air_temp: Vec<f64>,
    pub dew_point: Vec<f64>,
    pub wind_speed: Vec<f64>,
    /// Wind function column when the file provides it.
    pub wind_shear: Option<Vec<f64>>,
}

impl ForcingSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

pub fn load_forcing_csv(path: &Path, def: &ForcingDef) -> ProjectResult<ForcingSeries> {
    let content = std::fs::read_to_string(path)?;
    parse_forcing_csv(&content, def)
}

fn csv_error(line: usize, reason: impl Into<String>) -> ProjectError {
    ProjectError::ForcingCsv {
        line,
        reason: reason.into(),
    }
}

pub fn parse_forcing_csv(content: &str, def: &ForcingDef) -> ProjectResult<ForcingSeries> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| csv_error(0, "no header line"))?;
    let index: HashMap<&str, usize> = header
        .split(',')
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();
    let required = REQUIRED
        .iter()
        .map(|name| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| csv_error(header_line, format!("missing column '{name}'")))
        })
        .collect::<ProjectResult<Vec<usize>>>()?;
    let shear_col = index.get(WIND_SHEAR).copied();

    let mut series = ForcingSeries {
        wind_shear: shear_col.map(|_| Vec::new()),
        ..ForcingSeries::default()
    };

    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let value = |col: usize, name: &str| -> ProjectResult<f64> {
            let raw = fields
                .get(col)
                .ok_or_else(|| csv_error(line_no, format!("missing value for '{name}'")))?;
            let v: f64 = raw
                .parse()
                .map_err(|_| csv_error(line_no, format!("'{raw}' is not a number ({name})")))?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(csv_error(line_no, format!("non-finite {name}")))
            }
        };

        series.time.push(value(required[0], "time")?);
        let shortwave = value(required[1], "shortwave")?;
        series.shortwave.push(match def.shortwave_units {
            ShortwaveUnits::WPerM2 => w_per_m2_to_cal_per_cm2_day(shortwave),
            ShortwaveUnits::CalPerCm2Day => shortwave,
        });
        series.air_temp.push(value(required[2], "air_temp")?);
        series.dew_point.push(value(required[3], "dew_point")?);
        let wind = value(required[4], "wind_speed")?;
        series.wind_speed.push(match def.wind_units {
            WindUnits::MPerS => wind,
            WindUnits::KmPerH => km_per_h_to_m_per_s(wind),
        });
        if let (Some(col), Some(shear)) = (shear_col, series.wind_shear.as_mut()) {
            shear.push(value(col, WIND_SHEAR)?);
        }
    }

    if series.len() < 2 {
        return Err(csv_error(header_line, "need at least two forcing rows"));
    }
    Ok(series)
}
