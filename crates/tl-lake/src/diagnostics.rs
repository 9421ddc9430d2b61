//! Per-evaluation flux diagnostics.
//!
//! Models push one [`DiagnosticRecord`] into their sink on every right-hand
//! side evaluation, integrator stages included, so rows arrive in evaluation
//! order and their times are not monotone. Sinks only ever append.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::LakeResult;

/// Flux terms of one evaluation. Heat terms are in °C/d and are the
/// unscaled surface terms (before the ice factor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub qin: f64,
    pub qout: f64,
    pub mix_e: f64,
    pub mix_h: f64,
    pub sw: f64,
    pub lw: f64,
    pub water_lw: f64,
    pub conv: f64,
    pub evap: f64,
    /// Relative humidity (%)
    pub rh: f64,
    pub t: f64,
    pub ice_param: f64,
    pub ri: f64,
    /// Entrainment volume flux `dV·At / 1e4`
    pub entrainment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen: Option<OxygenDiagnostics>,
}

/// Oxygen terms (g/d), plus the exchange velocity (cm/d) and saturation
/// concentration (g/cm³) they were computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OxygenDiagnostics {
    pub atm: f64,
    pub nep: f64,
    pub sed: f64,
    pub oxy_mix_e: f64,
    pub oxy_mix_h: f64,
    pub k_o2: f64,
    pub o2_sat: f64,
}

impl DiagnosticRecord {
    pub const THERMAL_COLUMNS: [&'static str; 14] = [
        "qin",
        "qout",
        "mix_e",
        "mix_h",
        "sw",
        "lw",
        "water_lw",
        "conv",
        "evap",
        "rh",
        "t",
        "ice_param",
        "ri",
        "entrainment",
    ];

    pub const OXYGEN_COLUMNS: [&'static str; 7] =
        ["atm", "nep", "sed", "oxy_mix_e", "oxy_mix_h", "k_o2", "o2_sat"];

    /// Column names in write order for this record's variant.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut cols = Self::THERMAL_COLUMNS.to_vec();
        if self.oxygen.is_some() {
            cols.extend(Self::OXYGEN_COLUMNS);
        }
        cols
    }

    /// Values in the order of [`DiagnosticRecord::columns`].
    pub fn values(&self) -> Vec<f64> {
        let mut v = vec![
            self.qin,
            self.qout,
            self.mix_e,
            self.mix_h,
            self.sw,
            self.lw,
            self.water_lw,
            self.conv,
            self.evap,
            self.rh,
            self.t,
            self.ice_param,
            self.ri,
            self.entrainment,
        ];
        if let Some(o) = &self.oxygen {
            v.extend([
                o.atm, o.nep, o.sed, o.oxy_mix_e, o.oxy_mix_h, o.k_o2, o.o2_sat,
            ]);
        }
        v
    }
}

/// Destination for diagnostic records: append one record, never read.
pub trait DiagnosticsSink {
    fn record(&mut self, row: &DiagnosticRecord) -> LakeResult<()>;
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
    fn record(&mut self, row: &DiagnosticRecord) -> LakeResult<()> {
        (**self).record(row)
    }
}

/// Discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&mut self, _row: &DiagnosticRecord) -> LakeResult<()> {
        Ok(())
    }
}

/// Keeps records in memory, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<DiagnosticRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&mut self, row: &DiagnosticRecord) -> LakeResult<()> {
        self.rows.push(row.clone());
        Ok(())
    }
}

/// Writes each record as one headerless delimited line.
pub struct DelimitedSink<W: Write> {
    writer: W,
    delimiter: char,
    rows: usize,
}

impl<W: Write> DelimitedSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_delimiter(writer, ',')
    }

    pub fn with_delimiter(writer: W, delimiter: char) -> Self {
        Self {
            writer,
            delimiter,
            rows: 0,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the writer.
    pub fn into_inner(mut self) -> LakeResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> DiagnosticsSink for DelimitedSink<W> {
    fn record(&mut self, row: &DiagnosticRecord) -> LakeResult<()> {
        let mut line = String::new();
        for (i, v) in row.values().iter().enumerate() {
            if i > 0 {
                line.push(self.delimiter);
            }
            line.push_str(&v.to_string());
        }
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.rows += 1;
        Ok(())
    }
}
