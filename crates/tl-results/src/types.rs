//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub name: String,
    pub timestamp: String,
    pub variant: ModelVariant,
    pub grid: GridSummary,
    pub solver_version: String,
    /// Diagnostics file name inside the run directory, when one was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics_file: Option<String>,
    #[serde(default)]
    pub diagnostics_rows: usize,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(
        run_id: RunId,
        name: impl Into<String>,
        variant: ModelVariant,
        grid: GridSummary,
        solver_version: impl Into<String>,
    ) -> Self {
        Self {
            run_id,
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            variant,
            grid,
            solver_version: solver_version.into(),
            diagnostics_file: None,
            diagnostics_rows: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    Thermal,
    Oxygen,
}

impl ModelVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::Thermal => "thermal",
            ModelVariant::Oxygen => "oxygen",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridSummary {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

/// One output time of a trajectory. Oxygen masses are present for the
/// oxygen variant only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryRecord {
    pub t: f64,
    pub te: f64,
    pub th: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oh: Option<f64>,
}

impl TrajectoryRecord {
    pub fn thermal(t: f64, x: [f64; 2]) -> Self {
        Self {
            t,
            te: x[0],
            th: x[1],
            oe: None,
            oh: None,
        }
    }

    pub fn oxygen(t: f64, x: [f64; 4]) -> Self {
        Self {
            t,
            te: x[0],
            th: x[1],
            oe: Some(x[2]),
            oh: Some(x[3]),
        }
    }

    /// Time and name of the first field JSON cannot carry (NaN or infinite).
    pub fn first_non_finite(&self) -> Option<(f64, &'static str)> {
        [
            ("t", Some(self.t)),
            ("te", Some(self.te)),
            ("th", Some(self.th)),
            ("oe", self.oe),
            ("oh", self.oh),
        ]
        .into_iter()
        .find(|(_, v)| v.is_some_and(|v| !v.is_finite()))
        .map(|(what, _)| (self.t, what))
    }
}
