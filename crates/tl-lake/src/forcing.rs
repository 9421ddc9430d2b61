//! Meteorological forcing: the observation table and its interpolators.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tl_core::is_strictly_increasing;

use crate::error::{LakeError, LakeResult};

/// One row of meteorological observations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForcingRecord {
    /// Time coordinate (days)
    pub time: f64,
    /// Shortwave radiation (cal cm⁻² d⁻¹)
    pub shortwave: f64,
    /// Air temperature (°C)
    pub air_temp: f64,
    /// Dew-point temperature (°C)
    pub dew_point: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Wind shear term driving convective and evaporative transfer
    /// (cal cm⁻² d⁻¹ mmHg⁻¹), see [`wind_shear_from_speed`]
    pub wind_shear: f64,
}

/// Wind shear term from wind speed in m/s: `19.0 + 0.95·U²`.
#[inline]
pub fn wind_shear_from_speed(wind_speed: f64) -> f64 {
    19.0 + 0.95 * wind_speed * wind_speed
}

/// Ordered meteorological observations, as handed over by the loader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForcingTable {
    pub records: Vec<ForcingRecord>,
}

impl ForcingTable {
    pub fn new(records: Vec<ForcingRecord>) -> Self {
        Self { records }
    }

    /// A table holding the same observation at `times`.
    pub fn constant(times: &[f64], record: ForcingRecord) -> Self {
        let records = times
            .iter()
            .map(|&time| ForcingRecord { time, ..record })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time).collect()
    }

    fn column(&self, f: impl Fn(&ForcingRecord) -> f64) -> Vec<f64> {
        self.records.iter().map(f).collect()
    }
}

/// Position of a query time on the shared time axis.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bracket {
    lo: usize,
    frac: f64,
}

fn locate(times: &[f64], t: f64) -> Bracket {
    let last = times.len() - 1;
    if t <= times[0] {
        return Bracket { lo: 0, frac: 0.0 };
    }
    if t >= times[last] {
        return Bracket { lo: last, frac: 0.0 };
    }
    let lo = times
        .partition_point(|&x| x <= t)
        .saturating_sub(1)
        .min(last - 1);
    let frac = (t - times[lo]) / (times[lo + 1] - times[lo]);
    Bracket { lo, frac }
}

/// Piecewise-linear interpolant of one forcing variable, clamped to the
/// boundary values outside the observed time range.
#[derive(Clone, Debug)]
pub struct Interpolator {
    times: Arc<[f64]>,
    values: Vec<f64>,
}

impl Interpolator {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> LakeResult<Self> {
        validate_axis(&times)?;
        Self::on_axis(times.into(), values)
    }

    fn on_axis(times: Arc<[f64]>, values: Vec<f64>) -> LakeResult<Self> {
        if values.len() != times.len() {
            return Err(LakeError::InvalidForcing {
                reason: format!(
                    "{} values for {} time coordinates",
                    values.len(),
                    times.len()
                ),
            });
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(LakeError::InvalidForcing {
                reason: format!("non-finite forcing value {v}"),
            });
        }
        Ok(Self { times, values })
    }

    pub fn at(&self, t: f64) -> f64 {
        self.at_bracket(locate(&self.times, t))
    }

    fn at_bracket(&self, b: Bracket) -> f64 {
        if b.frac == 0.0 {
            return self.values[b.lo];
        }
        let (v0, v1) = (self.values[b.lo], self.values[b.lo + 1]);
        v0 + b.frac * (v1 - v0)
    }

    pub fn time_range(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }
}

fn validate_axis(times: &[f64]) -> LakeResult<()> {
    if times.len() < 2 {
        return Err(LakeError::InvalidForcing {
            reason: format!("need at least two records, got {}", times.len()),
        });
    }
    if times.iter().any(|t| !t.is_finite()) {
        return Err(LakeError::InvalidForcing {
            reason: "non-finite time coordinate".to_string(),
        });
    }
    if !is_strictly_increasing(times) {
        return Err(LakeError::InvalidForcing {
            reason: "time coordinates must be strictly increasing".to_string(),
        });
    }
    Ok(())
}

/// Forcing values at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForcingSample {
    pub shortwave: f64,
    pub air_temp: f64,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_shear: f64,
}

/// The five forcing interpolators of one run, sharing a single time axis.
///
/// Built once per run and borrowed by the model; holds no mutable state, so
/// independent runs may share one instance across threads.
#[derive(Clone, Debug)]
pub struct Forcing {
    shortwave: Interpolator,
    air_temp: Interpolator,
    dew_point: Interpolator,
    wind_speed: Interpolator,
    wind_shear: Interpolator,
}

impl Forcing {
    pub fn new(table: &ForcingTable) -> LakeResult<Self> {
        let times = table.times();
        validate_axis(&times)?;
        let axis: Arc<[f64]> = times.into();
        let build = |f: fn(&ForcingRecord) -> f64| Interpolator::on_axis(axis.clone(), table.column(f));

        Ok(Self {
            shortwave: build(|r| r.shortwave)?,
            air_temp: build(|r| r.air_temp)?,
            dew_point: build(|r| r.dew_point)?,
            wind_speed: build(|r| r.wind_speed)?,
            wind_shear: build(|r| r.wind_shear)?,
        })
    }

    pub fn sample(&self, t: f64) -> ForcingSample {
        let b = locate(&self.shortwave.times, t);
        ForcingSample {
            shortwave: self.shortwave.at_bracket(b),
            air_temp: self.air_temp.at_bracket(b),
            dew_point: self.dew_point.at_bracket(b),
            wind_speed: self.wind_speed.at_bracket(b),
            wind_shear: self.wind_shear.at_bracket(b),
        }
    }

    pub fn time_range(&self) -> (f64, f64) {
        self.shortwave.time_range()
    }

    /// True when `[start, end]` lies inside the observed range; outside it the
    /// interpolators hold the boundary values.
    pub fn covers(&self, start: f64, end: f64) -> bool {
        let (t0, t1) = self.time_range();
        start >= t0 && end <= t1
    }

    pub fn shortwave(&self) -> &Interpolator {
        &self.shortwave
    }

    pub fn air_temp(&self) -> &Interpolator {
        &self.air_temp
    }

    pub fn dew_point(&self) -> &Interpolator {
        &self.dew_point
    }

    pub fn wind_speed(&self) -> &Interpolator {
        &self.wind_speed
    }

    pub fn wind_shear(&self) -> &Interpolator {
        &self.wind_shear
    }
}
