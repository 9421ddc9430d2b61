//! Simulation runner and result recording.

use tl_core::{ensure_all_finite, is_strictly_increasing};
use tracing::{trace, warn};

use crate::error::{SimError, SimResult};
use crate::integrator::{Integrator, RK4};
use crate::model::TransientModel;

/// Ordered, strictly increasing report times.
///
/// Each consecutive pair is one integrator step, so a non-uniform grid simply
/// gives each interval its own step size.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    pub fn new(times: Vec<f64>) -> SimResult<Self> {
        if times.is_empty() {
            return Err(SimError::InvalidArg {
                what: "time grid must contain at least one time",
            });
        }
        ensure_all_finite(&times, "time grid")?;
        if !is_strictly_increasing(&times) {
            return Err(SimError::InvalidArg {
                what: "time grid must be strictly increasing",
            });
        }
        Ok(Self { times })
    }

    /// Evenly spaced grid from `start` to `end` inclusive.
    ///
    /// `end` is included when it lies on the grid to within a small fraction
    /// of `step`; otherwise the grid stops at the last point before it.
    pub fn uniform(start: f64, end: f64, step: f64) -> SimResult<Self> {
        if step <= 0.0 || !step.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time grid step must be positive",
            });
        }
        if end < start {
            return Err(SimError::InvalidArg {
                what: "time grid end must not precede start",
            });
        }
        let intervals = ((end - start) / step + 1e-9).floor() as usize;
        let times = (0..=intervals).map(|i| start + i as f64 * step).collect();
        Self::new(times)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.times[0]
    }

    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// True when every interval matches the first one to within `rel_tol`.
    pub fn is_uniform(&self, rel_tol: f64) -> bool {
        let Some(first) = self.times.windows(2).next().map(|w| w[1] - w[0]) else {
            return true;
        };
        self.times
            .windows(2)
            .all(|w| ((w[1] - w[0]) - first).abs() <= rel_tol * first)
    }
}

/// What the runner does with a state the model reports as invalid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StateCheck {
    /// Never ask the model.
    Off,
    /// Log a warning and keep integrating.
    #[default]
    Warn,
    /// Abort the run with `SimError::NonPhysical`.
    Strict,
}

/// Options for simulation runs.
#[derive(Clone, Debug, Default)]
pub struct SimOptions {
    pub state_check: StateCheck,
}

/// Progress snapshot handed to the callback after every step.
#[derive(Clone, Debug)]
pub struct SimProgress {
    pub step: usize,
    pub steps: usize,
    pub t: f64,
    pub fraction_complete: f64,
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (grid times)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

impl<S> SimRecord<S> {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn last(&self) -> Option<(f64, &S)> {
        self.t.last().copied().zip(self.x.last())
    }
}

/// Integrate `model` over `grid` with fixed-step RK4.
pub fn run_on_grid<M: TransientModel>(
    model: &mut M,
    grid: &TimeGrid,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    run_on_grid_with_progress(model, grid, opts, None)
}

/// Integrate `model` over `grid`, reporting progress after each step.
pub fn run_on_grid_with_progress<M: TransientModel>(
    model: &mut M,
    grid: &TimeGrid,
    opts: &SimOptions,
    mut progress_cb: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimRecord<M::State>> {
    let times = grid.times();
    let steps = times.len() - 1;
    let integrator = RK4;

    let mut x = model.initial_state();
    check_state(model, times[0], &x, opts.state_check)?;

    let mut t_record = Vec::with_capacity(times.len());
    let mut x_record = Vec::with_capacity(times.len());
    t_record.push(times[0]);
    x_record.push(x.clone());

    for (i, w) in times.windows(2).enumerate() {
        let (t, t_next) = (w[0], w[1]);
        x = integrator.step(model, t, &x, t_next - t)?;
        trace!(step = i + 1, t = t_next, "rk4 step");
        check_state(model, t_next, &x, opts.state_check)?;

        t_record.push(t_next);
        x_record.push(x.clone());

        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(SimProgress {
                step: i + 1,
                steps,
                t: t_next,
                fraction_complete: (i + 1) as f64 / steps as f64,
            });
        }
    }

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}

fn check_state<M: TransientModel>(
    model: &M,
    t: f64,
    x: &M::State,
    mode: StateCheck,
) -> SimResult<()> {
    if mode == StateCheck::Off {
        return Ok(());
    }
    if let Some(what) = model.validate_state(x) {
        match mode {
            StateCheck::Strict => return Err(SimError::NonPhysical { t, what }),
            _ => warn!(t, what, "state check failed"),
        }
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn uniform_grid_spans_start_to_end(
            start in -100.0f64..100.0,
            intervals in 1usize..400,
            step in 0.01f64..5.0,
        ) {
            let end = start + intervals as f64 * step;
            let grid = TimeGrid::uniform(start, end, step).unwrap();
            prop_assert_eq!(grid.len(), intervals + 1);
            prop_assert_eq!(grid.start(), start);
            prop_assert!((grid.end() - end).abs() <= 1e-9 * (1.0 + end.abs()));
            prop_assert!(grid.is_uniform(1e-6));
        }

        #[test]
        fn uniform_grid_never_overshoots(
            start in 0.0f64..10.0,
            span in 0.0f64..50.0,
            step in 0.1f64..3.0,
        ) {
            let grid = TimeGrid::uniform(start, start + span, step).unwrap();
            prop_assert!(grid.end() <= start + span + 1e-6 * step);
            prop_assert!(start + span - grid.end() < step * (1.0 + 1e-6));
        }
    }
}
