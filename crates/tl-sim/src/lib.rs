//! Transient integration framework for twolayer.
//!
//! Provides:
//! - `TransientModel` trait for pluggable ODE right-hand sides
//! - Fixed-step classical RK4 integrator
//! - Time-grid runner producing a trajectory with optional state checks

pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;

pub use error::{SimError, SimResult};
pub use integrator::{Integrator, RK4};
pub use model::TransientModel;
pub use sim::{
    SimOptions, SimProgress, SimRecord, StateCheck, TimeGrid, run_on_grid,
    run_on_grid_with_progress,
};
