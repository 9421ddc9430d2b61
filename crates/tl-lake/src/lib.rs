//! Two-box (epilimnion/hypolimnion) lake model.
//!
//! Provides:
//! - Forcing interpolation over a meteorological table
//! - Water density polynomial and wind-driven entrainment across the thermocline
//! - Heat balance (thermal variant) and heat + dissolved oxygen balance
//!   (oxygen variant) as `tl_sim::TransientModel`s
//! - Air-water oxygen exchange
//! - Diagnostics sinks receiving one record per right-hand-side evaluation

pub mod density;
pub mod diagnostics;
pub mod entrainment;
pub mod error;
pub mod forcing;
pub mod gas_exchange;
pub mod meteo;
pub mod oxygen;
pub mod params;
pub mod thermal;

pub use density::{density, densities};
pub use diagnostics::{
    DelimitedSink, DiagnosticRecord, DiagnosticsSink, MemorySink, NullSink, OxygenDiagnostics,
};
pub use entrainment::{Entrainment, EntrainmentInputs, MixingRegime, entrainment};
pub use error::{LakeError, LakeResult};
pub use forcing::{
    Forcing, ForcingRecord, ForcingSample, ForcingTable, Interpolator, wind_shear_from_speed,
};
pub use oxygen::{OxygenFluxes, OxygenModel, OxygenState, initial_masses, oxygen_fluxes};
pub use params::{OxygenParams, ThermalParams};
pub use thermal::{ICE_INSULATION, ThermalFluxes, ThermalModel, ThermalState, thermal_fluxes};
