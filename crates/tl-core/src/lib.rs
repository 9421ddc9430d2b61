//! tl-core: stable foundation for twolayer.
//!
//! Contains:
//! - units (uom SI types + the unit conversions the lake model needs)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{TlError, TlResult};
pub use numeric::*;
pub use units::*;
