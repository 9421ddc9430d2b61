//! Vapour pressure helpers (mmHg).

/// Saturation vapour pressure (mmHg) over water at `t` °C (Magnus form).
///
/// Evaluated at the dew point this is the actual vapour pressure of the air.
#[inline]
pub fn vapour_pressure(t: f64) -> f64 {
    4.596 * (17.27 * t / (237.3 + t)).exp()
}

/// Relative humidity (%) from air and dew-point temperature.
#[inline]
pub fn relative_humidity(air_temp: f64, dew_point: f64) -> f64 {
    100.0 * vapour_pressure(dew_point) / vapour_pressure(air_temp)
}
