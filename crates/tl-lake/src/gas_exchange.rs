//! Air-water oxygen exchange: piston velocity and saturation concentration.

use tl_core::units::per_hour_to_per_day;

/// Gas transfer velocity normalized to Sc = 600 (cm/h), Cole & Caraco (1998).
#[inline]
pub fn k600_cole(wind_speed: f64) -> f64 {
    2.07 + 0.215 * wind_speed.powf(1.7)
}

/// Schmidt number of O2 in fresh water at `t` °C (Wanninkhof 1992).
#[inline]
pub fn schmidt_o2(t: f64) -> f64 {
    1568.0 - 86.04 * t + 2.142 * t * t - 0.0216 * t * t * t
}

/// Rescale a k600 value to O2 at `t` °C (Schmidt exponent −0.5).
#[inline]
pub fn k_o2(k600: f64, t: f64) -> f64 {
    k600 * (schmidt_o2(t) / 600.0).powf(-0.5)
}

/// O2 piston velocity (cm/d) for a wind speed (m/s) and water temperature.
pub fn o2_piston_velocity(wind_speed: f64, t: f64) -> f64 {
    per_hour_to_per_day(k_o2(k600_cole(wind_speed), t))
}

/// Standard barometric pressure (mbar) at `altitude_m`.
#[inline]
pub fn barometric_pressure(altitude_m: f64) -> f64 {
    1013.25 * (1.0 - 2.25577e-5 * altitude_m).powf(5.25588)
}

/// Dissolved-oxygen saturation (mg/L) in fresh water at `t` °C and
/// `altitude_m`: Garcia & Gordon (1992) fit of Benson & Krause data,
/// corrected for barometric pressure and water vapour.
pub fn o2_saturation(t: f64, altitude_m: f64) -> f64 {
    const ML_TO_MG: f64 = 1.42905;
    const MMHG_PER_MBAR: f64 = 0.750061683;

    let ts = ((298.15 - t) / (273.15 + t)).ln();
    let ln_c = 2.00907 + 3.22014 * ts + 4.0501 * ts.powi(2) + 4.94457 * ts.powi(3)
        - 0.256847 * ts.powi(4)
        + 3.88767 * ts.powi(5);
    let sat_ml_per_l = ln_c.exp();

    let vapour = 10f64.powf(8.10765 - 1750.286 / (235.0 + t));
    let pressure_correction =
        (barometric_pressure(altitude_m) * MMHG_PER_MBAR - vapour) / (760.0 - vapour);

    sat_ml_per_l * ML_TO_MG * pressure_correction
}
