//! Density of fresh water as a function of temperature.

/// Density (kg/m³) of pure water at `t` °C.
///
/// Fifth-order polynomial (Martin & McCutcheon), valid for 0 to 40 °C.
pub fn density(t: f64) -> f64 {
    999.842594 + 6.793952e-2 * t - 9.095290e-3 * t.powi(2) + 1.001685e-4 * t.powi(3)
        - 1.120083e-6 * t.powi(4)
        + 6.536336e-9 * t.powi(5)
}

/// Density in g/cm³, the unit the flux balance works in.
#[inline]
pub fn density_g_per_cm3(t: f64) -> f64 {
    density(t) / 1000.0
}

pub fn densities(temps: &[f64]) -> Vec<f64> {
    temps.iter().copied().map(density).collect()
}
