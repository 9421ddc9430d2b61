// tl-core/src/units.rs
//
// The lake model runs in a centimetre-gram-day system with heat in calories
// (fluxes in cal cm⁻² d⁻¹, volumes in cm³). Upstream data usually arrives in
// SI, so the conversions live here and go through uom.

use uom::si::f64::{
    Area as UomArea, Energy as UomEnergy, HeatFluxDensity as UomHeatFluxDensity,
    Length as UomLength, ThermodynamicTemperature as UomThermodynamicTemperature,
    Time as UomTime, Velocity as UomVelocity, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Energy = UomEnergy;
pub type HeatFlux = UomHeatFluxDensity;
pub type Length = UomLength;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn days(v: f64) -> Time {
    use uom::si::time::day;
    Time::new::<day>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn w_per_m2(v: f64) -> HeatFlux {
    use uom::si::heat_flux_density::watt_per_square_meter;
    HeatFlux::new::<watt_per_square_meter>(v)
}

/// Absolute temperature in kelvin for a water or air temperature in °C.
#[inline]
pub fn celsius_to_kelvin(t_c: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    celsius(t_c).get::<kelvin>()
}

/// Radiative flux in W m⁻² expressed as cal cm⁻² d⁻¹.
pub fn w_per_m2_to_cal_per_cm2_day(v: f64) -> f64 {
    use uom::si::area::square_centimeter;
    use uom::si::energy::calorie;

    let per_cm2_day: Energy = w_per_m2(v) * Area::new::<square_centimeter>(1.0) * days(1.0);
    per_cm2_day.get::<calorie>()
}

#[inline]
pub fn km_per_h_to_m_per_s(v: f64) -> f64 {
    use uom::si::velocity::{kilometer_per_hour, meter_per_second};
    Velocity::new::<kilometer_per_hour>(v).get::<meter_per_second>()
}

/// Rescale a rate given per hour to the same rate per day.
#[inline]
pub fn per_hour_to_per_day(v: f64) -> f64 {
    use uom::si::time::hour;
    v * days(1.0).get::<hour>()
}

#[inline]
pub fn m_to_cm(v: f64) -> f64 {
    use uom::si::length::centimeter;
    m(v).get::<centimeter>()
}

#[inline]
pub fn m2_to_cm2(v: f64) -> f64 {
    use uom::si::area::square_centimeter;
    m2(v).get::<square_centimeter>()
}

#[inline]
pub fn m3_to_cm3(v: f64) -> f64 {
    use uom::si::volume::{cubic_centimeter, cubic_meter};
    Volume::new::<cubic_meter>(v).get::<cubic_centimeter>()
}

pub mod constants {
    /// Seconds per day over cm² per m²; turns an entrainment rate built from
    /// SI velocities into the model's cm d⁻¹ convention.
    pub const ENTRAINMENT_UNIT_FACTOR: f64 = 86_400.0 / 10_000.0;

    /// Grams per cm³ in one mg L⁻¹.
    pub const MG_PER_L_TO_G_PER_CM3: f64 = 1e-6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _t = celsius(20.0);
        let _l = m(2.0);
        let _a = m2(3.0);
        let _d = days(1.0);
        let _v = mps(3.0);
        let _q = w_per_m2(200.0);
    }

    #[test]
    fn kelvin_offset() {
        assert!((celsius_to_kelvin(0.0) - 273.15).abs() < 1e-9);
        assert!((celsius_to_kelvin(20.0) - 293.15).abs() < 1e-9);
    }

    #[test]
    fn shortwave_conversion() {
        // 1 W/m² = 86400 J m⁻² d⁻¹ = 8.64 J cm⁻² d⁻¹ ≈ 2.065 cal cm⁻² d⁻¹
        let v = w_per_m2_to_cal_per_cm2_day(1.0);
        assert!((v - 2.065).abs() < 2e-3);
    }

    #[test]
    fn speed_and_geometry_conversions() {
        assert!((km_per_h_to_m_per_s(36.0) - 10.0).abs() < 1e-9);
        assert!((per_hour_to_per_day(1.0) - 24.0).abs() < 1e-9);
        assert!((m_to_cm(1.5) - 150.0).abs() < 1e-9);
        assert!((m2_to_cm2(1.0) - 1e4).abs() < 1e-6);
        assert!((m3_to_cm3(1.0) - 1e6).abs() < 1e-3);
    }
}
