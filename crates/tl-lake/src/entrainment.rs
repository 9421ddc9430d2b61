//! Wind-driven entrainment across the thermocline.
//!
//! The exchange rate follows a bulk Richardson-number law while the column is
//! stably stratified and jumps to a fixed full-mixing rate when the
//! epilimnion becomes denser than the hypolimnion. The switch is a hard
//! discontinuity; equal densities count as stable.

use tl_core::units::constants::ENTRAINMENT_UNIT_FACTOR;

/// Entrainment rate (before calibration) used for an inverted column.
pub const INVERTED_MIXING_RATE: f64 = 100.0;

/// Air density (g/cm³ · 1000) in the surface stress formula.
const AIR_DENSITY: f64 = 1.164;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntrainmentInputs {
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Epilimnion density (g/cm³)
    pub epi_density: f64,
    /// Hypolimnion density (g/cm³)
    pub hypo_density: f64,
    /// Thermocline depth (cm)
    pub thermocline_depth: f64,
    /// Thermocline thickness (cm)
    pub thermocline_thickness: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Reference water density (g/cm³)
    pub reference_density: f64,
    /// Richardson-number constant `a`
    pub richardson_a: f64,
    /// Neutral entrainment constant `c`
    pub entrainment_c: f64,
    /// Calibration multiplier
    pub calibration: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixingRegime {
    /// `epi_density <= hypo_density`
    Stable,
    /// `epi_density > hypo_density`
    Inverted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entrainment {
    pub regime: MixingRegime,
    pub drag_coefficient: f64,
    pub shear_stress: f64,
    /// Surface shear velocity
    pub w0: f64,
    /// Neutral-stability entrainment velocity scale
    pub e0: f64,
    pub richardson: f64,
    /// Exchange rate across the thermocline (cm/d)
    pub rate: f64,
}

pub fn entrainment(inp: &EntrainmentInputs) -> Entrainment {
    let u = inp.wind_speed;
    let drag_coefficient = 0.00052 * u.powf(0.44);
    let shear_stress = AIR_DENSITY / 1000.0 * drag_coefficient * u * u;
    let w0 = (shear_stress / inp.epi_density).sqrt();
    let e0 = inp.entrainment_c * w0;

    let buoyancy =
        (inp.gravity / inp.reference_density) * ((inp.epi_density - inp.hypo_density).abs() / 10.0);
    let mut richardson = buoyancy / (w0 / inp.thermocline_depth.powi(2));
    if richardson.is_nan() {
        // calm wind over a neutral column
        richardson = 0.0;
    }

    let (regime, rate) = if inp.epi_density > inp.hypo_density {
        (MixingRegime::Inverted, INVERTED_MIXING_RATE * inp.calibration)
    } else if w0 == 0.0 {
        // no wind stress, no entrainment; `Ri` may be infinite here
        (MixingRegime::Stable, 0.0)
    } else {
        let damped = e0 / (1.0 + inp.richardson_a * richardson).powf(1.5);
        let rate = damped / (inp.thermocline_thickness / 100.0)
            * ENTRAINMENT_UNIT_FACTOR
            * inp.calibration;
        (MixingRegime::Stable, rate)
    };

    Entrainment {
        regime,
        drag_coefficient,
        shear_stress,
        w0,
        e0,
        richardson,
        rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(epi: f64, hypo: f64) -> EntrainmentInputs {
        EntrainmentInputs {
            wind_speed: 3.0,
            epi_density: epi,
            hypo_density: hypo,
            thermocline_depth: 500.0,
            thermocline_thickness: 100.0,
            gravity: 9.81,
            reference_density: 0.9982,
            richardson_a: 7.0,
            entrainment_c: 9e4,
            calibration: 1.0,
        }
    }

    #[test]
    fn neutral_column_uses_undamped_rate() {
        let e = entrainment(&inputs(0.999, 0.999));
        assert_eq!(e.regime, MixingRegime::Stable);
        assert_eq!(e.richardson, 0.0);
        let expected = e.e0 / 1.0 * ENTRAINMENT_UNIT_FACTOR;
        assert!((e.rate - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn drag_and_shear() {
        let e = entrainment(&inputs(1.0, 1.0));
        let cd = 0.00052 * 3.0f64.powf(0.44);
        assert!((e.drag_coefficient - cd).abs() < 1e-15);
        assert!((e.shear_stress - 1.164e-3 * cd * 9.0).abs() < 1e-15);
        assert!((e.w0 - e.shear_stress.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn stratification_damps_entrainment() {
        let weak = entrainment(&inputs(0.99990, 0.99991));
        let strong = entrainment(&inputs(0.99800, 0.99991));
        assert!(weak.richardson < strong.richardson);
        assert!(strong.rate < weak.rate);
        assert!(strong.rate > 0.0);
    }

    #[test]
    fn tie_is_stable_and_above_is_inverted() {
        let rho = 0.99997;
        let at_tie = entrainment(&inputs(rho, rho));
        assert_eq!(at_tie.regime, MixingRegime::Stable);

        let above = entrainment(&inputs(f64::from_bits(rho.to_bits() + 1), rho));
        assert_eq!(above.regime, MixingRegime::Inverted);
        assert_eq!(above.rate, INVERTED_MIXING_RATE);
        // the rate jumps: no continuity across the switch
        assert!((above.rate - at_tie.rate).abs() > 1.0);

        let below = entrainment(&inputs(f64::from_bits(rho.to_bits() - 1), rho));
        assert_eq!(below.regime, MixingRegime::Stable);
    }

    #[test]
    fn calibration_scales_both_branches() {
        let mut stable = inputs(0.9990, 0.9995);
        let base = entrainment(&stable).rate;
        stable.calibration = 2.5;
        assert!((entrainment(&stable).rate - 2.5 * base).abs() < 1e-12 * base.max(1.0));

        let mut inverted = inputs(0.9995, 0.9990);
        inverted.calibration = 0.5;
        assert_eq!(entrainment(&inverted).rate, 50.0);
    }

    #[test]
    fn calm_wind_stops_stable_mixing() {
        let mut calm = inputs(0.9990, 0.9995);
        calm.wind_speed = 0.0;
        let e = entrainment(&calm);
        assert_eq!(e.w0, 0.0);
        assert_eq!(e.rate, 0.0);

        calm.hypo_density = calm.epi_density;
        let e = entrainment(&calm);
        assert_eq!(e.richardson, 0.0);
        assert_eq!(e.rate, 0.0);
    }

    #[test]
    fn calm_wind_without_stability_damping_is_finite() {
        let mut calm = inputs(0.9990, 0.9995);
        calm.wind_speed = 0.0;
        calm.richardson_a = 0.0;
        let e = entrainment(&calm);
        assert_eq!(e.regime, MixingRegime::Stable);
        assert_eq!(e.richardson, f64::INFINITY);
        assert_eq!(e.rate, 0.0);

        calm.epi_density = 0.9995;
        let e = entrainment(&calm);
        assert_eq!(e.richardson, 0.0);
        assert_eq!(e.rate, 0.0);
    }
}
