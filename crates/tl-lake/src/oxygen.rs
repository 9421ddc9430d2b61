//! Heat plus dissolved-oxygen balance.
//!
//! Oxygen is carried as mass per layer (g); concentrations are mass over
//! layer volume (g/cm³). The temperature equations are those of the thermal
//! variant, ice factor included.

use tl_core::units::constants::MG_PER_L_TO_G_PER_CM3;
use tl_sim::{SimResult, TransientModel};
use tracing::debug;

use crate::diagnostics::{DiagnosticRecord, DiagnosticsSink, OxygenDiagnostics};
use crate::error::LakeResult;
use crate::forcing::{Forcing, ForcingSample};
use crate::gas_exchange::{o2_piston_velocity, o2_saturation};
use crate::params::OxygenParams;
use crate::thermal::{ThermalFluxes, thermal_fluxes};

/// `[Te (°C), Th (°C), Oe (g), Oh (g)]`
pub type OxygenState = [f64; 4];

/// Temperature coefficient of production and sediment demand.
pub const THETA: f64 = 1.03;

/// Half-saturation concentration of sediment oxygen demand (0.5 mg/L).
pub const SED_HALF_SATURATION: f64 = 0.5 * MG_PER_L_TO_G_PER_CM3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OxygenFluxes {
    pub thermal: ThermalFluxes,
    /// Atmospheric exchange into the epilimnion (g/d)
    pub atm: f64,
    /// Net ecosystem production in the epilimnion (g/d)
    pub nep: f64,
    /// Sediment demand in the hypolimnion (g/d)
    pub sed: f64,
    pub oxy_mix_e: f64,
    pub oxy_mix_h: f64,
    /// O2 piston velocity (cm/d)
    pub k_o2: f64,
    /// Saturation concentration (g/cm³)
    pub o2_sat: f64,
}

impl OxygenFluxes {
    pub fn d_oe(&self) -> f64 {
        self.nep + self.atm + self.oxy_mix_e
    }

    pub fn d_oh(&self) -> f64 {
        self.oxy_mix_h - self.sed
    }

    pub fn derivative(&self) -> OxygenState {
        [
            self.thermal.d_te(),
            self.thermal.d_th(),
            self.d_oe(),
            self.d_oh(),
        ]
    }

    pub fn record(&self, t: f64) -> DiagnosticRecord {
        DiagnosticRecord {
            oxygen: Some(OxygenDiagnostics {
                atm: self.atm,
                nep: self.nep,
                sed: self.sed,
                oxy_mix_e: self.oxy_mix_e,
                oxy_mix_h: self.oxy_mix_h,
                k_o2: self.k_o2,
                o2_sat: self.o2_sat,
            }),
            ..self.thermal.record(t)
        }
    }
}

pub fn oxygen_fluxes(
    p: &OxygenParams,
    f: &ForcingSample,
    x: &OxygenState,
    ice: bool,
    altitude_m: f64,
) -> OxygenFluxes {
    let [te, th, oe, oh] = *x;
    let tp = &p.thermal;
    let thermal = thermal_fluxes(tp, f, te, th, ice);

    let c_epi = oe / tp.epi_volume;
    let c_hypo = oh / tp.hypo_volume;
    let exchange = thermal.entrainment.rate / p.diffusion_reduction * tp.thermocline_area;

    let k_o2 = o2_piston_velocity(f.wind_speed, te);
    let o2_sat = o2_saturation(te, altitude_m) * MG_PER_L_TO_G_PER_CM3;
    let atm = thermal.ice_param * k_o2 * (o2_sat - c_epi) * tp.surface_area;

    let sed = p.sediment_flux_rate
        * p.sediment_area
        * THETA.powf(th - 20.0)
        * (c_hypo / (SED_HALF_SATURATION + c_hypo));
    let nep = THETA.powf(te - 20.0) * p.nep_rate * tp.epi_volume;

    OxygenFluxes {
        thermal,
        atm,
        nep,
        sed,
        oxy_mix_e: exchange * (c_hypo - c_epi),
        oxy_mix_h: exchange * (c_epi - c_hypo),
        k_o2,
        o2_sat,
    }
}

/// Oxygen masses (g) of both layers from concentrations in mg/L.
pub fn initial_masses(p: &OxygenParams, epi_mg_per_l: f64, hypo_mg_per_l: f64) -> [f64; 2] {
    [
        epi_mg_per_l * MG_PER_L_TO_G_PER_CM3 * p.thermal.epi_volume,
        hypo_mg_per_l * MG_PER_L_TO_G_PER_CM3 * p.thermal.hypo_volume,
    ]
}

/// Thermal + oxygen two-box model over a borrowed forcing.
pub struct OxygenModel<'a, S> {
    params: OxygenParams,
    forcing: &'a Forcing,
    initial: OxygenState,
    ice: bool,
    altitude_m: f64,
    sink: S,
}

impl<'a, S: DiagnosticsSink> OxygenModel<'a, S> {
    pub fn new(params: OxygenParams, forcing: &'a Forcing, initial: OxygenState, sink: S) -> Self {
        debug!(
            nep_rate = params.nep_rate,
            sediment_flux_rate = params.sediment_flux_rate,
            "oxygen model ready"
        );
        Self {
            params,
            forcing,
            initial,
            ice: false,
            altitude_m: 0.0,
            sink,
        }
    }

    /// Build from a raw 23-entry parameter vector.
    pub fn from_vector(
        v: &[f64],
        forcing: &'a Forcing,
        initial: OxygenState,
        sink: S,
    ) -> LakeResult<Self> {
        Ok(Self::new(OxygenParams::from_vector(v)?, forcing, initial, sink))
    }

    pub fn with_ice(mut self, ice: bool) -> Self {
        self.ice = ice;
        self
    }

    /// Lake altitude (m) for the oxygen saturation pressure correction.
    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = altitude_m;
        self
    }

    pub fn params(&self) -> &OxygenParams {
        &self.params
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn fluxes(&self, t: f64, x: &OxygenState) -> OxygenFluxes {
        oxygen_fluxes(
            &self.params,
            &self.forcing.sample(t),
            x,
            self.ice,
            self.altitude_m,
        )
    }
}

impl<S: DiagnosticsSink> TransientModel for OxygenModel<'_, S> {
    type State = OxygenState;

    fn initial_state(&self) -> Self::State {
        self.initial
    }

    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State> {
        let fluxes = self.fluxes(t, x);
        self.sink.record(&fluxes.record(t))?;
        Ok(fluxes.derivative())
    }

    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State {
        std::array::from_fn(|i| a[i] + b[i])
    }

    fn scale(&self, a: &Self::State, scale: f64) -> Self::State {
        a.map(|v| v * scale)
    }

    fn validate_state(&self, x: &Self::State) -> Option<&'static str> {
        if !x.iter().all(|v| v.is_finite()) {
            Some("non-finite state")
        } else if x[2] < 0.0 {
            Some("negative epilimnion oxygen mass")
        } else if x[3] < 0.0 {
            Some("negative hypolimnion oxygen mass")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcing::wind_shear_from_speed;
    use crate::params::fixtures::oxygen_vector;
    use crate::thermal::ICE_INSULATION;

    fn sample() -> ForcingSample {
        ForcingSample {
            shortwave: 400.0,
            air_temp: 20.0,
            dew_point: 15.0,
            wind_speed: 3.0,
            wind_shear: wind_shear_from_speed(3.0),
        }
    }

    fn params() -> OxygenParams {
        OxygenParams::from_vector(&oxygen_vector()).unwrap()
    }

    fn state(te: f64, th: f64, ce: f64, ch: f64) -> OxygenState {
        let p = params();
        let [oe, oh] = initial_masses(&p, ce, ch);
        [te, th, oe, oh]
    }

    #[test]
    fn undersaturated_surface_gains_oxygen() {
        let f = oxygen_fluxes(&params(), &sample(), &state(20.0, 8.0, 5.0, 5.0), false, 0.0);
        assert!(f.atm > 0.0);
        let f = oxygen_fluxes(&params(), &sample(), &state(20.0, 8.0, 12.0, 5.0), false, 0.0);
        assert!(f.atm < 0.0);
    }

    #[test]
    fn nep_temperature_correction() {
        let p = params();
        let at_20 = oxygen_fluxes(&p, &sample(), &state(20.0, 8.0, 8.0, 8.0), false, 0.0);
        assert!((at_20.nep - p.nep_rate * p.thermal.epi_volume).abs() < 1e-9 * at_20.nep);
        let at_30 = oxygen_fluxes(&p, &sample(), &state(30.0, 8.0, 8.0, 8.0), false, 0.0);
        assert!((at_30.nep / at_20.nep - 1.03f64.powi(10)).abs() < 1e-9);
    }

    #[test]
    fn sediment_demand_saturates_in_concentration() {
        let p = params();
        let anoxic = oxygen_fluxes(&p, &sample(), &state(20.0, 20.0, 8.0, 0.0), false, 0.0);
        assert_eq!(anoxic.sed, 0.0);
        let half = oxygen_fluxes(&p, &sample(), &state(20.0, 20.0, 8.0, 0.5), false, 0.0);
        let full = p.sediment_flux_rate * p.sediment_area;
        assert!((half.sed - 0.5 * full).abs() < 1e-9 * full);
        let rich = oxygen_fluxes(&p, &sample(), &state(20.0, 20.0, 8.0, 50.0), false, 0.0);
        assert!(rich.sed < full && rich.sed > 0.98 * full);
    }

    #[test]
    fn oxygen_exchange_uses_reduced_entrainment() {
        let p = params();
        let f = oxygen_fluxes(&p, &sample(), &state(12.0, 6.0, 10.0, 4.0), false, 0.0);
        let ce = 10.0 * MG_PER_L_TO_G_PER_CM3;
        let ch = 4.0 * MG_PER_L_TO_G_PER_CM3;
        let expected = f.thermal.entrainment.rate / 1.5 * p.thermal.thermocline_area * (ch - ce);
        assert!((f.oxy_mix_e - expected).abs() < 1e-9 * expected.abs());
        assert_eq!(f.oxy_mix_h, -f.oxy_mix_e);
    }

    #[test]
    fn ice_blocks_atmospheric_exchange() {
        let p = params();
        let winter = ForcingSample {
            air_temp: -5.0,
            dew_point: -8.0,
            ..sample()
        };
        let x = state(-0.05, 3.0, 5.0, 5.0);
        let open = oxygen_fluxes(&p, &winter, &x, false, 0.0);
        let iced = oxygen_fluxes(&p, &winter, &x, true, 0.0);
        assert!((iced.atm - ICE_INSULATION * open.atm).abs() < 1e-12 * open.atm.abs());
    }

    #[test]
    fn record_extends_thermal_columns() {
        let f = oxygen_fluxes(&params(), &sample(), &state(15.0, 8.0, 9.0, 7.0), false, 0.0);
        let r = f.record(2.5);
        assert_eq!(r.t, 2.5);
        assert_eq!(r.values().len(), 21);
        let o = r.oxygen.unwrap();
        assert_eq!(o.sed, f.sed);
        assert_eq!(o.nep, f.nep);
    }

    #[test]
    fn initial_masses_scale_with_volume() {
        let p = params();
        let [oe, oh] = initial_masses(&p, 8.0, 8.0);
        assert!((oe - 8e-6 * 5e12).abs() < 1e-3);
        assert!((oh / oe - 2.0).abs() < 1e-12);
    }

}
