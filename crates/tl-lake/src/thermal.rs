//! Heat balance of the two-box model.

use tl_core::units::celsius_to_kelvin;
use tl_sim::{SimResult, TransientModel};
use tracing::debug;

use crate::density::density_g_per_cm3;
use crate::diagnostics::{DiagnosticRecord, DiagnosticsSink};
use crate::entrainment::{Entrainment, EntrainmentInputs, entrainment};
use crate::error::LakeResult;
use crate::forcing::{Forcing, ForcingSample};
use crate::meteo::{relative_humidity, vapour_pressure};
use crate::params::ThermalParams;

/// `[epilimnion temperature, hypolimnion temperature]` (°C)
pub type ThermalState = [f64; 2];

/// Surface flux multiplier while the lake is treated as ice covered.
pub const ICE_INSULATION: f64 = 1e-5;

/// Surface flux multiplier: [`ICE_INSULATION`] when ice is enabled and both
/// water and air are at or below 0 °C, otherwise 1.
#[inline]
pub fn ice_factor(ice: bool, water_temp: f64, air_temp: f64) -> f64 {
    if ice && water_temp <= 0.0 && air_temp <= 0.0 {
        ICE_INSULATION
    } else {
        1.0
    }
}

/// Every heat-balance term of one evaluation (°C/d).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalFluxes {
    pub qin: f64,
    pub qout: f64,
    pub mix_e: f64,
    pub mix_h: f64,
    pub sw: f64,
    pub lw: f64,
    pub water_lw: f64,
    pub conv: f64,
    pub evap: f64,
    pub rh: f64,
    pub ice_param: f64,
    pub entrainment: Entrainment,
    /// Thermocline area, kept for the entrainment volume diagnostic
    thermocline_area: f64,
}

impl ThermalFluxes {
    /// Net surface heat input before the ice factor.
    pub fn surface(&self) -> f64 {
        self.sw + self.lw + self.water_lw + self.conv + self.evap
    }

    pub fn d_te(&self) -> f64 {
        self.qin + self.qout + self.mix_e + self.ice_param * self.surface()
    }

    pub fn d_th(&self) -> f64 {
        self.mix_h
    }

    pub fn record(&self, t: f64) -> DiagnosticRecord {
        DiagnosticRecord {
            qin: self.qin,
            qout: self.qout,
            mix_e: self.mix_e,
            mix_h: self.mix_h,
            sw: self.sw,
            lw: self.lw,
            water_lw: self.water_lw,
            conv: self.conv,
            evap: self.evap,
            rh: self.rh,
            t,
            ice_param: self.ice_param,
            ri: self.entrainment.richardson,
            entrainment: self.entrainment.rate * self.thermocline_area / 1e4,
            oxygen: None,
        }
    }
}

pub fn thermal_fluxes(
    p: &ThermalParams,
    f: &ForcingSample,
    te: f64,
    th: f64,
    ice: bool,
) -> ThermalFluxes {
    let entr = entrainment(&EntrainmentInputs {
        wind_speed: f.wind_speed,
        epi_density: density_g_per_cm3(te),
        hypo_density: density_g_per_cm3(th),
        thermocline_depth: p.thermocline_depth,
        thermocline_thickness: p.thermocline_thickness,
        gravity: p.gravity,
        reference_density: p.water_density,
        richardson_a: p.richardson_a,
        entrainment_c: p.entrainment_c,
        calibration: p.calibration,
    });
    let exchange = entr.rate * p.thermocline_area;

    let e_air = vapour_pressure(f.dew_point);
    let e_sat = vapour_pressure(te);
    let k = p.surface_heating_factor();
    let q = p.inflow_discharge / p.epi_volume;

    let sigma = p.stefan_boltzmann;
    let atm_lw = sigma
        * celsius_to_kelvin(f.air_temp).powi(4)
        * (p.atm_emissivity_coeff + 0.031 * e_air.sqrt())
        * (1.0 - p.longwave_reflection);
    let water_lw = p.water_emissivity * sigma * celsius_to_kelvin(te).powi(4);

    ThermalFluxes {
        qin: q * p.inflow_temp,
        qout: -q * te,
        mix_e: exchange / p.epi_volume * (th - te),
        mix_h: exchange / p.hypo_volume * (te - th),
        sw: k * f.shortwave,
        lw: k * atm_lw,
        water_lw: -k * water_lw,
        conv: -k * p.bowen_coeff * f.wind_shear * (te - f.air_temp),
        evap: -k * f.wind_shear * (e_sat - e_air),
        rh: relative_humidity(f.air_temp, f.dew_point),
        ice_param: ice_factor(ice, te, f.air_temp),
        entrainment: entr,
        thermocline_area: p.thermocline_area,
    }
}

/// Thermal-only two-box model over a borrowed forcing.
pub struct ThermalModel<'a, S> {
    params: ThermalParams,
    forcing: &'a Forcing,
    initial: ThermalState,
    ice: bool,
    sink: S,
}

impl<'a, S: DiagnosticsSink> ThermalModel<'a, S> {
    pub fn new(params: ThermalParams, forcing: &'a Forcing, initial: ThermalState, sink: S) -> Self {
        debug!(
            epi_volume = params.epi_volume,
            hypo_volume = params.hypo_volume,
            "thermal model ready"
        );
        Self {
            params,
            forcing,
            initial,
            ice: false,
            sink,
        }
    }

    /// Build from a raw 19-entry parameter vector.
    pub fn from_vector(
        v: &[f64],
        forcing: &'a Forcing,
        initial: ThermalState,
        sink: S,
    ) -> LakeResult<Self> {
        Ok(Self::new(ThermalParams::from_vector(v)?, forcing, initial, sink))
    }

    pub fn with_ice(mut self, ice: bool) -> Self {
        self.ice = ice;
        self
    }

    pub fn params(&self) -> &ThermalParams {
        &self.params
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Flux terms at `(t, x)` without touching the sink.
    pub fn fluxes(&self, t: f64, x: &ThermalState) -> ThermalFluxes {
        thermal_fluxes(&self.params, &self.forcing.sample(t), x[0], x[1], self.ice)
    }
}

impl<S: DiagnosticsSink> TransientModel for ThermalModel<'_, S> {
    type State = ThermalState;

    fn initial_state(&self) -> Self::State {
        self.initial
    }

    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State> {
        let fluxes = self.fluxes(t, x);
        self.sink.record(&fluxes.record(t))?;
        Ok([fluxes.d_te(), fluxes.d_th()])
    }

    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State {
        [a[0] + b[0], a[1] + b[1]]
    }

    fn scale(&self, a: &Self::State, scale: f64) -> Self::State {
        [a[0] * scale, a[1] * scale]
    }

    fn validate_state(&self, x: &Self::State) -> Option<&'static str> {
        (!x.iter().all(|v| v.is_finite())).then_some("non-finite water temperature")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::forcing::{ForcingRecord, ForcingTable, wind_shear_from_speed};
    use crate::params::fixtures::thermal_vector;
    use tl_core::units::w_per_m2_to_cal_per_cm2_day;

    fn sample(air_temp: f64, dew_point: f64) -> ForcingSample {
        ForcingSample {
            shortwave: w_per_m2_to_cal_per_cm2_day(200.0),
            air_temp,
            dew_point,
            wind_speed: 3.0,
            wind_shear: wind_shear_from_speed(3.0),
        }
    }

    fn params() -> ThermalParams {
        ThermalParams::from_vector(&thermal_vector()).unwrap()
    }

    #[test]
    fn ice_factor_switch() {
        assert_eq!(ice_factor(false, -1.0, -5.0), 1.0);
        assert_eq!(ice_factor(true, 0.0, 0.0), ICE_INSULATION);
        assert_eq!(ice_factor(true, 0.1, -5.0), 1.0);
        assert_eq!(ice_factor(true, -0.1, 0.1), 1.0);
    }

    #[test]
    fn warm_air_heats_cold_surface() {
        let f = thermal_fluxes(&params(), &sample(20.0, 15.0), 3.0, 3.0, false);
        assert!(f.sw > 0.0);
        assert!(f.lw > 0.0);
        assert!(f.water_lw < 0.0);
        // air warmer than water: sensible heat into the lake
        assert!(f.conv > 0.0);
        // dew point above the water temperature: condensation
        assert!(f.evap > 0.0);
        assert!(f.d_te() > 0.0);
        assert_eq!(f.mix_e, 0.0);
        assert_eq!(f.d_th(), 0.0);
    }

    #[test]
    fn mixing_terms_are_volume_weighted_opposites() {
        let p = params();
        let f = thermal_fluxes(&p, &sample(20.0, 15.0), 12.0, 6.0, false);
        assert!(f.mix_e < 0.0);
        assert!(f.mix_h > 0.0);
        let heat_e = f.mix_e * p.epi_volume;
        let heat_h = f.mix_h * p.hypo_volume;
        assert!((heat_e + heat_h).abs() < 1e-9 * heat_h.abs());
    }

    #[test]
    fn inflow_terms() {
        let mut v = thermal_vector();
        v[6] = 5e10; // discharge
        let p = ThermalParams::from_vector(&v).unwrap();
        let f = thermal_fluxes(&p, &sample(20.0, 15.0), 14.0, 8.0, false);
        assert!((f.qin - 0.01 * 10.0).abs() < 1e-12);
        assert!((f.qout + 0.01 * 14.0).abs() < 1e-12);
    }

    #[test]
    fn ice_scales_whole_surface_flux() {
        let p = params();
        let cold = sample(-5.0, -8.0);
        let open = thermal_fluxes(&p, &cold, -0.01, 3.0, false);
        let iced = thermal_fluxes(&p, &cold, -0.01, 3.0, true);
        assert_eq!(open.ice_param, 1.0);
        assert_eq!(iced.ice_param, ICE_INSULATION);
        let open_surface = open.d_te() - open.mix_e;
        let iced_surface = iced.d_te() - iced.mix_e;
        assert!((iced_surface - ICE_INSULATION * open_surface).abs() < 1e-12);
        // logged terms stay unscaled
        assert_eq!(open.sw, iced.sw);
    }

    #[test]
    fn rhs_records_one_row_per_call() {
        let table = ForcingTable::constant(
            &[0.0, 10.0],
            ForcingRecord {
                time: 0.0,
                shortwave: 400.0,
                air_temp: 20.0,
                dew_point: 15.0,
                wind_speed: 3.0,
                wind_shear: wind_shear_from_speed(3.0),
            },
        );
        let forcing = Forcing::new(&table).unwrap();
        let mut model =
            ThermalModel::new(params(), &forcing, [3.0, 3.0], MemorySink::new());
        let d1 = model.rhs(1.0, &[3.0, 3.0]).unwrap();
        let d2 = model.rhs(1.5, &[4.0, 3.0]).unwrap();
        assert!(d1[0] > 0.0 && d2[0] > 0.0);

        let sink = model.into_sink();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.rows[1].t, 1.5);
        assert_eq!(sink.rows[0].ice_param, 1.0);
        assert!(sink.rows[0].oxygen.is_none());
    }

    #[test]
    fn validate_flags_nan() {
        let table = ForcingTable::constant(
            &[0.0, 1.0],
            ForcingRecord {
                time: 0.0,
                shortwave: 0.0,
                air_temp: 10.0,
                dew_point: 5.0,
                wind_speed: 2.0,
                wind_shear: wind_shear_from_speed(2.0),
            },
        );
        let forcing = Forcing::new(&table).unwrap();
        let model = ThermalModel::new(params(), &forcing, [3.0, 3.0], MemorySink::new());
        assert!(model.validate_state(&[3.0, 3.0]).is_none());
        assert!(model.validate_state(&[f64::NAN, 3.0]).is_some());
    }
}
