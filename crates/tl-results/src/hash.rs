//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use tl_project::{ForcingSeries, RunConfig};

pub fn compute_run_id(config: &RunConfig, forcing: &ForcingSeries, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    let columns = [
        &forcing.time,
        &forcing.shortwave,
        &forcing.air_temp,
        &forcing.dew_point,
        &forcing.wind_speed,
    ];
    for column in columns.into_iter().chain(forcing.wind_shear.as_ref()) {
        hasher.update((column.len() as u64).to_le_bytes());
        for v in column {
            hasher.update(v.to_le_bytes());
        }
    }

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tl_project::schema::*;

    fn config() -> RunConfig {
        RunConfig {
            version: CONFIG_VERSION,
            name: "hash".to_string(),
            parameters: LakeParametersDef {
                epi_volume_cm3: 5e12,
                hypo_volume_cm3: 1e13,
                thermocline_area_cm2: 8e9,
                thermocline_thickness_cm: 100.0,
                surface_area_cm2: 1e10,
                inflow_temp_c: 10.0,
                inflow_discharge_cm3_per_day: 0.0,
                longwave_reflection: 0.03,
                atm_emissivity_coeff: 0.6,
                stefan_boltzmann: 11.7e-8,
                water_emissivity: 0.97,
                water_density_g_per_cm3: 0.9982,
                specific_heat_cal_per_g_c: 0.99,
                bowen_coeff: 0.47,
                richardson_a: 7.0,
                entrainment_c: 9e4,
                gravity: 9.81,
                thermocline_depth_cm: 500.0,
                calibration: 1.0,
            },
            oxygen: None,
            hypsography: None,
            forcing: ForcingDef {
                path: PathBuf::from("forcing.csv"),
                shortwave_units: ShortwaveUnits::WPerM2,
                wind_units: WindUnits::MPerS,
            },
            initial_state: InitialStateDef {
                epilimnion_temp_c: 4.0,
                hypolimnion_temp_c: 4.0,
            },
            time_grid: TimeGridDef::Uniform {
                start: 0.0,
                end: 10.0,
                step: 1.0,
            },
            ice: false,
            state_check: StateCheckDef::Warn,
            diagnostics: DiagnosticsDef::default(),
        }
    }

    fn forcing() -> ForcingSeries {
        ForcingSeries {
            time: vec![0.0, 10.0],
            shortwave: vec![400.0, 400.0],
            air_temp: vec![20.0, 20.0],
            dew_point: vec![15.0, 15.0],
            wind_speed: vec![3.0, 3.0],
            wind_shear: None,
        }
    }

    #[test]
    fn hash_stability() {
        let a = compute_run_id(&config(), &forcing(), "v1");
        let b = compute_run_id(&config(), &forcing(), "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let base = compute_run_id(&config(), &forcing(), "v1");

        let mut c = config();
        c.parameters.calibration = 1.1;
        assert_ne!(base, compute_run_id(&c, &forcing(), "v1"));

        let mut f = forcing();
        f.air_temp[1] = 20.5;
        assert_ne!(base, compute_run_id(&config(), &f, "v1"));

        let mut f = forcing();
        f.wind_shear = Some(vec![27.55, 27.55]);
        assert_ne!(base, compute_run_id(&config(), &f, "v1"));

        assert_ne!(base, compute_run_id(&config(), &forcing(), "v2"));
    }
}
