//! Layer geometry from a depth/area curve.

use tl_core::units::{m2_to_cm2, m3_to_cm3, m_to_cm};

use crate::schema::{HypsographyDef, LakeParametersDef};

/// Two-box geometry in model units (cm, cm², cm³).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LakeGeometry {
    pub epi_volume_cm3: f64,
    pub hypo_volume_cm3: f64,
    pub surface_area_cm2: f64,
    pub thermocline_area_cm2: f64,
    pub thermocline_depth_cm: f64,
    pub thermocline_thickness_cm: f64,
}

impl LakeGeometry {
    /// Replace the geometric entries of `params`.
    pub fn apply(&self, params: LakeParametersDef) -> LakeParametersDef {
        LakeParametersDef {
            epi_volume_cm3: self.epi_volume_cm3,
            hypo_volume_cm3: self.hypo_volume_cm3,
            surface_area_cm2: self.surface_area_cm2,
            thermocline_area_cm2: self.thermocline_area_cm2,
            thermocline_depth_cm: self.thermocline_depth_cm,
            thermocline_thickness_cm: self.thermocline_thickness_cm,
            ..params
        }
    }
}

impl HypsographyDef {
    pub fn max_depth_m(&self) -> f64 {
        self.depths_m.last().copied().unwrap_or(0.0)
    }

    /// Area (m²) at depth `z` (m), linear between tabulated depths and
    /// clamped outside them.
    pub fn area_at(&self, z: f64) -> f64 {
        let (d, a) = (&self.depths_m, &self.areas_m2);
        if d.is_empty() {
            return 0.0;
        }
        if z <= d[0] {
            return a[0];
        }
        for i in 1..d.len() {
            if z <= d[i] {
                let frac = (z - d[i - 1]) / (d[i] - d[i - 1]);
                return a[i - 1] + frac * (a[i] - a[i - 1]);
            }
        }
        a[a.len() - 1]
    }

    /// Trapezoidal volume (m³) between depths `z0 < z1` (m).
    pub fn volume_between(&self, z0: f64, z1: f64) -> f64 {
        let mut nodes = vec![z0];
        nodes.extend(self.depths_m.iter().copied().filter(|&z| z > z0 && z < z1));
        nodes.push(z1);
        nodes
            .windows(2)
            .map(|w| 0.5 * (self.area_at(w[0]) + self.area_at(w[1])) * (w[1] - w[0]))
            .sum()
    }

    pub fn geometry(&self) -> LakeGeometry {
        let zt = self.thermocline_depth_m;
        LakeGeometry {
            epi_volume_cm3: m3_to_cm3(self.volume_between(0.0, zt)),
            hypo_volume_cm3: m3_to_cm3(self.volume_between(zt, self.max_depth_m())),
            surface_area_cm2: m2_to_cm2(self.area_at(0.0)),
            thermocline_area_cm2: m2_to_cm2(self.area_at(zt)),
            thermocline_depth_cm: m_to_cm(zt),
            thermocline_thickness_cm: m_to_cm(self.thermocline_thickness_m),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn basin() -> impl Strategy<Value = HypsographyDef> {
        prop::collection::vec((0.5f64..10.0, 0.0f64..1e6), 1..8).prop_map(|segments| {
            let mut depths = vec![0.0];
            let mut areas = vec![2e6];
            for (dz, a) in segments {
                depths.push(depths[depths.len() - 1] + dz);
                areas.push(a);
            }
            HypsographyDef {
                depths_m: depths,
                areas_m2: areas,
                thermocline_depth_m: 0.0,
                thermocline_thickness_m: 1.0,
            }
        })
    }

    proptest! {
        #[test]
        fn layer_volumes_add_up(h in basin(), frac in 0.01f64..0.99) {
            let max = h.max_depth_m();
            let z = frac * max;
            let total = h.volume_between(0.0, max);
            let split = h.volume_between(0.0, z) + h.volume_between(z, max);
            prop_assert!((split - total).abs() <= 1e-9 * total.max(1.0));
            prop_assert!(h.volume_between(0.0, z) > 0.0);
        }
    }
}
