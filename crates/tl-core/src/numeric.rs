use crate::TlError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, TlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TlError::NonFinite { what, value: v })
    }
}

/// Check every entry of a slice, reporting the first non-finite value.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), TlError> {
    for &v in values {
        ensure_finite(v, what)?;
    }
    Ok(())
}

/// Check that a slice is strictly increasing.
pub fn is_strictly_increasing(values: &[Real]) -> bool {
    values.windows(2).all(|w| w[1] > w[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_reports_infinity() {
        assert!(ensure_all_finite(&[1.0, 2.0], "xs").is_ok());
        assert!(ensure_all_finite(&[1.0, Real::INFINITY], "xs").is_err());
    }

    #[test]
    fn strictly_increasing() {
        assert!(is_strictly_increasing(&[1.0, 2.0, 2.5]));
        assert!(is_strictly_increasing(&[1.0]));
        assert!(!is_strictly_increasing(&[1.0, 1.0]));
        assert!(!is_strictly_increasing(&[2.0, 1.0]));
    }
}
