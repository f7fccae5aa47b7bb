use crate::CoreError;

/// Floating point type used throughout the solvers.
pub type Real = f64;

/// Iteration cap shared by every fixed-point / Newton subproblem.
pub const MAX_ITERATIONS: usize = 1000;

/// Convergence threshold shared by every fixed-point / Newton subproblem.
pub const CONVERGENCE_EPS: Real = 1e-15;

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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// |q| smoothed to stay differentiable across a flow reversal.
///
/// Used by the valve Newton closure, whose derivative would otherwise be
/// discontinuous at Q = 0.
pub fn smooth_abs(q: Real) -> Real {
    (q * q + 1e-24).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

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
    fn smooth_abs_at_zero() {
        assert!(smooth_abs(0.0) > 0.0);
        assert!(smooth_abs(0.0) < 1e-11);
    }

    proptest! {
        #[test]
        fn smooth_abs_close_to_abs(q in -1.0e3_f64..1.0e3) {
            prop_assert!((smooth_abs(q) - q.abs()).abs() <= 1e-11);
            prop_assert!(smooth_abs(q) >= q.abs());
        }
    }
}
