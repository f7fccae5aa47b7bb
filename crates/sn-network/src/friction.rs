//! Shared hydraulic correlations: Reynolds number, Darcy friction factor,
//! momentum correction.

use sn_core::{CONVERGENCE_EPS, MAX_ITERATIONS, Real};
use sn_core::units::constants::G0_MPS2;
use sn_props::Fluid;
use tracing::warn;

/// Laminar/turbulent transition Reynolds number, shared with the
/// weighting-table selection.
pub use sn_props::RE_TRANSITION;

/// Reynolds number `|v|·ρ·d/μ`.
pub fn reynolds(velocity: Real, diameter: Real, fluid: &Fluid) -> Real {
    velocity.abs() * fluid.density * diameter / fluid.dynamic_viscosity
}

/// Darcy friction factor.
///
/// Laminar: 64/Re. Turbulent: Colebrook-White fixed point started at 0.015.
/// Zero Reynolds yields zero so a resting pipe contributes no resistance.
pub fn darcy_friction(reynolds: Real, roughness: Real, diameter: Real) -> Real {
    if reynolds < Real::EPSILON {
        return 0.0;
    }
    if reynolds < RE_TRANSITION {
        return 64.0 / reynolds;
    }
    let relative = roughness / (3.7075 * diameter);
    let mut lambda: Real = 0.015;
    for _ in 0..MAX_ITERATIONS {
        let next = (-2.0 * (relative + 2.523 / (reynolds * lambda.sqrt())).log10()).powi(-2);
        if (next - lambda).abs() < CONVERGENCE_EPS {
            return next;
        }
        lambda = next;
    }
    warn!(reynolds, "Colebrook-White iteration cap hit, keeping last iterate");
    lambda
}

/// Momentum (Boussinesq) correction β ≥ 1 for a non-uniform velocity
/// profile.
///
/// Laminar profiles are reconstructed from the driving head difference
/// across the element; turbulent profiles follow the Zagarola (1997) /
/// Chen (1992) power-law exponent.
#[allow(clippy::too_many_arguments)]
pub fn momentum_correction(
    reynolds: Real,
    pressure_start: Real,
    pressure_end: Real,
    elevation_start: Real,
    elevation_end: Real,
    diameter: Real,
    length: Real,
    velocity: Real,
    fluid: &Fluid,
) -> Real {
    if reynolds < Real::EPSILON {
        return 1.0;
    }
    let beta = if reynolds < RE_TRANSITION {
        let driving = (pressure_end - pressure_start)
            + fluid.density * G0_MPS2 * (elevation_end - elevation_start);
        let profile =
            driving * diameter * diameter / (4.0 * fluid.dynamic_viscosity * velocity.abs() * length);
        profile * profile / 42.0
    } else {
        let ln_re = reynolds.ln();
        let alpha = 1.085 / ln_re + 6.535 / (ln_re * ln_re);
        (1.0 + alpha) * (2.0 + alpha) * (2.0 + alpha) / (4.0 * (1.0 + 2.0 * alpha))
    };
    beta.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> &'static Fluid {
        Fluid::by_name("water").unwrap()
    }

    #[test]
    fn zero_reynolds_gives_zero_friction() {
        assert_eq!(darcy_friction(0.0, 5.0e-5, 0.3), 0.0);
    }

    #[test]
    fn laminar_friction_is_sixty_four_over_re() {
        let f = darcy_friction(1000.0, 5.0e-5, 0.3);
        assert!((f - 0.064).abs() < 1e-12);
    }

    #[test]
    fn turbulent_friction_for_a_steel_main() {
        // Re ~ 1.2e6, eps/d ~ 1.7e-4: Colebrook gives about 0.014.
        let re = reynolds(4.0, 0.3, water());
        assert!(re > 1.0e6, "re {re}");
        let f = darcy_friction(re, 5.0e-5, 0.3);
        assert!(f > 0.012 && f < 0.022, "friction {f}");
    }

    #[test]
    fn colebrook_fixed_point_is_consistent() {
        let re = 5.0e5;
        let f = darcy_friction(re, 1.0e-4, 0.25);
        let relative = 1.0e-4 / (3.7075 * 0.25);
        let rhs = (-2.0 * (relative + 2.523 / (re * f.sqrt())).log10()).powi(-2);
        assert!((f - rhs).abs() < 1e-12);
    }

    #[test]
    fn momentum_correction_turbulent_near_unity() {
        let beta = momentum_correction(1.0e6, 0.0, 0.0, 0.0, 0.0, 0.3, 1000.0, 4.0, water());
        assert!(beta >= 1.0 && beta < 1.1, "beta {beta}");
    }

    #[test]
    fn momentum_correction_clamped_at_rest() {
        let beta = momentum_correction(0.0, 0.0, 0.0, 0.0, 0.0, 0.3, 1000.0, 0.0, water());
        assert_eq!(beta, 1.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn turbulent_friction_satisfies_colebrook(
                re in 4.0e3_f64..1.0e8,
                rel_rough in 1.0e-7_f64..1.0e-3,
            ) {
                let d = 0.3;
                let f = darcy_friction(re, rel_rough * d, d);
                prop_assert!(f > 0.0 && f < 0.2);
                let relative = rel_rough * d / (3.7075 * d);
                let rhs = (-2.0 * (relative + 2.523 / (re * f.sqrt())).log10()).powi(-2);
                prop_assert!((f - rhs).abs() < 1e-10);
            }

            #[test]
            fn momentum_correction_never_below_one(re in 0.0_f64..1.0e8) {
                let beta =
                    momentum_correction(re, 1.0e5, 9.0e4, 0.0, 1.0, 0.3, 1000.0, 0.5, water());
                prop_assert!(beta >= 1.0);
                prop_assert!(beta.is_finite());
            }
        }
    }
}
