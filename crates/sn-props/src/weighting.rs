//! Exponential-sum approximations of the unsteady-friction weighting
//! functions.
//!
//! Two fixed tables: the laminar Zielke function (Kagawa-style coefficients)
//! and the turbulent Vardy–Brown function. Each retained mode k contributes
//! `m_k · exp(-n_k · τ)` to the approximated weighting function; `tau` is the
//! smallest dimensionless time for which truncation after that mode stays
//! within tolerance, so the tables are ordered by strictly decreasing `tau`.

use crate::{PropsError, PropsResult};
use sn_core::Real;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightingTerm {
    /// Exponential decay rate n_k [-]
    pub n: Real,
    /// Mode amplitude m_k [-]
    pub m: Real,
    /// Validity scale τ_mk: truncating after this mode is admissible for
    /// Δτ above this value
    pub tau: Real,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightingTable {
    pub name: &'static str,
    pub terms: &'static [WeightingTerm],
}

/// Laminar weighting function (Zielke), 10-mode exponential sum.
pub const ZIELKE: WeightingTable = WeightingTable {
    name: "zielke",
    terms: &[
        WeightingTerm { n: 26.3744, m: 1.0, tau: 2.0e-2 },
        WeightingTerm { n: 70.8493, m: 1.16725, tau: 8.0e-3 },
        WeightingTerm { n: 135.0198, m: 2.20064, tau: 4.0e-3 },
        WeightingTerm { n: 218.9216, m: 3.92861, tau: 2.0e-3 },
        WeightingTerm { n: 322.5544, m: 7.12867, tau: 1.0e-3 },
        WeightingTerm { n: 499.148, m: 13.2610, tau: 5.0e-4 },
        WeightingTerm { n: 745.7905, m: 24.8104, tau: 2.5e-4 },
        WeightingTerm { n: 1147.644, m: 46.5653, tau: 1.0e-4 },
        WeightingTerm { n: 1773.822, m: 87.6211, tau: 5.0e-5 },
        WeightingTerm { n: 2765.319, m: 164.839, tau: 2.0e-5 },
    ],
};

/// Turbulent weighting function (Vardy–Brown), 10-mode exponential sum.
pub const VARDY_BROWN: WeightingTable = WeightingTable {
    name: "vardy-brown",
    terms: &[
        WeightingTerm { n: 4.78793, m: 5.03362, tau: 5.0e-2 },
        WeightingTerm { n: 51.0897, m: 6.48760, tau: 1.5e-2 },
        WeightingTerm { n: 210.868, m: 10.7735, tau: 5.0e-3 },
        WeightingTerm { n: 765.030, m: 19.9040, tau: 1.5e-3 },
        WeightingTerm { n: 2731.01, m: 37.4754, tau: 5.0e-4 },
        WeightingTerm { n: 9731.44, m: 70.7117, tau: 1.5e-4 },
        WeightingTerm { n: 34668.5, m: 133.460, tau: 5.0e-5 },
        WeightingTerm { n: 123511.0, m: 251.933, tau: 1.5e-5 },
        WeightingTerm { n: 440374.0, m: 476.597, tau: 5.0e-6 },
        WeightingTerm { n: 1590300.0, m: 902.894, tau: 1.5e-6 },
    ],
};

/// Laminar/turbulent transition Reynolds number shared with the friction
/// model.
pub const RE_TRANSITION: Real = 2320.0;

/// Table applicable to a flow regime.
pub fn table_for_reynolds(reynolds: Real) -> &'static WeightingTable {
    if reynolds < RE_TRANSITION {
        &ZIELKE
    } else {
        &VARDY_BROWN
    }
}

impl WeightingTable {
    /// Number of exponential modes to retain for the dimensionless time step
    /// `dtau = 4·ν·Δt/d²`: the smallest M with `tau[M-1] < dtau`.
    ///
    /// A step finer than the smallest tabulated scale cannot be represented
    /// by the table and is fatal.
    pub fn mode_count(&self, dtau: Real) -> PropsResult<usize> {
        for (i, term) in self.terms.iter().enumerate() {
            if term.tau < dtau {
                return Ok(i + 1);
            }
        }
        Err(PropsError::TimeScaleBelowTable {
            dtau,
            tau_min: self.terms[self.terms.len() - 1].tau,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_tau_descending_and_n_ascending() {
        for table in [&ZIELKE, &VARDY_BROWN] {
            for pair in table.terms.windows(2) {
                assert!(pair[0].tau > pair[1].tau, "{} tau order", table.name);
                assert!(pair[0].n < pair[1].n, "{} n order", table.name);
            }
        }
    }

    #[test]
    fn coarse_step_needs_one_mode() {
        assert_eq!(ZIELKE.mode_count(0.1).unwrap(), 1);
        assert_eq!(VARDY_BROWN.mode_count(0.1).unwrap(), 1);
    }

    #[test]
    fn finer_steps_need_more_modes() {
        let coarse = ZIELKE.mode_count(1.0e-2).unwrap();
        let fine = ZIELKE.mode_count(3.0e-4).unwrap();
        assert!(fine > coarse);
        assert_eq!(ZIELKE.mode_count(3.0e-4).unwrap(), 7);
    }

    #[test]
    fn below_table_step_is_fatal() {
        let err = ZIELKE.mode_count(1.0e-5).unwrap_err();
        assert!(matches!(err, PropsError::TimeScaleBelowTable { .. }));
    }

    #[test]
    fn regime_selection() {
        assert_eq!(table_for_reynolds(1000.0).name, "zielke");
        assert_eq!(table_for_reynolds(1.0e5).name, "vardy-brown");
    }
}
