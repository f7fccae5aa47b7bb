//! Validated run settings.

use crate::{NetworkError, NetworkResult};
use sn_core::Real;
use sn_props::Fluid;

/// Global run parameters, validated once at construction.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// Working fluid (read-only property table entry).
    pub fluid: &'static Fluid,
    /// Reference free-gas fraction α_ref at the reference pressure.
    pub gas_fraction: Real,
    /// Minimum number of spatial segments on the shortest element.
    pub discretization: usize,
    /// Simulated time [s]; zero skips the transient stage entirely.
    pub sym_time: Real,
    /// Steps between CSV samples.
    pub write_interval: usize,
    /// Implicitness weighting ψ of the gas-continuity closure
    /// (0 = explicit, 1 = implicit).
    pub weighting_factor: Real,
}

impl Settings {
    pub fn new(
        fluid: &'static Fluid,
        gas_fraction: Real,
        discretization: usize,
        sym_time: Real,
        write_interval: usize,
        weighting_factor: Real,
    ) -> NetworkResult<Self> {
        if !gas_fraction.is_finite() || gas_fraction < 0.0 {
            return Err(NetworkError::InvalidSetting {
                what: "gasfraction must be >= 0",
            });
        }
        if discretization == 0 {
            return Err(NetworkError::InvalidSetting {
                what: "discretization must be >= 1",
            });
        }
        if !sym_time.is_finite() || sym_time < 0.0 {
            return Err(NetworkError::InvalidSetting {
                what: "symtime must be >= 0",
            });
        }
        if write_interval == 0 {
            return Err(NetworkError::InvalidSetting {
                what: "writeinterval must be >= 1",
            });
        }
        if !(0.0..=1.0).contains(&weighting_factor) {
            return Err(NetworkError::InvalidSetting {
                what: "weightingfactor must be within [0, 1]",
            });
        }
        Ok(Self {
            fluid,
            gas_fraction,
            discretization,
            sym_time,
            write_interval,
            weighting_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> &'static Fluid {
        Fluid::by_name("water").unwrap()
    }

    #[test]
    fn valid_settings() {
        let s = Settings::new(water(), 1e-7, 4, 10.0, 5, 1.0).unwrap();
        assert_eq!(s.discretization, 4);
        assert_eq!(s.write_interval, 5);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Settings::new(water(), -1.0, 4, 10.0, 5, 1.0).is_err());
        assert!(Settings::new(water(), 0.0, 0, 10.0, 5, 1.0).is_err());
        assert!(Settings::new(water(), 0.0, 4, -1.0, 5, 1.0).is_err());
        assert!(Settings::new(water(), 0.0, 4, 10.0, 0, 1.0).is_err());
        assert!(Settings::new(water(), 0.0, 4, 10.0, 5, 1.5).is_err());
    }
}
