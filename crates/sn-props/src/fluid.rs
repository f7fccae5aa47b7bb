//! Working-fluid property table.
//!
//! Entries are looked up once at input time by case-folded name and then
//! treated as read-only constants by both solvers.

use crate::{PropsError, PropsResult};
use sn_core::units::{Density, DynVisc, Length, Pressure, kgpm3, m, pa};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluidKind {
    Water,
}

/// One fluid of the catalog, SI values at 20 °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluid {
    pub kind: FluidKind,
    pub canonical_id: &'static str,
    /// Mass density [kg/m³]
    pub density: f64,
    /// Dynamic viscosity [Pa·s]
    pub dynamic_viscosity: f64,
    /// Bulk modulus of elasticity [Pa]
    pub bulk_modulus: f64,
    /// Vapour head relative to atmosphere [m]; the transient head update is
    /// bounded below by `elevation + vapour_head`.
    pub vapour_head: f64,
    /// Reference (atmospheric) pressure for the free-gas law [Pa]
    pub reference_pressure: f64,
}

const CATALOG: [Fluid; 1] = [Fluid {
    kind: FluidKind::Water,
    canonical_id: "water",
    density: 998.2,
    dynamic_viscosity: 1.002e-3,
    bulk_modulus: 2.19e9,
    vapour_head: -10.09,
    reference_pressure: 101_325.0,
}];

impl Fluid {
    /// Case-folded catalog lookup.
    pub fn by_name(name: &str) -> PropsResult<&'static Fluid> {
        let query = name.trim().to_ascii_lowercase();
        CATALOG
            .iter()
            .find(|f| f.canonical_id == query)
            .ok_or(PropsError::UnknownFluid { name: name.to_string() })
    }

    /// Kinematic viscosity ν = μ/ρ [m²/s].
    pub fn kinematic_viscosity(&self) -> f64 {
        self.dynamic_viscosity / self.density
    }

    /// Reference pressure expressed as head [m].
    pub fn reference_head(&self) -> f64 {
        self.reference_pressure / (self.density * sn_core::units::constants::G0_MPS2)
    }

    pub fn density_si(&self) -> Density {
        kgpm3(self.density)
    }

    pub fn dynamic_viscosity_si(&self) -> DynVisc {
        use uom::si::dynamic_viscosity::pascal_second;
        DynVisc::new::<pascal_second>(self.dynamic_viscosity)
    }

    pub fn bulk_modulus_si(&self) -> Pressure {
        pa(self.bulk_modulus)
    }

    pub fn vapour_head_si(&self) -> Length {
        m(self.vapour_head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_lookup_is_case_folded() {
        let a = Fluid::by_name("water").unwrap();
        let b = Fluid::by_name("  WaTeR ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.kind, FluidKind::Water);
    }

    #[test]
    fn unknown_fluid_is_an_error() {
        let err = Fluid::by_name("mercury").unwrap_err();
        assert!(format!("{err}").contains("mercury"));
    }

    #[test]
    fn water_reference_head_is_about_ten_metres() {
        let water = Fluid::by_name("water").unwrap();
        let h = water.reference_head();
        assert!((h - 10.35).abs() < 0.05, "reference head {h}");
    }

    #[test]
    fn kinematic_viscosity_magnitude() {
        let water = Fluid::by_name("water").unwrap();
        let nu = water.kinematic_viscosity();
        assert!((nu - 1.0e-6).abs() < 5e-8, "nu {nu}");
    }
}
