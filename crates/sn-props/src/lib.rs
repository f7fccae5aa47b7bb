//! sn-props: immutable property tables for surgenet.
//!
//! - fluids (density, viscosity, bulk modulus, vapour head)
//! - pipe materials (Young's modulus)
//! - unsteady-friction weighting-function coefficient tables

pub mod error;
pub mod fluid;
pub mod material;
pub mod weighting;

pub use error::{PropsError, PropsResult};
pub use fluid::{Fluid, FluidKind};
pub use material::{Material, MaterialKind};
pub use weighting::{
    RE_TRANSITION, VARDY_BROWN, WeightingTable, WeightingTerm, ZIELKE, table_for_reynolds,
};
