//! sn-transient: fixed-grid Method-of-Characteristics water-hammer
//! integrator.
//!
//! Consumes a steady-solved [`Network`], discretises every element onto a
//! Courant-compatible mesh, and advances head, per-side velocity, and
//! free-gas fraction with unsteady friction (exponential-sum convolution),
//! junction local losses, and Newton-closed valve boundaries.
//!
//! [`Network`]: sn_network::Network

mod boundary;
mod characteristics;
mod events;
mod kernel;
mod valve;

pub mod discretize;
pub mod engine;
pub mod error;
pub mod mesh;

pub use discretize::{Discretization, FrictionModel, discretize, discretize_with};
pub use engine::{Sample, TransientEngine};
pub use error::{TransientError, TransientResult};
pub use mesh::{ElementMesh, MeshSlot, Side, SideState};
