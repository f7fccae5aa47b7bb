//! sn-solver: steady-state flow distribution.
//!
//! Pipeline: discharge balancing → incidence initial flows → simultaneous
//! Hardy-Cross loop corrections → discharge recompute → head/pressure
//! back-substitution. All results are written back into the [`Network`]
//! arena.
//!
//! [`Network`]: sn_network::Network

pub mod error;
pub mod hardy_cross;
pub mod heads;
pub mod linalg;
pub mod resistance;
pub mod steady;

pub use error::{SolverError, SolverResult};
pub use steady::{SteadyReport, solve_steady};
