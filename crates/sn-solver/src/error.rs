//! Error types for the steady solver.

use sn_core::CoreError;
use sn_network::NetworkError;
use thiserror::Error;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Singular system: {what}")]
    Singular { what: &'static str },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: &'static str },

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
