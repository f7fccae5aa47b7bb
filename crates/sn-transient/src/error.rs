//! Error types for discretisation and the transient kernel.

use sn_core::CoreError;
use sn_network::NetworkError;
use thiserror::Error;

pub type TransientResult<T> = Result<T, TransientError>;

#[derive(Error, Debug)]
pub enum TransientError {
    #[error("Time step vanished during the Courant search")]
    TimeStepVanished,

    #[error("Element {element} has no steady flow to map onto its mesh")]
    MissingSteadyState { element: u32 },

    #[error(transparent)]
    Props(#[from] sn_props::PropsError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Sample sink failure: {0}")]
    Io(#[from] std::io::Error),
}
