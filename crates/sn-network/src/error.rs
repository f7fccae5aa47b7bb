//! Error types for network construction and enumeration.

use sn_core::{CoreError, NodeId};
use thiserror::Error;

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Element {element} references unknown node id {node}")]
    UnknownNode { element: u32, node: u32 },

    #[error("Element {element} has identical endpoints (node {node})")]
    DegenerateElement { element: u32, node: u32 },

    #[error("Network needs at least two source or reservoir nodes, found {found}")]
    TooFewSources { found: usize },

    #[error("Network has no node with a prescribed head or pressure")]
    NoFixedHead,

    #[error("Node {node} is not connected to the rest of the network")]
    Disconnected { node: NodeId },

    #[error("Valve {node} must have exactly one upstream and one downstream element")]
    MalformedValve { node: NodeId },

    #[error("Found {found} of {expected} fundamental loops")]
    IncompleteCycleBasis { found: usize, expected: usize },

    #[error("No chain joins the pressure-fixed nodes {from} and {to}")]
    UnreachableFixedNode { from: NodeId, to: NodeId },

    #[error("Network has no loops and no pseudo-loops")]
    NoEquations,

    #[error("Invalid setting: {what}")]
    InvalidSetting { what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Props(#[from] sn_props::PropsError),
}
