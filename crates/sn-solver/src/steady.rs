//! Steady-state pipeline orchestration.

use crate::hardy_cross::{HardyCrossOutcome, balance_flows};
use crate::heads::back_substitute;
use crate::linalg::solve_least_squares;
use crate::SolverResult;
use nalgebra::{DMatrix, DVector};
use sn_core::Real;
use sn_network::{LoopDepot, Network};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct SteadyReport {
    pub iterations: usize,
    pub max_correction: Real,
    pub residual_norm: Real,
    pub converged: bool,
}

impl From<HardyCrossOutcome> for SteadyReport {
    fn from(o: HardyCrossOutcome) -> Self {
        Self {
            iterations: o.iterations,
            max_correction: o.max_correction,
            residual_norm: o.residual_norm,
            converged: o.converged,
        }
    }
}

/// Run the full steady pipeline, writing flows, discharges, heads,
/// velocities, and pressures back into the network.
pub fn solve_steady(network: &mut Network, depot: &LoopDepot) -> SolverResult<SteadyReport> {
    balance_discharges(network);
    initial_flows(network)?;
    let outcome = balance_flows(network, depot)?;
    recompute_discharges(network);
    back_substitute(network)?;
    Ok(outcome.into())
}

/// Close the external mass balance: unset source/reservoir discharges share
/// the residual equally.
fn balance_discharges(network: &mut Network) {
    let mut total = 0.0;
    let mut unset = 0_usize;
    for node in network.nodes() {
        if node.is_source_like() {
            match node.discharge() {
                Some(q) => total += q,
                None => unset += 1,
            }
        }
    }
    if unset > 0 {
        let share = -total / unset as Real;
        for node in network.nodes_mut() {
            if node.is_source_like() && node.discharge().is_none() {
                node.set_discharge(share);
            }
        }
        return;
    }
    if total.abs() > 1e-12 {
        // Every discharge is prescribed but they do not cancel; spread the
        // imbalance over all of them so the incidence system stays
        // consistent.
        warn!(total, "prescribed discharges do not balance");
        let count = network.nodes().iter().filter(|n| n.is_source_like()).count();
        let share = total / count as Real;
        for node in network.nodes_mut() {
            if node.is_source_like() {
                let q = node.discharge().unwrap_or(0.0);
                node.set_discharge(q - share);
            }
        }
    }
}

/// Minimum-norm initial flows from the signed node-element incidence
/// system `A·x = b`.
fn initial_flows(network: &mut Network) -> SolverResult<()> {
    let node_count = network.nodes().len();
    let elem_count = network.elements().len();
    let mut a = DMatrix::zeros(node_count, elem_count);
    for (col, elem) in network.elements().iter().enumerate() {
        a[(elem.start.index() as usize, col)] = 1.0;
        a[(elem.end.index() as usize, col)] = -1.0;
    }
    let mut b = DVector::zeros(node_count);
    for (row, node) in network.nodes().iter().enumerate() {
        b[row] = node.discharge().unwrap_or(0.0);
    }

    let flows = if b.iter().all(|v| *v == 0.0) {
        DVector::zeros(elem_count)
    } else {
        solve_least_squares(&a, &b)?
    };
    debug!(max_flow = flows.amax(), "initial incidence flows");
    for (elem, q) in network.elements_mut().iter_mut().zip(flows.iter()) {
        elem.flow = Some(*q);
    }
    Ok(())
}

/// Re-derive source/reservoir discharges from the balanced element flows.
fn recompute_discharges(network: &mut Network) {
    let updates: Vec<(usize, Real)> = network
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_source_like())
        .map(|(idx, n)| {
            let q: Real = network
                .links(n.id)
                .iter()
                .map(|l| {
                    let elem = network.element(l.elem);
                    l.at.sign() * elem.flow.unwrap_or(0.0)
                })
                .sum();
            (idx, q)
        })
        .collect();
    for (idx, q) in updates {
        network.nodes_mut()[idx].set_discharge(q);
    }
}
