//! Simultaneous Hardy-Cross: all loop corrections solved together by a
//! damped Newton step on the dense loop Jacobian.

use crate::linalg::solve_square;
use crate::resistance::element_resistance;
use crate::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use sn_core::{CONVERGENCE_EPS, MAX_ITERATIONS, Real};
use sn_network::{LoopDepot, Network};
use tracing::{debug, warn};

/// Velocity used to floor the Jacobian curvature when an element is (still)
/// at rest, so a zero-flow start is not a singular start.
const FLOOR_VELOCITY: Real = 0.01;

const MAX_BACKTRACKS: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct HardyCrossOutcome {
    pub iterations: usize,
    pub max_correction: Real,
    pub residual_norm: Real,
    pub converged: bool,
}

/// Iterate loop corrections until `max|Δq| < 1e-15` or the iteration cap.
///
/// Corrections are applied along loops and pseudo-loops only, so the nodal
/// mass balance established by the initial flow solve is preserved exactly
/// at every junction.
pub fn balance_flows(
    network: &mut Network,
    depot: &LoopDepot,
) -> SolverResult<HardyCrossOutcome> {
    let mut flows: Vec<Real> = network
        .elements()
        .iter()
        .map(|e| e.flow.unwrap_or(0.0))
        .collect();

    let mut outcome = HardyCrossOutcome {
        iterations: 0,
        max_correction: Real::INFINITY,
        residual_norm: Real::INFINITY,
        converged: false,
    };

    for iter in 0..MAX_ITERATIONS {
        let h = residuals(network, depot, &flows)?;
        let h_norm = h.norm();
        let jac = jacobian(network, depot, &flows);
        let rhs = -h.clone();
        let dq = solve_square(&jac, &rhs)?;

        // Backtracking damping: halve the step while the residual grows.
        let mut alpha = 1.0;
        let mut best: Option<(Real, Real)> = None; // (norm, alpha)
        for _ in 0..MAX_BACKTRACKS {
            let candidate = apply(depot, &flows, &dq, alpha);
            let norm = residuals(network, depot, &candidate)?.norm();
            if best.is_none_or(|(b, _)| norm < b) {
                best = Some((norm, alpha));
            }
            if norm < h_norm {
                break;
            }
            alpha *= 0.5;
        }
        let (new_norm, alpha) = best.ok_or(SolverError::ProblemSetup {
            what: "empty damping search",
        })?;
        flows = apply(depot, &flows, &dq, alpha);

        let max_correction = dq.iter().fold(0.0_f64, |m, v| m.max((v * alpha).abs()));
        outcome.iterations = iter + 1;
        outcome.max_correction = max_correction;
        outcome.residual_norm = new_norm;
        debug!(iter, max_correction, new_norm, "loop correction step");

        if max_correction < CONVERGENCE_EPS || new_norm < 1e-13 {
            outcome.converged = true;
            break;
        }
    }

    if !outcome.converged {
        warn!(
            iterations = outcome.iterations,
            residual = outcome.residual_norm,
            "Hardy-Cross iteration cap hit, keeping last iterate"
        );
    }

    for (elem, q) in network.elements_mut().iter_mut().zip(&flows) {
        elem.flow = Some(*q);
    }
    Ok(outcome)
}

/// Residual per loop row: `Σ orient·r·q·|q|`, plus the fixed-head imbalance
/// `H_tail − H_head` for pseudo-loops.
pub fn residuals(
    network: &Network,
    depot: &LoopDepot,
    flows: &[Real],
) -> SolverResult<DVector<Real>> {
    let fluid = network.fluid();
    let mut h = DVector::zeros(depot.total());
    for (row, lp) in depot.all().enumerate() {
        let mut sum = 0.0;
        for link in lp.links() {
            let idx = link.elem.index() as usize;
            let q = flows[idx];
            let r = element_resistance(network, network.element(link.elem), q);
            sum += link.orientation.sign() * r * q * q.abs();
        }
        if row >= depot.loops().len() {
            let head = |node| {
                network
                    .node(node)
                    .fixed_head(fluid)
                    .ok_or(SolverError::ProblemSetup {
                        what: "pseudo-loop endpoint has no fixed head",
                    })
            };
            let first = lp
                .first_free(network.elements())
                .ok_or(SolverError::ProblemSetup {
                    what: "empty pseudo-loop",
                })?;
            let last = lp
                .last_free(network.elements())
                .ok_or(SolverError::ProblemSetup {
                    what: "empty pseudo-loop",
                })?;
            sum += head(last)? - head(first)?;
        }
        h[row] = sum;
    }
    Ok(h)
}

/// Dense symmetric loop Jacobian: `J[i][j] = Σ_{e∈L_i∩L_j}
/// orient_i·orient_j·2·r_e·|q_e|`, with |q| floored so resting elements
/// still contribute curvature.
fn jacobian(network: &Network, depot: &LoopDepot, flows: &[Real]) -> DMatrix<Real> {
    let n = depot.total();
    let loops: Vec<_> = depot.all().collect();
    let mut jac = DMatrix::zeros(n, n);
    for (i, li) in loops.iter().enumerate() {
        for link in li.links() {
            let idx = link.elem.index() as usize;
            let elem = network.element(link.elem);
            let floor = FLOOR_VELOCITY * elem.area();
            let q = flows[idx].abs().max(floor);
            let q_signed = if flows[idx] < 0.0 { -q } else { q };
            let r = element_resistance(network, elem, q_signed);
            let contrib = 2.0 * r * q;
            for (j, lj) in loops.iter().enumerate() {
                if let Some(orient_j) = lj.orientation_of(link.elem) {
                    jac[(i, j)] += link.orientation.sign() * orient_j.sign() * contrib;
                }
            }
        }
    }
    jac
}

fn apply(depot: &LoopDepot, flows: &[Real], dq: &DVector<Real>, alpha: Real) -> Vec<Real> {
    let mut next = flows.to_vec();
    for (row, lp) in depot.all().enumerate() {
        for link in lp.links() {
            next[link.elem.index() as usize] += link.orientation.sign() * dq[row] * alpha;
        }
    }
    next
}
