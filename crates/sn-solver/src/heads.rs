//! Head and pressure back-substitution after the loop corrections.

use crate::linalg::solve_least_squares;
use crate::resistance::element_resistance;
use crate::SolverResult;
use nalgebra::{DMatrix, DVector};
use sn_core::Real;
use sn_core::units::constants::G0_MPS2;
use sn_network::{Network, NodeKind};

/// Solve the over-determined element head-drop system `H_start − H_end =
/// r·q·|q|` for the free nodal heads; pressure-fixed columns move to the
/// right-hand side. Stores static head, mean nodal velocity, and gauge
/// pressure on every node.
pub fn back_substitute(network: &mut Network) -> SolverResult<()> {
    let fluid = network.fluid();
    let node_count = network.nodes().len();
    let elem_count = network.elements().len();

    let fixed: Vec<Option<Real>> = network
        .nodes()
        .iter()
        .map(|n| n.fixed_head(fluid))
        .collect();

    // Compact column map over the free nodes only; pressure-fixed heads
    // move to the right-hand side.
    let mut free_col = vec![usize::MAX; node_count];
    let mut free_count = 0;
    for (idx, f) in fixed.iter().enumerate() {
        if f.is_none() {
            free_col[idx] = free_count;
            free_count += 1;
        }
    }

    let mut b = DMatrix::zeros(elem_count, free_count);
    let mut c = DVector::zeros(elem_count);
    for (row, elem) in network.elements().iter().enumerate() {
        let q = elem.flow()?;
        let r = element_resistance(network, elem, q);
        c[row] = r * q * q.abs();
        for (node, sign) in [(elem.start, 1.0), (elem.end, -1.0)] {
            let col = node.index() as usize;
            match fixed[col] {
                Some(h) => c[row] -= sign * h,
                None => b[(row, free_col[col])] = sign,
            }
        }
    }
    let solved = if free_count > 0 {
        solve_least_squares(&b, &c)?
    } else {
        DVector::zeros(0)
    };

    // Mean adjacent speed per node, for the dynamic-head correction.
    let velocities: Vec<Real> = network
        .nodes()
        .iter()
        .map(|n| {
            let links = network.links(n.id);
            if links.is_empty() {
                return 0.0;
            }
            let sum: Real = links
                .iter()
                .map(|l| {
                    let e = network.element(l.elem);
                    (e.flow.unwrap_or(0.0) / e.area()).abs()
                })
                .sum();
            sum / links.len() as Real
        })
        .collect();

    let rho_g = fluid.density * G0_MPS2;
    for idx in 0..node_count {
        let v = velocities[idx];
        let head = match fixed[idx] {
            Some(h) => h,
            // The system solves total heads; free nodes store the static
            // head.
            None => solved[free_col[idx]] - v * v / (2.0 * G0_MPS2),
        };
        let node = &mut network.nodes_mut()[idx];
        node.velocity = Some(v);
        node.head = Some(head);
        if let Some(p) = node.input_pressure {
            node.pressure = Some(p);
        } else {
            let surface = match node.kind {
                NodeKind::Reservoir { level, .. } => level,
                _ => 0.0,
            };
            node.pressure = Some((head - node.elevation - surface) * rho_g);
        }
    }
    Ok(())
}
