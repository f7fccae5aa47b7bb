//! Hydraulic resistance of an element at a given flow.

use sn_core::Real;
use sn_core::units::constants::G0_MPS2;
use sn_network::{Element, Network, NodeKind, friction};
use std::f64::consts::PI;

/// Resistance `r` in the loss law `Δh = r·q·|q|`:
/// `r = λ·8L/(d⁵gπ²) + 8K/(d⁴gπ²)`.
///
/// `K` collects the local-loss coefficients of both endpoints plus the
/// spouting loss where the element discharges into a reservoir. `λ` is
/// evaluated at the element velocity implied by `flow`.
pub fn element_resistance(network: &Network, elem: &Element, flow: Real) -> Real {
    let fluid = network.fluid();
    let velocity = flow / elem.area();
    let re = friction::reynolds(velocity, elem.diameter, fluid);
    let lambda = friction::darcy_friction(re, elem.roughness, elem.diameter);
    let d = elem.diameter;
    let k = local_losses(network, elem, flow);
    let denom4 = d.powi(4) * G0_MPS2 * PI * PI;
    lambda * 8.0 * elem.length / (d.powi(5) * G0_MPS2 * PI * PI) + 8.0 * k / denom4
}

fn local_losses(network: &Network, elem: &Element, flow: Real) -> Real {
    let start = network.node(elem.start);
    let end = network.node(elem.end);
    let mut k = start.effective_loss() + end.effective_loss();
    // Spouting loss when the element empties into a free surface.
    if flow > 0.0 && matches!(end.kind, NodeKind::Reservoir { .. }) {
        k += 1.0;
    }
    if flow < 0.0 && matches!(start.kind, NodeKind::Reservoir { .. }) {
        k += 1.0;
    }
    k
}
