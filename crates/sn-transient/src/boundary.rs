//! Boundary-slot closures: pressure-fixed nodes, junctions (with optional
//! external discharge), and dispatch to the valve closure.
//!
//! Every incident element's update recomputes the same closure from the
//! previous-step meshes, then writes only its own side of the shared node,
//! so coincident visits agree deterministically.

use crate::characteristics::{Characteristic, Dir, ElemCtx, characteristic, elem_ctx};
use crate::kernel::{GasClosure, into_node_flow, write_slot};
use crate::mesh::ElementMesh;
use crate::valve;
use sn_core::{NodeId, Real};
use sn_network::{End, Network, NodeKind, Settings};

/// Step-wide context shared by all closures.
pub(crate) struct StepGlobals<'a> {
    pub network: &'a Network,
    pub settings: &'a Settings,
    pub dt: Real,
}

/// One incident element's characteristic view of a boundary node.
pub(crate) struct Incident {
    pub ch: Characteristic,
    /// Previous-step flow into the node [m³/s]
    pub q_in_old: Real,
    /// Control-volume share `A·Δx/2` [m³]
    pub vol: Real,
}

pub(crate) fn incident_set(
    globals: &StepGlobals<'_>,
    old: &[ElementMesh],
    node: NodeId,
) -> Vec<Incident> {
    globals
        .network
        .links(node)
        .iter()
        .map(|link| {
            let elem_idx = link.elem.index() as usize;
            let mesh = &old[elem_idx];
            let ctx = elem_ctx(globals.network, globals.settings, globals.dt, elem_idx, mesh);
            let (ch, q_in_old) = match link.at {
                End::End => {
                    let at = mesh.last();
                    (
                        characteristic(&ctx, mesh, at, Dir::Plus),
                        ctx.area * mesh.slots[at].up.velocity,
                    )
                }
                End::Start => (
                    characteristic(&ctx, mesh, 0, Dir::Minus),
                    -ctx.area * mesh.slots[0].down.velocity,
                ),
            };
            Incident {
                ch,
                q_in_old,
                vol: ctx.area * ctx.dx / 2.0,
            }
        })
        .collect()
}

/// Solve the junction gas-continuity closure over the full incident set.
pub(crate) fn junction_closure(
    globals: &StepGlobals<'_>,
    incidents: &[Incident],
    alpha_old: Real,
    zv: Real,
    discharge: Real,
) -> (Real, Real) {
    let psi = globals.settings.weighting_factor;
    let c_gas = globals.settings.gas_fraction * globals.network.fluid().reference_head();
    let vol: Real = incidents.iter().map(|i| i.vol).sum();
    let q_in_old: Real = incidents.iter().map(|i| i.q_in_old).sum();
    let sum_k_over_p: Real = incidents.iter().map(|i| i.ch.k / i.ch.p).sum();
    let sum_inv_p: Real = incidents.iter().map(|i| 1.0 / i.ch.p).sum();

    let kp = alpha_old
        - 2.0 * globals.dt / vol
            * ((1.0 - psi) * (q_in_old + discharge) + psi * (sum_k_over_p + discharge));
    let closure = GasClosure {
        b1: 2.0 * psi * globals.dt * sum_inv_p / vol,
        kp,
        zv,
    };
    closure.solve(c_gas)
}

/// Update the boundary slot of `cur` (`slot` is 0 or last) for the element
/// `elem_idx`.
pub(crate) fn update_boundary(
    globals: &StepGlobals<'_>,
    old: &[ElementMesh],
    cur: &mut ElementMesh,
    ctx: &ElemCtx,
    elem_idx: usize,
    slot: usize,
) {
    let elem = &globals.network.elements()[elem_idx];
    let at_end = slot != 0;
    let node_id = if at_end { elem.end } else { elem.start };
    let node = globals.network.node(node_id);

    if matches!(node.kind, NodeKind::Valve { .. }) {
        valve::update_valve_side(globals, old, cur, ctx, elem_idx, slot);
        return;
    }

    let fluid = globals.network.fluid();
    let old_slot = old[elem_idx].slots[slot].clone();
    let zv = old_slot.elevation + fluid.vapour_head;
    let c_gas = globals.settings.gas_fraction * fluid.reference_head();

    let (head, alpha) = match node.fixed_head(fluid) {
        Some(h) => {
            let alpha = if c_gas > 0.0 {
                (c_gas / (h - old_slot.elevation - fluid.vapour_head).max(1e-9)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            (h, alpha)
        }
        None => {
            let incidents = incident_set(globals, old, node_id);
            let discharge = node.discharge().unwrap_or(0.0);
            junction_closure(globals, &incidents, old_slot.gas_fraction, zv, discharge)
        }
    };

    // Own characteristic and side flow in element orientation.
    let own_ch = if at_end {
        characteristic(ctx, &old[elem_idx], slot, Dir::Plus)
    } else {
        characteristic(ctx, &old[elem_idx], 0, Dir::Minus)
    };
    let q_in = into_node_flow(&own_ch, head);
    let (q_up, q_down) = if at_end {
        (Some(q_in), None)
    } else {
        (None, Some(-q_in))
    };
    write_slot(
        ctx,
        fluid,
        &old_slot,
        &mut cur.slots[slot],
        head,
        alpha,
        q_up,
        q_down,
    );
}
