//! Two-way in-line valve closure.
//!
//! With the valve shut the two sides decouple into single-sided gas
//! closures at zero through-flow. With the valve open, the through-flow is
//! the root of a scalar equation assembling the two side heads (each the
//! positive root of its gas quadratic) and the opening-dependent valve
//! loss; the root is found by Newton-Raphson with a smoothed |Q| so the
//! derivative stays continuous across flow reversal.

use crate::boundary::StepGlobals;
use crate::characteristics::{Dir, ElemCtx, characteristic, elem_ctx};
use crate::kernel::{GasClosure, write_slot};
use crate::mesh::ElementMesh;
use sn_core::units::constants::G0_MPS2;
use sn_core::{CONVERGENCE_EPS, MAX_ITERATIONS, Real, smooth_abs};
use sn_network::{End, NodeKind};
use tracing::warn;

const CLOSED_STATE: Real = 1e-9;

struct ValveSolution {
    head_up: Real,
    head_down: Real,
    alpha_up: Real,
    alpha_down: Real,
    /// Pipe-side flows at the two faces, element orientation [m³/s]
    q_up_pipe: Real,
    q_down_pipe: Real,
}

/// Update this element's face of the valve node (`slot` 0 or last).
pub(crate) fn update_valve_side(
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
    let NodeKind::Valve { state, .. } = node.kind else {
        return;
    };

    // Validated: exactly one element on each face.
    let mut up_idx = elem_idx;
    let mut down_idx = elem_idx;
    for link in globals.network.links(node_id) {
        match link.at {
            End::End => up_idx = link.elem.index() as usize,
            End::Start => down_idx = link.elem.index() as usize,
        }
    }

    let solution = solve_valve(globals, old, node.loss, state, up_idx, down_idx);
    let fluid = globals.network.fluid();
    let old_slot = old[elem_idx].slots[slot].clone();
    if at_end {
        write_slot(
            ctx,
            fluid,
            &old_slot,
            &mut cur.slots[slot],
            solution.head_up,
            solution.alpha_up,
            Some(solution.q_up_pipe),
            None,
        );
    } else {
        write_slot(
            ctx,
            fluid,
            &old_slot,
            &mut cur.slots[slot],
            solution.head_down,
            solution.alpha_down,
            None,
            Some(solution.q_down_pipe),
        );
    }
}

fn solve_valve(
    globals: &StepGlobals<'_>,
    old: &[ElementMesh],
    loss: Real,
    state: Real,
    up_idx: usize,
    down_idx: usize,
) -> ValveSolution {
    let g = G0_MPS2;
    let fluid = globals.network.fluid();
    let psi = globals.settings.weighting_factor;
    let dt = globals.dt;
    let c_gas = globals.settings.gas_fraction * fluid.reference_head();

    let ctx_u = elem_ctx(globals.network, globals.settings, dt, up_idx, &old[up_idx]);
    let ctx_d = elem_ctx(globals.network, globals.settings, dt, down_idx, &old[down_idx]);
    let last_u = old[up_idx].last();
    let ch_u = characteristic(&ctx_u, &old[up_idx], last_u, Dir::Plus);
    let ch_d = characteristic(&ctx_d, &old[down_idx], 0, Dir::Minus);

    let up_slot = &old[up_idx].slots[last_u];
    let down_slot = &old[down_idx].slots[0];
    let q_u_old = ctx_u.area * up_slot.up.velocity;
    let q_d_old = ctx_d.area * down_slot.down.velocity;
    let net_out_old = q_d_old - q_u_old;
    let vol_u = ctx_u.area * ctx_u.dx / 2.0;
    let vol_d = ctx_d.area * ctx_d.dx / 2.0;
    let zv_u = up_slot.elevation + fluid.vapour_head;
    let zv_d = down_slot.elevation + fluid.vapour_head;

    let explicit = 1.0 - psi;

    if state <= CLOSED_STATE {
        if psi < 1e-12 {
            let alpha_u = (up_slot.gas_fraction + 2.0 * dt / vol_u * net_out_old).clamp(0.0, 1.0);
            let alpha_d = (down_slot.gas_fraction + 2.0 * dt / vol_d * net_out_old).clamp(0.0, 1.0);
            return ValveSolution {
                head_up: ch_u.k,
                head_down: ch_d.k,
                alpha_up: alpha_u,
                alpha_down: alpha_d,
                q_up_pipe: 0.0,
                q_down_pipe: 0.0,
            };
        }
        let c_u = 2.0 * psi * dt / vol_u;
        let kp_u = up_slot.gas_fraction + 2.0 * dt / vol_u * explicit * net_out_old
            - c_u * ch_u.k / ch_u.p;
        let (head_up, alpha_up) = GasClosure {
            b1: c_u / ch_u.p,
            kp: kp_u,
            zv: zv_u,
        }
        .solve(c_gas);
        let c_d = 2.0 * psi * dt / vol_d;
        let kp_d = down_slot.gas_fraction + 2.0 * dt / vol_d * explicit * net_out_old
            - c_d * ch_d.k / ch_d.p;
        let (head_down, alpha_down) = GasClosure {
            b1: c_d / ch_d.p,
            kp: kp_d,
            zv: zv_d,
        }
        .solve(c_gas);
        return ValveSolution {
            head_up,
            head_down,
            alpha_up,
            alpha_down,
            q_up_pipe: 0.0,
            q_down_pipe: 0.0,
        };
    }

    let zeta = loss - state.log10();
    let coeff = zeta / (2.0 * g * ctx_u.area * ctx_u.area);

    let c_u = 2.0 * psi * dt / vol_u;
    let c_d = 2.0 * psi * dt / vol_d;
    let b1u = c_u / ch_u.p;
    let b4 = c_d / ch_d.p;
    let kp_u0 =
        up_slot.gas_fraction + 2.0 * dt / vol_u * explicit * net_out_old - c_u * ch_u.k / ch_u.p;
    let kp_d0 = down_slot.gas_fraction + 2.0 * dt / vol_d * explicit * net_out_old
        - c_d * ch_d.k / ch_d.p;

    // Side heads and their Q-derivatives at a trial through-flow.
    let sides = |q: Real| -> (Real, Real, Real, Real) {
        if psi < 1e-12 {
            let h_u = ch_u.k - ch_u.p * q;
            let h_d = ch_d.k + ch_d.p * q;
            return (h_u, h_d, -ch_u.p, ch_d.p);
        }
        let kp_u = kp_u0 + c_u * q;
        let b2u = kp_u - b1u * zv_u;
        let b3u = -kp_u * zv_u - c_gas;
        let su = (b2u * b2u - 4.0 * b1u * b3u).max(0.0).sqrt().max(1e-30);
        let h_u = (-b2u + su) / (2.0 * b1u);
        let dh_u = -c_u / (2.0 * b1u) + c_u * (b2u + 2.0 * b1u * zv_u) / (2.0 * b1u * su);

        let kp_d = kp_d0 - c_d * q;
        let b5 = kp_d - b4 * zv_d;
        let b6 = -kp_d * zv_d - c_gas;
        let sd = (b5 * b5 - 4.0 * b4 * b6).max(0.0).sqrt().max(1e-30);
        let h_d = (-b5 + sd) / (2.0 * b4);
        let dh_d = c_d / (2.0 * b4) - c_d * (b5 + 2.0 * b4 * zv_d) / (2.0 * b4 * sd);
        (h_u, h_d, dh_u, dh_d)
    };

    let mut q = q_d_old;
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let (h_u, h_d, dh_u, dh_d) = sides(q);
        let f = coeff * q * q.abs() + h_d - h_u;
        if f.abs() < CONVERGENCE_EPS {
            converged = true;
            break;
        }
        let fp = 2.0 * coeff * smooth_abs(q) + dh_d - dh_u;
        if !fp.is_finite() || fp.abs() < 1e-30 {
            break;
        }
        let dq = -f / fp;
        q += dq;
        if dq.abs() < CONVERGENCE_EPS {
            converged = true;
            break;
        }
    }
    if !converged {
        warn!(q, "valve closure Newton cap hit, keeping last iterate");
    }

    let (head_up, head_down, _, _) = sides(q);
    let q_up_pipe = (ch_u.k - head_up) / ch_u.p;
    let q_down_pipe = (head_down - ch_d.k) / ch_d.p;
    let (alpha_up, alpha_down) = if psi < 1e-12 {
        (
            (up_slot.gas_fraction + 2.0 * dt / vol_u * net_out_old).clamp(0.0, 1.0),
            (down_slot.gas_fraction + 2.0 * dt / vol_d * net_out_old).clamp(0.0, 1.0),
        )
    } else {
        (
            (b1u * head_up + kp_u0 + c_u * q).clamp(0.0, 1.0),
            (b4 * head_down + kp_d0 - c_d * q).clamp(0.0, 1.0),
        )
    };

    ValveSolution {
        head_up,
        head_down,
        alpha_up,
        alpha_down,
        q_up_pipe,
        q_down_pipe,
    }
}
