//! Interior-node MOC update and the shared slot writer.

use crate::characteristics::{Characteristic, Dir, ElemCtx, characteristic};
use crate::mesh::{ElementMesh, MeshSlot, Side, head_root};
use sn_core::Real;
use sn_network::friction::{darcy_friction, reynolds as reynolds_of};
use sn_props::Fluid;

/// Gas-continuity quadratic coefficients shared by interior and boundary
/// closures: `α_new = B₁·h + Kp` combined with the free-gas law
/// `α·(h − z_v) = C_gas` gives `B₁h² + B₂h + B₃ = 0`.
pub(crate) struct GasClosure {
    pub b1: Real,
    pub kp: Real,
    pub zv: Real,
}

impl GasClosure {
    pub fn solve(&self, c_gas: Real) -> (Real, Real) {
        let b2 = self.kp - self.b1 * self.zv;
        let b3 = -self.kp * self.zv - c_gas;
        let h = head_root(self.b1, b2, b3);
        let alpha = (self.b1 * h + self.kp).clamp(0.0, 1.0);
        (h, alpha)
    }
}

/// Update one interior slot from the two in-element characteristics.
pub(crate) fn update_interior(
    ctx: &ElemCtx,
    fluid: &Fluid,
    old: &ElementMesh,
    cur: &mut ElementMesh,
    i: usize,
) {
    let cp = characteristic(ctx, old, i, Dir::Plus);
    let cm = characteristic(ctx, old, i, Dir::Minus);
    let o = &old.slots[i];

    let qu_old = ctx.area * o.up.velocity;
    let qd_old = ctx.area * o.down.velocity;
    let vol = ctx.area * ctx.dx;

    let kp = o.gas_fraction
        + 2.0 * ctx.dt / vol
            * ((1.0 - ctx.psi) * (qd_old - qu_old) - ctx.psi * (cp.k / cp.p + cm.k / cm.p));
    let closure = GasClosure {
        b1: 2.0 * ctx.psi * ctx.dt * (1.0 / cp.p + 1.0 / cm.p) / vol,
        kp,
        zv: o.elevation + ctx.vapour_head,
    };
    let (h, alpha) = closure.solve(ctx.c_gas);

    let qu = (cp.k - h) / cp.p;
    let qd = (h - cm.k) / cm.p;
    write_slot(
        ctx,
        fluid,
        o,
        &mut cur.slots[i],
        h,
        alpha,
        Some(qu),
        Some(qd),
    );
}

/// Write an updated slot: head, gas fraction, per-side velocity and
/// friction, and the convolution history of every side that changed. A
/// `None` flow leaves that side untouched (boundary slots update only the
/// side facing their element).
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_slot(
    ctx: &ElemCtx,
    fluid: &Fluid,
    old_slot: &MeshSlot,
    cur_slot: &mut MeshSlot,
    head: Real,
    alpha: Real,
    q_up: Option<Real>,
    q_down: Option<Real>,
) {
    *cur_slot = old_slot.clone();
    cur_slot.head = head;
    cur_slot.gas_fraction = alpha;

    let mut res = Vec::with_capacity(2);
    for (side, q) in [(Side::Up, q_up), (Side::Down, q_down)] {
        let Some(q) = q else { continue };
        let v = q / ctx.area;
        let re = reynolds_of(v, ctx.diameter, fluid);
        let dv = v - old_slot.side(side).velocity;
        {
            let s = cur_slot.side_mut(side);
            s.velocity = v;
            s.friction = darcy_friction(re, ctx.roughness, ctx.diameter);
        }
        cur_slot.push_history(ctx.table, ctx.dtau, side, dv);
        res.push(re);
    }
    if !res.is_empty() {
        cur_slot.reynolds = res.iter().sum::<Real>() / res.len() as Real;
    }
}

/// Characteristic pair helper for closures that need the full incident set.
pub(crate) fn into_node_flow(ch: &Characteristic, head: Real) -> Real {
    (ch.k - head) / ch.p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_closure_without_free_gas_recovers_the_characteristic_mean() {
        // Two characteristics agreeing on h = 80: Kp collapses to -B₁·80,
        // and the positive root is exactly the characteristic head.
        let b1 = 0.25;
        let closure = GasClosure {
            b1,
            kp: -b1 * 80.0,
            zv: -10.0,
        };
        let (h, alpha) = closure.solve(0.0);
        assert!((h - 80.0).abs() < 1e-12, "head {h}");
        assert!(alpha.abs() < 1e-12);
    }

    #[test]
    fn gas_closure_floors_the_head_at_the_vapour_bound() {
        // Characteristics pulling far below vapour head: the root pins to
        // z_v and the residual becomes free gas.
        let b1 = 0.25;
        let closure = GasClosure {
            b1,
            kp: -b1 * -400.0,
            zv: -10.0,
        };
        let (h, alpha) = closure.solve(0.0);
        assert!((h - -10.0).abs() < 1e-12, "head {h}");
        assert!(alpha > 0.0);
    }

    #[test]
    fn gas_closure_keeps_the_head_above_vapour_with_gas_present() {
        let b1 = 0.25;
        let closure = GasClosure {
            b1,
            kp: -b1 * -400.0,
            zv: -10.0,
        };
        let (h, _) = closure.solve(1e-6);
        assert!(h > -10.0);
        assert!(h < -9.9);
    }
}
