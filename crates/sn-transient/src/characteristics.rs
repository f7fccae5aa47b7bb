//! Characteristic relations `H = K ∓ P·Q` assembled from the previous-step
//! mesh.
//!
//! `K` carries the donor head, the inertial term, and the explicit part of
//! the unsteady-friction convolution; `P` carries the inertial admittance,
//! quasi-steady wall friction, the implicit convolution weight, and any
//! local loss concentrated on the traversed segment.

use crate::mesh::{ElementMesh, Side};
use sn_core::Real;
use sn_core::units::constants::G0_MPS2;
use sn_network::{Network, NodeKind, Settings};
use sn_props::WeightingTable;

/// Per-element constants of one transient step.
#[derive(Clone, Copy)]
pub(crate) struct ElemCtx {
    pub area: Real,
    pub diameter: Real,
    pub dx: Real,
    pub dtau: Real,
    pub dt: Real,
    pub psi: Real,
    /// `α_ref · p_ref/(ρg)` of the free-gas law
    pub c_gas: Real,
    pub vapour_head: Real,
    /// Kinematic viscosity [m²/s]
    pub nu: Real,
    pub celerity: Real,
    pub roughness: Real,
    pub table: &'static WeightingTable,
    /// Local loss concentrated at each face (valve faces excluded: the
    /// valve closure prices its own loss)
    pub start_loss: Real,
    pub end_loss: Real,
    pub start_is_reservoir: bool,
    pub end_is_reservoir: bool,
    pub last: usize,
}

pub(crate) fn elem_ctx(
    network: &Network,
    settings: &Settings,
    dt: Real,
    elem_idx: usize,
    mesh: &ElementMesh,
) -> ElemCtx {
    let elem = &network.elements()[elem_idx];
    let fluid = network.fluid();
    let face = |node_id| {
        let node = network.node(node_id);
        match node.kind {
            NodeKind::Valve { .. } => (0.0, false),
            NodeKind::Reservoir { .. } => (node.effective_loss(), true),
            _ => (node.effective_loss(), false),
        }
    };
    let (start_loss, start_is_reservoir) = face(elem.start);
    let (end_loss, end_is_reservoir) = face(elem.end);
    ElemCtx {
        area: elem.area(),
        diameter: elem.diameter,
        dx: mesh.dx,
        dtau: mesh.dtau,
        dt,
        psi: settings.weighting_factor,
        c_gas: settings.gas_fraction * fluid.reference_head(),
        vapour_head: fluid.vapour_head,
        nu: fluid.kinematic_viscosity(),
        celerity: elem.celerity,
        roughness: elem.roughness,
        table: mesh.table,
        start_loss,
        end_loss,
        start_is_reservoir,
        end_is_reservoir,
        last: mesh.last(),
    }
}

impl ElemCtx {
    /// Local loss on the segment between `at` and `donor`, including the
    /// flow-direction-dependent spouting loss at a reservoir face.
    fn segment_loss(&self, at: usize, donor: usize, qx: Real) -> Real {
        let lo = at.min(donor);
        let hi = at.max(donor);
        let mut k = 0.0;
        if lo == 0 {
            k += self.start_loss;
            if self.start_is_reservoir && qx < 0.0 {
                k += 1.0;
            }
        }
        if hi == self.last {
            k += self.end_loss;
            if self.end_is_reservoir && qx > 0.0 {
                k += 1.0;
            }
        }
        k
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Dir {
    /// Positive characteristic, arriving from the upstream neighbour.
    Plus,
    /// Negative characteristic, arriving from the downstream neighbour.
    Minus,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Characteristic {
    pub k: Real,
    pub p: Real,
}

/// Assemble the characteristic arriving at slot `at` of `old` from its
/// in-element neighbour.
pub(crate) fn characteristic(
    ctx: &ElemCtx,
    old: &ElementMesh,
    at: usize,
    dir: Dir,
) -> Characteristic {
    let g = G0_MPS2;
    let (donor_idx, donor_side, own_side, sgn) = match dir {
        Dir::Plus => (at - 1, Side::Down, Side::Up, 1.0),
        Dir::Minus => (at + 1, Side::Up, Side::Down, -1.0),
    };
    let donor = &old.slots[donor_idx];
    let own = &old.slots[at];

    let qx = ctx.area * donor.side(donor_side).velocity;
    let f = donor.side(donor_side).friction;
    let a_sum = own.a_sum(ctx.table, ctx.dtau, own_side);
    let b_sum = own.b_sum(ctx.table, ctx.dtau, own_side);
    let cn = ctx.celerity * donor.beta.sqrt();
    let hist = 16.0 * ctx.nu * ctx.dx / (g * ctx.diameter * ctx.diameter);

    let k = donor.head + sgn * cn * qx / (g * ctx.area)
        - sgn * hist * (b_sum - qx * a_sum / ctx.area);
    let p = cn / (g * ctx.area)
        + f * ctx.dx * qx.abs() / (2.0 * g * ctx.diameter * ctx.area * ctx.area)
        + ctx.segment_loss(at, donor_idx, qx) * qx.abs() / (2.0 * g * ctx.area * ctx.area)
        + hist * a_sum / ctx.area;

    Characteristic { k, p }
}
