//! Fixed MOC meshes: one slot per grid point, double-buffered by the
//! engine.
//!
//! Endpoint slots are the element's view of the shared boundary nodes;
//! interior slots are element-private. Each slot carries independent
//! upstream/downstream side states so a cavity or a closed valve can hold
//! different velocities on the two faces.

use sn_core::Real;
use sn_props::WeightingTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Up,
    Down,
}

/// One face of a mesh slot: velocity, wall friction, and the retained
/// exponential modes of the unsteady-friction convolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SideState {
    pub velocity: Real,
    pub friction: Real,
    pub coeffs: Vec<Real>,
}

impl SideState {
    pub fn new(velocity: Real, friction: Real, modes: usize) -> Self {
        Self {
            velocity,
            friction,
            coeffs: vec![0.0; modes],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshSlot {
    /// Piezometric head [m]
    pub head: Real,
    /// Elevation [m], interpolated along the element
    pub elevation: Real,
    /// Free-gas fraction [-]
    pub gas_fraction: Real,
    /// Momentum correction β ≥ 1
    pub beta: Real,
    /// Reynolds number of the last update
    pub reynolds: Real,
    /// Unsteady-friction scaling (Vitkovsky) for this point
    pub a_scale: Real,
    pub b_scale: Real,
    pub up: SideState,
    pub down: SideState,
}

impl MeshSlot {
    pub fn side(&self, side: Side) -> &SideState {
        match side {
            Side::Up => &self.up,
            Side::Down => &self.down,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Up => &mut self.up,
            Side::Down => &mut self.down,
        }
    }

    /// Instantaneous convolution weight `Σ m_k·aScale·exp(-(n_k+bScale)Δτ)`
    /// over the retained modes.
    pub fn a_sum(&self, table: &WeightingTable, dtau: Real, side: Side) -> Real {
        let modes = self.side(side).coeffs.len();
        table.terms[..modes]
            .iter()
            .map(|t| (-(t.n + self.b_scale) * dtau).exp() * t.m * self.a_scale)
            .sum()
    }

    /// History weight `Σ exp(-2(n_k+bScale)Δτ)·coeff_k`; the double decay
    /// matches the two-Δt cadence of the staggered update.
    pub fn b_sum(&self, table: &WeightingTable, dtau: Real, side: Side) -> Real {
        let state = self.side(side);
        table.terms[..state.coeffs.len()]
            .iter()
            .zip(&state.coeffs)
            .map(|(t, c)| (-2.0 * (t.n + self.b_scale) * dtau).exp() * c)
            .sum()
    }

    /// Advance one side's convolution history with the velocity change of
    /// this update: `c_k ← E·(E·c_k + m_k·aScale·Δv)`.
    pub fn push_history(
        &mut self,
        table: &WeightingTable,
        dtau: Real,
        side: Side,
        dv: Real,
    ) {
        let a_scale = self.a_scale;
        let b_scale = self.b_scale;
        let state = self.side_mut(side);
        for (t, c) in table.terms.iter().zip(state.coeffs.iter_mut()) {
            let e = (-(t.n + b_scale) * dtau).exp();
            *c = e * (e * *c + t.m * a_scale * dv);
        }
    }
}

/// The per-element grid plus its discretisation constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementMesh {
    pub slots: Vec<MeshSlot>,
    /// Spatial step [m]
    pub dx: Real,
    /// Dimensionless time step `4·ν·Δt/d²`
    pub dtau: Real,
    /// Weighting table for the element's flow regime
    pub table: &'static WeightingTable,
}

impl ElementMesh {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn last(&self) -> usize {
        self.slots.len() - 1
    }
}

/// Positive root of `B₁·h² + B₂·h + B₃ = 0`; degenerates to the linear
/// solution when the quadratic coefficient vanishes (fully explicit
/// closure).
pub fn head_root(b1: Real, b2: Real, b3: Real) -> Real {
    if b1.abs() < 1e-30 {
        return -b3 / b2;
    }
    let disc = (b2 * b2 - 4.0 * b1 * b3).max(0.0);
    (-b2 + disc.sqrt()) / (2.0 * b1)
}
