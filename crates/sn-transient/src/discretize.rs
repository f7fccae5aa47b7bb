//! Courant-compatible discretisation and initial mesh mapping.
//!
//! The shortest element fixes the tentative spatial step; the time step is
//! then shrunk until every element's Courant number is admissible. Steady
//! fields are mapped onto the meshes with the endpoint local losses
//! concentrated at the element faces, so an undisturbed transient holds the
//! steady profile.

use crate::mesh::{ElementMesh, MeshSlot, SideState};
use crate::{TransientError, TransientResult};
use sn_core::Real;
use sn_core::units::constants::G0_MPS2;
use sn_network::friction::{RE_TRANSITION, darcy_friction, momentum_correction, reynolds};
use sn_network::{Element, Network, NodeKind, Settings};
use sn_props::table_for_reynolds;
use std::f64::consts::PI;
use tracing::debug;

/// Wall-friction selection for the transient kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrictionModel {
    /// Quasi-steady friction plus the exponential-sum history term
    /// (default).
    #[default]
    Unsteady,
    /// Quasi-steady friction only; the convolution history is dropped.
    /// Useful as a comparison baseline for damping studies.
    QuasiSteady,
}

#[derive(Debug, Clone)]
pub struct Discretization {
    /// Temporal step [s]
    pub dt: Real,
    /// One mesh per element, in arena order
    pub meshes: Vec<ElementMesh>,
}

pub fn discretize(network: &mut Network, settings: &Settings) -> TransientResult<Discretization> {
    discretize_with(network, settings, FrictionModel::default())
}

pub fn discretize_with(
    network: &mut Network,
    settings: &Settings,
    friction: FrictionModel,
) -> TransientResult<Discretization> {
    let betas = element_betas(network)?;
    let dt = courant_search(network, settings, &betas)?;

    let mut meshes = Vec::with_capacity(network.elements().len());
    for idx in 0..network.elements().len() {
        meshes.push(build_mesh(network, settings, idx, betas[idx], dt, friction)?);
    }
    debug!(dt, elements = meshes.len(), "discretisation complete");
    Ok(Discretization { dt, meshes })
}

/// Momentum correction per element, from the steady endpoint states.
fn element_betas(network: &Network) -> TransientResult<Vec<Real>> {
    let fluid = network.fluid();
    network
        .elements()
        .iter()
        .map(|elem| {
            let v = elem.velocity()?;
            let re = reynolds(v, elem.diameter, fluid);
            let start = network.node(elem.start);
            let end = network.node(elem.end);
            Ok(momentum_correction(
                re,
                start.pressure()?,
                end.pressure()?,
                start.elevation,
                end.elevation,
                elem.diameter,
                elem.length,
                v,
                fluid,
            ))
        })
        .collect()
}

/// Choose Δt so that `C_e = a_e·Δt/(Δx_e·√β_e) ≤ 1` everywhere, and store
/// each element's spatial step and Courant number.
fn courant_search(
    network: &mut Network,
    settings: &Settings,
    betas: &[Real],
) -> TransientResult<Real> {
    let (shortest, _) = network
        .elements()
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.length.total_cmp(&b.length))
        .expect("validated network has elements");
    let dx_star = network.elements()[shortest].length / settings.discretization as Real;

    let steps: Vec<Real> = network
        .elements()
        .iter()
        .map(|e| e.length / (e.length / dx_star).ceil())
        .collect();

    let e_star = &network.elements()[shortest];
    let mut dt = dx_star * betas[shortest].sqrt() / e_star.celerity;
    // Admissible ceiling over all elements; the nudge loop below then only
    // absorbs rounding.
    for (idx, elem) in network.elements().iter().enumerate() {
        dt = dt.min(steps[idx] * betas[idx].sqrt() / elem.celerity);
    }
    loop {
        if dt <= 0.0 {
            return Err(TransientError::TimeStepVanished);
        }
        let worst = network
            .elements()
            .iter()
            .enumerate()
            .map(|(idx, e)| e.celerity * dt / (steps[idx] * betas[idx].sqrt()))
            .fold(0.0_f64, f64::max);
        if worst <= 1.0 {
            break;
        }
        dt -= 1e-9;
    }

    for (idx, elem) in network.elements_mut().iter_mut().enumerate() {
        elem.spatial_step = Some(steps[idx]);
        elem.courant = Some(elem.celerity * dt / (steps[idx] * betas[idx].sqrt()));
    }
    Ok(dt)
}

/// Vitkovsky scaling of the weighting function for the point's flow regime.
pub(crate) fn friction_scales(re: Real, relative_roughness: Real) -> (Real, Real) {
    if re < RE_TRANSITION {
        (1.0, 0.0)
    } else if relative_roughness < 1e-6 {
        let kappa = (15.29 / re.powf(0.0567)).log10();
        (0.5 * (1.0 / PI).sqrt(), re.powf(kappa) / 12.86)
    } else {
        (
            0.0103 * re.sqrt() * relative_roughness.powf(0.39),
            0.352 * re * relative_roughness.powf(0.41),
        )
    }
}

/// Local-loss coefficient concentrated at an element face, as the steady
/// resistance counts it: the endpoint's own loss plus spouting where the
/// flow empties into a reservoir.
fn face_loss(network: &Network, elem: &Element, flow: Real, at_start: bool) -> Real {
    let node = network.node(if at_start { elem.start } else { elem.end });
    let mut k = node.effective_loss();
    let into_reservoir = if at_start { flow < 0.0 } else { flow > 0.0 };
    if into_reservoir && matches!(node.kind, NodeKind::Reservoir { .. }) {
        k += 1.0;
    }
    k
}

fn build_mesh(
    network: &Network,
    settings: &Settings,
    idx: usize,
    beta: Real,
    dt: Real,
    friction: FrictionModel,
) -> TransientResult<ElementMesh> {
    let fluid = network.fluid();
    let elem = &network.elements()[idx];
    let q = elem
        .flow
        .ok_or(TransientError::MissingSteadyState {
            element: elem.id.one_based(),
        })?;
    let area = elem.area();
    let velocity = q / area;
    let re = reynolds(velocity, elem.diameter, fluid);
    let lambda = darcy_friction(re, elem.roughness, elem.diameter);

    let table = table_for_reynolds(re);
    let dtau = 4.0 * fluid.kinematic_viscosity() * dt / (elem.diameter * elem.diameter);
    let (a_scale, b_scale, modes) = match friction {
        FrictionModel::Unsteady => {
            let (a, b) = friction_scales(re, elem.relative_roughness());
            (a, b, table.mode_count(dtau)?)
        }
        // No retained modes: the convolution sums vanish identically.
        FrictionModel::QuasiSteady => (0.0, 0.0, 0),
    };

    let dx = elem.spatial_step()?;
    let count = elem.mesh_len()?;

    // Total (not static) endpoint heads keep the mapped profile consistent
    // with the element head-drop rows of the steady solve.
    let base_head = |node: sn_core::NodeId| -> TransientResult<Real> {
        let n = network.node(node);
        match n.fixed_head(fluid) {
            Some(h) => Ok(h),
            None => {
                let v = n.velocity.unwrap_or(0.0);
                Ok(n.head()? + v * v / (2.0 * G0_MPS2))
            }
        }
    };
    let head_start = base_head(elem.start)?;
    let head_end = base_head(elem.end)?;
    let drop_unit = q * q.abs() / (2.0 * G0_MPS2 * area * area);
    let inside_start = head_start - face_loss(network, elem, q, true) * drop_unit;
    let inside_end = head_end + face_loss(network, elem, q, false) * drop_unit;

    let z_start = network.node(elem.start).elevation;
    let z_end = network.node(elem.end).elevation;

    let c_gas = settings.gas_fraction * fluid.reference_head();
    let last = count - 1;
    let slots = (0..count)
        .map(|i| {
            let frac = i as Real / last as Real;
            let head = if i == 0 {
                head_start
            } else if i == last {
                head_end
            } else {
                inside_start + (inside_end - inside_start) * frac
            };
            let elevation = z_start + (z_end - z_start) * frac;
            let gas_fraction = if c_gas > 0.0 {
                let denom = (head - elevation - fluid.vapour_head).max(1e-9);
                (c_gas / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            MeshSlot {
                head,
                elevation,
                gas_fraction,
                beta,
                reynolds: re,
                a_scale,
                b_scale,
                up: SideState::new(velocity, lambda, modes),
                down: SideState::new(velocity, lambda, modes),
            }
        })
        .collect();

    Ok(ElementMesh {
        slots,
        dx,
        dtau,
        table,
    })
}
