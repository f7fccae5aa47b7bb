//! Pipe element: geometry, material, and the fields the solvers fill in.

use sn_core::{CoreError, CoreResult, ElemId, NodeId, Real};
use sn_props::{Fluid, Material};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElemId,
    pub start: NodeId,
    pub end: NodeId,
    /// Inner diameter [m]
    pub diameter: Real,
    /// Length [m]
    pub length: Real,
    /// Wall thickness [m]
    pub thickness: Real,
    /// Absolute roughness [m]
    pub roughness: Real,
    pub material: &'static Material,
    /// Pressure-wave speed in the elastic pipe [m/s]
    pub celerity: Real,
    /// Volumetric flow in start→end orientation [m³/s], set by the steady
    /// solver
    pub flow: Option<Real>,
    /// Mesh spacing [m], set by discretisation
    pub spatial_step: Option<Real>,
    /// Courant number, set by discretisation
    pub courant: Option<Real>,
}

impl Element {
    pub fn new(
        id: ElemId,
        start: NodeId,
        end: NodeId,
        diameter: Real,
        length: Real,
        thickness: Real,
        roughness: Real,
        material: &'static Material,
        fluid: &Fluid,
    ) -> Self {
        let celerity = celerity(fluid, material, diameter, thickness);
        Self {
            id,
            start,
            end,
            diameter,
            length,
            thickness,
            roughness,
            material,
            celerity,
            flow: None,
            spatial_step: None,
            courant: None,
        }
    }

    /// Cross-section area [m²].
    pub fn area(&self) -> Real {
        PI * self.diameter * self.diameter / 4.0
    }

    pub fn relative_roughness(&self) -> Real {
        self.roughness / self.diameter
    }

    pub fn flow(&self) -> CoreResult<Real> {
        self.flow.ok_or(CoreError::Unset {
            what: "element flow",
        })
    }

    /// Mean velocity from the stored flow [m/s], signed in start→end
    /// orientation.
    pub fn velocity(&self) -> CoreResult<Real> {
        Ok(self.flow()? / self.area())
    }

    pub fn spatial_step(&self) -> CoreResult<Real> {
        self.spatial_step.ok_or(CoreError::Unset {
            what: "element spatial step",
        })
    }

    /// Mesh node count after discretisation. The spatial step divides the
    /// length by construction, so this is `length/Δx + 1` up to float
    /// rounding.
    pub fn mesh_len(&self) -> CoreResult<usize> {
        let dx = self.spatial_step()?;
        Ok((self.length / dx).round() as usize + 1)
    }

    /// The endpoint opposite `node`, if `node` is an endpoint at all.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if node == self.start {
            Some(self.end)
        } else if node == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}

/// Pressure-wave speed `a = √(K/ρ / (1 + K·d/(E·e)))` for a fluid-filled
/// elastic pipe.
pub fn celerity(fluid: &Fluid, material: &Material, diameter: Real, thickness: Real) -> Real {
    let stiffness = fluid.bulk_modulus / fluid.density;
    let restraint = 1.0 + fluid.bulk_modulus * diameter / (material.young_modulus * thickness);
    (stiffness / restraint).sqrt()
}
