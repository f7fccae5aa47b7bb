//! Hydraulic point variants and their steady-state fields.
//!
//! The upstream design dispatched on a class hierarchy; here a node is one
//! record of common fields plus a tagged variant payload. Transient per-mesh
//! state lives in the transient engine's mesh slots, not here.

use sn_core::{CoreError, CoreResult, NodeId, Real};
use sn_props::Fluid;
use sn_core::units::constants::G0_MPS2;

/// Scheduled actuation window for a valve. `handled` latches once the window
/// has closed so later steps skip the event entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventWindow {
    pub start: Real,
    pub end: Real,
    pub handled: bool,
}

impl EventWindow {
    pub fn new(start: Real, end: Real) -> Self {
        Self {
            start,
            end,
            handled: false,
        }
    }

    /// Length of the intersection of the window with `[t, t + dt]`.
    pub fn overlap(&self, t: Real, dt: Real) -> Real {
        let lo = self.start.max(t);
        let hi = self.end.min(t + dt);
        (hi - lo).max(0.0)
    }
}

/// Variant payload of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Junction,
    /// Flow source or sink; positive discharge feeds the network.
    Source { discharge: Option<Real> },
    /// Free surface `level` metres above the node elevation.
    Reservoir {
        level: Real,
        discharge: Option<Real>,
    },
    /// In-line valve: opening state in [0, 1] and signed actuation rate
    /// [1/s] (positive opens; non-finite rates snap instantaneously).
    Valve { state: Real, rate: Real },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Geodetic elevation [m]
    pub elevation: Real,
    /// Local-loss coefficient [-]
    pub loss: Real,
    /// Head prescribed in the input, if any [m]
    pub input_head: Option<Real>,
    /// Pressure prescribed in the input, if any [Pa]
    pub input_pressure: Option<Real>,
    /// Piezometric head [m], filled by the steady solver
    pub head: Option<Real>,
    /// Gauge pressure [Pa], filled by the steady solver
    pub pressure: Option<Real>,
    /// Mean adjacent-element speed [m/s], filled by the steady solver
    pub velocity: Option<Real>,
    /// Valve actuation window, if scheduled
    pub event: Option<EventWindow>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, elevation: Real, loss: Real) -> Self {
        Self {
            id,
            kind,
            elevation,
            loss,
            input_head: None,
            input_pressure: None,
            head: None,
            pressure: None,
            velocity: None,
            event: None,
        }
    }

    /// Whether the node pins the hydraulic grade line: a reservoir, or any
    /// node with a head or pressure prescribed in the input.
    pub fn is_pressure_fixed(&self) -> bool {
        matches!(self.kind, NodeKind::Reservoir { .. })
            || self.input_head.is_some()
            || self.input_pressure.is_some()
    }

    /// The pinned head of a pressure-fixed node [m].
    pub fn fixed_head(&self, fluid: &Fluid) -> Option<Real> {
        if let NodeKind::Reservoir { level, .. } = self.kind {
            return Some(self.elevation + level);
        }
        if let Some(h) = self.input_head {
            return Some(h);
        }
        self.input_pressure
            .map(|p| self.elevation + p / (fluid.density * G0_MPS2))
    }

    /// Whether the node exchanges flow with the outside.
    pub fn is_source_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Source { .. } | NodeKind::Reservoir { .. }
        )
    }

    pub fn discharge(&self) -> Option<Real> {
        match self.kind {
            NodeKind::Source { discharge } => discharge,
            NodeKind::Reservoir { discharge, .. } => discharge,
            _ => None,
        }
    }

    pub fn set_discharge(&mut self, q: Real) {
        match &mut self.kind {
            NodeKind::Source { discharge } => *discharge = Some(q),
            NodeKind::Reservoir { discharge, .. } => *discharge = Some(q),
            _ => {}
        }
    }

    /// Local-loss coefficient seen by the steady solver; an in-line valve
    /// adds its opening-dependent resistance.
    pub fn effective_loss(&self) -> Real {
        match self.kind {
            NodeKind::Valve { state, .. } => self.loss - state.clamp(1e-10, 1.0).log10(),
            _ => self.loss,
        }
    }

    pub fn head(&self) -> CoreResult<Real> {
        self.head.ok_or(CoreError::Unset { what: "node head" })
    }

    pub fn pressure(&self) -> CoreResult<Real> {
        self.pressure.ok_or(CoreError::Unset {
            what: "node pressure",
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Junction => "node",
            NodeKind::Source { .. } => "source",
            NodeKind::Reservoir { .. } => "reservoir",
            NodeKind::Valve { .. } => "valve",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_core::Id;

    fn water() -> &'static Fluid {
        Fluid::by_name("water").unwrap()
    }

    #[test]
    fn reservoir_head_is_surface_elevation() {
        let node = Node::new(
            Id::from_index(0),
            NodeKind::Reservoir {
                level: 5.0,
                discharge: None,
            },
            95.0,
            0.5,
        );
        assert!(node.is_pressure_fixed());
        assert_eq!(node.fixed_head(water()), Some(100.0));
    }

    #[test]
    fn prescribed_pressure_converts_to_head() {
        let mut node = Node::new(Id::from_index(1), NodeKind::Junction, 10.0, 0.0);
        assert!(!node.is_pressure_fixed());
        node.input_pressure = Some(98_066.5);
        let h = node.fixed_head(water()).unwrap();
        // 98066.5 Pa of water is almost exactly 10 m of column.
        assert!((h - 20.0).abs() < 0.05, "head {h}");
    }

    #[test]
    fn unset_head_read_is_an_error() {
        let node = Node::new(Id::from_index(2), NodeKind::Junction, 0.0, 0.0);
        assert!(node.head().is_err());
    }

    #[test]
    fn valve_loss_grows_as_it_closes() {
        let mut node = Node::new(
            Id::from_index(3),
            NodeKind::Valve {
                state: 1.0,
                rate: -0.1,
            },
            0.0,
            2.0,
        );
        assert_eq!(node.effective_loss(), 2.0);
        if let NodeKind::Valve { state, .. } = &mut node.kind {
            *state = 0.01;
        }
        assert!((node.effective_loss() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn event_overlap_clamps_to_window() {
        let w = EventWindow::new(1.0, 2.0);
        assert_eq!(w.overlap(0.0, 0.5), 0.0);
        assert!((w.overlap(0.9, 0.2) - 0.1).abs() < 1e-12);
        assert!((w.overlap(1.2, 0.3) - 0.3).abs() < 1e-12);
        assert!((w.overlap(1.9, 0.5) - 0.1).abs() < 1e-12);
        assert_eq!(w.overlap(2.5, 0.5), 0.0);
    }
}
