//! Small builders shared by the unit tests.

use crate::{Element, Node, NodeKind};
use sn_core::Id;
use sn_props::{Fluid, Material, MaterialKind};

pub fn junction(idx: u32, elevation: f64) -> Node {
    Node::new(Id::from_index(idx), NodeKind::Junction, elevation, 0.0)
}

pub fn reservoir(idx: u32, surface: f64) -> Node {
    Node::new(
        Id::from_index(idx),
        NodeKind::Reservoir {
            level: surface,
            discharge: None,
        },
        0.0,
        0.0,
    )
}

pub fn source(idx: u32, discharge: f64) -> Node {
    Node::new(
        Id::from_index(idx),
        NodeKind::Source {
            discharge: Some(discharge),
        },
        0.0,
        0.0,
    )
}

pub fn valve(idx: u32, state: f64, rate: f64) -> Node {
    Node::new(
        Id::from_index(idx),
        NodeKind::Valve { state, rate },
        0.0,
        0.0,
    )
}

pub fn pipe(id: u32, start: u32, end: u32, length: f64) -> Element {
    Element::new(
        Id::from_index(id),
        Id::from_index(start),
        Id::from_index(end),
        0.25,
        length,
        0.008,
        5.0e-5,
        Material::by_kind(MaterialKind::Steel),
        Fluid::by_name("water").unwrap(),
    )
}
