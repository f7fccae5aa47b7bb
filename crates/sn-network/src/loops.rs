//! Ordered element chains: fundamental cycles and pseudo-loops.

use crate::Element;
use sn_core::{ElemId, NodeId, Real};

/// Traversal direction of an element inside a chain relative to its nominal
/// start→end orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Forward,
    Reverse,
}

impl Orientation {
    pub fn sign(self) -> Real {
        match self {
            Orientation::Forward => 1.0,
            Orientation::Reverse => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopLink {
    pub elem: ElemId,
    pub orientation: Orientation,
}

/// An ordered, endpoint-chained sequence of oriented elements.
///
/// A closed chain is a fundamental cycle; an open chain whose free ends are
/// both pressure-fixed nodes is a pseudo-loop. The first link is always
/// traversed forward by convention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loop {
    links: Vec<LoopLink>,
}

impl Loop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[LoopLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn push(&mut self, link: LoopLink) {
        self.links.push(link);
    }

    pub fn pop(&mut self) -> Option<LoopLink> {
        self.links.pop()
    }

    pub fn contains_element(&self, elem: ElemId) -> bool {
        self.links.iter().any(|l| l.elem == elem)
    }

    /// Orientation of `elem` inside this chain, if it participates.
    pub fn orientation_of(&self, elem: ElemId) -> Option<Orientation> {
        self.links
            .iter()
            .find(|l| l.elem == elem)
            .map(|l| l.orientation)
    }

    /// The free node at the chain head: the untraversed endpoint of the
    /// first link.
    pub fn first_free(&self, elements: &[Element]) -> Option<NodeId> {
        self.links.first().map(|l| {
            let e = &elements[l.elem.index() as usize];
            match l.orientation {
                Orientation::Forward => e.start,
                Orientation::Reverse => e.end,
            }
        })
    }

    /// The free node at the chain tail: the endpoint the last link arrives
    /// at.
    pub fn last_free(&self, elements: &[Element]) -> Option<NodeId> {
        self.links.last().map(|l| {
            let e = &elements[l.elem.index() as usize];
            match l.orientation {
                Orientation::Forward => e.end,
                Orientation::Reverse => e.start,
            }
        })
    }

    /// A chain of at least two links whose tail meets its head is a cycle.
    pub fn is_closed(&self, elements: &[Element]) -> bool {
        self.links.len() >= 2 && self.first_free(elements) == self.last_free(elements)
    }

    /// Loops compare equal as element sets; orientation and rotation are
    /// ignored.
    pub fn same_element_set(&self, other: &Loop) -> bool {
        self.links.len() == other.links.len()
            && self.links.iter().all(|l| other.contains_element(l.elem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_core::Id;
    use sn_props::{Fluid, Material, MaterialKind};

    fn pipe(id: u32, start: u32, end: u32) -> Element {
        Element::new(
            Id::from_index(id),
            Id::from_index(start),
            Id::from_index(end),
            0.25,
            1000.0,
            0.008,
            5.0e-5,
            Material::by_kind(MaterialKind::Steel),
            Fluid::by_name("water").unwrap(),
        )
    }

    fn link(elem: u32, orientation: Orientation) -> LoopLink {
        LoopLink {
            elem: Id::from_index(elem),
            orientation,
        }
    }

    /// Triangle 0→1, 1→2, and a reversed 0→2 closing edge.
    fn triangle() -> (Vec<Element>, Loop) {
        let elements = vec![pipe(0, 0, 1), pipe(1, 1, 2), pipe(2, 0, 2)];
        let mut chain = Loop::new();
        chain.push(link(0, Orientation::Forward));
        chain.push(link(1, Orientation::Forward));
        chain.push(link(2, Orientation::Reverse));
        (elements, chain)
    }

    #[test]
    fn triangle_is_closed() {
        let (elements, chain) = triangle();
        assert_eq!(chain.first_free(&elements), Some(Id::from_index(0)));
        assert_eq!(chain.last_free(&elements), Some(Id::from_index(0)));
        assert!(chain.is_closed(&elements));
    }

    #[test]
    fn open_chain_reports_free_ends() {
        let (elements, mut chain) = triangle();
        chain.pop();
        assert!(!chain.is_closed(&elements));
        assert_eq!(chain.first_free(&elements), Some(Id::from_index(0)));
        assert_eq!(chain.last_free(&elements), Some(Id::from_index(2)));
    }

    #[test]
    fn element_set_equality_ignores_orientation_and_rotation() {
        let (_, chain) = triangle();
        let mut rotated = Loop::new();
        rotated.push(link(1, Orientation::Forward));
        rotated.push(link(2, Orientation::Forward));
        rotated.push(link(0, Orientation::Reverse));
        assert!(chain.same_element_set(&rotated));

        let mut other = Loop::new();
        other.push(link(0, Orientation::Forward));
        other.push(link(1, Orientation::Forward));
        assert!(!chain.same_element_set(&other));
    }
}
