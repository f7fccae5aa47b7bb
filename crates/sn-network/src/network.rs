//! The network arena: owns nodes and elements, resolves adjacency, and
//! validates topology.

use crate::{Element, NetworkError, NetworkResult, Node, NodeKind};
use sn_core::{ElemId, NodeId, Real};
use sn_props::Fluid;

/// Which endpoint of an element a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Start,
    End,
}

impl End {
    /// Incidence sign: +1 where the element leaves the node.
    pub fn sign(self) -> Real {
        match self {
            End::Start => 1.0,
            End::End => -1.0,
        }
    }
}

/// One incident element of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRef {
    pub elem: ElemId,
    pub at: End,
}

/// A validated, connected pipe network.
///
/// All cross-references are arena indices ([`NodeId`]/[`ElemId`]); the
/// network exclusively owns both collections.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    links: Vec<Vec<LinkRef>>,
    fluid: &'static Fluid,
}

impl Network {
    pub fn new(
        nodes: Vec<Node>,
        elements: Vec<Element>,
        fluid: &'static Fluid,
    ) -> NetworkResult<Self> {
        let links = resolve_links(&nodes, &elements)?;
        let network = Self {
            nodes,
            elements,
            links,
            fluid,
        };
        network.validate()?;
        Ok(network)
    }

    fn validate(&self) -> NetworkResult<()> {
        let sources = self.nodes.iter().filter(|n| n.is_source_like()).count();
        if sources < 2 {
            return Err(NetworkError::TooFewSources { found: sources });
        }
        if !self.nodes.iter().any(|n| n.is_pressure_fixed()) {
            return Err(NetworkError::NoFixedHead);
        }
        self.check_connected()?;
        for node in &self.nodes {
            if matches!(node.kind, NodeKind::Valve { .. }) {
                let upstream = self
                    .links(node.id)
                    .iter()
                    .filter(|l| l.at == End::End)
                    .count();
                let downstream = self
                    .links(node.id)
                    .iter()
                    .filter(|l| l.at == End::Start)
                    .count();
                if upstream != 1 || downstream != 1 {
                    return Err(NetworkError::MalformedValve { node: node.id });
                }
            }
        }
        Ok(())
    }

    /// Reachability sweep from node 0 over undirected incidence.
    fn check_connected(&self) -> NetworkResult<()> {
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = vec![0_usize];
        seen[0] = true;
        while let Some(v) = queue.pop() {
            for link in &self.links[v] {
                let elem = &self.elements[link.elem.index() as usize];
                let other = match link.at {
                    End::Start => elem.end,
                    End::End => elem.start,
                };
                let idx = other.index() as usize;
                if !seen[idx] {
                    seen[idx] = true;
                    queue.push(idx);
                }
            }
        }
        match seen.iter().position(|s| !s) {
            None => Ok(()),
            Some(idx) => Err(NetworkError::Disconnected {
                node: self.nodes[idx].id,
            }),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index() as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index() as usize]
    }

    pub fn element(&self, id: ElemId) -> &Element {
        &self.elements[id.index() as usize]
    }

    pub fn element_mut(&mut self, id: ElemId) -> &mut Element {
        &mut self.elements[id.index() as usize]
    }

    /// Incident elements of a node, with which endpoint the node occupies.
    pub fn links(&self, node: NodeId) -> &[LinkRef] {
        &self.links[node.index() as usize]
    }

    pub fn fluid(&self) -> &'static Fluid {
        self.fluid
    }

    /// All nodes that pin the hydraulic grade line, in arena order.
    pub fn pressure_fixed_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_pressure_fixed())
            .map(|n| n.id)
            .collect()
    }

    /// Number of independent fundamental cycles `|E| - |V| + 1`.
    pub fn cycle_rank(&self) -> usize {
        (self.elements.len() + 1).saturating_sub(self.nodes.len())
    }
}

fn resolve_links(nodes: &[Node], elements: &[Element]) -> NetworkResult<Vec<Vec<LinkRef>>> {
    let mut links: Vec<Vec<LinkRef>> = vec![Vec::new(); nodes.len()];
    for elem in elements {
        for (node, at) in [(elem.start, End::Start), (elem.end, End::End)] {
            let idx = node.index() as usize;
            if idx >= nodes.len() {
                return Err(NetworkError::UnknownNode {
                    element: elem.id.one_based(),
                    node: node.one_based(),
                });
            }
            links[idx].push(LinkRef { elem: elem.id, at });
        }
        if elem.start == elem.end {
            return Err(NetworkError::DegenerateElement {
                element: elem.id.one_based(),
                node: elem.start.one_based(),
            });
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{junction, pipe, reservoir};
    use sn_core::Id;

    fn water() -> &'static Fluid {
        Fluid::by_name("water").unwrap()
    }

    #[test]
    fn straight_pipe_network_resolves_adjacency() {
        let nodes = vec![reservoir(0, 100.0), reservoir(1, 50.0)];
        let elements = vec![pipe(0, 0, 1, 1000.0)];
        let net = Network::new(nodes, elements, water()).unwrap();

        let links = net.links(Id::from_index(0));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].at, End::Start);
        assert_eq!(net.links(Id::from_index(1))[0].at, End::End);
        assert_eq!(net.cycle_rank(), 0);
        assert_eq!(net.pressure_fixed_nodes().len(), 2);
    }

    #[test]
    fn single_source_is_rejected() {
        let nodes = vec![reservoir(0, 100.0), junction(1, 0.0)];
        let elements = vec![pipe(0, 0, 1, 1000.0)];
        let err = Network::new(nodes, elements, water()).unwrap_err();
        assert!(matches!(err, NetworkError::TooFewSources { found: 1 }));
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let nodes = vec![reservoir(0, 100.0), reservoir(1, 50.0)];
        let elements = vec![pipe(0, 0, 7, 1000.0)];
        let err = Network::new(nodes, elements, water()).unwrap_err();
        assert!(matches!(err, NetworkError::UnknownNode { node: 8, .. }));
    }

    #[test]
    fn disconnected_node_is_rejected() {
        let nodes = vec![
            reservoir(0, 100.0),
            reservoir(1, 50.0),
            junction(2, 0.0),
        ];
        let elements = vec![pipe(0, 0, 1, 1000.0)];
        let err = Network::new(nodes, elements, water()).unwrap_err();
        assert!(matches!(err, NetworkError::Disconnected { .. }));
    }

    #[test]
    fn square_has_one_fundamental_cycle() {
        let nodes = vec![
            reservoir(0, 100.0),
            junction(1, 0.0),
            reservoir(2, 70.0),
            junction(3, 0.0),
        ];
        let elements = vec![
            pipe(0, 0, 1, 500.0),
            pipe(1, 1, 2, 500.0),
            pipe(2, 2, 3, 500.0),
            pipe(3, 3, 0, 500.0),
        ];
        let net = Network::new(nodes, elements, water()).unwrap();
        assert_eq!(net.cycle_rank(), 1);
    }
}
