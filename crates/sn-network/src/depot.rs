//! Cycle-basis and pseudo-loop enumeration.
//!
//! Both modes share a depth-first search over a chain buffer: candidate
//! elements extend the buffer when one of their endpoints matches the
//! buffer's tail free node, picking the orientation accordingly. Loop mode
//! hunts closed chains of a target size; pseudo mode hunts open chains from
//! a master pressure-fixed node to every other pressure-fixed node.

use crate::{End, Loop, LoopLink, Network, NetworkError, NetworkResult, Orientation};
use sn_core::NodeId;

/// The complete steady-state equation set of a network: `|E| - |V| + 1`
/// fundamental cycles plus one pseudo-loop per additional pressure-fixed
/// node.
#[derive(Debug, Clone)]
pub struct LoopDepot {
    loops: Vec<Loop>,
    pseudo_loops: Vec<Loop>,
}

impl LoopDepot {
    pub fn enumerate(network: &Network) -> NetworkResult<Self> {
        let loops = enumerate_cycles(network)?;
        let pseudo_loops = enumerate_pseudo_loops(network)?;
        if loops.is_empty() && pseudo_loops.is_empty() {
            return Err(NetworkError::NoEquations);
        }
        Ok(Self {
            loops,
            pseudo_loops,
        })
    }

    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn pseudo_loops(&self) -> &[Loop] {
        &self.pseudo_loops
    }

    /// Fundamental cycles first, then pseudo-loops: the row order of the
    /// Hardy-Cross system.
    pub fn all(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter().chain(self.pseudo_loops.iter())
    }

    pub fn total(&self) -> usize {
        self.loops.len() + self.pseudo_loops.len()
    }
}

fn orientation_leaving(at: End) -> Orientation {
    // Tail matches the element's start: traverse forward. Tail matches the
    // element's end: traverse against its nominal orientation.
    match at {
        End::Start => Orientation::Forward,
        End::End => Orientation::Reverse,
    }
}

fn enumerate_cycles(network: &Network) -> NetworkResult<Vec<Loop>> {
    let target = network.cycle_rank();
    if target == 0 {
        return Ok(Vec::new());
    }
    let element_count = network.elements().len();
    let mut pool = vec![true; element_count];
    let mut found: Vec<Loop> = Vec::new();

    for size in 3..=element_count {
        for start in 0..element_count {
            if found.len() == target {
                break;
            }
            if !pool[start] {
                continue;
            }
            let elem = &network.elements()[start];
            let mut buffer = Loop::new();
            buffer.push(LoopLink {
                elem: elem.id,
                orientation: Orientation::Forward,
            });
            let mut in_buffer = vec![false; element_count];
            in_buffer[start] = true;
            extend_cycle(
                network,
                size,
                &mut buffer,
                &mut in_buffer,
                &mut pool,
                &mut found,
                target,
            );
        }
        if found.len() == target {
            break;
        }
    }

    if found.len() != target {
        return Err(NetworkError::IncompleteCycleBasis {
            found: found.len(),
            expected: target,
        });
    }
    Ok(found)
}

/// Returns true once the quota is reached so the recursion unwinds early.
fn extend_cycle(
    network: &Network,
    size: usize,
    buffer: &mut Loop,
    in_buffer: &mut [bool],
    pool: &mut [bool],
    found: &mut Vec<Loop>,
    target: usize,
) -> bool {
    if buffer.len() == size {
        if buffer.is_closed(network.elements())
            && !found.iter().any(|l| l.same_element_set(buffer))
        {
            for link in buffer.links() {
                pool[link.elem.index() as usize] = false;
            }
            found.push(buffer.clone());
            if found.len() == target {
                return true;
            }
        }
        return false;
    }

    let tail = buffer
        .last_free(network.elements())
        .expect("cycle buffer is never empty");
    for link in network.links(tail) {
        let idx = link.elem.index() as usize;
        if in_buffer[idx] {
            continue;
        }
        buffer.push(LoopLink {
            elem: link.elem,
            orientation: orientation_leaving(link.at),
        });
        in_buffer[idx] = true;
        let done = extend_cycle(network, size, buffer, in_buffer, pool, found, target);
        buffer.pop();
        in_buffer[idx] = false;
        if done {
            return true;
        }
    }
    false
}

fn enumerate_pseudo_loops(network: &Network) -> NetworkResult<Vec<Loop>> {
    let fixed = network.pressure_fixed_nodes();
    let target = fixed.len().saturating_sub(1);
    if target == 0 {
        return Ok(Vec::new());
    }
    let master = fixed[0];
    let element_count = network.elements().len();
    let mut found: Vec<Loop> = Vec::new();
    let mut terminals: Vec<NodeId> = Vec::new();

    for link in network.links(master) {
        if found.len() == target {
            break;
        }
        let mut buffer = Loop::new();
        buffer.push(LoopLink {
            elem: link.elem,
            orientation: orientation_leaving(link.at),
        });
        let mut in_buffer = vec![false; element_count];
        in_buffer[link.elem.index() as usize] = true;
        extend_chain(
            network,
            master,
            &mut buffer,
            &mut in_buffer,
            &mut found,
            &mut terminals,
            target,
        );
    }

    if found.len() != target {
        let to = fixed
            .iter()
            .skip(1)
            .find(|id| !terminals.contains(id))
            .copied()
            .unwrap_or(master);
        return Err(NetworkError::UnreachableFixedNode { from: master, to });
    }
    Ok(found)
}

fn extend_chain(
    network: &Network,
    master: NodeId,
    buffer: &mut Loop,
    in_buffer: &mut [bool],
    found: &mut Vec<Loop>,
    terminals: &mut Vec<NodeId>,
    target: usize,
) -> bool {
    let tail = buffer
        .last_free(network.elements())
        .expect("chain buffer is never empty");
    if tail == master {
        // Closed back onto the master: a cycle, not a pseudo-loop.
        return false;
    }
    if network.node(tail).is_pressure_fixed() && !terminals.contains(&tail) {
        terminals.push(tail);
        found.push(buffer.clone());
        if found.len() == target {
            return true;
        }
        // Chains to the remaining fixed nodes may have to run through this
        // terminal, so keep extending.
    }
    for link in network.links(tail) {
        let idx = link.elem.index() as usize;
        if in_buffer[idx] {
            continue;
        }
        buffer.push(LoopLink {
            elem: link.elem,
            orientation: orientation_leaving(link.at),
        });
        in_buffer[idx] = true;
        let done = extend_chain(network, master, buffer, in_buffer, found, terminals, target);
        buffer.pop();
        in_buffer[idx] = false;
        if done {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{junction, pipe, reservoir};
    use sn_props::Fluid;

    fn water() -> &'static Fluid {
        Fluid::by_name("water").unwrap()
    }

    #[test]
    fn straight_pipe_has_one_pseudo_loop() {
        let net = Network::new(
            vec![reservoir(0, 100.0), reservoir(1, 50.0)],
            vec![pipe(0, 0, 1, 1000.0)],
            water(),
        )
        .unwrap();
        let depot = LoopDepot::enumerate(&net).unwrap();
        assert_eq!(depot.loops().len(), 0);
        assert_eq!(depot.pseudo_loops().len(), 1);
        assert_eq!(depot.pseudo_loops()[0].len(), 1);
    }

    #[test]
    fn three_reservoir_y_has_two_pseudo_loops() {
        let net = Network::new(
            vec![
                reservoir(0, 100.0),
                reservoir(1, 80.0),
                reservoir(2, 60.0),
                junction(3, 0.0),
            ],
            vec![pipe(0, 0, 3, 1000.0), pipe(1, 1, 3, 1000.0), pipe(2, 2, 3, 1000.0)],
            water(),
        )
        .unwrap();
        let depot = LoopDepot::enumerate(&net).unwrap();
        assert_eq!(depot.loops().len(), 0);
        assert_eq!(depot.pseudo_loops().len(), 2);
        let mut terminals: Vec<u32> = depot
            .pseudo_loops()
            .iter()
            .map(|l| l.last_free(net.elements()).unwrap().index())
            .collect();
        terminals.sort_unstable();
        assert_eq!(terminals, vec![1, 2]);
    }

    #[test]
    fn square_with_two_reservoirs() {
        // Square 0-1-2-3 plus reservoirs at opposite corners: one cycle,
        // one pseudo-loop.
        let net = Network::new(
            vec![
                reservoir(0, 100.0),
                junction(1, 0.0),
                reservoir(2, 70.0),
                junction(3, 0.0),
            ],
            vec![
                pipe(0, 0, 1, 500.0),
                pipe(1, 1, 2, 500.0),
                pipe(2, 2, 3, 500.0),
                pipe(3, 3, 0, 500.0),
            ],
            water(),
        )
        .unwrap();
        let depot = LoopDepot::enumerate(&net).unwrap();
        assert_eq!(depot.loops().len(), 1);
        assert_eq!(depot.loops()[0].len(), 4);
        assert!(depot.loops()[0].is_closed(net.elements()));
        assert_eq!(depot.pseudo_loops().len(), 1);
    }

    #[test]
    fn chain_of_reservoirs_passes_through_a_terminal() {
        // R0 - R1 - R2 in a line: the chain to R2 runs through terminal R1.
        let net = Network::new(
            vec![reservoir(0, 100.0), reservoir(1, 80.0), reservoir(2, 60.0)],
            vec![pipe(0, 0, 1, 1000.0), pipe(1, 1, 2, 1000.0)],
            water(),
        )
        .unwrap();
        let depot = LoopDepot::enumerate(&net).unwrap();
        assert_eq!(depot.pseudo_loops().len(), 2);
        let lengths: Vec<usize> = depot.pseudo_loops().iter().map(Loop::len).collect();
        assert!(lengths.contains(&1) && lengths.contains(&2));
    }

    #[test]
    fn cycle_basis_count_matches_rank() {
        // Two stacked squares sharing an edge: rank 2.
        let net = Network::new(
            vec![
                reservoir(0, 100.0),
                junction(1, 0.0),
                junction(2, 0.0),
                junction(3, 0.0),
                reservoir(4, 60.0),
                junction(5, 0.0),
            ],
            vec![
                pipe(0, 0, 1, 500.0),
                pipe(1, 1, 2, 500.0),
                pipe(2, 2, 3, 500.0),
                pipe(3, 3, 0, 500.0),
                pipe(4, 2, 4, 500.0),
                pipe(5, 4, 5, 500.0),
                pipe(6, 5, 3, 500.0),
            ],
            water(),
        )
        .unwrap();
        assert_eq!(net.cycle_rank(), 2);
        let depot = LoopDepot::enumerate(&net).unwrap();
        assert_eq!(depot.loops().len(), 2);
        assert_eq!(depot.pseudo_loops().len(), 1);
        for l in depot.loops() {
            assert!(l.is_closed(net.elements()));
        }
    }

    #[test]
    fn loop_links_chain_by_endpoint_identity() {
        let net = Network::new(
            vec![
                reservoir(0, 100.0),
                junction(1, 0.0),
                reservoir(2, 70.0),
                junction(3, 0.0),
            ],
            vec![
                pipe(0, 0, 1, 500.0),
                pipe(1, 1, 2, 500.0),
                pipe(2, 2, 3, 500.0),
                pipe(3, 3, 0, 500.0),
            ],
            water(),
        )
        .unwrap();
        let depot = LoopDepot::enumerate(&net).unwrap();
        let cycle = &depot.loops()[0];
        // Walk the chain: every consecutive pair must share the in-between
        // node honoring per-position orientation.
        let elements = net.elements();
        let mut at = cycle.first_free(elements).unwrap();
        for link in cycle.links() {
            let e = &elements[link.elem.index() as usize];
            let (from, to) = match link.orientation {
                Orientation::Forward => (e.start, e.end),
                Orientation::Reverse => (e.end, e.start),
            };
            assert_eq!(from, at);
            at = to;
        }
        assert_eq!(at, cycle.first_free(elements).unwrap());
    }
}
