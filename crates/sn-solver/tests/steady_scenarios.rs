//! End-to-end steady scenarios: a straight pipe between two reservoirs, the
//! three-reservoir Y, and a single closed loop.

use sn_core::Id;
use sn_network::{Element, LoopDepot, Network, Node, NodeKind};
use sn_props::{Fluid, Material, MaterialKind};
use sn_solver::hardy_cross::residuals;
use sn_solver::solve_steady;

fn water() -> &'static Fluid {
    Fluid::by_name("water").unwrap()
}

fn reservoir(idx: u32, surface: f64) -> Node {
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

fn junction(idx: u32) -> Node {
    Node::new(Id::from_index(idx), NodeKind::Junction, 0.0, 0.0)
}

fn pipe(id: u32, start: u32, end: u32, diameter: f64, length: f64) -> Element {
    Element::new(
        Id::from_index(id),
        Id::from_index(start),
        Id::from_index(end),
        diameter,
        length,
        0.01,
        5.0e-5,
        Material::by_kind(MaterialKind::Steel),
        water(),
    )
}

/// `|Σ orient·q|` at every node without external flow.
fn max_junction_imbalance(net: &Network) -> f64 {
    net.nodes()
        .iter()
        .filter(|n| !n.is_source_like())
        .map(|n| {
            net.links(n.id)
                .iter()
                .map(|l| l.at.sign() * net.element(l.elem).flow.unwrap())
                .sum::<f64>()
                .abs()
        })
        .fold(0.0, f64::max)
}

fn max_loop_residual(net: &Network, depot: &LoopDepot) -> f64 {
    let flows: Vec<f64> = net.elements().iter().map(|e| e.flow.unwrap()).collect();
    residuals(net, depot, &flows).unwrap().amax()
}

#[test]
fn s1_straight_pipe_between_two_reservoirs() {
    let mut net = Network::new(
        vec![reservoir(0, 100.0), reservoir(1, 50.0)],
        vec![pipe(0, 0, 1, 0.3, 1000.0)],
        water(),
    )
    .unwrap();
    let depot = LoopDepot::enumerate(&net).unwrap();
    assert_eq!(depot.loops().len(), 0);
    assert_eq!(depot.pseudo_loops().len(), 1);

    solve_steady(&mut net, &depot).unwrap();

    let q = net.elements()[0].flow.unwrap();
    assert!(q > 0.0, "flow runs from high to low reservoir, got {q}");
    assert!((0.2..0.4).contains(&q), "flow magnitude {q}");

    let v = net.elements()[0].velocity().unwrap();
    assert!((3.0..5.5).contains(&v), "velocity {v}");

    assert!(max_loop_residual(&net, &depot) <= 1e-9);

    // Reservoir heads stay pinned at their surfaces.
    assert_eq!(net.node(Id::from_index(0)).head().unwrap(), 100.0);
    assert_eq!(net.node(Id::from_index(1)).head().unwrap(), 50.0);

    // Discharges were re-derived from the balanced flow.
    assert!((net.node(Id::from_index(0)).discharge().unwrap() - q).abs() < 1e-12);
    assert!((net.node(Id::from_index(1)).discharge().unwrap() + q).abs() < 1e-12);
}

#[test]
fn s2_three_reservoir_y() {
    let mut net = Network::new(
        vec![
            reservoir(0, 100.0),
            reservoir(1, 80.0),
            reservoir(2, 60.0),
            junction(3),
        ],
        vec![
            pipe(0, 0, 3, 0.25, 1000.0),
            pipe(1, 1, 3, 0.25, 1000.0),
            pipe(2, 2, 3, 0.25, 1000.0),
        ],
        water(),
    )
    .unwrap();
    let depot = LoopDepot::enumerate(&net).unwrap();
    assert_eq!(depot.loops().len(), 0);
    assert_eq!(depot.pseudo_loops().len(), 2);

    solve_steady(&mut net, &depot).unwrap();

    assert!(max_junction_imbalance(&net) <= 1e-9);
    assert!(max_loop_residual(&net, &depot) <= 1e-9);

    // The highest reservoir feeds, the lowest one takes.
    assert!(net.elements()[0].flow.unwrap() > 0.0);
    assert!(net.elements()[2].flow.unwrap() < 0.0);

    let h = net.node(Id::from_index(3)).head().unwrap();
    assert!(h > 60.0 && h < 100.0, "junction head {h}");
}

#[test]
fn s3_single_closed_loop() {
    // Four equal pipes forming a square with reservoirs at two opposite
    // corners, 30 m apart.
    let mut net = Network::new(
        vec![
            reservoir(0, 100.0),
            junction(1),
            reservoir(2, 70.0),
            junction(3),
        ],
        vec![
            pipe(0, 0, 1, 0.25, 800.0),
            pipe(1, 1, 2, 0.25, 800.0),
            pipe(2, 2, 3, 0.25, 800.0),
            pipe(3, 3, 0, 0.25, 800.0),
        ],
        water(),
    )
    .unwrap();
    let depot = LoopDepot::enumerate(&net).unwrap();
    assert_eq!(depot.loops().len(), 1);
    assert_eq!(depot.pseudo_loops().len(), 1);

    solve_steady(&mut net, &depot).unwrap();

    assert!(max_junction_imbalance(&net) <= 1e-9);
    assert!(max_loop_residual(&net, &depot) <= 1e-9);

    // Symmetric split: both branches leave the high reservoir with equal
    // magnitude.
    let q01 = net.elements()[0].flow.unwrap();
    let q30 = net.elements()[3].flow.unwrap();
    assert!(q01 > 0.0);
    assert!(q30 < 0.0);
    assert!(
        (q01.abs() - q30.abs()).abs() < 1e-9,
        "asymmetric split {q01} vs {q30}"
    );

    // Interior junction heads sit between the reservoir surfaces, equal by
    // symmetry.
    let h1 = net.node(Id::from_index(1)).head().unwrap();
    let h3 = net.node(Id::from_index(3)).head().unwrap();
    assert!((h1 - h3).abs() < 1e-9);
    assert!(h1 > 70.0 && h1 < 100.0);
}
