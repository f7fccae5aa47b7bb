//! Integration: write the three input files to disk and load a full
//! network through the directory entry point.

use sn_io::load_dir;
use sn_network::NodeKind;
use std::fs;
use std::path::PathBuf;

const SETTINGS: &str = "\
// two reservoirs and a mid-pipe valve
{
    fluid: water;
    gasfraction: 1e-7;
    discretization: 4;
    symtime: 2;
    writeinterval: 2;
    weightingfactor: 1;
}
";

const NODES: &str = "\
{
    reservoir
    {
        id: 1;
        elevation: 0;
        level: 100;
    }
    valve
    {
        id: 2;
        state: 1;
        valvetime: -0;
        eventstart: 1;
        eventend: 1;
    }
    reservoir
    {
        id: 3;
        elevation: 0;
        level: 50;
    }
}
";

const ELEMENTS: &str = "\
nodeQty: 3;
elementQty: 2;
{
    {
        id: 1;
        start: 1;
        end: 2;
        diameter: 0.3;
        length: 500;
        thickness: 0.01;
        roughness: 5e-5;
        material: steel;
    }
    {
        id: 2;
        start: 2;
        end: 3;
        diameter: 0.3;
        length: 500;
        thickness: 0.01;
        roughness: 5e-5;
        material: steel;
    }
}
";

fn write_inputs(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sn-io-test-{}-{tag}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("settings"), SETTINGS).unwrap();
    fs::write(dir.join("nodes"), NODES).unwrap();
    fs::write(dir.join("elements"), ELEMENTS).unwrap();
    dir
}

#[test]
fn loads_a_valve_network_from_disk() {
    let dir = write_inputs("ok");
    let (settings, network) = load_dir(&dir).unwrap();
    fs::remove_dir_all(&dir).ok();

    assert_eq!(settings.sym_time, 2.0);
    assert_eq!(network.nodes().len(), 3);
    assert_eq!(network.elements().len(), 2);
    assert!(matches!(network.nodes()[1].kind, NodeKind::Valve { .. }));
    assert_eq!(network.pressure_fixed_nodes().len(), 2);
    assert_eq!(network.cycle_rank(), 0);
}

#[test]
fn node_count_mismatch_is_fatal() {
    let dir = write_inputs("mismatch");
    fs::write(
        dir.join("elements"),
        ELEMENTS.replace("nodeQty: 3;", "nodeQty: 4;"),
    )
    .unwrap();
    let err = load_dir(&dir).unwrap_err();
    fs::remove_dir_all(&dir).ok();
    assert!(matches!(err, sn_io::ParseError::CountMismatch { .. }));
}
