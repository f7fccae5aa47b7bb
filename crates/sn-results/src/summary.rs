//! End-of-run human-readable report.

use sn_network::{End, LoopDepot, Network, NodeKind, Orientation, Settings};
use std::io::Write;

/// Write the settings echo, nodal results, adjacency, and the enumerated
/// loop system.
pub fn write_summary(
    out: &mut impl Write,
    settings: &Settings,
    network: &Network,
    depot: &LoopDepot,
) -> std::io::Result<()> {
    writeln!(out, "settings")?;
    writeln!(out, "  fluid:           {}", settings.fluid.canonical_id)?;
    writeln!(out, "  gas fraction:    {:e}", settings.gas_fraction)?;
    writeln!(out, "  discretization:  {}", settings.discretization)?;
    writeln!(out, "  sym time:        {} s", settings.sym_time)?;
    writeln!(out, "  write interval:  {}", settings.write_interval)?;
    writeln!(out, "  weighting:       {}", settings.weighting_factor)?;
    writeln!(out)?;

    writeln!(out, "nodes")?;
    for node in network.nodes() {
        let head = node
            .head
            .map_or_else(|| "-".to_string(), |h| format!("{h:.4} m"));
        let pressure = node
            .pressure
            .map_or_else(|| "-".to_string(), |p| format!("{p:.1} Pa"));
        let extra = match node.kind {
            NodeKind::Source { discharge } | NodeKind::Reservoir { discharge, .. } => discharge
                .map_or_else(String::new, |q| format!("  Q = {q:.6} m3/s")),
            NodeKind::Valve { state, .. } => format!("  state = {state:.3}"),
            NodeKind::Junction => String::new(),
        };
        writeln!(
            out,
            "  {:>3} {:<9} z = {:.2} m  H = {head}  p = {pressure}{extra}",
            node.id.one_based(),
            node.type_name(),
            node.elevation,
        )?;
    }
    writeln!(out)?;

    writeln!(out, "links")?;
    for node in network.nodes() {
        let mut refs = String::new();
        for link in network.links(node.id) {
            let sign = match link.at {
                End::Start => '+',
                End::End => '-',
            };
            refs.push_str(&format!(" {sign}{}", link.elem.one_based()));
        }
        writeln!(out, "  node {:>3}:{refs}", node.id.one_based())?;
    }
    writeln!(out)?;

    writeln!(out, "elements")?;
    for elem in network.elements() {
        let flow = elem
            .flow
            .map_or_else(|| "-".to_string(), |q| format!("{q:.6} m3/s"));
        writeln!(
            out,
            "  {:>3} {} -> {}  d = {} m  L = {} m  a = {:.1} m/s  Q = {flow}",
            elem.id.one_based(),
            elem.start.one_based(),
            elem.end.one_based(),
            elem.diameter,
            elem.length,
            elem.celerity,
        )?;
    }
    writeln!(out)?;

    write_chains(out, "loops", depot.loops(), network)?;
    write_chains(out, "pseudo-loops", depot.pseudo_loops(), network)?;
    Ok(())
}

fn write_chains(
    out: &mut impl Write,
    title: &str,
    chains: &[sn_network::Loop],
    network: &Network,
) -> std::io::Result<()> {
    writeln!(out, "{title}")?;
    if chains.is_empty() {
        writeln!(out, "  none")?;
    }
    for (idx, chain) in chains.iter().enumerate() {
        let mut line = String::new();
        for link in chain.links() {
            let sign = match link.orientation {
                Orientation::Forward => '+',
                Orientation::Reverse => '-',
            };
            line.push_str(&format!(" {sign}{}", link.elem.one_based()));
        }
        let ends = match (
            chain.first_free(network.elements()),
            chain.last_free(network.elements()),
        ) {
            (Some(a), Some(b)) if a != b => {
                format!("  ({} -> {})", a.one_based(), b.one_based())
            }
            _ => String::new(),
        };
        writeln!(out, "  {:>2}:{line}{ends}", idx + 1)?;
    }
    writeln!(out)?;
    Ok(())
}
