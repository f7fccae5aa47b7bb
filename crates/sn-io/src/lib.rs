//! sn-io: parsing of the three plain-text input files (`settings`,
//! `elements`, `nodes`) into a validated [`Network`] plus [`Settings`].
//!
//! The format is brace-delimited `tag: value;` entries with `//` comments,
//! case-folded and whitespace-insensitive. Every diagnostic carries file
//! and line.
//!
//! [`Network`]: sn_network::Network
//! [`Settings`]: sn_network::Settings

pub mod elements;
pub mod error;
pub mod lexer;
pub mod nodes;
pub mod settings;

pub use elements::{ElementsFile, parse_elements};
pub use error::{IoResult, ParseError};
pub use nodes::parse_nodes;
pub use settings::parse_settings;

use sn_network::{Network, Settings};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load `settings`, `nodes`, and `elements` from a directory and assemble
/// the validated network.
pub fn load_dir(dir: &Path) -> IoResult<(Settings, Network)> {
    let read = |name: &str| fs::read_to_string(dir.join(name));
    let settings = parse_settings(&read("settings")?)?;
    let nodes = parse_nodes(&read("nodes")?)?;
    let parsed = parse_elements(&read("elements")?, settings.fluid)?;
    if parsed.node_count != nodes.len() {
        return Err(ParseError::CountMismatch {
            file: "nodes",
            declared: parsed.node_count,
            found: nodes.len(),
        });
    }
    debug!(
        nodes = nodes.len(),
        elements = parsed.elements.len(),
        "inputs parsed"
    );
    let network = Network::new(nodes, parsed.elements, settings.fluid)?;
    Ok((settings, network))
}
