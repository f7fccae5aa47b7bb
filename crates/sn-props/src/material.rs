//! Pipe-wall material table.

use crate::{PropsError, PropsResult};
use sn_core::units::{Pressure, pa};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Steel,
    Copper,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub canonical_id: &'static str,
    /// Young's modulus of elasticity [Pa]
    pub young_modulus: f64,
}

const CATALOG: [Material; 2] = [
    Material {
        kind: MaterialKind::Steel,
        canonical_id: "steel",
        young_modulus: 210.0e9,
    },
    Material {
        kind: MaterialKind::Copper,
        canonical_id: "copper",
        young_modulus: 120.0e9,
    },
];

impl Material {
    /// Case-folded catalog lookup.
    pub fn by_name(name: &str) -> PropsResult<&'static Material> {
        let query = name.trim().to_ascii_lowercase();
        CATALOG
            .iter()
            .find(|m| m.canonical_id == query)
            .ok_or(PropsError::UnknownMaterial { name: name.to_string() })
    }

    pub fn by_kind(kind: MaterialKind) -> &'static Material {
        match kind {
            MaterialKind::Steel => &CATALOG[0],
            MaterialKind::Copper => &CATALOG[1],
        }
    }

    pub fn young_modulus_si(&self) -> Pressure {
        pa(self.young_modulus)
    }
}
