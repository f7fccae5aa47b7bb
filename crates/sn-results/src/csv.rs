//! Per-element CSV streams.
//!
//! Five files per element (`el_<i>_v.csv`, `_H.csv`, `_p.csv`, `_f.csv`,
//! `_alpha.csv`); each emitted line holds one value per mesh node followed
//! by the sample time. Streams are acquired up front and flushed on
//! `finish`, so partial output is still well-formed if a run aborts.

use crate::{ResultsError, ResultsResult};
use sn_core::units::constants::G0_MPS2;
use sn_network::Network;
use sn_transient::{MeshSlot, Sample};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug)]
struct ElementStreams {
    velocity: BufWriter<File>,
    head: BufWriter<File>,
    pressure: BufWriter<File>,
    friction: BufWriter<File>,
    gas: BufWriter<File>,
}

#[derive(Debug)]
pub struct CsvEmitter {
    streams: Vec<ElementStreams>,
    rho_g: f64,
}

impl CsvEmitter {
    /// Open all output streams under `dir`, one set per element.
    pub fn create(dir: &Path, network: &Network) -> ResultsResult<Self> {
        if dir.exists() && !dir.is_dir() {
            return Err(ResultsError::InvalidPath {
                message: format!("{} is not a directory", dir.display()),
            });
        }
        fs::create_dir_all(dir)?;
        let mut streams = Vec::with_capacity(network.elements().len());
        for elem in network.elements() {
            let open = |suffix: &str| -> ResultsResult<BufWriter<File>> {
                let name = format!("el_{}_{suffix}.csv", elem.id.one_based());
                Ok(BufWriter::new(File::create(dir.join(name))?))
            };
            streams.push(ElementStreams {
                velocity: open("v")?,
                head: open("H")?,
                pressure: open("p")?,
                friction: open("f")?,
                gas: open("alpha")?,
            });
        }
        Ok(Self {
            streams,
            rho_g: network.fluid().density * G0_MPS2,
        })
    }

    /// Append one sampled line per element and stream.
    pub fn emit(&mut self, sample: &Sample<'_>) -> std::io::Result<()> {
        for (mesh, streams) in sample.meshes.iter().zip(&mut self.streams) {
            let rho_g = self.rho_g;
            write_line(&mut streams.velocity, &mesh.slots, sample.time, |s| {
                0.5 * (s.up.velocity + s.down.velocity)
            })?;
            write_line(&mut streams.head, &mesh.slots, sample.time, |s| s.head)?;
            write_line(&mut streams.pressure, &mesh.slots, sample.time, |s| {
                (s.head - s.elevation) * rho_g
            })?;
            write_line(&mut streams.friction, &mesh.slots, sample.time, |s| {
                0.5 * (s.up.friction + s.down.friction)
            })?;
            write_line(&mut streams.gas, &mesh.slots, sample.time, |s| {
                s.gas_fraction
            })?;
        }
        Ok(())
    }

    /// Flush and close every stream.
    pub fn finish(mut self) -> ResultsResult<()> {
        for streams in &mut self.streams {
            streams.velocity.flush()?;
            streams.head.flush()?;
            streams.pressure.flush()?;
            streams.friction.flush()?;
            streams.gas.flush()?;
        }
        Ok(())
    }
}

fn write_line<F>(
    out: &mut BufWriter<File>,
    slots: &[MeshSlot],
    time: f64,
    value: F,
) -> std::io::Result<()>
where
    F: Fn(&MeshSlot) -> f64,
{
    for slot in slots {
        write!(out, "{},", value(slot))?;
    }
    writeln!(out, "{time}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_core::Id;
    use sn_network::{Element, Node, NodeKind};
    use sn_props::{Fluid, Material, MaterialKind};
    use std::path::PathBuf;

    fn straight_pipe() -> Network {
        let water = Fluid::by_name("water").unwrap();
        let reservoir = |idx, level| {
            Node::new(
                Id::from_index(idx),
                NodeKind::Reservoir {
                    level,
                    discharge: None,
                },
                0.0,
                0.0,
            )
        };
        let pipe = Element::new(
            Id::from_index(0),
            Id::from_index(0),
            Id::from_index(1),
            0.3,
            1000.0,
            0.01,
            5.0e-5,
            Material::by_kind(MaterialKind::Steel),
            water,
        );
        Network::new(vec![reservoir(0, 100.0), reservoir(1, 50.0)], vec![pipe], water).unwrap()
    }

    fn scratch(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sn-results-test-{}-{tag}", std::process::id()))
    }

    #[test]
    fn create_opens_one_stream_set_per_element() {
        let dir = scratch("ok");
        let emitter = CsvEmitter::create(&dir, &straight_pipe()).unwrap();
        for suffix in ["v", "H", "p", "f", "alpha"] {
            assert!(dir.join(format!("el_1_{suffix}.csv")).exists());
        }
        emitter.finish().unwrap();
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn create_rejects_a_non_directory_target() {
        let path = scratch("file");
        fs::write(&path, "occupied").unwrap();
        let err = CsvEmitter::create(&path, &straight_pipe()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ResultsError::InvalidPath { .. }));
    }
}
