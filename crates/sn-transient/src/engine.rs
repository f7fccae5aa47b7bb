//! The transient time loop: events, staggered per-element MOC updates,
//! sampling, and the mesh buffer swap.

use crate::boundary::{StepGlobals, update_boundary};
use crate::characteristics::elem_ctx;
use crate::discretize::{FrictionModel, discretize_with};
use crate::kernel::update_interior;
use crate::mesh::ElementMesh;
use crate::TransientResult;
use sn_core::Real;
use sn_network::{Network, Settings};
use tracing::debug;

/// One emitted state: the completed step's meshes plus the network they
/// belong to.
pub struct Sample<'a> {
    pub time: Real,
    pub step: usize,
    pub meshes: &'a [ElementMesh],
    pub network: &'a Network,
}

/// Fixed-grid MOC integrator over a steady-initialised network.
///
/// Owns both mesh buffers; within a step every update reads exclusively
/// from the previous-step buffer and writes exclusively to the scratch
/// buffer, which are swapped at the end of the step.
pub struct TransientEngine<'a> {
    network: &'a mut Network,
    settings: Settings,
    dt: Real,
    time: Real,
    step_index: usize,
    /// Last completed state.
    state: Vec<ElementMesh>,
    /// Scratch buffer written during a step.
    scratch: Vec<ElementMesh>,
}

impl<'a> TransientEngine<'a> {
    /// Discretise the network and prime both buffers with the steady state.
    pub fn new(network: &'a mut Network, settings: Settings) -> TransientResult<Self> {
        Self::with_friction_model(network, settings, FrictionModel::default())
    }

    /// Like [`TransientEngine::new`], with an explicit wall-friction
    /// selection.
    pub fn with_friction_model(
        network: &'a mut Network,
        settings: Settings,
        friction: FrictionModel,
    ) -> TransientResult<Self> {
        let disc = discretize_with(network, &settings, friction)?;
        Ok(Self {
            state: disc.meshes.clone(),
            scratch: disc.meshes,
            dt: disc.dt,
            time: 0.0,
            step_index: 0,
            network,
            settings,
        })
    }

    pub fn dt(&self) -> Real {
        self.dt
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn steps_taken(&self) -> usize {
        self.step_index
    }

    pub fn meshes(&self) -> &[ElementMesh] {
        &self.state
    }

    pub fn network(&self) -> &Network {
        self.network
    }

    pub fn sample(&self) -> Sample<'_> {
        Sample {
            time: self.time,
            step: self.step_index,
            meshes: &self.state,
            network: &*self.network,
        }
    }

    /// Advance one Δt: dispatch valve events, update the parity-matching
    /// slots of every element, swap buffers, advance the clock.
    pub fn step(&mut self) -> TransientResult<()> {
        crate::events::handle_events(self.network, self.time, self.dt);

        let parity = self.step_index % 2;
        let fluid = self.network.fluid();
        let globals = StepGlobals {
            network: &*self.network,
            settings: &self.settings,
            dt: self.dt,
        };
        for idx in 0..self.state.len() {
            let ctx = elem_ctx(globals.network, &self.settings, self.dt, idx, &self.state[idx]);
            let count = self.state[idx].len();
            for i in 0..count {
                if i % 2 != parity {
                    self.scratch[idx].slots[i] = self.state[idx].slots[i].clone();
                } else if i == 0 || i == count - 1 {
                    update_boundary(&globals, &self.state, &mut self.scratch[idx], &ctx, idx, i);
                } else {
                    update_interior(&ctx, fluid, &self.state[idx], &mut self.scratch[idx], i);
                }
            }
        }

        std::mem::swap(&mut self.state, &mut self.scratch);
        self.step_index += 1;
        self.time += self.dt;
        Ok(())
    }

    /// Run to `symtime`, emitting the initial state and then every
    /// `writeinterval`-th step.
    pub fn run<F>(&mut self, mut emit: F) -> TransientResult<()>
    where
        F: FnMut(Sample<'_>) -> std::io::Result<()>,
    {
        let total = (self.settings.sym_time / self.dt).ceil() as usize;
        debug!(total, dt = self.dt, "transient run");
        emit(self.sample())?;
        for _ in 0..total {
            self.step()?;
            if self.step_index % self.settings.write_interval == 0 {
                emit(self.sample())?;
            }
        }
        Ok(())
    }
}
