//! Array-compute executors for one integration stage
//!
//! A backend evaluates the pairwise force kernel (and optionally the
//! collision kernel) for every particle of a [`Snapshot`]. The call only
//! returns once every particle is done, which is the barrier between the two
//! velocity-Verlet stages.

use std::fmt;

use ndarray::Array2;
use particle_physics::{PhysicsParams, Snapshot};

use crate::error::BackendError;

pub mod cpu;
pub mod gpu;
pub mod selector;


pub use cpu::CpuBackend;
pub use gpu::GpuBackend;
pub use selector::{select_backend, time_backend, Selection, SELECTION_ITERATIONS};

/// Which executor produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
    Gpu,
}

impl BackendKind {
    pub fn is_accelerator(self) -> bool {
        matches!(self, BackendKind::Gpu)
    }

    pub fn from_accelerator_flag(accelerator: bool) -> Self {
        if accelerator {
            BackendKind::Gpu
        } else {
            BackendKind::Cpu
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Cpu => write!(f, "CPU"),
            BackendKind::Gpu => write!(f, "GPU"),
        }
    }
}

/// Executor contract shared by the CPU and accelerator paths
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Accelerations of every particle in `snapshot`, shape `(N, p)`
    ///
    /// `collision_dt` enables the collision term with the given timestep.
    fn accelerations(
        &self,
        snapshot: &Snapshot<'_>,
        physics: &PhysicsParams,
        collision_dt: Option<f64>,
    ) -> Result<Array2<f64>, BackendError>;
}
