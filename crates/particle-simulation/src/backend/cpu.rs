//! Data-parallel CPU backend

use ndarray::{Array2, Axis};
use particle_physics::{accumulate_collisions, accumulate_pairwise, PhysicsParams, Snapshot};
use rayon::prelude::*;

use super::{Backend, BackendKind};
use crate::error::BackendError;

/// Evaluates each particle's row on the rayon thread pool
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl Backend for CpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cpu
    }

    fn accelerations(
        &self,
        snapshot: &Snapshot<'_>,
        physics: &PhysicsParams,
        collision_dt: Option<f64>,
    ) -> Result<Array2<f64>, BackendError> {
        let mut out = Array2::zeros((snapshot.len(), snapshot.dimension()));

        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut row)| {
                accumulate_pairwise(i, snapshot, physics, row.view_mut());
                if let Some(dt) = collision_dt {
                    accumulate_collisions(i, snapshot, physics, dt, row.view_mut());
                }
            });

        Ok(out)
    }
}
