//! Automatic backend choice by timing
//!
//! Both executors evaluate the same synthetic stage several times. The
//! accelerator is only chosen when it is strictly faster.

use std::time::{Duration, Instant};

use ndarray::{Array1, Array2};
use particle_physics::{sanitize_positive, PhysicsParams, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::{Backend, BackendKind};
use crate::error::BackendError;

/// Stage evaluations timed per backend
pub const SELECTION_ITERATIONS: usize = 10;

const SELECTION_SEED: u64 = 0x5EED;

/// Outcome of a timing comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub kind: BackendKind,
    pub cpu_time: Duration,
    /// `None` when no accelerator was available or it failed
    pub accelerator_time: Option<Duration>,
}

/// Random stage input of the run's size
struct Workload {
    positions: Array2<f64>,
    velocities: Array2<f64>,
    masses: Array1<f64>,
    charges: Array1<f64>,
    radii: Array1<f64>,
}

impl Workload {
    fn new(count: usize, dimension: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(SELECTION_SEED);
        // normal(0, 0.5)
        let mut sample = |shape: (usize, usize)| {
            Array2::from_shape_fn(shape, |_| 0.5 * rng.sample::<f64, _>(StandardNormal))
        };

        let positions = sample((count, dimension));
        let velocities = sample((count, dimension));
        let extras = sample((3, count));

        Self {
            positions,
            velocities,
            masses: extras.row(0).mapv(sanitize_positive),
            charges: extras.row(1).to_owned(),
            radii: extras.row(2).mapv(sanitize_positive),
        }
    }

    fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(
            self.positions.view(),
            self.velocities.view(),
            self.masses.view(),
            self.charges.view(),
            self.radii.view(),
        )
    }
}

/// Wall time of `iterations` stage evaluations on `backend`
pub fn time_backend(
    backend: &dyn Backend,
    snapshot: &Snapshot<'_>,
    physics: &PhysicsParams,
    collision_dt: Option<f64>,
    iterations: usize,
) -> Result<Duration, BackendError> {
    let start = Instant::now();
    for _ in 0..iterations {
        backend.accelerations(snapshot, physics, collision_dt)?;
    }
    let elapsed = start.elapsed();
    log::debug!(
        "{} backend: {} stage evaluations of {} particles in {:?}",
        backend.kind(),
        iterations,
        snapshot.len(),
        elapsed
    );
    Ok(elapsed)
}

/// Time `cpu` against `accelerator` on a synthetic `(count, dimension)` stage
///
/// A failing accelerator is logged and treated as unavailable.
pub fn select_backend(
    count: usize,
    dimension: usize,
    collision: bool,
    physics: &PhysicsParams,
    cpu: &dyn Backend,
    accelerator: Option<&dyn Backend>,
) -> Result<Selection, BackendError> {
    let workload = Workload::new(count, dimension);
    let snapshot = workload.snapshot();
    let collision_dt = collision.then_some(1.0);

    let cpu_time = time_backend(cpu, &snapshot, physics, collision_dt, SELECTION_ITERATIONS)?;

    let accelerator_time = accelerator.and_then(|backend| {
        match time_backend(backend, &snapshot, physics, collision_dt, SELECTION_ITERATIONS) {
            Ok(elapsed) => Some(elapsed),
            Err(e) => {
                log::warn!("Accelerator failed during selection: {}", e);
                None
            }
        }
    });

    let kind = match accelerator_time {
        Some(elapsed) if elapsed < cpu_time => BackendKind::Gpu,
        _ => BackendKind::Cpu,
    };

    log::info!(
        "Selected {} backend (CPU {:?}, GPU {})",
        kind,
        cpu_time,
        accelerator_time.map_or_else(|| "unavailable".to_string(), |t| format!("{:?}", t))
    );

    Ok(Selection {
        kind,
        cpu_time,
        accelerator_time,
    })
}
