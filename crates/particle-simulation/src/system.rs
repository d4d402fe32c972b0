//! Particle system identity state and the solve entry points

use std::fmt;

use ndarray::{aview1, Array1, Array2, ArrayD, ArrayView1, ArrayView2, Axis, Ix1, Ix2};
use particle_physics::{sanitize_positive, Particle, Snapshot};

use crate::backend::{select_backend, Backend, BackendKind, CpuBackend, GpuBackend};
use crate::error::{BackendError, SimulationError, ValidationError};
use crate::integrator::{plan_steps, Bodies, StepPlan, VelocityVerlet};
use crate::params::{BackendChoice, RunConfig};
use crate::progress::Progress;
use crate::trajectory::Trajectory;

/// Everything a completed `solve` produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub trajectory: Trajectory,
    pub dt: f64,
    /// Effective simulated time, a whole number of steps
    pub total_time: f64,
    pub backend: BackendKind,
    pub collision: bool,
}

/// Human-readable description of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub particles: usize,
    pub dimension: usize,
    pub total_time: f64,
    pub dt: f64,
    pub steps: usize,
    pub backend: BackendKind,
    pub collision: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = |on: bool| if on { "Active" } else { "Inactive" };
        writeln!(f, "SIMULATION INFO:")?;
        writeln!(f)?;
        writeln!(f, "\tParticles\t\t{}", self.particles)?;
        writeln!(f, "\tDimensions\t\t{}", self.dimension)?;
        writeln!(f, "\tT\t\t\t{}", self.total_time)?;
        writeln!(f, "\tdt\t\t\t{}", self.dt)?;
        writeln!(f, "\tSteps\t\t\t{}", self.steps)?;
        writeln!(f, "\tGPU\t\t\t{}", active(self.backend.is_accelerator()))?;
        write!(f, "\tCollisions\t\t{}", active(self.collision))
    }
}

/// N particles in p dimensions plus the most recent run, if any
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    positions: Array2<f64>,
    velocities: Array2<f64>,
    masses: Array1<f64>,
    charges: Array1<f64>,
    radii: Array1<f64>,
    run: Option<RunRecord>,
}

impl ParticleSystem {
    /// Build a system from `(N, p)` positions and velocities and length-N
    /// masses, charges and radii
    ///
    /// Zero masses and radii become 1, negative ones are made positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::array;
    /// use particle_simulation::ParticleSystem;
    ///
    /// let system = ParticleSystem::new(
    ///     array![[0.0, 0.0], [1.0, 0.0]],
    ///     array![[0.0, 0.0], [0.0, 0.0]],
    ///     array![1.0, -2.0],
    ///     array![0.0, 0.0],
    ///     array![0.0, 0.5],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(system.len(), 2);
    /// assert_eq!(system.masses()[1], 2.0);
    /// assert_eq!(system.radii()[0], 1.0);
    /// ```
    pub fn new(
        positions: Array2<f64>,
        velocities: Array2<f64>,
        masses: Array1<f64>,
        charges: Array1<f64>,
        radii: Array1<f64>,
    ) -> Result<Self, ValidationError> {
        if positions.dim() != velocities.dim() {
            return Err(ValidationError::StateShape {
                positions: positions.dim(),
                velocities: velocities.dim(),
            });
        }
        let (count, dimension) = positions.dim();
        if dimension == 0 {
            return Err(ValidationError::ZeroDimension);
        }
        for (name, array) in [("masses", &masses), ("charges", &charges), ("radii", &radii)] {
            if array.len() != count {
                return Err(ValidationError::Length {
                    name,
                    expected: count,
                    found: array.len(),
                });
            }
        }

        Ok(Self {
            positions,
            velocities,
            masses: masses.mapv(sanitize_positive),
            charges,
            radii: radii.mapv(sanitize_positive),
            run: None,
        })
    }

    /// Like [`new`](Self::new) but for arrays of unchecked rank
    pub fn from_dyn(
        positions: ArrayD<f64>,
        velocities: ArrayD<f64>,
        masses: ArrayD<f64>,
        charges: ArrayD<f64>,
        radii: ArrayD<f64>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            into_rank::<Ix2>("positions", positions)?,
            into_rank::<Ix2>("velocities", velocities)?,
            into_rank::<Ix1>("masses", masses)?,
            into_rank::<Ix1>("charges", charges)?,
            into_rank::<Ix1>("radii", radii)?,
        )
    }

    /// Append a particle at index N and drop the previous run
    pub fn add(&mut self, particle: Particle) -> Result<(), ValidationError> {
        let dimension = self.dimension();
        for found in [particle.position.len(), particle.velocity.len()] {
            if found != dimension {
                return Err(ValidationError::ParticleDimension {
                    expected: dimension,
                    found,
                });
            }
        }

        let mismatch = |_| ValidationError::ParticleDimension {
            expected: dimension,
            found: particle.position.len(),
        };
        self.positions.push_row(particle.position.view()).map_err(mismatch)?;
        self.velocities.push_row(particle.velocity.view()).map_err(mismatch)?;
        self.masses
            .append(Axis(0), aview1(&[sanitize_positive(particle.mass)]))
            .map_err(mismatch)?;
        self.charges
            .append(Axis(0), aview1(&[particle.charge]))
            .map_err(mismatch)?;
        self.radii
            .append(Axis(0), aview1(&[sanitize_positive(particle.radius)]))
            .map_err(mismatch)?;

        self.run = None;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.positions.ncols()
    }

    /// Initial positions x0
    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    /// Initial velocities v0
    pub fn velocities(&self) -> ArrayView2<'_, f64> {
        self.velocities.view()
    }

    pub fn masses(&self) -> ArrayView1<'_, f64> {
        self.masses.view()
    }

    pub fn charges(&self) -> ArrayView1<'_, f64> {
        self.charges.view()
    }

    pub fn radii(&self) -> ArrayView1<'_, f64> {
        self.radii.view()
    }

    pub fn run(&self) -> Option<&RunRecord> {
        self.run.as_ref()
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.run.as_ref().map(|run| &run.trajectory)
    }

    /// Summary of the stored run
    pub fn summary(&self) -> Option<RunSummary> {
        self.run.as_ref().map(|run| RunSummary {
            particles: self.len(),
            dimension: self.dimension(),
            total_time: run.total_time,
            dt: run.dt,
            steps: run.trajectory.steps(),
            backend: run.backend,
            collision: run.collision,
        })
    }

    /// Snapshot of the initial state
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(
            self.positions.view(),
            self.velocities.view(),
            self.masses.view(),
            self.charges.view(),
            self.radii.view(),
        )
    }

    /// Snapshot of the stored trajectory at `step`
    pub fn snapshot_at(&self, step: usize) -> Option<Snapshot<'_>> {
        let trajectory = self.trajectory()?;
        (step < trajectory.steps()).then(|| {
            Snapshot::new(
                trajectory.positions_at(step),
                trajectory.velocities_at(step),
                self.masses.view(),
                self.charges.view(),
                self.radii.view(),
            )
        })
    }

    /// `Σ ½ m |v|²` for a `(N, p)` velocity array
    pub fn kinetic_energy(&self, velocities: ArrayView2<'_, f64>) -> f64 {
        velocities
            .outer_iter()
            .zip(self.masses.iter())
            .map(|(v, &m)| 0.5 * m * v.dot(&v))
            .sum()
    }

    /// `Σ m v` for a `(N, p)` velocity array
    pub fn total_momentum(&self, velocities: ArrayView2<'_, f64>) -> Array1<f64> {
        let mut total = Array1::zeros(velocities.ncols());
        for (v, &m) in velocities.outer_iter().zip(self.masses.iter()) {
            total.scaled_add(m, &v);
        }
        total
    }

    /// Integrate the system, choosing the executor from `config.backend`
    pub fn solve(&mut self, config: &RunConfig) -> Result<&Trajectory, SimulationError> {
        let plan = plan_steps(config.total_time, config.dt)?;
        let cpu = CpuBackend;

        match config.backend {
            BackendChoice::Cpu => self.integrate(config, &plan, &cpu),
            BackendChoice::Gpu => {
                let gpu = GpuBackend::new().map_err(|e| {
                    log::warn!("GPU backend requested but unavailable: {}", e);
                    BackendError::Unavailable
                })?;
                self.integrate(config, &plan, &gpu)
            }
            BackendChoice::Auto => {
                let gpu = match GpuBackend::new() {
                    Ok(gpu) => Some(gpu),
                    Err(e) => {
                        log::debug!("No accelerator for backend selection: {}", e);
                        None
                    }
                };
                let selection = select_backend(
                    self.len(),
                    self.dimension(),
                    config.collision,
                    &config.physics,
                    &cpu,
                    gpu.as_ref().map(|gpu| gpu as &dyn Backend),
                )?;
                match (selection.kind, gpu.as_ref()) {
                    (BackendKind::Gpu, Some(gpu)) => self.integrate(config, &plan, gpu),
                    _ => self.integrate(config, &plan, &cpu),
                }
            }
        }
    }

    /// Integrate the system on an explicit executor, ignoring `config.backend`
    pub fn solve_with(
        &mut self,
        config: &RunConfig,
        backend: &dyn Backend,
    ) -> Result<&Trajectory, SimulationError> {
        let plan = plan_steps(config.total_time, config.dt)?;
        self.integrate(config, &plan, backend)
    }

    fn integrate(
        &mut self,
        config: &RunConfig,
        plan: &StepPlan,
        backend: &dyn Backend,
    ) -> Result<&Trajectory, SimulationError> {
        self.run = None;

        let summary = RunSummary {
            particles: self.len(),
            dimension: self.dimension(),
            total_time: plan.total_time,
            dt: plan.dt,
            steps: plan.steps,
            backend: backend.kind(),
            collision: config.collision,
        };
        log::info!("{}", summary);

        let mut progress = config
            .progress
            .then(|| Progress::new(2 * plan.steps.saturating_sub(1) * self.len()));
        let bodies = Bodies {
            masses: self.masses.view(),
            charges: self.charges.view(),
            radii: self.radii.view(),
        };
        let trajectory = VelocityVerlet::new(backend, config.physics, config.collision).run(
            self.positions.view(),
            self.velocities.view(),
            bodies,
            plan,
            progress.as_mut(),
        )?;
        if let Some(progress) = progress {
            progress.finish();
        }

        if trajectory.has_non_finite() {
            log::warn!("Trajectory contains non-finite values (coincident particles?)");
        }

        let record = self.run.insert(RunRecord {
            trajectory,
            dt: plan.dt,
            total_time: plan.total_time,
            backend: backend.kind(),
            collision: config.collision,
        });
        Ok(&record.trajectory)
    }

    /// Attach a run read back from disk
    pub(crate) fn restore_run(&mut self, record: RunRecord) {
        self.run = Some(record);
    }
}

fn into_rank<D: ndarray::Dimension>(
    name: &'static str,
    array: ArrayD<f64>,
) -> Result<ndarray::Array<f64, D>, ValidationError> {
    let found = array.ndim();
    array
        .into_dimensionality::<D>()
        .map_err(|_| ValidationError::Rank {
            name,
            expected: D::NDIM.unwrap_or(found),
            found,
        })
}
