//! Velocity-Verlet step loop
//!
//! Each step runs two stages, each a full backend evaluation over every
//! particle:
//!
//! ```text
//! A: a  = acc(x[m-1], v[m-1])
//!    v_half = v[m-1] + dt/2 * a
//!    x[m]   = x[m-1] + dt * v_half
//! B: a' = acc(x[m], v_half; focal v[m-1])
//!    v[m]   = v_half + dt/2 * a'
//! ```

use ndarray::{s, Array2, ArrayView1, ArrayView2, ArrayViewMut2, Axis, Zip};
use particle_physics::{PhysicsParams, Snapshot, DEFAULT_STEPS};

use crate::backend::Backend;
use crate::error::{BackendError, SimulationError};
use crate::progress::Progress;
use crate::trajectory::Trajectory;

/// Resolved timestep and step count for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    /// Recorded steps including the initial state
    pub steps: usize,
    pub dt: f64,
    /// Effective simulated time, `steps * dt`
    pub total_time: f64,
}

/// Resolve `dt` (default `T / 500`) and `steps = ceil(T / dt)`
pub fn plan_steps(total_time: f64, dt: Option<f64>) -> Result<StepPlan, SimulationError> {
    let dt = dt.unwrap_or(total_time / DEFAULT_STEPS as f64);
    let valid = |value: f64| value.is_finite() && value > 0.0;
    if !valid(total_time) || !valid(dt) {
        return Err(SimulationError::InvalidTimestep { total_time, dt });
    }

    let mut steps = (total_time / dt).floor() as usize;
    if (steps as f64) * dt < total_time {
        steps += 1;
    }

    Ok(StepPlan {
        steps,
        dt,
        total_time: steps as f64 * dt,
    })
}

/// Identity arrays shared by every stage of a run
#[derive(Debug, Clone, Copy)]
pub struct Bodies<'a> {
    pub masses: ArrayView1<'a, f64>,
    pub charges: ArrayView1<'a, f64>,
    pub radii: ArrayView1<'a, f64>,
}

pub struct VelocityVerlet<'a> {
    backend: &'a dyn Backend,
    physics: PhysicsParams,
    collision: bool,
}

impl<'a> VelocityVerlet<'a> {
    pub fn new(backend: &'a dyn Backend, physics: PhysicsParams, collision: bool) -> Self {
        Self {
            backend,
            physics,
            collision,
        }
    }

    /// Integrate from `(positions, velocities)` over `plan`
    pub fn run(
        &self,
        positions: ArrayView2<'_, f64>,
        velocities: ArrayView2<'_, f64>,
        bodies: Bodies<'_>,
        plan: &StepPlan,
        mut progress: Option<&mut Progress>,
    ) -> Result<Trajectory, BackendError> {
        let mut trajectory = Trajectory::allocate(plan.steps, plan.total_time, positions, velocities);
        let count = positions.nrows();

        let (x, v) = trajectory.states_mut();
        for m in 1..plan.steps {
            let (x_prev, x_next) = x.multi_slice_mut((s![m - 1, .., ..], s![m, .., ..]));
            let (v_prev, v_next) = v.multi_slice_mut((s![m - 1, .., ..], s![m, .., ..]));

            let v_half = self.drift(x_prev.view(), v_prev.view(), x_next, bodies, plan.dt)?;
            if let Some(progress) = progress.as_deref_mut() {
                progress.advance(count);
            }

            let x_next = x.index_axis(Axis(0), m);
            self.kick(x_next, v_prev.view(), v_half, v_next, bodies, plan.dt)?;
            if let Some(progress) = progress.as_deref_mut() {
                progress.advance(count);
            }
        }

        Ok(trajectory)
    }

    /// Stage A: returns `v_half` and writes `x[m]`
    fn drift(
        &self,
        x_prev: ArrayView2<'_, f64>,
        v_prev: ArrayView2<'_, f64>,
        mut x_next: ArrayViewMut2<'_, f64>,
        bodies: Bodies<'_>,
        dt: f64,
    ) -> Result<Array2<f64>, BackendError> {
        let snapshot = Snapshot::new(
            x_prev.reborrow(),
            v_prev.reborrow(),
            bodies.masses.reborrow(),
            bodies.charges.reborrow(),
            bodies.radii.reborrow(),
        );
        let mut v_half = self.accelerations(&snapshot, dt)?;

        Zip::from(&mut v_half)
            .and(&v_prev)
            .for_each(|a, &v0| *a = v0 + 0.5 * dt * *a);
        Zip::from(&mut x_next)
            .and(&x_prev)
            .and(&v_half)
            .for_each(|x1, &x0, &vh| *x1 = x0 + dt * vh);

        Ok(v_half)
    }

    /// Stage B: writes `v[m]` from `v_half` and the accelerations at `x[m]`
    fn kick(
        &self,
        x_next: ArrayView2<'_, f64>,
        v_prev: ArrayView2<'_, f64>,
        v_half: Array2<f64>,
        mut v_next: ArrayViewMut2<'_, f64>,
        bodies: Bodies<'_>,
        dt: f64,
    ) -> Result<(), BackendError> {
        let snapshot = Snapshot::new(
            x_next.reborrow(),
            v_half.view(),
            bodies.masses.reborrow(),
            bodies.charges.reborrow(),
            bodies.radii.reborrow(),
        )
        .with_focal_velocities(v_prev.reborrow());
        let a = self.accelerations(&snapshot, dt)?;

        Zip::from(&mut v_next)
            .and(&v_half)
            .and(&a)
            .for_each(|v1, &vh, &acc| *v1 = vh + 0.5 * dt * acc);

        Ok(())
    }

    fn accelerations(&self, snapshot: &Snapshot<'_>, dt: f64) -> Result<Array2<f64>, BackendError> {
        let collision_dt = self.collision.then_some(dt);
        self.backend.accelerations(snapshot, &self.physics, collision_dt)
    }
}
