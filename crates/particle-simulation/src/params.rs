//! Run configuration and the GPU uniform block

use bytemuck::{Pod, Zeroable};
use particle_physics::PhysicsParams;

/// Which executor runs the per-stage array math
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// Benchmark CPU against the accelerator and take the faster one
    #[default]
    Auto,
    Cpu,
    Gpu,
}

/// Parameters of a single `solve` call
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Requested simulated time T
    pub total_time: f64,
    /// Timestep; `None` divides T into 500 steps
    pub dt: Option<f64>,
    /// Apply the elastic-collision term
    pub collision: bool,
    pub backend: BackendChoice,
    pub physics: PhysicsParams,
    /// Log percentage and ETA while running
    pub progress: bool,
}

impl RunConfig {
    pub fn new(total_time: f64) -> Self {
        Self {
            total_time,
            dt: None,
            collision: true,
            backend: BackendChoice::Auto,
            physics: PhysicsParams::default(),
            progress: false,
        }
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    pub fn with_collision(mut self, collision: bool) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_backend(mut self, backend: BackendChoice) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsParams) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

/// Uniform block consumed by `shaders/accelerations.wgsl`
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuParams {
    // x: particle count, y: dimension, z: collision flag, w: distance power
    pub shape: [u32; 4],

    // x: G, y: K_electric, z: collision coefficient, w: dt
    pub constants: [f32; 4],

    // x: softening, y: padding, z: padding, w: padding
    pub softening: [f32; 4],
}

impl GpuParams {
    pub fn new(
        count: usize,
        dimension: usize,
        physics: &PhysicsParams,
        collision_dt: Option<f64>,
    ) -> Self {
        Self {
            shape: [
                count as u32,
                dimension as u32,
                collision_dt.is_some() as u32,
                physics.law.distance_power() as u32,
            ],
            constants: [
                physics.g as f32,
                physics.k_electric as f32,
                physics.collision_coefficient as f32,
                collision_dt.unwrap_or(0.0) as f32,
            ],
            softening: [physics.softening as f32, 0.0, 0.0, 0.0],
        }
    }
}
