//! # Particle Simulation Engine
//!
//! Velocity-Verlet integration of N particles under pairwise gravity,
//! Coulomb forces and elastic collisions, with each stage evaluated on a
//! rayon CPU backend or a wgpu compute backend.

pub mod backend;
pub mod error;
pub mod initial;
pub mod integrator;
pub mod params;
pub mod persistence;
pub mod progress;
pub mod system;
pub mod trajectory;

#[cfg(test)]
mod initial_test;
#[cfg(test)]
mod progress_test;
#[cfg(test)]
mod trajectory_test;

pub use backend::{Backend, BackendKind, CpuBackend, GpuBackend};
pub use error::*;
pub use integrator::{plan_steps, StepPlan, VelocityVerlet};
pub use params::*;
pub use system::*;
pub use trajectory::*;
