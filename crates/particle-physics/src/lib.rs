//! # Particle Physics Kernels
//!
//! Pairwise gravity/Coulomb acceleration and elastic-collision response for
//! N point particles in any number of spatial dimensions. Every kernel is a
//! pure function of a read-only [`Snapshot`].

pub mod collisions;
pub mod constants;
pub mod forces;
pub mod params;
pub mod particle;
pub mod snapshot;

#[cfg(test)]
mod particle_test;

pub use collisions::*;
pub use constants::*;
pub use forces::*;
pub use params::*;
pub use particle::*;
pub use snapshot::*;
