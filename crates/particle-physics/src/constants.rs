//! Physical constants for particle simulation
//!
//! All values are SI. Positions are meters, velocities meters/second,
//! masses kilograms, charges coulombs and radii meters.

/// Universal gravitational constant (m³ kg⁻¹ s⁻²)
pub const G: f64 = 6.67430e-11;

/// Coulomb constant for the electrostatic force (k = 1/(4πε₀), N m² C⁻²)
pub const K_ELECTRIC: f64 = 8.9875517887e9;

/// Calibration coefficient turning an elastic-collision velocity update into
/// an acceleration applied within one timestep
pub const COLLISION_COEFFICIENT: f64 = 0.5;

/// Number of steps the total time is divided into when no timestep is given
pub const DEFAULT_STEPS: usize = 500;
