//! Single particle description used when appending to a system

use ndarray::Array1;

/// A point particle with a finite collision radius
///
/// Mass and radius are always positive: see [`sanitize_positive`].
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position vector (length p)
    pub position: Array1<f64>,
    /// Velocity vector (length p)
    pub velocity: Array1<f64>,
    /// Mass of the particle
    pub mass: f64,
    /// Electric charge, any sign
    pub charge: f64,
    /// Collision radius
    pub radius: f64,
}

impl Particle {
    /// Create a particle, sanitizing mass and radius
    ///
    /// # Examples
    ///
    /// ```
    /// use particle_physics::Particle;
    ///
    /// let p = Particle::new(vec![0.0, 1.0], vec![0.0, 0.0], -2.0, 1e-6, 0.0);
    /// assert_eq!(p.mass, 2.0);
    /// assert_eq!(p.radius, 1.0);
    /// assert_eq!(p.dimension(), 2);
    /// ```
    pub fn new(
        position: impl Into<Array1<f64>>,
        velocity: impl Into<Array1<f64>>,
        mass: f64,
        charge: f64,
        radius: f64,
    ) -> Self {
        Self {
            position: position.into(),
            velocity: velocity.into(),
            mass: sanitize_positive(mass),
            charge,
            radius: sanitize_positive(radius),
        }
    }

    /// Spatial dimension of the position vector
    pub fn dimension(&self) -> usize {
        self.position.len()
    }
}

/// Map a mass or radius onto a strictly positive value
///
/// Negative values are replaced by their absolute value and exact zero maps
/// to 1. NaN is passed through unchanged.
pub fn sanitize_positive(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value.abs()
    }
}
