//! Initial-condition generators

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::error::ValidationError;
use crate::system::ParticleSystem;

/// Particles at rest on a regular grid with alternating charge signs
///
/// The grid has `shape[d]` points along axis `d`, spaced `2 * radius + distance`
/// apart. The particle at the origin carries `-|absolute_charge|` and the sign
/// flips between grid neighbours.
///
/// Particles are numbered with axis 0 varying fastest, then axes `2..p`
/// from last to first, and axis 1 slowest (Cartesian meshgrid order).
///
/// # Examples
///
/// ```
/// use particle_simulation::initial;
///
/// let system = initial::lattice(&[2, 3], 1e7, 1e-5, 0.5, 1.0).unwrap();
/// assert_eq!(system.len(), 6);
/// assert_eq!(system.dimension(), 2);
/// assert!(system.charges()[0] < 0.0);
/// assert!(system.charges()[1] > 0.0);
/// ```
pub fn lattice(
    shape: &[usize],
    mass: f64,
    absolute_charge: f64,
    distance: f64,
    radius: f64,
) -> Result<ParticleSystem, ValidationError> {
    let dimension = shape.len();
    let count: usize = if dimension == 0 { 0 } else { shape.iter().product() };
    let spacing = 2.0 * radius + distance;
    let magnitude = absolute_charge.abs();

    let mut positions = Array2::zeros((count, dimension));
    let mut charges = Array1::zeros(count);
    let order = meshgrid_order(dimension);
    for (k, mut row) in positions.outer_iter_mut().enumerate() {
        let mut rest = k;
        let mut parity = 0;
        for &d in order.iter().rev() {
            let index = rest % shape[d];
            rest /= shape[d];
            row[d] = index as f64 * spacing;
            parity += index;
        }
        charges[k] = if parity % 2 == 0 { -magnitude } else { magnitude };
    }

    ParticleSystem::new(
        positions,
        Array2::zeros((count, dimension)),
        Array1::from_elem(count, mass),
        charges,
        Array1::from_elem(count, radius),
    )
}

/// Axes from slowest to fastest varying; the first two are swapped
fn meshgrid_order(dimension: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dimension).collect();
    if dimension >= 2 {
        order.swap(0, 1);
    }
    order
}

/// Mean and standard deviation of a normal distribution
pub type Spread = (f64, f64);

/// Distributions for [`random`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomConfig {
    pub count: usize,
    pub dimension: usize,
    pub position: Spread,
    pub velocity: Spread,
    pub mass: Spread,
    pub charge: Spread,
    pub radius: Spread,
}

impl RandomConfig {
    pub fn new(count: usize, dimension: usize) -> Self {
        Self {
            count,
            dimension,
            ..Default::default()
        }
    }
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            count: 0,
            dimension: 2,
            position: (0.0, 100.0),
            velocity: (0.0, 100.0),
            mass: (1e7, 1e5),
            charge: (0.0, 1e-5),
            radius: (1.0, 0.1),
        }
    }
}

fn normal(name: &'static str, (mean, std): Spread) -> Result<Normal<f64>, ValidationError> {
    if std.is_nan() || std < 0.0 {
        return Err(ValidationError::Distribution {
            name,
            reason: format!("standard deviation must be non-negative, got {}", std),
        });
    }
    Normal::new(mean, std).map_err(|e| ValidationError::Distribution {
        name,
        reason: e.to_string(),
    })
}

/// Particles with every property drawn from a normal distribution
///
/// The same `seed` always yields the same system.
pub fn random(config: &RandomConfig, seed: u64) -> Result<ParticleSystem, ValidationError> {
    let position = normal("position", config.position)?;
    let velocity = normal("velocity", config.velocity)?;
    let mass = normal("mass", config.mass)?;
    let charge = normal("charge", config.charge)?;
    let radius = normal("radius", config.radius)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let shape = (config.count, config.dimension);
    let positions = Array2::from_shape_fn(shape, |_| position.sample(&mut rng));
    let velocities = Array2::from_shape_fn(shape, |_| velocity.sample(&mut rng));
    let masses = Array1::from_shape_fn(config.count, |_| mass.sample(&mut rng));
    let charges = Array1::from_shape_fn(config.count, |_| charge.sample(&mut rng));
    let radii = Array1::from_shape_fn(config.count, |_| radius.sample(&mut rng));

    ParticleSystem::new(positions, velocities, masses, charges, radii)
}
