//! Read-only view of the system that one integration stage evaluates

use ndarray::{ArrayView1, ArrayView2};

/// Borrowed state shared by every per-particle kernel call of one stage
///
/// `velocities` are the velocities of the *other* particles as seen by the
/// collision kernel, `focal_velocities` the velocity each particle uses for
/// itself. Outside of the second velocity-Verlet stage both are the same
/// array.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub positions: ArrayView2<'a, f64>,
    pub velocities: ArrayView2<'a, f64>,
    pub focal_velocities: ArrayView2<'a, f64>,
    pub masses: ArrayView1<'a, f64>,
    pub charges: ArrayView1<'a, f64>,
    pub radii: ArrayView1<'a, f64>,
}

impl<'a> Snapshot<'a> {
    /// Snapshot where each particle sees the same velocity array
    pub fn new(
        positions: ArrayView2<'a, f64>,
        velocities: ArrayView2<'a, f64>,
        masses: ArrayView1<'a, f64>,
        charges: ArrayView1<'a, f64>,
        radii: ArrayView1<'a, f64>,
    ) -> Self {
        Self {
            positions,
            velocities,
            focal_velocities: velocities,
            masses,
            charges,
            radii,
        }
    }

    /// Replace the velocities particles use for themselves
    pub fn with_focal_velocities(mut self, focal_velocities: ArrayView2<'a, f64>) -> Self {
        self.focal_velocities = focal_velocities;
        self
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spatial dimension p
    pub fn dimension(&self) -> usize {
        self.positions.ncols()
    }

    /// Squared distance between particles `i` and `j`
    #[inline]
    pub fn squared_distance(&self, i: usize, j: usize) -> f64 {
        let xi = self.positions.row(i);
        let xj = self.positions.row(j);
        xi.iter().zip(xj.iter()).map(|(a, b)| (b - a) * (b - a)).sum()
    }
}
