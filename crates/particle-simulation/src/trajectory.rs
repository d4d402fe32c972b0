//! Time-major trajectory buffer

use ndarray::{s, Array1, Array2, Array3, ArrayView2, Axis, Zip};

use crate::error::ValidationError;

/// Positions and velocities of every particle at every recorded step
///
/// `x` and `v` have shape `(steps, N, p)`. `t` spans `[0, T]` evenly, ending
/// at the effective simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    t: Array1<f64>,
    x: Array3<f64>,
    v: Array3<f64>,
}

impl Trajectory {
    /// Zeroed buffer with step 0 set to the initial state
    pub(crate) fn allocate(
        steps: usize,
        total_time: f64,
        positions: ArrayView2<'_, f64>,
        velocities: ArrayView2<'_, f64>,
    ) -> Self {
        let (count, dimension) = positions.dim();
        let mut t = Array1::linspace(0.0, total_time, steps);
        if steps > 1 {
            t[steps - 1] = total_time;
        }
        let mut x = Array3::zeros((steps, count, dimension));
        let mut v = Array3::zeros((steps, count, dimension));
        if steps > 0 {
            x.slice_mut(s![0, .., ..]).assign(&positions);
            v.slice_mut(s![0, .., ..]).assign(&velocities);
        }
        Self { t, x, v }
    }

    /// Rebuild from saved arrays
    pub fn from_parts(
        t: Array1<f64>,
        x: Array3<f64>,
        v: Array3<f64>,
    ) -> Result<Self, ValidationError> {
        if x.shape() != v.shape() {
            return Err(ValidationError::TrajectoryShape {
                positions: x.shape().to_vec(),
                velocities: v.shape().to_vec(),
            });
        }
        if t.len() != x.len_of(Axis(0)) {
            return Err(ValidationError::Length {
                name: "t",
                expected: x.len_of(Axis(0)),
                found: t.len(),
            });
        }
        Ok(Self { t, x, v })
    }

    pub(crate) fn states_mut(&mut self) -> (&mut Array3<f64>, &mut Array3<f64>) {
        (&mut self.x, &mut self.v)
    }

    pub fn t(&self) -> &Array1<f64> {
        &self.t
    }

    pub fn x(&self) -> &Array3<f64> {
        &self.x
    }

    pub fn v(&self) -> &Array3<f64> {
        &self.v
    }

    /// Number of recorded steps including the initial state
    pub fn steps(&self) -> usize {
        self.t.len()
    }

    pub fn positions_at(&self, step: usize) -> ArrayView2<'_, f64> {
        self.x.index_axis(Axis(0), step)
    }

    pub fn velocities_at(&self, step: usize) -> ArrayView2<'_, f64> {
        self.v.index_axis(Axis(0), step)
    }

    /// True if any position or velocity is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.x.iter().chain(self.v.iter()).any(|value| !value.is_finite())
    }

    /// Per-step, per-particle colour values in `[0, 1]` from speed
    ///
    /// Speeds are log-scaled and inverted so the slowest particles map to 1.
    /// A trajectory where every scaled speed is equal maps to all zeros.
    pub fn speed_colors(&self) -> Array2<f64> {
        let speeds = self.v.map_axis(Axis(2), |v| v.dot(&v).sqrt());
        if speeds.is_empty() {
            return speeds;
        }

        let min_speed = speeds.fold(f64::INFINITY, |acc, &s| acc.min(s));
        let scaled = speeds.mapv(|s| (s + min_speed + 1e-15).ln());
        let low = scaled.fold(f64::INFINITY, |acc, &s| acc.min(s));
        let high = scaled.fold(f64::NEG_INFINITY, |acc, &s| acc.max(s));
        let range = high - low;

        let mut colors = Array2::zeros(scaled.raw_dim());
        if range > 0.0 && range.is_finite() {
            Zip::from(&mut colors)
                .and(&scaled)
                .for_each(|c, &s| *c = 1.0 - (s - low) / range);
        }
        colors
    }
}
