//! Pairwise gravity + Coulomb acceleration
//!
//! For a focal particle `i` the acceleration is
//!
//! ```text
//! a_i = Σ_{j≠i} (G m_j + k q_i q_j / m_i) · d_ij / |d_ij|^p
//! ```
//!
//! with `d_ij = x_j - x_i` and `p = 1` for [`ForceLaw::UnitVector`] or
//! `p = 3` for [`ForceLaw::InverseSquare`]. A positive coefficient pulls `i`
//! toward `j`.
//!
//! Coincident particles are not guarded: with zero softening the term is
//! `inf * 0` and the result is NaN.

use ndarray::{Array1, ArrayViewMut1, Zip};

use crate::params::{ForceLaw, PhysicsParams};
use crate::snapshot::Snapshot;

/// Add the acceleration on particle `i` from every other particle into `out`
pub fn accumulate_pairwise(
    i: usize,
    snapshot: &Snapshot<'_>,
    params: &PhysicsParams,
    mut out: ArrayViewMut1<'_, f64>,
) {
    let xi = snapshot.positions.row(i);
    let m_i = snapshot.masses[i];
    let q_i = snapshot.charges[i];
    let power = params.law.distance_power();

    for j in (0..snapshot.len()).filter(|&j| j != i) {
        let xj = snapshot.positions.row(j);
        let distance = params.softened_distance(snapshot.squared_distance(i, j));
        let coefficient =
            params.pair_coefficient(m_i, q_i, snapshot.masses[j], snapshot.charges[j]);
        let scale = coefficient / distance.powi(power);

        Zip::from(&mut out)
            .and(&xi)
            .and(&xj)
            .for_each(|a, &from, &to| *a += scale * (to - from));
    }
}

/// Acceleration on particle `i` from every other particle
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use particle_physics::{pairwise_acceleration, PhysicsParams, Snapshot};
///
/// let x = array![[0.0, 0.0], [2.0, 0.0]];
/// let v = array![[0.0, 0.0], [0.0, 0.0]];
/// let m = array![1.0, 3.0];
/// let q = array![0.0, 0.0];
/// let r = array![0.1, 0.1];
/// let snapshot = Snapshot::new(x.view(), v.view(), m.view(), q.view(), r.view());
///
/// let a = pairwise_acceleration(0, &snapshot, &PhysicsParams::default());
/// // Pulled toward the heavier particle along +x
/// assert!(a[0] > 0.0);
/// assert_eq!(a[1], 0.0);
/// ```
pub fn pairwise_acceleration(i: usize, snapshot: &Snapshot<'_>, params: &PhysicsParams) -> Array1<f64> {
    let mut out = Array1::zeros(snapshot.dimension());
    accumulate_pairwise(i, snapshot, params, out.view_mut());
    out
}

/// Total potential energy of the pairwise interaction, each pair counted once
///
/// Consistent with the acceleration for the configured [`ForceLaw`]:
/// `C·|d|` for the unit-vector law and `-C/|d|` for inverse-square, where
/// `C = G m_i m_j + k q_i q_j`.
pub fn pairwise_potential_energy(snapshot: &Snapshot<'_>, params: &PhysicsParams) -> f64 {
    let n = snapshot.len();
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .map(|(i, j)| {
            let c = params.g * snapshot.masses[i] * snapshot.masses[j]
                + params.k_electric * snapshot.charges[i] * snapshot.charges[j];
            let distance = params.softened_distance(snapshot.squared_distance(i, j));
            match params.law {
                ForceLaw::UnitVector => c * distance,
                ForceLaw::InverseSquare => -c / distance,
            }
        })
        .sum()
}
