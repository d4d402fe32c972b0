//! Elastic-collision response expressed as an acceleration
//!
//! Particles `i` and `j` are in contact when `|d_ij| <= r_i + r_j`. For each
//! contact the 1-D elastic-collision velocity
//!
//! ```text
//! v' = v_i (m_i - m_j)/(m_i + m_j) + 2 m_j v_j/(m_i + m_j)
//! ```
//!
//! is reduced to its magnitude and pushed back along the separation, giving
//!
//! ```text
//! a_i = -cf · Σ_contacts |v'| · d_ij/|d_ij| / dt
//! ```

use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

use crate::params::PhysicsParams;
use crate::snapshot::Snapshot;

/// Whether two particles at `distance` with radii `r_i`, `r_j` touch
#[inline]
pub fn in_contact(distance: f64, r_i: f64, r_j: f64) -> bool {
    distance <= r_i + r_j
}

/// Speed of particle `i` after a 1-D elastic collision with `j`
fn elastic_speed(v_i: ArrayView1<'_, f64>, v_j: ArrayView1<'_, f64>, m_i: f64, m_j: f64) -> f64 {
    let total = m_i + m_j;
    let keep = (m_i - m_j) / total;
    let transfer = 2.0 * m_j / total;
    v_i.iter()
        .zip(v_j.iter())
        .map(|(&a, &b)| {
            let component = a * keep + b * transfer;
            component * component
        })
        .sum::<f64>()
        .sqrt()
}

/// Add the collision acceleration on particle `i` into `out`
///
/// Returns the number of particles found in contact with `i`.
pub fn accumulate_collisions(
    i: usize,
    snapshot: &Snapshot<'_>,
    params: &PhysicsParams,
    dt: f64,
    mut out: ArrayViewMut1<'_, f64>,
) -> usize {
    let xi = snapshot.positions.row(i);
    let vi = snapshot.focal_velocities.row(i);
    let m_i = snapshot.masses[i];
    let r_i = snapshot.radii[i];
    let mut contacts = 0;

    for j in (0..snapshot.len()).filter(|&j| j != i) {
        let squared = snapshot.squared_distance(i, j);
        if !in_contact(squared.sqrt(), r_i, snapshot.radii[j]) {
            continue;
        }
        contacts += 1;

        let speed = elastic_speed(vi, snapshot.velocities.row(j), m_i, snapshot.masses[j]);
        let distance = params.softened_distance(squared);
        let scale = -params.collision_coefficient * speed / (distance * dt);

        Zip::from(&mut out)
            .and(&xi)
            .and(&snapshot.positions.row(j))
            .for_each(|a, &from, &to| *a += scale * (to - from));
    }

    contacts
}

/// Collision acceleration on particle `i`
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use particle_physics::{collision_acceleration, PhysicsParams, Snapshot};
///
/// // Overlapping, approaching each other along x
/// let x = array![[0.0, 0.0], [1.0, 0.0]];
/// let v = array![[1.0, 0.0], [-1.0, 0.0]];
/// let m = array![1.0, 1.0];
/// let q = array![0.0, 0.0];
/// let r = array![1.0, 1.0];
/// let snapshot = Snapshot::new(x.view(), v.view(), m.view(), q.view(), r.view());
///
/// let a = collision_acceleration(0, &snapshot, &PhysicsParams::default(), 0.1);
/// // Pushed away from the other particle
/// assert!(a[0] < 0.0);
/// ```
pub fn collision_acceleration(
    i: usize,
    snapshot: &Snapshot<'_>,
    params: &PhysicsParams,
    dt: f64,
) -> Array1<f64> {
    let mut out = Array1::zeros(snapshot.dimension());
    accumulate_collisions(i, snapshot, params, dt, out.view_mut());
    out
}
