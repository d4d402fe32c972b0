use approx::assert_relative_eq;
use ndarray::{array, Array1, Array3};

use crate::error::ValidationError;
use crate::trajectory::Trajectory;

#[test]
fn test_allocate_sets_initial_state_and_time_grid() {
    let x0 = array![[1.0, 2.0], [3.0, 4.0]];
    let v0 = array![[0.5, 0.0], [0.0, -0.5]];
    let trajectory = Trajectory::allocate(3, 0.5, x0.view(), v0.view());

    assert_eq!(trajectory.steps(), 3);
    assert_eq!(trajectory.t(), &array![0.0, 0.25, 0.5]);
    assert_eq!(trajectory.positions_at(0), x0);
    assert_eq!(trajectory.velocities_at(0), v0);
    assert!(trajectory.positions_at(2).iter().all(|&x| x == 0.0));
}

#[test]
fn test_time_grid_ends_at_total_time() {
    let x0 = array![[0.0]];
    let trajectory = Trajectory::allocate(4, 1.0, x0.view(), x0.view());

    let t = trajectory.t();
    assert_eq!(t[0], 0.0);
    assert_relative_eq!(t[1], 1.0 / 3.0, epsilon = 1e-15);
    assert_relative_eq!(t[2], 2.0 / 3.0, epsilon = 1e-15);
    assert_eq!(t[3], 1.0);
}

#[test]
fn test_single_step_grid_is_zero() {
    let x0 = array![[0.0]];
    let trajectory = Trajectory::allocate(1, 0.25, x0.view(), x0.view());
    assert_eq!(trajectory.t(), &array![0.0]);
}

#[test]
fn test_from_parts_checks_shapes() {
    let err = Trajectory::from_parts(
        Array1::zeros(2),
        Array3::zeros((2, 3, 2)),
        Array3::zeros((2, 3, 1)),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationError::TrajectoryShape {
            positions: vec![2, 3, 2],
            velocities: vec![2, 3, 1],
        }
    );

    let err = Trajectory::from_parts(
        Array1::zeros(5),
        Array3::zeros((2, 3, 2)),
        Array3::zeros((2, 3, 2)),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationError::Length {
            name: "t",
            expected: 2,
            found: 5
        }
    );
}

#[test]
fn test_has_non_finite() {
    let mut v = Array3::zeros((2, 2, 1));
    let finite = Trajectory::from_parts(Array1::zeros(2), Array3::zeros((2, 2, 1)), v.clone()).unwrap();
    assert!(!finite.has_non_finite());

    v[[1, 0, 0]] = f64::NAN;
    let broken = Trajectory::from_parts(Array1::zeros(2), Array3::zeros((2, 2, 1)), v).unwrap();
    assert!(broken.has_non_finite());
}

#[test]
fn test_speed_colors_invert_log_speed() {
    // one step, speeds 1 and 10 and 3
    let v = Array3::from_shape_vec((1, 3, 2), vec![1.0, 0.0, 6.0, 8.0, 0.0, 3.0]).unwrap();
    let trajectory = Trajectory::from_parts(Array1::zeros(1), Array3::zeros((1, 3, 2)), v).unwrap();

    let colors = trajectory.speed_colors();
    assert_eq!(colors.shape(), &[1, 3]);
    // slowest maps to 1, fastest to 0
    assert_relative_eq!(colors[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(colors[[0, 1]], 0.0, epsilon = 1e-12);

    let low = (1.0f64 + 1.0 + 1e-15).ln();
    let high = (10.0f64 + 1.0 + 1e-15).ln();
    let mid = (3.0f64 + 1.0 + 1e-15).ln();
    assert_relative_eq!(colors[[0, 2]], 1.0 - (mid - low) / (high - low), epsilon = 1e-12);
}

#[test]
fn test_speed_colors_uniform_speed_is_zero() {
    let v = Array3::from_elem((4, 2, 3), 2.0);
    let trajectory = Trajectory::from_parts(Array1::zeros(4), Array3::zeros((4, 2, 3)), v).unwrap();
    assert!(trajectory.speed_colors().iter().all(|&c| c == 0.0));
}

#[test]
fn test_speed_colors_empty_trajectory() {
    let trajectory =
        Trajectory::from_parts(Array1::zeros(3), Array3::zeros((3, 0, 2)), Array3::zeros((3, 0, 2)))
            .unwrap();
    assert_eq!(trajectory.speed_colors().shape(), &[3, 0]);
}
