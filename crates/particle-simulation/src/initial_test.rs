use ndarray::array;

use crate::error::ValidationError;
use crate::initial::{lattice, random, RandomConfig};

#[test]
fn test_lattice_positions_and_spacing() {
    let system = lattice(&[2, 2], 5.0, 1e-6, 1.0, 0.5).unwrap();
    // spacing = 2 * radius + distance = 2
    assert_eq!(
        system.positions(),
        array![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]]
    );
    assert!(system.velocities().iter().all(|&v| v == 0.0));
    assert!(system.masses().iter().all(|&m| m == 5.0));
    assert!(system.radii().iter().all(|&r| r == 0.5));
}

#[test]
fn test_lattice_alternates_charge_sign() {
    let system = lattice(&[3, 3], 1.0, -2e-6, 0.0, 1.0).unwrap();
    let q = system.charges();
    // checkerboard with the origin negative
    assert_eq!(q[0], -2e-6);
    assert_eq!(q[1], 2e-6);
    assert_eq!(q[3], 2e-6);
    assert_eq!(q[4], -2e-6);
    assert_eq!(q.iter().filter(|&&c| c < 0.0).count(), 5);
}

#[test]
fn test_lattice_in_three_dimensions() {
    let system = lattice(&[2, 1, 3], 1.0, 0.0, 1.0, 1.0).unwrap();
    assert_eq!(system.len(), 6);
    assert_eq!(system.dimension(), 3);
    assert_eq!(system.positions().row(1), array![0.0, 0.0, 3.0]);
    assert_eq!(system.positions().row(3), array![3.0, 0.0, 0.0]);
    assert_eq!(system.positions().row(5), array![3.0, 0.0, 6.0]);
}

#[test]
fn test_lattice_first_axis_varies_fastest() {
    let system = lattice(&[2, 3], 1.0, 1.0, 0.0, 0.5).unwrap();
    assert_eq!(
        system.positions(),
        array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [0.0, 2.0],
            [1.0, 2.0]
        ]
    );
    assert_eq!(system.charges(), array![-1.0, 1.0, 1.0, -1.0, -1.0, 1.0]);
}

#[test]
fn test_lattice_without_axes_is_rejected() {
    assert_eq!(
        lattice(&[], 1.0, 0.0, 1.0, 1.0).unwrap_err(),
        ValidationError::ZeroDimension
    );
}

#[test]
fn test_random_is_reproducible() {
    let config = RandomConfig::new(20, 3);
    let a = random(&config, 7).unwrap();
    let b = random(&config, 7).unwrap();
    let c = random(&config, 8).unwrap();

    assert_eq!(a.positions(), b.positions());
    assert_eq!(a.masses(), b.masses());
    assert_ne!(a.positions(), c.positions());
    assert_eq!(a.len(), 20);
    assert_eq!(a.dimension(), 3);
}

#[test]
fn test_random_masses_and_radii_are_positive() {
    let config = RandomConfig {
        mass: (0.0, 1.0),
        radius: (0.0, 1.0),
        ..RandomConfig::new(200, 2)
    };
    let system = random(&config, 1).unwrap();
    assert!(system.masses().iter().all(|&m| m > 0.0));
    assert!(system.radii().iter().all(|&r| r > 0.0));
}

#[test]
fn test_random_accepts_zero_spread() {
    let config = RandomConfig {
        velocity: (3.0, 0.0),
        ..RandomConfig::new(5, 2)
    };
    let system = random(&config, 3).unwrap();
    assert!(system.velocities().iter().all(|&v| v == 3.0));
}

#[test]
fn test_random_rejects_nan_spread() {
    let config = RandomConfig {
        mass: (1.0, f64::NAN),
        ..RandomConfig::new(4, 2)
    };
    assert!(matches!(
        random(&config, 0),
        Err(ValidationError::Distribution { name: "mass", .. })
    ));
}

#[test]
fn test_random_rejects_negative_spread() {
    let config = RandomConfig {
        velocity: (0.0, -1.0),
        ..RandomConfig::new(4, 2)
    };
    assert!(matches!(
        random(&config, 0),
        Err(ValidationError::Distribution { name: "velocity", .. })
    ));
}
