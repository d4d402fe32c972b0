use ndarray::array;

use crate::particle::{sanitize_positive, Particle};

#[test]
fn test_sanitize_negative_is_absolute() {
    assert_eq!(sanitize_positive(-3.5), 3.5);
}

#[test]
fn test_sanitize_zero_maps_to_one() {
    assert_eq!(sanitize_positive(0.0), 1.0);
    assert_eq!(sanitize_positive(-0.0), 1.0);
}

#[test]
fn test_sanitize_positive_is_unchanged() {
    assert_eq!(sanitize_positive(2.0e7), 2.0e7);
}

#[test]
fn test_new_particle_sanitizes_mass_and_radius() {
    let p = Particle::new(array![1.0, 2.0, 3.0], array![0.0, 0.0, 0.0], -5.0, -1.0e-6, 0.0);

    assert_eq!(p.mass, 5.0);
    assert_eq!(p.radius, 1.0);
    // Charge keeps its sign
    assert_eq!(p.charge, -1.0e-6);
    assert_eq!(p.dimension(), 3);
}
