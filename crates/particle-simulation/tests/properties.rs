//! End-to-end properties of the integrator on the CPU backend

use approx::assert_relative_eq;
use ndarray::{array, Array1, Array2};
use particle_physics::{pairwise_potential_energy, Particle, PhysicsParams, G, K_ELECTRIC};
use particle_simulation::{persistence, plan_steps, CpuBackend, ParticleSystem, RunConfig};

fn max_energy_drift(system: &ParticleSystem, physics: &PhysicsParams) -> f64 {
    let trajectory = system.trajectory().unwrap();
    let energy = |step: usize| {
        let snapshot = system.snapshot_at(step).unwrap();
        system.kinetic_energy(trajectory.velocities_at(step))
            + pairwise_potential_energy(&snapshot, physics)
    };
    let initial = energy(0);
    (0..trajectory.steps())
        .map(|step| (energy(step) - initial).abs())
        .fold(0.0, f64::max)
}

fn binary(velocity: f64) -> ParticleSystem {
    let mass = 1e10;
    ParticleSystem::new(
        array![[-5.0, 0.0], [5.0, 0.0]],
        array![[0.0, -velocity], [0.0, velocity]],
        array![mass, mass],
        array![0.0, 0.0],
        array![0.1, 0.1],
    )
    .unwrap()
}

#[test]
fn momentum_is_conserved_when_coulomb_cancels_gravity() {
    let mass = 1e6;
    let charge = (G * mass * mass / K_ELECTRIC).sqrt();
    let mut system = ParticleSystem::new(
        array![[0.0, 0.0], [3.0, 1.0]],
        array![[1.0, 0.5], [-2.0, 0.25]],
        array![mass, mass],
        array![charge, -charge],
        array![0.1, 0.1],
    )
    .unwrap();

    let config = RunConfig::new(2.0).with_dt(0.01).with_collision(false);
    system.solve_with(&config, &CpuBackend).unwrap();

    let initial = system.total_momentum(system.velocities());
    let trajectory = system.trajectory().unwrap();
    for step in 0..trajectory.steps() {
        let momentum = system.total_momentum(trajectory.velocities_at(step));
        for d in 0..2 {
            assert_relative_eq!(momentum[d], initial[d], epsilon = 1e-6, max_relative = 1e-9);
        }
    }
}

#[test]
fn two_body_energy_error_is_second_order() {
    let physics = PhysicsParams::default();

    let mut coarse = binary(1.7);
    coarse
        .solve_with(&RunConfig::new(10.0).with_dt(0.1).with_collision(false), &CpuBackend)
        .unwrap();
    let mut fine = binary(1.7);
    fine.solve_with(&RunConfig::new(10.0).with_dt(0.05).with_collision(false), &CpuBackend)
        .unwrap();

    let coarse_drift = max_energy_drift(&coarse, &physics);
    let fine_drift = max_energy_drift(&fine, &physics);
    let scale = coarse.kinetic_energy(coarse.velocities());

    assert!(coarse_drift < 1e-2 * scale, "drift {:e} vs energy {:e}", coarse_drift, scale);
    // halving dt cuts the error by about four
    assert!(
        fine_drift < coarse_drift / 3.0,
        "coarse {:e}, fine {:e}",
        coarse_drift,
        fine_drift
    );
}

#[test]
fn single_particle_feels_no_acceleration() {
    let mut system = ParticleSystem::new(
        array![[1.0, -2.0, 3.0]],
        Array2::zeros((1, 3)),
        array![5e9],
        array![1e-3],
        array![10.0],
    )
    .unwrap();
    system
        .solve_with(&RunConfig::new(1.0).with_dt(0.1), &CpuBackend)
        .unwrap();

    let trajectory = system.trajectory().unwrap();
    for step in 0..trajectory.steps() {
        assert_eq!(trajectory.positions_at(step), system.positions());
        assert!(trajectory.velocities_at(step).iter().all(|&v| v == 0.0));
    }
}

#[test]
fn overlapping_particles_only_collide_when_enabled() {
    let overlapping = || {
        ParticleSystem::new(
            array![[0.0, 0.0], [1.0, 0.0]],
            array![[1.0, 0.0], [-1.0, 0.0]],
            array![1.0, 1.0],
            array![0.0, 0.0],
            array![1.0, 1.0],
        )
        .unwrap()
    };
    let config = RunConfig::new(0.02).with_dt(0.01);

    let mut with = overlapping();
    with.solve_with(&config.clone().with_collision(true), &CpuBackend)
        .unwrap();
    let mut without = overlapping();
    without
        .solve_with(&config.with_collision(false), &CpuBackend)
        .unwrap();

    let v_with = with.trajectory().unwrap().velocities_at(1).to_owned();
    let v_without = without.trajectory().unwrap().velocities_at(1).to_owned();

    // gravity between unit masses is negligible
    assert_relative_eq!(v_without[[0, 0]], 1.0, epsilon = 1e-8);
    assert_relative_eq!(v_without[[1, 0]], -1.0, epsilon = 1e-8);
    // the collision term pushes the pair apart
    assert!(v_with[[0, 0]] < v_without[[0, 0]] - 0.25, "{}", v_with);
    assert!(v_with[[1, 0]] > v_without[[1, 0]] + 0.25, "{}", v_with);
    assert_relative_eq!(v_with[[0, 0]], -v_with[[1, 0]], epsilon = 1e-12);
}

#[test]
fn add_after_run_resets_run_state() {
    let mut system = binary(1.0);
    system
        .solve_with(&RunConfig::new(1.0).with_dt(0.1), &CpuBackend)
        .unwrap();
    let before = system.len();

    system
        .add(Particle::new(vec![0.0, 20.0], vec![0.0, 0.0], 3.0, -1e-6, 0.5))
        .unwrap();

    assert_eq!(system.len(), before + 1);
    assert_eq!(system.positions().row(before), array![0.0, 20.0]);
    assert_eq!(system.masses()[before], 3.0);
    assert_eq!(system.charges()[before], -1e-6);
    assert_eq!(system.radii()[before], 0.5);
    assert!(system.run().is_none());
    assert!(system.trajectory().is_none());
}

#[test]
fn persisted_run_reconstructs_identically() {
    let dir = std::env::temp_dir().join(format!("particles-properties-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut system = binary(1.2);
    system
        .solve_with(&RunConfig::new(0.7).with_dt(0.03), &CpuBackend)
        .unwrap();
    let written = persistence::save(&system, &dir).unwrap();
    let loaded = persistence::load(&written).unwrap();

    let original = system.run().unwrap();
    let restored = loaded.run().unwrap();
    assert_eq!(loaded.len(), system.len());
    assert_eq!(loaded.dimension(), system.dimension());
    assert_eq!(loaded.masses(), system.masses());
    assert_eq!(loaded.charges(), system.charges());
    assert_eq!(loaded.radii(), system.radii());
    assert_eq!(restored.dt.to_bits(), original.dt.to_bits());
    assert_eq!(restored.total_time.to_bits(), original.total_time.to_bits());
    assert_eq!(restored.collision, original.collision);
    assert_eq!(restored.backend, original.backend);
    assert_eq!(loaded.positions(), original.trajectory.positions_at(0));
    assert_eq!(loaded.velocities(), original.trajectory.velocities_at(0));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn step_count_covers_requested_time() {
    let cases = [
        (1.0, 0.1),
        (1.0, 0.3),
        (2.5, 0.7),
        (10.0, 0.001),
        (0.05, 1.0),
        (123.456, 0.789),
    ];
    for (total_time, dt) in cases {
        let plan = plan_steps(total_time, Some(dt)).unwrap();
        assert!(plan.steps as f64 * dt >= total_time);
        assert!((plan.steps - 1) as f64 * dt < total_time);
        assert_eq!(plan.total_time, plan.steps as f64 * dt);

        let mut system = ParticleSystem::new(
            array![[0.0]],
            array![[1.0]],
            Array1::ones(1),
            Array1::zeros(1),
            Array1::ones(1),
        )
        .unwrap();
        if plan.steps <= 2_000 {
            let trajectory = system
                .solve_with(&RunConfig::new(total_time).with_dt(dt), &CpuBackend)
                .unwrap();
            assert_eq!(trajectory.steps(), plan.steps);
        }
    }
}
