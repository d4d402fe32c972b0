//! N-body gravity, Coulomb and collision simulation driver
//!
//! Builds an initial state, integrates it and optionally saves the run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use particle_physics::{ForceLaw, PhysicsParams};
use particle_simulation::initial::{self, RandomConfig};
use particle_simulation::{persistence, BackendChoice, ParticleSystem, RunConfig};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    init: Init,

    /// Total simulated time T
    #[arg(short = 'T', long, default_value_t = 10.0, global = true)]
    time: f64,

    /// Timestep; defaults to T / 500
    #[arg(long, global = true)]
    dt: Option<f64>,

    /// Disable the elastic-collision term
    #[arg(long, global = true)]
    no_collision: bool,

    #[arg(long, value_enum, default_value_t = BackendArg::Auto, global = true)]
    backend: BackendArg,

    #[arg(long, value_enum, default_value_t = LawArg::Unit, global = true)]
    law: LawArg,

    /// Softening length added to every pair distance
    #[arg(long, default_value_t = 0.0, global = true)]
    softening: f64,

    /// Calibration coefficient scaling the collision term
    #[arg(long, default_value_t = particle_physics::COLLISION_COEFFICIENT, global = true)]
    collision_coefficient: f64,

    /// Save directory; a name ending in `_` is numbered automatically
    #[arg(long, global = true)]
    save: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Init {
    /// Particles at rest on a grid with alternating charges
    Lattice {
        /// Grid points per axis, e.g. `4 4` for a 2-D 4x4 grid
        #[arg(required = true)]
        shape: Vec<usize>,
        #[arg(long, default_value_t = 1e7)]
        mass: f64,
        #[arg(long, default_value_t = 1e-5)]
        charge: f64,
        /// Gap between neighbouring particle surfaces
        #[arg(long, default_value_t = 1.0)]
        distance: f64,
        #[arg(long, default_value_t = 1.0)]
        radius: f64,
    },
    /// Normally distributed particles
    Random {
        #[arg(short = 'n', long, default_value_t = 64)]
        count: usize,
        #[arg(short = 'p', long, default_value_t = 2)]
        dimension: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Re-run a saved system with new run parameters
    Load { dir: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Auto,
    Cpu,
    Gpu,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LawArg {
    Unit,
    InverseSquare,
}

impl From<BackendArg> for BackendChoice {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendChoice::Auto,
            BackendArg::Cpu => BackendChoice::Cpu,
            BackendArg::Gpu => BackendChoice::Gpu,
        }
    }
}

impl From<LawArg> for ForceLaw {
    fn from(arg: LawArg) -> Self {
        match arg {
            LawArg::Unit => ForceLaw::UnitVector,
            LawArg::InverseSquare => ForceLaw::InverseSquare,
        }
    }
}

fn build_system(init: &Init) -> Result<ParticleSystem> {
    let system = match init {
        Init::Lattice {
            shape,
            mass,
            charge,
            distance,
            radius,
        } => initial::lattice(shape, *mass, *charge, *distance, *radius)?,
        Init::Random {
            count,
            dimension,
            seed,
        } => initial::random(&RandomConfig::new(*count, *dimension), *seed)?,
        Init::Load { dir } => persistence::load(dir)
            .with_context(|| format!("failed to load {}", dir.display()))?,
    };
    Ok(system)
}

fn main() -> Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut system = build_system(&args.init)?;
    log::info!(
        "Built {} particles in {} dimension(s)",
        system.len(),
        system.dimension()
    );

    let physics = PhysicsParams::default()
        .with_law(args.law.into())
        .with_softening(args.softening)
        .with_collision_coefficient(args.collision_coefficient);
    let mut config = RunConfig::new(args.time)
        .with_collision(!args.no_collision)
        .with_backend(args.backend.into())
        .with_physics(physics)
        .with_progress(true);
    if let Some(dt) = args.dt {
        config = config.with_dt(dt);
    }

    let trajectory = system.solve(&config).context("simulation failed")?;
    let last = trajectory.steps().saturating_sub(1);
    let final_velocities = trajectory.velocities_at(last).to_owned();

    log::info!(
        "Kinetic energy: {:e} -> {:e}",
        system.kinetic_energy(system.velocities()),
        system.kinetic_energy(final_velocities.view())
    );
    log::info!(
        "Total momentum: {} -> {}",
        system.total_momentum(system.velocities()),
        system.total_momentum(final_velocities.view())
    );

    if let Some(dir) = &args.save {
        let written = persistence::save(&system, dir)
            .with_context(|| format!("failed to save to {}", dir.display()))?;
        println!("{}", written.display());
    }

    Ok(())
}
