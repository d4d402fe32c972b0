//! Error types for system construction, backends, runs and persistence.

use std::fmt;
use std::io;

/// Malformed arrays passed when building or extending a system.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An input array has the wrong number of axes.
    Rank {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// Positions and velocities disagree in shape.
    StateShape {
        positions: (usize, usize),
        velocities: (usize, usize),
    },
    /// A per-particle array does not have one entry per particle.
    Length {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// Positions have zero spatial components.
    ZeroDimension,
    /// A particle being appended has the wrong number of components.
    ParticleDimension { expected: usize, found: usize },
    /// Trajectory position and velocity buffers disagree in shape.
    TrajectoryShape {
        positions: Vec<usize>,
        velocities: Vec<usize>,
    },
    /// A sampling distribution was given an invalid spread.
    Distribution { name: &'static str, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Rank {
                name,
                expected,
                found,
            } => write!(f, "<{}> must be {}-D, got {}-D", name, expected, found),
            ValidationError::StateShape {
                positions,
                velocities,
            } => write!(
                f,
                "<positions> {:?} and <velocities> {:?} must have the same shape (N, p)",
                positions, velocities
            ),
            ValidationError::Length {
                name,
                expected,
                found,
            } => write!(f, "<{}> must have length N = {}, got {}", name, expected, found),
            ValidationError::ZeroDimension => {
                write!(f, "positions must have at least one spatial component")
            }
            ValidationError::ParticleDimension { expected, found } => write!(
                f,
                "particle has {} components but the system is {}-D",
                found, expected
            ),
            ValidationError::TrajectoryShape {
                positions,
                velocities,
            } => write!(
                f,
                "trajectory <x> {:?} and <v> {:?} must have the same shape (steps, N, p)",
                positions, velocities
            ),
            ValidationError::Distribution { name, reason } => {
                write!(f, "invalid distribution for <{}>: {}", name, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failures of the array-compute executors.
#[derive(Debug)]
pub enum BackendError {
    /// The accelerator was requested but no compatible adapter exists.
    Unavailable,
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// Failed to map a read-back buffer.
    BufferMapping(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unavailable => write!(f, "GPU backend requested but no accelerator is available"),
            BackendError::NoAdapter(e) => write!(f, "No compatible GPU adapter found: {}", e),
            BackendError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            BackendError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::NoAdapter(e) => Some(e),
            BackendError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::RequestAdapterError> for BackendError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        BackendError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for BackendError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        BackendError::DeviceCreation(e)
    }
}

/// Errors returned by [`ParticleSystem::solve`](crate::ParticleSystem::solve).
#[derive(Debug)]
pub enum SimulationError {
    /// Total time or timestep is not a positive finite number.
    InvalidTimestep { total_time: f64, dt: f64 },
    Validation(ValidationError),
    Backend(BackendError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidTimestep { total_time, dt } => write!(
                f,
                "total time and timestep must be positive and finite (T = {}, dt = {})",
                total_time, dt
            ),
            SimulationError::Validation(e) => write!(f, "{}", e),
            SimulationError::Backend(e) => write!(f, "backend failure: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Validation(e) => Some(e),
            SimulationError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for SimulationError {
    fn from(e: ValidationError) -> Self {
        SimulationError::Validation(e)
    }
}

impl From<BackendError> for SimulationError {
    fn from(e: BackendError) -> Self {
        SimulationError::Backend(e)
    }
}

/// Errors that can occur while saving or loading a run.
#[derive(Debug)]
pub enum PersistenceError {
    /// The system has no completed run to save.
    NoRun,
    /// Failed to read or write a file.
    Io(io::Error),
    /// A file exists but its contents are not understood.
    Format { file: String, reason: String },
    /// Saved arrays do not form a valid system.
    Validation(ValidationError),
}

impl PersistenceError {
    pub(crate) fn format(file: impl Into<String>, reason: impl Into<String>) -> Self {
        PersistenceError::Format {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::NoRun => write!(f, "nothing to save: the system has not been solved"),
            PersistenceError::Io(e) => write!(f, "I/O error: {}", e),
            PersistenceError::Format { file, reason } => write!(f, "malformed {}: {}", file, reason),
            PersistenceError::Validation(e) => write!(f, "saved arrays are inconsistent: {}", e),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PersistenceError {
    fn from(e: io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

impl From<ValidationError> for PersistenceError {
    fn from(e: ValidationError) -> Self {
        PersistenceError::Validation(e)
    }
}
