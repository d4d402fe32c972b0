//! Physics parameters shared by the force and collision kernels

use crate::constants::{COLLISION_COEFFICIENT, G, K_ELECTRIC};

/// Distance dependence of the pairwise gravity/Coulomb term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceLaw {
    /// `coefficient * d / |d|`: the coefficient times the unit separation
    #[default]
    UnitVector,
    /// `coefficient * d / |d|³`: Newtonian inverse-square falloff
    InverseSquare,
}

impl ForceLaw {
    /// Power of the distance the separation vector is divided by
    pub fn distance_power(self) -> i32 {
        match self {
            ForceLaw::UnitVector => 1,
            ForceLaw::InverseSquare => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Gravitational constant
    pub g: f64,
    /// Coulomb constant
    pub k_electric: f64,
    /// Collision calibration coefficient (cf)
    pub collision_coefficient: f64,
    /// Softening length added in quadrature to every pair distance.
    /// Zero leaves coincident particles undefined.
    pub softening: f64,
    pub law: ForceLaw,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            g: G,
            k_electric: K_ELECTRIC,
            collision_coefficient: COLLISION_COEFFICIENT,
            softening: 0.0,
            law: ForceLaw::UnitVector,
        }
    }
}

impl PhysicsParams {
    pub fn with_law(mut self, law: ForceLaw) -> Self {
        self.law = law;
        self
    }

    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self
    }

    pub fn with_collision_coefficient(mut self, cf: f64) -> Self {
        self.collision_coefficient = cf;
        self
    }

    /// Combined gravity + Coulomb coefficient acting on particle `i` from `j`
    #[inline]
    pub fn pair_coefficient(&self, m_i: f64, q_i: f64, m_j: f64, q_j: f64) -> f64 {
        self.g * m_j + self.k_electric * q_i * q_j / m_i
    }

    /// Pair distance with softening applied
    #[inline]
    pub fn softened_distance(&self, squared_distance: f64) -> f64 {
        (squared_distance + self.softening * self.softening).sqrt()
    }
}
