//! Force contributors for the gravity engine
//!
//! Defines the pairwise Newtonian force, the `ForceLaw` trait and the
//! `ForceSet` that sums every registered law into one net force per body

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::simulation::error::{InvalidBodyReason, SimError};
use crate::simulation::params::G;
use crate::simulation::states::{Body, NVec2};

/// Force exerted by `b` on `a`:
///   F = G * m_a * m_b * (x_b - x_a) / |x_b - x_a|^3
///
/// Coincident bodies have no defined force and are reported as
/// `InvalidBody` instead of producing inf/NaN.
pub fn force_between(a: &Body, b: &Body, g: f64) -> Result<NVec2, SimError> {
    // r points from a to b, so a is pulled along +r
    let r = b.position - a.position;
    let d2 = r.dot(&r);
    if d2 == 0.0 {
        return Err(SimError::InvalidBody {
            bodies: vec![a.name.clone(), b.name.clone()],
            reason: InvalidBodyReason::Coincident,
        });
    }

    let inv_d = d2.sqrt().recip();
    let inv_d3 = inv_d * inv_d * inv_d;

    // m_a * m_b first so that force_between(b, a) == -force_between(a, b) exactly
    Ok(g * (a.mass * b.mass) * inv_d3 * r)
}

/// Trait for force sources operating on a read-only body slice.
/// Implementations add their contribution into `out[i]` for each body
pub trait ForceLaw {
    fn accumulate(&self, bodies: &[Body], out: &mut [NVec2]) -> Result<(), SimError>;
}

/// Collection of force terms; their contributions are summed into a single
/// net force per body
pub struct ForceSet {
    terms: Vec<Box<dyn ForceLaw + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Newtonian gravity with the given constant, nothing else
    pub fn gravity(g: f64) -> Self {
        Self::new().with(NewtonianGravity { g })
    }

    /// Add a force term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: ForceLaw + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute net forces for all bodies
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_forces(&self, bodies: &[Body], out: &mut [NVec2]) -> Result<(), SimError> {
        for f in out.iter_mut() {
            *f = NVec2::zeros();
        }
        for term in &self.terms {
            term.accumulate(bodies, out)?;
        }
        Ok(())
    }
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::gravity(G)
    }
}

/// Direct-sum Newtonian gravity, no softening
pub struct NewtonianGravity {
    pub g: f64,
}

impl NewtonianGravity {
    /// Net force on body `i` from every other body, summed in index order
    fn net_force_on(&self, i: usize, bodies: &[Body]) -> Result<NVec2, SimError> {
        let bi = &bodies[i];
        let mut total = NVec2::zeros();
        for (j, bj) in bodies.iter().enumerate() {
            if i != j {
                total += force_between(bi, bj, self.g)?;
            }
        }
        Ok(total)
    }
}

impl ForceLaw for NewtonianGravity {
    #[cfg(not(feature = "parallel"))]
    fn accumulate(&self, bodies: &[Body], out: &mut [NVec2]) -> Result<(), SimError> {
        for (i, f) in out.iter_mut().enumerate() {
            *f += self.net_force_on(i, bodies)?;
        }
        Ok(())
    }

    // Outer index split across threads; each body's sum keeps the same order,
    // so the result matches the sequential path bit for bit
    #[cfg(feature = "parallel")]
    fn accumulate(&self, bodies: &[Body], out: &mut [NVec2]) -> Result<(), SimError> {
        out.par_iter_mut().enumerate().try_for_each(|(i, f)| {
            *f += self.net_force_on(i, bodies)?;
            Ok(())
        })
    }
}
