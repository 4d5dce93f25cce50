//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - total simulated time and the integer step count,
//! - gravitational constant `g`

use crate::simulation::error::SimError;

/// Gravitational constant (m^3 kg^-1 s^-2)
pub const G: f64 = 6.67408e-11;

/// Seconds in a year of 365 days
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0;

pub fn years_to_seconds(years: f64) -> f64 {
    years * SECONDS_PER_YEAR
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub t_end: f64, // total simulated time (s)
    pub steps: usize, // number of fixed steps
    pub g: f64, // gravitational constant
}

impl Parameters {
    pub fn new(t_end: f64, steps: usize) -> Self {
        Self { t_end, steps, g: G }
    }

    /// Check that a run with these settings is well defined
    pub fn validate(&self) -> Result<(), SimError> {
        if self.steps == 0 {
            return Err(SimError::InvalidParameters("step count must be at least 1".into()));
        }
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(SimError::InvalidParameters(format!(
                "duration must be positive and finite, got {}",
                self.t_end
            )));
        }
        if !(self.g.is_finite() && self.g > 0.0) {
            return Err(SimError::InvalidParameters(format!(
                "gravitational constant must be positive, got {}",
                self.g
            )));
        }
        Ok(())
    }

    /// Fixed step size dt = t_end / steps
    pub fn dt(&self) -> f64 {
        self.t_end / self.steps as f64
    }
}
