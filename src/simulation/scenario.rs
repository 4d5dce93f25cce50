//! Build fully-initialized scenarios
//!
//! Two ways to get the bodies at t = 0:
//! - randomized: a central star plus bodies sampled inside configured bounds
//! - preset/table: rows parsed from an initial-condition table
//!
//! Every builder ends in `Scenario::new`, which enforces the scenario
//! invariants before the driver ever sees the bodies

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use rand::Rng;

use crate::configuration::config::RandomConfig;
use crate::simulation::error::SimError;
use crate::simulation::presets::{parse_table, Preset};
use crate::simulation::states::{Body, NVec2, Scenario};

/// Upper bound on `RandomConfig::count`; the direct sum is O(n^2) per step
pub const MAX_RANDOM_BODIES: usize = 100_000;

impl Scenario {
    /// Star at the origin plus `cfg.count` bodies with uniformly sampled mass,
    /// position (per axis) and velocity (per axis)
    pub fn randomized<R: Rng + ?Sized>(cfg: &RandomConfig, scale: f64, rng: &mut R) -> Result<Self, SimError> {
        if !(cfg.m_min > 0.0 && cfg.m_min <= cfg.m_max && cfg.m_max.is_finite()) {
            return Err(SimError::InvalidParameters(format!(
                "mass bounds must satisfy 0 < m_min <= m_max, got [{}, {}]",
                cfg.m_min, cfg.m_max
            )));
        }
        if !(cfg.position >= 0.0 && cfg.position.is_finite() && cfg.velocity >= 0.0 && cfg.velocity.is_finite()) {
            return Err(SimError::InvalidParameters(format!(
                "position/velocity bounds must be finite and non-negative, got {} / {}",
                cfg.position, cfg.velocity
            )));
        }

        if cfg.count > 0 && cfg.position == 0.0 {
            return Err(SimError::InvalidParameters(
                "position bound must be positive, every sampled body would sit on the star".into(),
            ));
        }
        if cfg.count > MAX_RANDOM_BODIES {
            return Err(SimError::InvalidParameters(format!(
                "at most {MAX_RANDOM_BODIES} random bodies are supported, got {}",
                cfg.count
            )));
        }

        let mut bodies = Vec::with_capacity(cfg.count + 1);
        bodies.push(Body::new("star", cfg.star_mass, NVec2::zeros(), NVec2::zeros())?);

        let (p, v) = (cfg.position, cfg.velocity);
        for i in 1..=cfg.count {
            let mass = rng.random_range(cfg.m_min..=cfg.m_max);
            let position = NVec2::new(rng.random_range(-p..=p), rng.random_range(-p..=p));
            let velocity = NVec2::new(rng.random_range(-v..=v), rng.random_range(-v..=v));
            bodies.push(Body::new(i.to_string(), mass, position, velocity)?);
        }

        debug!("randomized scenario with {} bodies", bodies.len());
        Self::new(bodies, scale)
    }

    /// Scenario from a named preset
    pub fn preset(name: &str, scale: f64) -> Result<Self, SimError> {
        let preset = Preset::from_name(name)?;
        let bodies = preset.bodies()?;
        debug!("preset '{}' with {} bodies", preset.name(), bodies.len());
        Self::new(bodies, scale)
    }

    /// Scenario from an initial-condition table on disk
    pub fn from_table_file(path: &Path, scale: f64) -> Result<Self, SimError> {
        let reader = BufReader::new(File::open(path)?);
        let bodies = parse_table(reader)?;
        debug!("loaded {} bodies from {}", bodies.len(), path.display());
        Self::new(bodies, scale)
    }
}
