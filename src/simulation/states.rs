//! Core state types for the gravity simulation
//!
//! Defines the 2D point-mass `Body` with its recorded trajectory and the
//! `Scenario` bundle handed to the driver:
//! - `Body` carries mass, position, velocity (`NVec2`) and its samples
//! - `Scenario` holds the bodies at t = 0 plus a plot scale hint

use nalgebra::Vector2;

use crate::simulation::error::{InvalidBodyReason, SimError};

pub type NVec2 = Vector2<f64>;

/// One recorded state of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: NVec2, // m
    pub velocity: NVec2, // m/s
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    pub mass: f64, // kg
    pub position: NVec2, // m
    pub velocity: NVec2, // m/s
    trajectory: Vec<Sample>, // append-only, index 0 is the initial state
}

impl Body {
    /// Build a body and seed its trajectory with the initial state.
    /// Fails with `InvalidBody` when the mass is not a positive finite number
    /// or the initial state is not finite.
    pub fn new(name: impl Into<String>, mass: f64, position: NVec2, velocity: NVec2) -> Result<Self, SimError> {
        let name = name.into();
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SimError::InvalidBody {
                bodies: vec![name],
                reason: InvalidBodyReason::NonPositiveMass(mass),
            });
        }
        if !(is_finite(&position) && is_finite(&velocity)) {
            return Err(SimError::InvalidBody {
                bodies: vec![name],
                reason: InvalidBodyReason::NonFiniteState,
            });
        }

        Ok(Self {
            name,
            mass,
            position,
            velocity,
            trajectory: vec![Sample { position, velocity }],
        })
    }

    pub fn trajectory(&self) -> &[Sample] {
        &self.trajectory
    }

    /// Momentum m * v of the current state
    pub fn momentum(&self) -> NVec2 {
        self.mass * self.velocity
    }

    /// Record the current state as the next trajectory sample
    pub(crate) fn record(&mut self) {
        self.trajectory.push(Sample {
            position: self.position,
            velocity: self.velocity,
        });
    }
}

pub(crate) fn is_finite(v: &NVec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Initial set of bodies plus the rendering bounds hint (m)
#[derive(Debug, Clone)]
pub struct Scenario {
    pub bodies: Vec<Body>,
    pub scale: f64,
}

impl Scenario {
    /// Default plot half-width, wide enough for the outer solar system
    pub const DEFAULT_SCALE: f64 = 1.0e12;

    /// Wrap a body list after checking the scenario invariants:
    /// at least one body, and no two bodies at the same position.
    /// Masses are already checked by `Body::new`.
    pub fn new(bodies: Vec<Body>, scale: f64) -> Result<Self, SimError> {
        if bodies.is_empty() {
            return Err(SimError::EmptyScenario);
        }

        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                if bodies[i].position == bodies[j].position {
                    return Err(SimError::InvalidBody {
                        bodies: vec![bodies[i].name.clone(), bodies[j].name.clone()],
                        reason: InvalidBodyReason::Coincident,
                    });
                }
            }
        }

        Ok(Self { bodies, scale })
    }

    pub fn total_momentum(&self) -> NVec2 {
        total_momentum(&self.bodies)
    }
}

/// Sum of m * v over all bodies
pub fn total_momentum(bodies: &[Body]) -> NVec2 {
    bodies.iter().map(Body::momentum).sum()
}
