//! Simulation driver
//!
//! Runs a fixed integer number of semi-implicit Euler steps over a scenario,
//! reporting progress to an observer and checking for cancellation between
//! steps

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use log::{debug, info};

use crate::simulation::error::SimError;
use crate::simulation::forces::ForceSet;
use crate::simulation::integrator::semi_implicit_euler;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, Scenario};

/// Receives run progress as a fraction in [0, 1], non-decreasing
pub trait ProgressObserver {
    fn report(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> ProgressObserver for F {
    fn report(&mut self, fraction: f64) {
        self(fraction)
    }
}

// fire-and-forget: a dropped receiver does not affect the run
impl ProgressObserver for Sender<f64> {
    fn report(&mut self, fraction: f64) {
        let _ = self.send(fraction);
    }
}

/// Ignores progress
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn report(&mut self, _fraction: f64) {}
}

/// Logs progress every 10%
#[derive(Default)]
pub struct LogProgress {
    last_decile: u32,
}

impl ProgressObserver for LogProgress {
    fn report(&mut self, fraction: f64) {
        let decile = (fraction * 10.0).floor() as u32;
        if decile > self.last_decile {
            self.last_decile = decile;
            info!("progress {:3.0}%", fraction * 100.0);
        }
    }
}

/// Checked between steps; `true` stops the run
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<F: Fn() -> bool> Cancellation for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Never cancels
pub struct Never;

impl Cancellation for Never {
    fn is_cancelled(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Cancelled,
}

/// Bodies handed back after a run, each with `steps_completed + 1` samples
#[derive(Debug, Clone)]
pub struct Run {
    pub status: RunStatus,
    pub steps_completed: usize,
    pub bodies: Vec<Body>,
}

impl Run {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

pub struct Engine {
    parameters: Parameters,
    forces: ForceSet,
}

impl Engine {
    /// Driver with Newtonian gravity using `parameters.g`
    pub fn new(parameters: Parameters) -> Result<Self, SimError> {
        let forces = ForceSet::gravity(parameters.g);
        Self::with_forces(parameters, forces)
    }

    pub fn with_forces(parameters: Parameters, forces: ForceSet) -> Result<Self, SimError> {
        parameters.validate()?;
        Ok(Self { parameters, forces })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Run to completion without progress or cancellation
    pub fn run_to_end(&self, scenario: Scenario) -> Result<Vec<Body>, SimError> {
        let run = self.run(scenario, &mut NoProgress, &Never)?;
        Ok(run.bodies)
    }

    /// Integrate `scenario` for exactly `parameters.steps` steps of
    /// `dt = t_end / steps`.
    ///
    /// Progress is reported whenever the completed per-mille increases, so
    /// the observer sees at most ~1000 calls and always ends on 1.0 for a
    /// completed run. `cancel` is checked before every step; a cancelled run
    /// keeps every sample recorded so far.
    pub fn run<P, C>(&self, scenario: Scenario, observer: &mut P, cancel: &C) -> Result<Run, SimError>
    where
        P: ProgressObserver + ?Sized,
        C: Cancellation + ?Sized,
    {
        let steps = self.parameters.steps;
        let dt = self.parameters.dt();
        let mut bodies = scenario.bodies;

        debug!("running {} bodies for {} steps, dt = {} s", bodies.len(), steps, dt);

        let mut forces_buf = vec![NVec2::zeros(); bodies.len()];
        let mut last_permille = 0;

        for step in 1..=steps {
            if cancel.is_cancelled() {
                info!("run cancelled after {} of {} steps", step - 1, steps);
                return Ok(Run {
                    status: RunStatus::Cancelled,
                    steps_completed: step - 1,
                    bodies,
                });
            }

            semi_implicit_euler(&mut bodies, &self.forces, &mut forces_buf, dt, step)?;

            let permille = step * 1000 / steps;
            if permille > last_permille {
                last_permille = permille;
                observer.report(step as f64 / steps as f64);
            }
        }

        Ok(Run {
            status: RunStatus::Completed,
            steps_completed: steps,
            bodies,
        })
    }
}
