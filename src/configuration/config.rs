//! Configuration types for loading and saving simulation settings as YAML.
//!
//! A settings file describes one run:
//!
//! - [`SimulationConfig`] – duration, step count and how to build the scenario
//! - [`RandomConfig`]     – sampling bounds for randomized scenarios
//! - [`OutputConfig`]     – what to export after the run, and where
//!
//! # YAML format
//! Every field is optional; missing fields take the defaults shown here.
//!
//! ```yaml
//! years: 1.0              # simulated duration, years of 365 days
//! steps: 250              # fixed number of integration steps
//! mode: preset            # "preset" or "randomize"
//! preset: Sol             # "Sol", "Sol (moons)"
//! scale: 1.0e12           # plot half-width in metres
//!
//! random:
//!   count: 5              # bodies besides the central star
//!   m_min: 1.0e21
//!   m_max: 1.0e23
//!   position: 1.0e11      # positions sampled in [-position, position]
//!   velocity: 1.0e5       # velocities sampled in [-velocity, velocity]
//!   star_mass: 2.0e30
//!   seed: 42              # omit for a fresh scenario every run
//!
//! # initial_conditions: my_system.csv   # table file, overrides preset
//!
//! output:
//!   directory: data
//!   filename: orbits
//!   plot: false
//!   plot_save: false
//!   animate: false
//!   animate_save: false
//!   raw_data: false
//! ```
//!
//! [`SimulationConfig::build_scenario`] maps this into a runtime
//! [`Scenario`] and [`SimulationConfig::parameters`] into [`Parameters`].

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::simulation::error::SimError;
use crate::simulation::params::{years_to_seconds, Parameters};
use crate::simulation::states::Scenario;

/// How the initial bodies are produced
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioMode {
    #[serde(rename = "randomize")] // central star plus randomly sampled bodies
    Randomize,

    #[serde(rename = "preset")] // fixed table looked up by preset name
    Preset,
}

/// Sampling bounds for a randomized scenario
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RandomConfig {
    pub count: usize,      // number of bodies besides the star
    pub m_min: f64,        // kg
    pub m_max: f64,        // kg
    pub position: f64,     // m, per-axis bound
    pub velocity: f64,     // m/s, per-axis bound
    pub star_mass: f64,    // kg
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>, // deterministic seed to make runs reproducible
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            count: 5,
            m_min: 1.0e21,
            m_max: 1.0e23,
            position: 1.0e11,
            velocity: 1.0e5,
            star_mass: 2.0e30,
            seed: None,
        }
    }
}

impl RandomConfig {
    /// Seeded rng when `seed` is set, OS entropy otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Post-run exports. `*_save` picks saving to a file over showing on screen
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub filename: String, // stem for plot/animation files
    pub plot: bool,
    pub plot_save: bool,
    pub animate: bool,
    pub animate_save: bool,
    pub raw_data: bool, // one trajectory file per body
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            filename: "orbits".to_string(),
            plot: false,
            plot_save: false,
            animate: false,
            animate_save: false,
            raw_data: false,
        }
    }
}

/// Top-level settings for one run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub years: f64,
    pub steps: usize,
    pub mode: ScenarioMode,
    pub preset: String,
    pub scale: f64,
    pub random: RandomConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_conditions: Option<PathBuf>,
    pub output: OutputConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            years: 1.0,
            steps: 250,
            mode: ScenarioMode::Preset,
            preset: "Sol".to_string(),
            scale: Scenario::DEFAULT_SCALE,
            random: RandomConfig::default(),
            initial_conditions: None,
            output: OutputConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Read settings from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening settings {}", path.display()))?;
        let reader = BufReader::new(file);
        let cfg = serde_yaml::from_reader(reader).with_context(|| format!("parsing settings {}", path.display()))?;
        Ok(cfg)
    }

    /// Write settings to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating settings {}", path.display()))?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn parameters(&self) -> Parameters {
        Parameters::new(years_to_seconds(self.years), self.steps)
    }

    /// Build the initial scenario selected by `mode`.
    /// A table file in `initial_conditions` takes precedence over the preset name.
    pub fn build_scenario(&self) -> Result<Scenario, SimError> {
        match self.mode {
            ScenarioMode::Randomize => {
                let mut rng = self.random.rng();
                Scenario::randomized(&self.random, self.scale, &mut rng)
            }
            ScenarioMode::Preset => match &self.initial_conditions {
                Some(path) => Scenario::from_table_file(path, self.scale),
                None => Scenario::preset(&self.preset, self.scale),
            },
        }
    }
}
