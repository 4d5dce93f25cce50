pub mod simulation;
pub mod configuration;
pub mod export;

pub use simulation::states::{Body, Sample, Scenario, NVec2, total_momentum};
pub use simulation::error::{SimError, InvalidBodyReason};
pub use simulation::params::{Parameters, G, years_to_seconds};
pub use simulation::forces::{force_between, ForceLaw, ForceSet, NewtonianGravity};
pub use simulation::integrator::semi_implicit_euler;
pub use simulation::presets::{parse_table, Preset};
pub use simulation::engine::{Engine, Run, RunStatus, ProgressObserver, LogProgress, NoProgress, Cancellation, Never};

pub use configuration::config::{SimulationConfig, RandomConfig, OutputConfig, ScenarioMode};

pub use export::{raw_data::write_raw_data, plot::{save_plot, save_animation}};
