pub mod states;
pub mod error;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod presets;
pub mod scenario;
