//! Error kinds raised while building or running a simulation

use std::fmt;
use std::io;

/// Why a body (or pair of bodies) was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidBodyReason {
    NonPositiveMass(f64),
    NonFiniteState,
    Coincident, // zero separation
}

#[derive(Debug)]
pub enum SimError {
    InvalidBody {
        bodies: Vec<String>,
        reason: InvalidBodyReason,
    },
    UnknownPreset(String),
    UnsupportedPreset(String),
    MalformedPresetRow {
        row: usize, // 1-based, header excluded
        reason: String,
    },
    NumericalInstability {
        body: String,
        step: usize,
    },
    EmptyScenario,
    InvalidParameters(String),
    Io(io::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidBody { bodies, reason } => {
                let names = bodies.join(", ");
                match reason {
                    InvalidBodyReason::NonPositiveMass(m) => {
                        write!(f, "invalid body {names}: mass must be positive and finite, got {m}")
                    }
                    InvalidBodyReason::NonFiniteState => {
                        write!(f, "invalid body {names}: position and velocity must be finite")
                    }
                    InvalidBodyReason::Coincident => {
                        write!(f, "invalid bodies {names}: zero separation")
                    }
                }
            }
            SimError::UnknownPreset(name) => write!(f, "unknown preset '{name}'"),
            SimError::UnsupportedPreset(name) => write!(f, "preset '{name}' is not supported yet"),
            SimError::MalformedPresetRow { row, reason } => {
                write!(f, "malformed initial-condition row {row}: {reason}")
            }
            SimError::NumericalInstability { body, step } => {
                write!(f, "numerical instability: body '{body}' left finite range at step {step}")
            }
            SimError::EmptyScenario => write!(f, "scenario contains no bodies"),
            SimError::InvalidParameters(msg) => write!(f, "invalid parameters: {msg}"),
            SimError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SimError {
    fn from(err: io::Error) -> Self {
        SimError::Io(err)
    }
}
