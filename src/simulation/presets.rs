//! Named initial-condition presets and the tabular format they use
//!
//! A table is one header line followed by one row per body:
//!
//! ```text
//! name, mass, position_x, position_y, velocity_x, velocity_y
//! Sun, 1.989e30, 0.0, 0.0, 0.0, 0.0
//! Earth, 5.972e24, 1.496e11, 0.0, 0.0, 29780.0
//! ```
//!
//! Fields are comma separated and trimmed; numbers are parsed as `f64`.

use std::io::BufRead;

use crate::simulation::error::SimError;
use crate::simulation::states::{Body, NVec2};

const SOL: &str = include_str!("../../presets/sol.csv");
const SOL_MOONS: &str = include_str!("../../presets/sol_moons.csv");

/// Presets known by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Sol,
    SolMoons,
    AlphaCentauri, // listed, no data yet
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Sol, Preset::SolMoons, Preset::AlphaCentauri];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Sol => "Sol",
            Preset::SolMoons => "Sol (moons)",
            Preset::AlphaCentauri => "Alpha Centauri",
        }
    }

    /// Resolve a preset by its display name
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| SimError::UnknownPreset(name.to_string()))
    }

    /// Embedded table for this preset
    pub fn table(self) -> Result<&'static str, SimError> {
        match self {
            Preset::Sol => Ok(SOL),
            Preset::SolMoons => Ok(SOL_MOONS),
            Preset::AlphaCentauri => Err(SimError::UnsupportedPreset(self.name().to_string())),
        }
    }

    pub fn bodies(self) -> Result<Vec<Body>, SimError> {
        parse_table(self.table()?.as_bytes())
    }
}

/// Parse an initial-condition table into bodies.
/// Blank lines are skipped; a table without rows is `EmptyScenario`.
/// Lines are read as raw bytes so a row that is not UTF-8 is reported with
/// its row index.
pub fn parse_table<R: BufRead>(reader: R) -> Result<Vec<Body>, SimError> {
    let mut lines = reader.split(b'\n');

    // header
    match lines.next() {
        Some(line) => {
            line?;
        }
        None => return Err(SimError::EmptyScenario),
    }

    let mut bodies = Vec::new();
    let mut row = 0;
    for line in lines {
        let bytes = line?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        row += 1;
        let line = std::str::from_utf8(&bytes).map_err(|err| SimError::MalformedPresetRow {
            row,
            reason: format!("not valid UTF-8: {err}"),
        })?;
        bodies.push(parse_row(line, row)?);
    }

    if bodies.is_empty() {
        return Err(SimError::EmptyScenario);
    }
    Ok(bodies)
}

fn parse_row(line: &str, row: usize) -> Result<Body, SimError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        return Err(SimError::MalformedPresetRow {
            row,
            reason: format!("expected 6 fields, found {}", fields.len()),
        });
    }
    if fields[0].is_empty() {
        return Err(SimError::MalformedPresetRow {
            row,
            reason: "empty body name".into(),
        });
    }

    let mut values = [0.0; 5];
    for (value, (field, column)) in values.iter_mut().zip(fields[1..].iter().zip(COLUMNS)) {
        *value = field.parse::<f64>().map_err(|err| SimError::MalformedPresetRow {
            row,
            reason: format!("{column} '{field}': {err}"),
        })?;
    }
    let [mass, x, y, vx, vy] = values;

    Body::new(fields[0], mass, NVec2::new(x, y), NVec2::new(vx, vy))
}

const COLUMNS: [&str; 5] = ["mass", "position_x", "position_y", "velocity_x", "velocity_y"];
