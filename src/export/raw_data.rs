//! Raw trajectory export
//!
//! One text file per body under `<dir>/objects/`, one line per sample:
//! `[x, y][vx, vy]`

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::simulation::states::Body;

/// Body name made safe for use as a file name
pub fn file_name_for(body: &Body) -> String {
    let name: String = body
        .name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => format!("_{name}"),
        _ => name,
    }
}

/// Write every trajectory sample of `body`, one per line
pub fn write_trajectory<W: Write>(body: &Body, mut out: W) -> io::Result<()> {
    for s in body.trajectory() {
        writeln!(
            out,
            "[{}, {}][{}, {}]",
            s.position.x, s.position.y, s.velocity.x, s.velocity.y
        )?;
    }
    out.flush()
}

/// Write one trajectory file per body into `dir/objects`, creating the
/// directory if needed. Returns the written paths in body order
pub fn write_raw_data(bodies: &[Body], dir: &Path) -> io::Result<Vec<PathBuf>> {
    let objects = dir.join("objects");
    fs::create_dir_all(&objects)?;

    let mut written = Vec::with_capacity(bodies.len());
    for body in bodies {
        let path = objects.join(file_name_for(body));
        write_trajectory(body, BufWriter::new(File::create(&path)?))?;
        debug!("wrote {} samples to {}", body.trajectory().len(), path.display());
        written.push(path);
    }
    Ok(written)
}
