//! Orbit plot and animation
//!
//! Draws every trajectory as a polyline into an SVG file. The view spans
//! `[-scale, scale]` on both axes with +y pointing up. The animated variant
//! traces each polyline from its first to its last sample with SMIL, one
//! frame per step at `FPS`

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::simulation::states::Body;

const SIZE: f64 = 800.0; // px
const MARGIN: f64 = 40.0; // px, room for title and labels

const FPS: f64 = 30.0;

const COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Map a world coordinate in metres to plot pixels
fn to_px(x: f64, y: f64, scale: f64) -> (f64, f64) {
    let half = SIZE / 2.0;
    (MARGIN + half + x / scale * half, MARGIN + half - y / scale * half)
}

pub fn write_svg<W: Write>(bodies: &[Body], scale: f64, out: W) -> io::Result<()> {
    write_orbits(bodies, scale, None, out)
}

/// Same picture as `write_svg`, with every trajectory drawn over time
pub fn write_animated_svg<W: Write>(bodies: &[Body], scale: f64, out: W) -> io::Result<()> {
    let frames = bodies.iter().map(|b| b.trajectory().len()).max().unwrap_or(1);
    let seconds = (frames as f64 / FPS).max(1.0);
    write_orbits(bodies, scale, Some(seconds), out)
}

fn write_orbits<W: Write>(bodies: &[Body], scale: f64, draw_secs: Option<f64>, mut out: W) -> io::Result<()> {
    let full = SIZE + 2.0 * MARGIN;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{full}" height="{full}" viewBox="0 0 {full} {full}">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(out, r#"<text x="{}" y="{}" text-anchor="middle" font-size="18">Orbits</text>"#, full / 2.0, MARGIN * 0.6)?;
    writeln!(out, r#"<text x="{}" y="{}" text-anchor="middle">x</text>"#, full / 2.0, full - MARGIN * 0.3)?;
    writeln!(out, r#"<text x="{}" y="{}" text-anchor="middle">y</text>"#, MARGIN * 0.4, full / 2.0)?;

    // plot frame, clipped so escaping bodies don't leave the axes
    writeln!(
        out,
        r#"<clipPath id="frame"><rect x="{MARGIN}" y="{MARGIN}" width="{SIZE}" height="{SIZE}"/></clipPath>"#
    )?;
    writeln!(
        out,
        r#"<rect x="{MARGIN}" y="{MARGIN}" width="{SIZE}" height="{SIZE}" fill="none" stroke="black"/>"#
    )?;

    writeln!(out, r#"<g clip-path="url(#frame)" fill="none" stroke-width="1">"#)?;
    for (i, body) in bodies.iter().enumerate() {
        let points: Vec<String> = body
            .trajectory()
            .iter()
            .map(|s| {
                let (px, py) = to_px(s.position.x, s.position.y, scale);
                format!("{px:.2},{py:.2}")
            })
            .collect();
        let color = COLORS[i % COLORS.len()];
        let points = points.join(" ");
        let title = escape(&body.name);
        match draw_secs {
            None => writeln!(
                out,
                r#"<polyline stroke="{color}" points="{points}"><title>{title}</title></polyline>"#
            )?,
            // dash as long as the whole line, slid in from fully hidden
            Some(secs) => writeln!(
                out,
                r#"<polyline stroke="{color}" points="{points}" pathLength="1" stroke-dasharray="1" stroke-dashoffset="1"><title>{title}</title><animate attributeName="stroke-dashoffset" from="1" to="0" dur="{secs:.2}s" fill="freeze"/></polyline>"#
            )?,
        }
    }
    writeln!(out, "</g>")?;
    writeln!(out, "</svg>")?;
    out.flush()
}

/// Write `<dir>/saves/<stem>.svg`
pub fn save_plot(bodies: &[Body], scale: f64, dir: &Path, stem: &str) -> io::Result<PathBuf> {
    let saves = dir.join("saves");
    fs::create_dir_all(&saves)?;
    let path = saves.join(format!("{stem}.svg"));
    write_svg(bodies, scale, BufWriter::new(File::create(&path)?))?;
    Ok(path)
}

/// Write `<dir>/saves/<stem>-animation.svg`
pub fn save_animation(bodies: &[Body], scale: f64, dir: &Path, stem: &str) -> io::Result<PathBuf> {
    let saves = dir.join("saves");
    fs::create_dir_all(&saves)?;
    let path = saves.join(format!("{stem}-animation.svg"));
    write_animated_svg(bodies, scale, BufWriter::new(File::create(&path)?))?;
    Ok(path)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
