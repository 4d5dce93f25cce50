use gravsim::{Engine, LogProgress, Never, SimulationConfig};
use gravsim::{save_animation, save_plot, write_raw_data};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
struct Args {
    /// Settings file, looked up as given and then under scenarios/
    #[arg(short, long, default_value = "default.yaml")]
    file_name: PathBuf,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    save_settings: Option<PathBuf>,

    /// Seed for randomized scenarios
    #[arg(long)]
    seed: Option<u64>,
}

fn resolve_settings_path(file_name: &Path) -> PathBuf {
    if file_name.exists() {
        return file_name.to_path_buf();
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

// load here to keep main clean
fn load_settings(args: &Args) -> Result<SimulationConfig> {
    let path = resolve_settings_path(&args.file_name);
    let mut cfg = SimulationConfig::load(&path)?;
    if args.seed.is_some() {
        cfg.random.seed = args.seed;
    }
    info!("loaded settings from {}", path.display());
    Ok(cfg)
}

fn export(cfg: &SimulationConfig, bodies: &[gravsim::Body], scale: f64) -> Result<()> {
    let out = &cfg.output;

    if out.raw_data {
        let files = write_raw_data(bodies, &out.directory).context("writing raw trajectory data")?;
        info!("wrote {} trajectory files to {}", files.len(), out.directory.join("objects").display());
    }

    if out.plot {
        if out.plot_save {
            let path = save_plot(bodies, scale, &out.directory, &out.filename).context("saving plot")?;
            info!("saved plot to {}", path.display());
        } else {
            warn!("showing plots needs a display; set output.plot_save to write {}.svg instead", out.filename);
        }
    }

    if out.animate {
        if out.animate_save {
            let path = save_animation(bodies, scale, &out.directory, &out.filename).context("saving animation")?;
            info!("saved animation to {}", path.display());
        } else {
            warn!(
                "showing animations needs a display; set output.animate_save to write {}-animation.svg instead",
                out.filename
            );
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = load_settings(&args)?;

    if let Some(path) = &args.save_settings {
        cfg.save(path)?;
        info!("saved settings to {}", path.display());
        return Ok(());
    }

    let scenario = cfg.build_scenario().context("building scenario")?;
    let scale = scenario.scale;
    info!("scenario ready with {} bodies", scenario.bodies.len());

    let engine = Engine::new(cfg.parameters())?;
    let run = engine.run(scenario, &mut LogProgress::default(), &Never)?;
    info!("finished {} steps", run.steps_completed);

    export(&cfg, &run.bodies, scale)?;

    Ok(())
}
