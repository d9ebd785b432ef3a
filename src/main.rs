//! # sine-waves
//!
//! Preview animated sine waves in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use sine_wave_generator::terminal::{self, DEFAULT_FPS};
use sine_wave_generator::{EasingStyle, SceneConfig};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Animated sine waves in your terminal
#[derive(Parser)]
#[command(name = "sine-waves")]
#[command(version, about)]
struct Cli {
    /// Scene file to play (YAML or JSON)
    #[arg(short, long, env = "SINE_WAVES_SCENE")]
    scene: Option<PathBuf>,

    /// Number of random waves when no scene is given
    #[arg(short, long, default_value_t = 3)]
    waves: usize,

    /// Seed for the random waves
    #[arg(long)]
    seed: Option<u64>,

    /// Easing applied to every wave (sine_in_out, eased_sine)
    #[arg(short, long)]
    easing: Option<EasingStyle>,

    /// Frames per second
    #[arg(long, default_value_t = DEFAULT_FPS, env = "SINE_WAVES_FPS")]
    fps: u32,

    /// Upper bound on the pixel ratio
    #[arg(long)]
    max_pixel_ratio: Option<f64>,

    /// Print the scene as YAML instead of playing it
    #[arg(long)]
    dump_scene: bool,

    /// Write log records to this file (filtered by RUST_LOG, debug by default)
    #[arg(long, env = "SINE_WAVES_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn scene(&self) -> Result<SceneConfig> {
        let mut scene = match &self.scene {
            Some(path) => {
                SceneConfig::load(path).with_context(|| format!("loading scene {}", path.display()))?
            }
            None => {
                let mut rng = match self.seed {
                    Some(seed) => fastrand::Rng::with_seed(seed),
                    None => fastrand::Rng::new(),
                };
                SceneConfig::random(self.waves, &mut rng)
            }
        };
        if let Some(easing) = self.easing {
            for wave in &mut scene.waves {
                wave.easing = Some(easing);
            }
        }
        if self.max_pixel_ratio.is_some() {
            scene.max_pixel_ratio = self.max_pixel_ratio;
        }
        Ok(scene)
    }
}

/// Install a logger. Records go to `log_file` when given; otherwise to stderr, and only when
/// `RUST_LOG` is set, since stderr shares the terminal with the preview.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    let filter_set = std::env::var_os("RUST_LOG").is_some();
    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            if !filter_set {
                builder.filter_level(log::LevelFilter::Debug);
            }
        }
        None if !filter_set => return Ok(()),
        None => {}
    }
    builder.try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let scene = cli.scene()?;

    if cli.dump_scene {
        print!("{}", scene.to_yaml()?);
        return Ok(());
    }

    let summary = terminal::run(scene, cli.fps).context("running terminal preview")?;
    eprintln!(
        "{} frame(s) of {} wave(s) in {:.1}s ({:.1} fps)",
        summary.frames,
        summary.waves,
        summary.elapsed.as_secs_f64(),
        summary.average_fps()
    );
    Ok(())
}
