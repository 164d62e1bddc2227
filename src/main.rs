use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use particle_field::{ParticleField, ParticlesConfig};

/// Open a window with the drifting particle field.
#[derive(Parser, Debug)]
#[command(name = "particle-field")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file; missing keys use the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of particles
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// Seed for reproducible particle layouts
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore the pointer
    #[arg(long)]
    no_hover: bool,

    /// Hard-edged opaque particles instead of soft ones
    #[arg(long)]
    opaque: bool,

    /// Disable the idle rotation
    #[arg(long)]
    no_rotation: bool,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,particle_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ParticlesConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => ParticlesConfig::default(),
    };
    if let Some(count) = cli.count {
        config.particle_count = count;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.no_hover {
        config.move_particles_on_hover = false;
    }
    if cli.opaque {
        config.alpha_particles = false;
    }
    if cli.no_rotation {
        config.disable_rotation = true;
    }

    let result = ParticleField::from_config(config)
        .with_window_size(cli.width, cli.height)
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "particle field failed");
            ExitCode::FAILURE
        }
    }
}
