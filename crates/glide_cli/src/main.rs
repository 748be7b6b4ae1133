//! Glide CLI
//!
//! Validate sheet configurations and replay scripted interactions headlessly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use glide_sheet::{ContainerLayout, SheetConfig, SheetController};

mod script;

use script::{Runner, Script};

#[derive(Parser)]
#[command(name = "glide")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Glide bottom sheet tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a sheet config and print its snap table
    Check {
        /// Sheet config (TOML)
        config: PathBuf,

        /// Container height used to resolve percentage points
        #[arg(long, default_value_t = 800.0)]
        height: f32,
    },

    /// Replay a scripted interaction and print one JSON line per frame
    Simulate {
        /// Sheet config (TOML)
        config: PathBuf,

        /// Interaction script (JSON)
        script: PathBuf,

        /// Container height, unless the script sets one
        #[arg(long, default_value_t = 800.0)]
        height: f32,

        /// Frames per second
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },

    /// Print the default config as TOML
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Check { config, height } => cmd_check(&config, height),
        Commands::Simulate {
            config,
            script,
            height,
            fps,
        } => cmd_simulate(&config, &script, height, fps),
        Commands::Defaults => cmd_defaults(),
    }
}

fn load_config(path: &Path) -> Result<SheetConfig> {
    SheetConfig::load(path).with_context(|| format!("invalid sheet config {}", path.display()))
}

fn cmd_check(path: &Path, height: f32) -> Result<()> {
    let config = load_config(path)?;
    let sheet = SheetController::new("check", config)?;
    sheet.set_layout(ContainerLayout::new(height));

    let table = sheet.table();
    info!(
        "{} is valid ({} snap points at height {})",
        path.display(),
        table.len(),
        height
    );
    for (index, position) in table.positions().iter().enumerate() {
        println!("  [{}] {:>8.1}", index, position);
    }
    Ok(())
}

fn cmd_simulate(config: &Path, script: &Path, height: f32, fps: u32) -> Result<()> {
    if fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }
    let config = load_config(config)?;
    let script = Script::load(script)?;

    let layout = script.container.unwrap_or(ContainerLayout::new(height));
    let mut runner = Runner::new(config, layout, fps)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runner.run(&script, &mut out)?;

    let snapshot = runner.sheet().snapshot();
    info!(
        "finished after {} frames at index {} (position {:.1})",
        runner.frames(),
        snapshot.current_index,
        snapshot.position
    );
    Ok(())
}

fn cmd_defaults() -> Result<()> {
    print!("{}", SheetConfig::default().to_toml_string()?);
    Ok(())
}
