//! loom CLI — welding, headless simulation, and weight asset tools.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "loom")]
#[command(version, about = "loom — cloth simulation data layer tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Weld a mesh into solver particles and print the result.
    Weld {
        /// Path to mesh (JSON).
        path: String,

        /// Weld grid cell in world units.
        #[arg(short, long, default_value_t = loom_types::constants::DEFAULT_WELD_EPSILON)]
        epsilon: f32,
    },

    /// Hang a procedural sheet from a bone and simulate it.
    Simulate {
        /// Cloth settings (TOML). Defaults are used when omitted.
        #[arg(short, long)]
        settings: Option<String>,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: u32,

        /// Quads per side of the sheet.
        #[arg(short, long, default_value_t = 16)]
        grid: usize,

        /// Write the final render mesh (JSON) here.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inspect or generate weight assets.
    Weights {
        #[command(subcommand)]
        command: WeightCommands,
    },

    /// Validate cloth settings (.toml) or a mesh (.json).
    Validate {
        /// Path to settings or mesh file.
        path: String,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Print a summary of a weight asset.
    Inspect {
        /// Path to weight asset (JSON).
        path: String,
    },

    /// Write an asset giving every particle the same weight.
    Fill {
        /// Output path.
        path: String,

        /// Particle count of the target mesh.
        #[arg(short, long)]
        count: usize,

        /// Weight in [0, 1] (0 = fixed, 1 = free).
        #[arg(short, long)]
        value: f32,

        /// Skeletal mesh the weights belong to.
        #[arg(short, long, default_value = "")]
        mesh: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Weld { path, epsilon } => commands::weld(&path, epsilon),
        Commands::Simulate {
            settings,
            frames,
            grid,
            output,
        } => commands::simulate(settings.as_deref(), frames, grid, output.as_deref()),
        Commands::Weights { command } => match command {
            WeightCommands::Inspect { path } => commands::weights_inspect(&path),
            WeightCommands::Fill {
                path,
                count,
                value,
                mesh,
            } => commands::weights_fill(&path, count, value, &mesh),
        },
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
