// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use photobooth::Orientation;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Wave at the camera, get a photo strip")]
#[command(version = photobooth::constants::app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Strip styling shared by `compose` and `booth`
#[derive(Args, Debug, Clone)]
pub struct StyleArgs {
    /// Frame (background) color as hex
    #[arg(long, default_value = "#FFFFFF")]
    pub frame_color: String,

    /// Tint color as hex
    #[arg(long, default_value = "#FFFFFF")]
    pub tint: String,

    /// Tint opacity in [0, 1]; 0 disables the tint
    #[arg(long, default_value = "0")]
    pub tint_opacity: f64,

    /// Render every slot in greyscale
    #[arg(long)]
    pub greyscale: bool,

    /// Output directory (default: ~/Pictures/photobooth)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print slot dimensions for every surface
    Layout {
        /// Photos per strip (1-6) [default: from config]
        #[arg(short, long)]
        count: Option<u8>,

        /// Strip orientation [default: from config]
        #[arg(long)]
        orientation: Option<Orientation>,
    },

    /// Compose existing images into a strip
    Compose {
        /// Source images, in slot order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Photos per strip (1-6) [default: from config]
        #[arg(short, long)]
        count: Option<u8>,

        /// Strip orientation [default: from config]
        #[arg(long)]
        orientation: Option<Orientation>,

        /// Photo numbers to use, starting at 1 (default: the first `count`)
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<usize>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Run a capture session against a frame source and landmark trace
    Booth {
        /// Image file or directory of frames
        #[arg(short, long)]
        frames: PathBuf,

        /// JSON array of fingertip x positions (null for no hand)
        #[arg(short, long)]
        trace: Option<PathBuf>,

        /// Photos per strip (1-6) [default: from config]
        #[arg(short, long)]
        count: Option<u8>,

        /// Strip orientation [default: from config]
        #[arg(long)]
        orientation: Option<Orientation>,

        /// Use the capture button instead of gestures
        #[arg(short, long)]
        manual: bool,

        /// Photos to take before leaving (default: `count`)
        #[arg(long)]
        shots: Option<usize>,

        /// Photo numbers to use, starting at 1 (default: the first `count`)
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<usize>,

        /// Also save every captured photo
        #[arg(long)]
        keep_frames: bool,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { count, orientation } => cli::print_layout(count, orientation),
        Commands::Compose {
            images,
            count,
            orientation,
            select,
            style,
        } => cli::compose_images(images, count, orientation, select, style),
        Commands::Booth {
            frames,
            trace,
            count,
            orientation,
            manual,
            shots,
            select,
            keep_frames,
            style,
        } => cli::run_booth(cli::BoothOptions {
            frames,
            trace,
            count,
            orientation,
            manual,
            shots,
            select,
            keep_frames,
            style,
        }),
        Commands::Config => cli::print_config(),
    }
}
