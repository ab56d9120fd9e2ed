//! fio clat grid CLI
//!
//! Turns a set of fio `json+` results, one per block size, into a
//! completion-latency density heatmap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use fio_clat_grid::commands::{
    display_schema, display_version, execute_grid, validate_args, validate_grid_file, GridArgs,
};
use fio_clat_grid::heatmap::{Colormap, HeatmapConfig};
use fio_clat_grid::utils::config::{load_config, GridConfig, DEFAULT_HEATMAP_FILENAME};

/// fio clat grid - latency density heatmaps from fio histograms
#[derive(Parser, Debug)]
#[command(name = "clat-grid")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate fio results into a density grid and heatmap
    Grid {
        /// Directory of fio JSON results (repeatable)
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for tables, grid report and heatmap
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// TOML file with grid settings (command-line flags take precedence)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of latency rows in the grid
        #[arg(long)]
        rows: Option<usize>,

        /// Overwrite existing files in the output directory
        #[arg(long)]
        force: bool,

        /// I/O direction to aggregate: read or write
        #[arg(long)]
        mode: Option<String>,

        /// Block size to leave out of the grid (repeatable)
        #[arg(long = "skip-bs")]
        skip_bs: Vec<u64>,

        /// Largest block size included in the grid
        #[arg(long = "max-bs")]
        max_bs: Option<u64>,

        /// Plot log10 of the latency
        #[arg(long)]
        log_scale: bool,

        /// Latency unit: us or ms
        #[arg(long)]
        timescale: Option<String>,

        /// Colormap: copper, gray or hot
        #[arg(long, default_value = "copper")]
        cmap: String,

        /// Draw a colorbar
        #[arg(long)]
        colorbar: bool,

        /// Heatmap file name inside the output directory
        #[arg(long, default_value = DEFAULT_HEATMAP_FILENAME)]
        filename: String,

        /// Heatmap title
        #[arg(long)]
        title: Option<String>,

        /// Heatmap width in pixels
        #[arg(long, default_value = "900")]
        width: usize,

        /// Heatmap height in pixels
        #[arg(long, default_value = "600")]
        height: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a grid report JSON file
    Validate {
        /// Path to grid report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Grid {
            inputs,
            output,
            config,
            rows,
            force,
            mode,
            skip_bs,
            max_bs,
            log_scale,
            timescale,
            cmap,
            colorbar,
            filename,
            title,
            width,
            height,
            summary,
        } => {
            // File settings first, then command-line overrides
            let mut grid_config = match config {
                Some(path) => load_config(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => GridConfig::default(),
            };

            if let Some(rows) = rows {
                grid_config.rows = rows;
            }
            if let Some(mode) = mode {
                grid_config.mode = mode.parse()?;
            }
            if let Some(timescale) = timescale {
                grid_config.time_unit = timescale.parse()?;
            }
            if let Some(max_bs) = max_bs {
                grid_config.max_block_size = max_bs;
            }
            grid_config.skip_block_sizes.extend(skip_bs);
            grid_config.log_scale |= log_scale;

            let mut heatmap = HeatmapConfig::new()
                .with_colormap(cmap.parse::<Colormap>()?)
                .with_colorbar(colorbar);
            if let Some(title) = title {
                heatmap = heatmap.with_title(title);
            }
            heatmap.width = width;
            heatmap.height = height;

            let args = GridArgs {
                input_dirs: inputs,
                output_dir: output,
                force,
                config: grid_config,
                heatmap,
                filename,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_grid(args)?;
        }

        Commands::Validate { file } => {
            validate_grid_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
