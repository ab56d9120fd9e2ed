use crate::heatmap::HeatmapConfig;
use crate::utils::config::{GridConfig, DEFAULT_HEATMAP_FILENAME};
use std::path::PathBuf;

/// Arguments for the grid command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct GridArgs {
    /// Directories scanned for fio JSON results
    pub input_dirs: Vec<PathBuf>,

    /// Directory receiving tables, grid report and heatmap
    pub output_dir: PathBuf,

    /// Delete existing files in the output directory
    pub force: bool,

    /// Aggregation settings
    pub config: GridConfig,

    /// Heatmap rendering settings
    pub heatmap: HeatmapConfig,

    /// Heatmap file name inside the output directory
    pub filename: String,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for GridArgs {
    fn default() -> Self {
        Self {
            input_dirs: Vec::new(),
            output_dir: PathBuf::from("output"),
            force: false,
            config: GridConfig::default(),
            heatmap: HeatmapConfig::default(),
            filename: DEFAULT_HEATMAP_FILENAME.to_string(),
            print_summary: false,
        }
    }
}
