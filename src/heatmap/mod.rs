//! Heatmap rendering of density grids.
//!
//! This is the last stage of the pipeline: the grid is already final, and
//! rendering only decides colours and axes.

pub mod colormap;
pub mod generator;
pub mod summary;

// Re-export main types
pub use colormap::Colormap;
pub use generator::{generate_heatmap, HeatmapConfig};
pub use summary::generate_text_summary;
