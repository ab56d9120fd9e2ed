//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod grid;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use grid::{build_grid, execute_grid, populate, validate_args};
pub use models::GridArgs;
pub use utils::{display_schema, display_version, validate_grid_file};
