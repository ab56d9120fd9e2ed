//! Result parsing and schema definitions.
//!
//! This module handles:
//! - Discovering fio result files in input directories
//! - Parsing fio `json+` output
//! - Defining the grid report schema

pub mod fio;
pub mod schema;

// Re-export main types
pub use fio::{
    collect_results, list_result_files, parse_block_size, parse_result_file, parse_run_str,
    ClatStats, FioJob, FioRun, JobStats, ResultSet,
};
pub use schema::{to_report, BlockSummary, GridReport};
