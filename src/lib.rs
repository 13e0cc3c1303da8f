pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod engagement;
pub mod import;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod report;
pub mod routines;
pub mod store;
pub mod taxonomy;

#[cfg(test)]
pub mod test_utils;

pub use engagement::{calculate_program_engagement, score_program, EngagementOptions, EngagementResult};
pub use report::{export_program_analytics, generate_heatmap_data, ExportFormat, HeatmapEntry};
pub use routines::{generate_routines, suggest_routine_name, GeneratorError};
