//! CLI library for testing purposes

pub mod config;
pub mod path_glob;
pub mod validation;

pub use config::{XlfsyncConfig, load_config};
pub use path_glob::{expand_target_globs, language_files_beside};
