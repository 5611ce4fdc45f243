use std::{fs::File, io::BufWriter, path::PathBuf};

use xlfsync::{
    Document, TranslationMode,
    export::{ExportFilter, export_review_tsv},
    traits::Parser,
};
use xlfsync_cli::{
    XlfsyncConfig,
    validation::{validate_file_path, validate_output_path},
};

#[derive(Debug, Clone)]
pub struct ExportCommandOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filter: ExportFilter,
    pub mode: Option<TranslationMode>,
}

pub fn run_export_command(opts: ExportCommandOptions, config: &XlfsyncConfig) -> Result<(), String> {
    validate_file_path(&opts.input)?;
    validate_output_path(&opts.output)?;

    let mode = opts.mode.unwrap_or(config.refresh_settings().mode);
    let document = Document::read_from(&opts.input)
        .map_err(|e| format!("Error reading {}: {}", opts.input.display(), e))?;

    let file = File::create(&opts.output)
        .map_err(|e| format!("Cannot create {}: {}", opts.output.display(), e))?;
    let rows = export_review_tsv(
        &document,
        opts.filter,
        mode.policy().uses_state,
        BufWriter::new(file),
    )
    .map_err(|e| format!("Export failed: {}", e))?;

    println!("Exported {} units to {}", rows, opts.output.display());
    Ok(())
}
