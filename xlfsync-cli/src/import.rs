use std::path::PathBuf;

use xlfsync::{
    Document, TranslationMode, codec::write_document, dictionary::Dictionary,
    import::{ImportOptions, import_translated},
    traits::Parser,
};
use xlfsync_cli::{XlfsyncConfig, validation::validate_file_path};

#[derive(Debug, Clone, Default)]
pub struct ImportCommandOptions {
    pub translated: PathBuf,
    pub target: PathBuf,
    pub dictionary: Option<PathBuf>,
    pub mode: Option<TranslationMode>,
    pub ignore_missing_units: bool,
    pub import_with_different_source: bool,
}

pub fn run_import_command(opts: ImportCommandOptions, config: &XlfsyncConfig) -> Result<(), String> {
    validate_file_path(&opts.translated)?;
    validate_file_path(&opts.target)?;

    let mut settings = config.refresh_settings();
    if let Some(mode) = opts.mode {
        settings = settings.with_mode(mode);
    }

    let translated = Document::read_from(&opts.translated)
        .map_err(|e| format!("Error reading {}: {}", opts.translated.display(), e))?;
    let mut target = Document::read_from(&opts.target)
        .map_err(|e| format!("Error reading {}: {}", opts.target.display(), e))?;
    let dictionary = match &opts.dictionary {
        Some(path) => Some(Dictionary::load(path).map_err(|e| e.to_string())?),
        None => None,
    };

    let import_options = ImportOptions::new()
        .with_ignore_missing_units(opts.ignore_missing_units)
        .with_import_with_different_source(opts.import_with_different_source);
    let updated = import_translated(
        &translated,
        &mut target,
        &settings,
        &import_options,
        dictionary.as_ref(),
    )
    .map_err(|e| format!("Import failed: {}", e))?;

    write_document(&target, &opts.target, &config.write_options())
        .map_err(|e| format!("Error writing output: {}", e))?;
    println!(
        "Imported {} translations into {}",
        updated,
        opts.target.display()
    );
    Ok(())
}
