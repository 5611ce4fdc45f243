use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, info};
use xlfsync::{
    BatchOptions, BatchOutcome, ChangeReport, FailurePolicy, TranslationMode, refresh_files,
};
use xlfsync_cli::{
    XlfsyncConfig, expand_target_globs, language_files_beside,
    validation::{validate_directory, validate_file_path},
};

#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    pub master: PathBuf,
    pub targets: Vec<String>,
    pub mode: Option<TranslationMode>,
    pub sort_only: bool,
    pub match_file: Option<PathBuf>,
    pub suggestion_folders: Vec<PathBuf>,
    pub corpus_dir: Option<PathBuf>,
    pub regenerate_master: Option<PathBuf>,
    pub continue_on_error: bool,
    pub strict: bool,
    pub json: bool,
}

fn batch_options(opts: &RefreshOptions, config: &XlfsyncConfig) -> Result<BatchOptions, String> {
    let mut settings = config.refresh_settings();
    if let Some(mode) = opts.mode {
        settings = settings.with_mode(mode);
    }
    if opts.strict {
        settings = settings.with_strict(true);
    }

    let mut suggestions = config.suggestion_settings();
    if let Some(match_file) = &opts.match_file {
        if !match_file.as_os_str().is_empty() {
            validate_file_path(match_file)?;
        }
        suggestions.match_file = Some(match_file.clone());
    }
    for folder in &opts.suggestion_folders {
        validate_directory(folder)?;
        suggestions = suggestions.with_suggestion_folder(folder.clone());
    }

    let corpus_dir = opts.corpus_dir.clone().or_else(|| config.corpus_dir());
    if let Some(dir) = &corpus_dir {
        validate_directory(dir)?;
        suggestions.use_reference_corpus = true;
    }

    let failure_policy = if opts.continue_on_error || config.continue_on_error() {
        FailurePolicy::ContinueOnError
    } else {
        FailurePolicy::HaltOnError
    };

    let mut options = BatchOptions::new()
        .with_settings(settings)
        .with_suggestions(suggestions)
        .with_sort_only(opts.sort_only)
        .with_failure_policy(failure_policy)
        .with_write_options(config.write_options());
    if let Some(dir) = corpus_dir {
        options = options.with_corpus_dir(dir);
    }
    if let Some(units) = &opts.regenerate_master {
        validate_file_path(units)?;
        options = options.with_regenerate_from(units.clone());
    }
    Ok(options)
}

fn resolve_targets(opts: &RefreshOptions) -> Result<Vec<PathBuf>, String> {
    let targets = if opts.targets.is_empty() {
        language_files_beside(&opts.master)?
    } else {
        expand_target_globs(&opts.targets)?
    };
    let master = opts.master.canonicalize().ok();
    let targets: Vec<PathBuf> = targets
        .into_iter()
        .filter(|t| master.is_none() || t.canonicalize().ok() != master)
        .collect();
    for target in &targets {
        validate_file_path(target)?;
    }
    Ok(targets)
}

fn print_outcome(master: &Path, outcome: &BatchOutcome, report: &ChangeReport, as_json: bool) {
    if as_json {
        let payload = json!({
            "master": master.display().to_string(),
            "summary": report.summary(),
            "report": report,
            "changed_files": outcome
                .changed_files
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
            "master_written": outcome.master_written,
            "failures": outcome
                .failures
                .iter()
                .map(|f| json!({ "path": f.path.display().to_string(), "error": f.error.to_string() }))
                .collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize report JSON: {}", e),
        }
        return;
    }

    println!("{}", report);
    for path in &outcome.changed_files {
        println!("  updated {}", path.display());
    }
    for failure in &outcome.failures {
        eprintln!("  failed {}: {}", failure.path.display(), failure.error);
    }
}

/// Runs the refresh. Returns whether any target file changed on disk.
pub fn run_refresh_command(opts: RefreshOptions, config: &XlfsyncConfig) -> Result<bool, String> {
    validate_file_path(&opts.master)?;
    let options = batch_options(&opts, config)?;
    let targets = resolve_targets(&opts)?;
    debug!(master = %opts.master.display(), targets = targets.len(), mode = %options.settings.mode, "refresh");
    if targets.is_empty() {
        info!("no language files found for {}", opts.master.display());
    }

    let mut report = ChangeReport::new();
    let outcome = refresh_files(&opts.master, &targets, &options, &mut report)
        .map_err(|e| format!("Refresh failed: {}", e))?;

    print_outcome(&opts.master, &outcome, &report, opts.json);
    if !outcome.failures.is_empty() {
        return Err(format!("{} file(s) could not be refreshed", outcome.failures.len()));
    }
    Ok(outcome.has_changes())
}
