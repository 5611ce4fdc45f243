//! Refreshing a set of language files from one master file.
//!
//! This is the only layer that touches the file system or logs: every file is
//! read, reconciled in memory and written back only when its text changed.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    codec::{WriteOptions, serialize},
    error::Error,
    language_comment::{CommentStrip, apply_strips},
    master::{load_extracted_units, update_master},
    match_map::{LocalCorpusCache, ReferenceCorpus, build_suggestion_maps},
    reconcile::reconcile,
    report::{ChangeReport, Counter},
    settings::{RefreshSettings, SuggestionSettings},
    traits::Parser,
    types::Document,
};

/// What to do when one file of the batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    HaltOnError,
    ContinueOnError,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub settings: RefreshSettings,
    pub suggestions: SuggestionSettings,
    pub sort_only: bool,
    pub failure_policy: FailurePolicy,
    /// Extracted-units JSON to update the master from before refreshing.
    pub regenerate_from: Option<PathBuf>,
    pub write_options: WriteOptions,
    /// Directory of the local reference corpus cache.
    pub corpus_dir: Option<PathBuf>,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: RefreshSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_suggestions(mut self, suggestions: SuggestionSettings) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_sort_only(mut self, sort_only: bool) -> Self {
        self.sort_only = sort_only;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_regenerate_from<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.regenerate_from = Some(path.into());
        self
    }

    pub fn with_write_options(mut self, write_options: WriteOptions) -> Self {
        self.write_options = write_options;
        self
    }

    pub fn with_corpus_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.corpus_dir = Some(dir.into());
        self
    }
}

/// A file that could not be refreshed under [`FailurePolicy::ContinueOnError`].
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Target files whose content on disk changed.
    pub changed_files: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
    /// Whether the master file was written back.
    pub master_written: bool,
}

impl BatchOutcome {
    pub fn has_changes(&self) -> bool {
        !self.changed_files.is_empty()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Writes `text` unless the file already holds exactly these bytes.
fn write_if_changed(path: &Path, text: &str) -> Result<bool, Error> {
    if fs::read(path).is_ok_and(|current| current == text.as_bytes()) {
        return Ok(false);
    }
    fs::write(path, text).map_err(|e| Error::Io(e).in_file(path))?;
    Ok(true)
}

/// Refreshes every file of `target_paths` from the master at `master_path`.
///
/// Counters of all files are added to `report`. Every file is read and
/// refreshed in memory before anything is written. With
/// [`FailurePolicy::HaltOnError`] a file that fails to load or refresh ends
/// the batch with its error and no file, master included, is touched. If
/// writing a file fails, the files written before it and the master they
/// were refreshed against are kept on disk before the error is returned.
pub fn refresh_files(
    master_path: &Path,
    target_paths: &[PathBuf],
    options: &BatchOptions,
    report: &mut ChangeReport,
) -> Result<BatchOutcome, Error> {
    let mut outcome = BatchOutcome::default();
    let mut master = Document::read_from(master_path)?;
    let mut master_dirty = false;

    if let Some(extracted) = &options.regenerate_from {
        let records = load_extracted_units(extracted)?;
        let master_report = update_master(&mut master, &records);
        info!(
            master = %master_path.display(),
            "regenerated master: {}",
            master_report.summary()
        );
        report.merge(&master_report);
        master_dirty = true;
    }

    let mut targets = Vec::with_capacity(target_paths.len());
    for path in target_paths {
        match Document::read_from(path) {
            Ok(document) => targets.push((path.clone(), document)),
            Err(error) => fail(&mut outcome, options.failure_policy, path, error)?,
        }
    }

    let mut languages: Vec<String> = targets
        .iter()
        .map(|(_, d)| d.target_language.to_lowercase())
        .collect();
    languages.sort();
    languages.dedup();
    let cache = options.corpus_dir.as_ref().map(LocalCorpusCache::new);
    let maps = build_suggestion_maps(
        &languages,
        &options.suggestions,
        cache.as_ref().map(|c| c as &dyn ReferenceCorpus),
    )?;
    debug!(languages = ?languages, "built suggestion maps for {} languages", maps.languages().count());

    let master_name = file_name(master_path);
    let mut pending: Vec<Pending> = Vec::with_capacity(targets.len());
    for (path, document) in targets {
        let mut file_report = ChangeReport::new();
        file_report.file_name = Some(file_name(&path));

        let result = reconcile(
            &master,
            document,
            &options.settings,
            &maps,
            &mut file_report,
            options.sort_only,
        )
        .and_then(|mut reconciled| {
            reconciled.document.original = master_name.clone();
            let text = serialize(&reconciled.document, &options.write_options)?;
            Ok((reconciled.comment_strips, text))
        });

        match result {
            Ok((strips, text)) => pending.push(Pending {
                path,
                text,
                strips,
                report: file_report,
            }),
            Err(error) => fail(&mut outcome, options.failure_policy, &path, error.in_file(&path))?,
        }
    }

    let mut strips: Vec<CommentStrip> = Vec::new();
    let mut halted = None;
    for file in pending {
        match write_if_changed(&file.path, &file.text) {
            Ok(changed) => {
                info!(file = %file.path.display(), changed, "{}", file.report.summary());
                strips.extend(file.strips);
                report.merge(&file.report);
                report.increment(Counter::CheckedFiles);
                if changed {
                    outcome.changed_files.push(file.path);
                }
            }
            Err(error) => {
                if let Err(error) = fail(&mut outcome, options.failure_policy, &file.path, error) {
                    halted = Some(error);
                    break;
                }
            }
        }
    }

    // Files already written were refreshed against this master.
    if apply_strips(&mut master, &strips) > 0 {
        master_dirty = true;
    }
    if master_dirty {
        let text = serialize(&master, &options.write_options)?;
        outcome.master_written = write_if_changed(master_path, &text)?;
        debug!(master = %master_path.display(), written = outcome.master_written, "master saved");
    }

    match halted {
        Some(error) => Err(error),
        None => Ok(outcome),
    }
}

/// A refreshed file waiting to be written.
struct Pending {
    path: PathBuf,
    text: String,
    strips: Vec<CommentStrip>,
    report: ChangeReport,
}

fn fail(
    outcome: &mut BatchOutcome,
    policy: FailurePolicy,
    path: &Path,
    error: Error,
) -> Result<(), Error> {
    match policy {
        FailurePolicy::HaltOnError => Err(error),
        FailurePolicy::ContinueOnError => {
            warn!(file = %path.display(), "skipped: {}", error);
            outcome.failures.push(BatchFailure {
                path: path.to_path_buf(),
                error,
            });
            Ok(())
        }
    }
}
