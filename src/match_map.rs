//! Suggestion lookup tables: source text to candidate translations.
//!
//! Maps are collected per target language in ascending priority: reference
//! corpus, suggestion folders, the explicitly chosen match file, and last
//! the document's own translations. Lookups walk them from the back, so the
//! most specific source wins.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    mode::TranslationMode,
    settings::{RefreshSettings, SuggestionSettings},
    traits::Parser,
    types::{Document, RefreshHint, StateQualifier, Target, TargetState, TranslationToken, Unit},
};

/// Source text to distinct translations, in insertion order per source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl MatchMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a translation; empty values and repeats are ignored.
    pub fn insert(&mut self, source: &str, target: &str) {
        if source.is_empty() || target.is_empty() {
            return;
        }
        let targets = self.entries.entry(source.to_string()).or_default();
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }

    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.entries
            .get(source)
            .map(Vec::as_slice)
            .filter(|targets| !targets.is_empty())
    }

    /// Number of distinct sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finished translations of `document`.
    ///
    /// A target is admitted when it has text, carries no token and its state
    /// is absent or accepted.
    pub fn from_document(document: &Document) -> Self {
        let mut map = MatchMap::new();
        for unit in &document.units {
            for target in unit.targets.iter().filter(|t| is_finished(t)) {
                map.insert(&unit.source, &target.text);
            }
        }
        map
    }

    /// Parses a JSON object of `source -> [targets]`.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(text)?;
        let mut map = MatchMap::new();
        for (source, targets) in &raw {
            for target in targets {
                map.insert(source, target);
            }
        }
        Ok(map)
    }
}

fn is_finished(target: &Target) -> bool {
    target.has_content()
        && target.token.is_none()
        && target.state.is_none_or(TargetState::is_accepted)
}

/// Match maps per lowercase target language, lowest priority first.
#[derive(Debug, Clone, Default)]
pub struct SuggestionMaps {
    maps: BTreeMap<String, Vec<MatchMap>>,
}

impl SuggestionMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `map` as the highest priority map so far for `language`.
    pub fn add(&mut self, language: &str, map: MatchMap) {
        self.maps.entry(language.to_lowercase()).or_default().push(map);
    }

    pub fn for_language(&self, language: &str) -> &[MatchMap] {
        self.maps
            .get(&language.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.maps.values().all(Vec::is_empty)
    }
}

/// A supplier of reference translations.
pub trait ReferenceCorpus {
    /// The table for `language`, `None` when the corpus has nothing for it.
    fn translation_map(&self, language: &str) -> Result<Option<MatchMap>, Error>;
}

/// Corpus tables cached on disk as `<dir>/<language>.json`.
#[derive(Debug, Clone)]
pub struct LocalCorpusCache {
    dir: PathBuf,
}

impl LocalCorpusCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        LocalCorpusCache { dir: dir.into() }
    }

    pub fn entry_path(&self, language: &str) -> PathBuf {
        self.dir.join(format!("{}.json", language.to_lowercase()))
    }
}

impl ReferenceCorpus for LocalCorpusCache {
    /// An empty or unreadable entry is deleted before the error is returned,
    /// so the next fetch starts clean.
    fn translation_map(&self, language: &str) -> Result<Option<MatchMap>, Error> {
        let path = self.entry_path(language);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| Error::Io(e).in_file(&path))?;
        let parsed = if text.trim().is_empty() {
            Err("empty file".to_string())
        } else {
            MatchMap::from_json(&text).map_err(|e| e.to_string())
        };
        match parsed {
            Ok(map) => Ok(Some(map)),
            Err(reason) => {
                fs::remove_file(&path).map_err(|e| Error::Io(e).in_file(&path))?;
                Err(Error::CorruptCache(format!(
                    "{}: {} (entry deleted)",
                    path.display(),
                    reason
                )))
            }
        }
    }
}

/// Builds the suggestion maps for `languages`.
///
/// An explicitly chosen but empty match file path fails before any file is
/// read.
pub fn build_suggestion_maps(
    languages: &[String],
    settings: &SuggestionSettings,
    corpus: Option<&dyn ReferenceCorpus>,
) -> Result<SuggestionMaps, Error> {
    if let Some(match_file) = &settings.match_file {
        if match_file.as_os_str().is_empty() {
            return Err(Error::MissingInput("No xlf selected for matching".to_string()));
        }
    }

    let languages: Vec<String> = languages.iter().map(|l| l.to_lowercase()).collect();
    let mut maps = SuggestionMaps::new();

    if settings.use_reference_corpus {
        if let Some(corpus) = corpus {
            for language in &languages {
                if let Some(map) = corpus.translation_map(language)? {
                    maps.add(language, map);
                }
            }
        }
    }

    for folder in &settings.suggestion_folders {
        for path in suggestion_files(folder)? {
            add_file(&mut maps, &languages, &path)?;
        }
    }

    if let Some(match_file) = &settings.match_file {
        add_file(&mut maps, &languages, match_file)?;
    }

    Ok(maps)
}

/// `.xlf` files of `folder` by name, master files (`*g.xlf`) left out.
fn suggestion_files(folder: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(folder).map_err(|e| Error::Io(e).in_file(folder))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::Io(e).in_file(folder))?.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if path.is_file() && name.ends_with(".xlf") && !name.ends_with("g.xlf") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn add_file(maps: &mut SuggestionMaps, languages: &[String], path: &Path) -> Result<(), Error> {
    let document = Document::read_from(path)?;
    let language = document.target_language.to_lowercase();
    if languages.contains(&language) {
        maps.add(&language, MatchMap::from_document(&document));
    }
    Ok(())
}

/// Fills untranslated units from `maps`, highest priority map first.
///
/// Returns the number of suggestions added.
pub fn apply_suggestions(
    document: &mut Document,
    maps: &[&MatchMap],
    settings: &RefreshSettings,
) -> usize {
    maps.iter()
        .rev()
        .map(|map| apply_match_map(document, map, settings))
        .sum()
}

fn is_candidate(unit: &Unit) -> bool {
    !unit.has_targets()
        || unit.token() == Some(TranslationToken::NotTranslated)
        || unit.state() == Some(TargetState::NeedsTranslation)
}

/// Applies one map to every unit still waiting for a translation.
pub fn apply_match_map(document: &mut Document, map: &MatchMap, settings: &RefreshSettings) -> usize {
    let mut added = 0;
    for unit in document.units.iter_mut().filter(|u| is_candidate(u)) {
        let Some(matches) = map.get(&unit.source) else {
            continue;
        };
        match settings.mode {
            TranslationMode::Tag if settings.auto_accept_suggestions => {
                unit.targets = vec![Target::new(&matches[0])];
                unit.remove_refresh_hint();
                added += 1;
            }
            TranslationMode::Tag => {
                for candidate in matches {
                    unit.targets.push(
                        Target::new(candidate).with_token(Some(TranslationToken::Suggestion)),
                    );
                }
                unit.targets
                    .retain(|t| t.token != Some(TranslationToken::NotTranslated));
                unit.insert_refresh_hint(RefreshHint::Suggestion.as_str());
                added += matches.len();
            }
            TranslationMode::External | TranslationMode::ReferenceService => {
                let mut target = Target::new(&matches[0])
                    .with_state(Some(TargetState::Translated))
                    .with_qualifier(Some(StateQualifier::ExactMatch));
                settings.apply_exact_match_state(&mut target);
                unit.remove_refresh_hint();
                unit.targets = vec![target];
                added += 1;
            }
        }
    }
    added
}
