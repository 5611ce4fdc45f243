//! Options for a refresh run.
//!
//! All settings are plain structs with builder-style setters so callers can
//! write `RefreshSettings::new().with_mode(TranslationMode::External)`.

use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    mode::TranslationMode,
    types::{StateQualifier, Target, TargetState},
};

/// How the engine treats units while reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub mode: TranslationMode,
    /// State given to exact-match suggestions instead of `translated`.
    pub exact_match_state: Option<TargetState>,
    /// External mode only: drop the old text when the source changes.
    pub clear_target_when_source_changed: bool,
    pub detect_invalid_values: bool,
    /// Offer the file's own translations as suggestions for equal sources.
    pub use_self_matching: bool,
    /// Tag mode only: take the best suggestion as translation.
    pub auto_accept_suggestions: bool,
    /// Fail on duplicate trans-unit ids instead of using the first one.
    pub strict: bool,
    pub language: LanguageSettings,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        RefreshSettings {
            mode: TranslationMode::Tag,
            exact_match_state: None,
            clear_target_when_source_changed: false,
            detect_invalid_values: true,
            use_self_matching: true,
            auto_accept_suggestions: false,
            strict: false,
            language: LanguageSettings::default(),
        }
    }
}

impl RefreshSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_exact_match_state(mut self, state: Option<TargetState>) -> Self {
        self.exact_match_state = state;
        self
    }

    pub fn with_clear_target_when_source_changed(mut self, clear: bool) -> Self {
        self.clear_target_when_source_changed = clear;
        self
    }

    pub fn with_detect_invalid_values(mut self, detect: bool) -> Self {
        self.detect_invalid_values = detect;
        self
    }

    pub fn with_self_matching(mut self, enabled: bool) -> Self {
        self.use_self_matching = enabled;
        self
    }

    pub fn with_auto_accept_suggestions(mut self, enabled: bool) -> Self {
        self.auto_accept_suggestions = enabled;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_language_settings(mut self, language: LanguageSettings) -> Self {
        self.language = language;
        self
    }

    /// Replaces an exact-match qualifier by the configured state, if any.
    pub fn apply_exact_match_state(&self, target: &mut Target) {
        if let Some(state) = self.exact_match_state {
            if target.state_qualifier.is_some_and(StateQualifier::is_exact_match) {
                target.state = Some(state);
                target.state_qualifier = None;
            }
        }
    }
}

/// Per-language behaviour, keyed by language tag (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSettings {
    /// Language tag to the three-letter code used in developer-note
    /// translations, e.g. `de-DE` to `DEU`.
    pub comment_codes: BTreeMap<String, String>,
    /// Language tag to the structural roles (`ToolTip`, `Label`, ...) that
    /// are not translated into that language.
    pub skip_rules: BTreeMap<String, Vec<String>>,
    /// Keep skipped units that already have a translation.
    pub keep_translated_on_skip: bool,
}

impl LanguageSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment_code(mut self, language: &str, code: &str) -> Self {
        self.comment_codes.insert(language.to_string(), code.to_string());
        self
    }

    pub fn with_skip_rule(mut self, language: &str, roles: &[&str]) -> Self {
        self.skip_rules.insert(
            language.to_string(),
            roles.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    pub fn with_keep_translated_on_skip(mut self, keep: bool) -> Self {
        self.keep_translated_on_skip = keep;
        self
    }

    pub fn comment_code(&self, language: &str) -> Option<&str> {
        self.comment_codes
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(language))
            .map(|(_, code)| code.as_str())
    }

    pub fn skip_roles(&self, language: &str) -> &[String] {
        self.skip_rules
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(language))
            .map(|(_, roles)| roles.as_slice())
            .unwrap_or(&[])
    }

    pub fn skips_role(&self, language: &str, role: &str) -> bool {
        self.skip_roles(language)
            .iter()
            .any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Where suggestion maps come from, lowest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionSettings {
    /// Consult the reference corpus, if one is supplied.
    pub use_reference_corpus: bool,
    /// Folders of `.xlf` files; master files (`*g.xlf`) are ignored.
    pub suggestion_folders: Vec<PathBuf>,
    /// An explicitly chosen file; an empty path is an error.
    pub match_file: Option<PathBuf>,
}

impl SuggestionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_corpus(mut self, enabled: bool) -> Self {
        self.use_reference_corpus = enabled;
        self
    }

    pub fn with_suggestion_folder<P: Into<PathBuf>>(mut self, folder: P) -> Self {
        self.suggestion_folders.push(folder.into());
        self
    }

    pub fn with_match_file<P: Into<PathBuf>>(mut self, file: P) -> Self {
        self.match_file = Some(file.into());
        self
    }
}
