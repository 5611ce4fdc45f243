use std::path::{Path, PathBuf};

use serde::Deserialize;
use xlfsync::{
    RefreshSettings, SuggestionSettings, WriteOptions, codec::SearchReplace, types::LineEnding,
};

use crate::validation::{validate_comment_code, validate_language_code};

pub const DEFAULT_CONFIG_FILE: &str = "xlfsync.toml";

/// Contents of `xlfsync.toml`. Every field is optional; flags win.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XlfsyncConfig {
    pub refresh: Option<RefreshSettings>,
    pub suggestions: Option<SuggestionsCfg>,
    pub output: Option<OutputCfg>,
    pub batch: Option<BatchCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionsCfg {
    pub match_file: Option<String>,
    pub folders: Option<Vec<String>>,
    pub use_reference_corpus: Option<bool>,
    pub corpus_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputCfg {
    pub replace_self_closing: Option<bool>,
    pub line_ending: Option<LineEnding>,
    pub utf8_bom: Option<bool>,
    pub search_replace: Option<Vec<SearchReplace>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchCfg {
    pub continue_on_error: Option<bool>,
}

impl XlfsyncConfig {
    pub fn from_toml(text: &str) -> Result<Self, String> {
        let config: XlfsyncConfig =
            toml::from_str(text).map_err(|e| format!("Invalid configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let Some(refresh) = &self.refresh else {
            return Ok(());
        };
        for (tag, code) in &refresh.language.comment_codes {
            validate_language_code(tag)?;
            validate_comment_code(code)?;
        }
        for tag in refresh.language.skip_rules.keys() {
            validate_language_code(tag)?;
        }
        Ok(())
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        self.refresh.clone().unwrap_or_default()
    }

    pub fn suggestion_settings(&self) -> SuggestionSettings {
        let mut settings = SuggestionSettings::new();
        if let Some(cfg) = &self.suggestions {
            settings.use_reference_corpus = cfg.use_reference_corpus.unwrap_or(cfg.corpus_dir.is_some());
            settings.suggestion_folders = cfg
                .folders
                .iter()
                .flatten()
                .map(PathBuf::from)
                .collect();
            settings.match_file = cfg.match_file.as_ref().map(PathBuf::from);
        }
        settings
    }

    pub fn corpus_dir(&self) -> Option<PathBuf> {
        self.suggestions
            .as_ref()
            .and_then(|cfg| cfg.corpus_dir.as_ref())
            .map(PathBuf::from)
    }

    pub fn write_options(&self) -> WriteOptions {
        let mut options = WriteOptions::new();
        if let Some(cfg) = &self.output {
            if let Some(replace) = cfg.replace_self_closing {
                options = options.with_replace_self_closing(replace);
            }
            if let Some(bom) = cfg.utf8_bom {
                options = options.with_utf8_bom(bom);
            }
            options = options
                .with_line_ending(cfg.line_ending)
                .with_search_replace(cfg.search_replace.clone().unwrap_or_default());
        }
        options
    }

    pub fn continue_on_error(&self) -> bool {
        self.batch
            .as_ref()
            .and_then(|b| b.continue_on_error)
            .unwrap_or(false)
    }
}

/// Loads `explicit`, or `xlfsync.toml` from the working directory when it
/// exists. An explicit path that cannot be read is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<XlfsyncConfig, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = std::env::current_dir()
                .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
                .map_err(|e| format!("Cannot determine working directory: {}", e))?;
            if !default.is_file() {
                return Ok(XlfsyncConfig::default());
            }
            default
        }
    };
    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read configuration '{}': {}", path.display(), e))?;
    XlfsyncConfig::from_toml(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xlfsync::{TargetState, TranslationMode};

    #[test]
    fn test_full_config() {
        let config = XlfsyncConfig::from_toml(
            r#"
            [refresh]
            mode = "reference-service"
            exact_match_state = "needs-review-translation"
            strict = true

            [refresh.language]
            keep_translated_on_skip = true
            comment_codes = { "de-DE" = "DEU" }
            skip_rules = { "fr-FR" = ["ToolTip"] }

            [suggestions]
            match_file = "Base.sv-SE.xlf"
            folders = ["shared"]
            corpus_dir = ".cache"

            [output]
            line_ending = "crlf"
            utf8_bom = true

            [[output.search_replace]]
            search = "&#xD;"
            replace = ""

            [batch]
            continue_on_error = true
            "#,
        )
        .unwrap();

        let refresh = config.refresh_settings();
        assert_eq!(refresh.mode, TranslationMode::ReferenceService);
        assert_eq!(refresh.exact_match_state, Some(TargetState::NeedsReviewTranslation));
        assert!(refresh.strict);
        assert!(refresh.detect_invalid_values);
        assert_eq!(refresh.language.comment_code("de-de"), Some("DEU"));

        let suggestions = config.suggestion_settings();
        assert!(suggestions.use_reference_corpus);
        assert_eq!(suggestions.suggestion_folders, vec![PathBuf::from("shared")]);
        assert_eq!(suggestions.match_file, Some(PathBuf::from("Base.sv-SE.xlf")));

        let output = config.write_options();
        assert_eq!(output.line_ending, Some(LineEnding::CrLf));
        assert!(output.utf8_bom);
        assert!(output.replace_self_closing);
        assert_eq!(output.search_replace.len(), 1);
        assert!(config.continue_on_error());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = XlfsyncConfig::from_toml("").unwrap();
        assert_eq!(config.refresh_settings(), RefreshSettings::default());
        assert_eq!(config.write_options(), WriteOptions::default());
        assert!(!config.continue_on_error());
    }

    #[test]
    fn test_invalid_comment_code_is_rejected() {
        let err = XlfsyncConfig::from_toml(
            r#"
            [refresh.language]
            comment_codes = { "de-DE" = "german" }
            "#,
        )
        .unwrap_err();
        assert!(err.contains("german"));
    }
}
