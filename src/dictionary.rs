//! Word substitution applied to imported translations.

use std::{fs, path::Path};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSettings {
    pub match_whole_word: bool,
    pub match_casing: bool,
    pub use_regex: bool,
    pub keep_casing_on_first_character: bool,
}

impl Default for WordSettings {
    fn default() -> Self {
        WordSettings {
            match_whole_word: true,
            match_casing: true,
            use_regex: false,
            keep_casing_on_first_character: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryWord {
    pub word: String,
    pub replacement: String,
    #[serde(default, alias = "setting")]
    pub settings: WordSettings,
}

impl DictionaryWord {
    fn pattern(&self) -> Result<Regex, Error> {
        let mut pattern = if self.settings.use_regex {
            self.word.clone()
        } else {
            regex::escape(&self.word)
        };
        if self.settings.match_whole_word {
            pattern = format!(r"\b(?:{})\b", pattern);
        }
        if !self.settings.match_casing {
            pattern = format!("(?i){}", pattern);
        }
        Regex::new(&pattern).map_err(|e| {
            Error::validation_error(format!("invalid dictionary word '{}': {}", self.word, e))
        })
    }

    fn replace(&self, text: &str) -> Result<String, Error> {
        let re = self.pattern()?;
        let replaced = re.replace_all(text, |caps: &Captures| {
            let mut out = String::new();
            if self.settings.use_regex {
                caps.expand(&self.replacement, &mut out);
            } else {
                out.push_str(&self.replacement);
            }
            match caps.get(0).and_then(|m| m.as_str().chars().next()) {
                Some(first) if self.settings.keep_casing_on_first_character => {
                    with_first_char_case(&out, first.is_uppercase())
                }
                _ => out,
            }
        });
        Ok(replaced.into_owned())
    }
}

fn with_first_char_case(text: &str, upper: bool) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A per-language word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    pub language: String,
    #[serde(default, alias = "words")]
    pub word_list: Vec<DictionaryWord>,
}

impl Dictionary {
    pub fn new(language: &str) -> Self {
        Dictionary {
            language: language.to_string(),
            word_list: Vec::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingInput(format!(
                "Could not open file: \"{}\"",
                path.display()
            )));
        }
        let text = fs::read_to_string(path).map_err(|e| Error::Io(e).in_file(path))?;
        Self::from_json(&text)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| Error::Io(e).in_file(path))
    }

    /// Case-insensitive lookup.
    pub fn find(&self, word: &str) -> Option<&DictionaryWord> {
        self.word_list
            .iter()
            .find(|w| w.word.to_lowercase() == word.to_lowercase())
    }

    /// Adds `word`, or updates its replacement when it is already listed.
    pub fn add_word(&mut self, word: &str, replacement: &str) -> &mut Self {
        let lower = word.to_lowercase();
        match self.word_list.iter_mut().find(|w| w.word.to_lowercase() == lower) {
            Some(existing) => existing.replacement = replacement.to_string(),
            None => self.word_list.push(DictionaryWord {
                word: word.to_string(),
                replacement: replacement.to_string(),
                settings: WordSettings::default(),
            }),
        }
        self
    }

    /// Returns whether the word was listed.
    pub fn delete_word(&mut self, word: &str) -> bool {
        let lower = word.to_lowercase();
        let before = self.word_list.len();
        self.word_list.retain(|w| w.word.to_lowercase() != lower);
        before != self.word_list.len()
    }

    /// Applies every word in list order.
    pub fn search_and_replace(&self, text: &str) -> Result<String, Error> {
        let mut result = text.to_string();
        for word in &self.word_list {
            result = word.replace(&result)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(word: &str, replacement: &str, settings: WordSettings) -> DictionaryWord {
        DictionaryWord {
            word: word.to_string(),
            replacement: replacement.to_string(),
            settings,
        }
    }

    #[test]
    fn test_whole_word_and_casing() {
        let mut dictionary = Dictionary::new("sv-SE");
        dictionary.word_list.push(word(
            "artikel",
            "vara",
            WordSettings {
                match_casing: false,
                ..WordSettings::default()
            },
        ));
        assert_eq!(
            dictionary.search_and_replace("Artikel och artikelnummer, artikel.").unwrap(),
            "Vara och artikelnummer, vara."
        );
    }

    #[test]
    fn test_match_casing_only_replaces_exact_case() {
        let mut dictionary = Dictionary::new("sv-SE");
        dictionary.add_word("Kund", "Beställare");
        assert_eq!(
            dictionary.search_and_replace("Kund och kund").unwrap(),
            "Beställare och kund"
        );
    }

    #[test]
    fn test_regex_mode() {
        let mut dictionary = Dictionary::new("da-DK");
        dictionary.word_list.push(word(
            r"(\d+) stk",
            "$1 styk",
            WordSettings {
                use_regex: true,
                match_whole_word: false,
                keep_casing_on_first_character: false,
                ..WordSettings::default()
            },
        ));
        assert_eq!(dictionary.search_and_replace("Antal: 5 stk").unwrap(), "Antal: 5 styk");
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let mut dictionary = Dictionary::new("da-DK");
        dictionary.word_list.push(word(
            "(",
            "x",
            WordSettings {
                use_regex: true,
                ..WordSettings::default()
            },
        ));
        assert!(matches!(
            dictionary.search_and_replace("a"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_add_find_delete() {
        let mut dictionary = Dictionary::new("sv-SE");
        dictionary.add_word("Kund", "Beställare");
        dictionary.add_word("kund", "Klient");
        assert_eq!(dictionary.word_list.len(), 1);
        assert_eq!(dictionary.find("KUND").unwrap().replacement, "Klient");
        assert!(dictionary.delete_word("kUnD"));
        assert!(!dictionary.delete_word("kund"));
        assert!(dictionary.find("kund").is_none());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"language": "sv-SE", "wordList": [{"word": "kund", "replacement": "klient",
            "setting": {"matchWholeWord": true, "matchCasing": false, "useRegex": false,
            "keepCasingOnFirstCharacter": true}}]}"#;
        let dictionary = Dictionary::from_json(json).unwrap();
        assert!(!dictionary.word_list[0].settings.match_casing);
        assert_eq!(dictionary.search_and_replace("Kund").unwrap(), "Klient");
    }
}
