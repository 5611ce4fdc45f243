//! Translation modes and how each one records translation progress.
//!
//! Tag mode writes an inline token in front of the target text and never a
//! `state` attribute. External and reference-service modes use `state`
//! (reference-service also `state-qualifier`) and never a token. Every
//! mode-dependent decision of the refresh engine goes through this module.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::types::{StateQualifier, Target, TargetState, TranslationToken, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationMode {
    /// Inline `[NAB: ...]` tokens.
    #[default]
    Tag,
    /// `state` attribute only.
    External,
    /// `state` plus `state-qualifier`, managed by a hosted translation service.
    ReferenceService,
}

/// Per-mode switches consulted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    /// Copy `maxwidth` and `size-unit` from the master.
    pub syncs_size_constraints: bool,
    /// Targets carry progress in `state` rather than in a token.
    pub uses_state: bool,
    /// Stale-hint cleanup also marks the unit translated.
    pub promotes_on_cleanup: bool,
}

impl TranslationMode {
    pub const ALL: [TranslationMode; 3] = [
        TranslationMode::Tag,
        TranslationMode::External,
        TranslationMode::ReferenceService,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TranslationMode::Tag => "tag",
            TranslationMode::External => "external",
            TranslationMode::ReferenceService => "reference-service",
        }
    }

    pub fn policy(self) -> ModePolicy {
        match self {
            TranslationMode::Tag => ModePolicy {
                syncs_size_constraints: true,
                uses_state: false,
                promotes_on_cleanup: false,
            },
            TranslationMode::External => ModePolicy {
                syncs_size_constraints: true,
                uses_state: true,
                promotes_on_cleanup: false,
            },
            TranslationMode::ReferenceService => ModePolicy {
                syncs_size_constraints: false,
                uses_state: true,
                promotes_on_cleanup: true,
            },
        }
    }

    /// Target for a unit that has none yet.
    ///
    /// With `same_language` the source is copied and flagged for review,
    /// otherwise the target is empty and flagged as not translated. An empty
    /// source yields a plain empty target.
    pub fn new_target(self, source: &str, same_language: bool) -> Target {
        if source.is_empty() {
            return Target::new("");
        }
        let text = if same_language { source } else { "" };
        match self {
            TranslationMode::Tag => Target::new(text).with_token(Some(if same_language {
                TranslationToken::Review
            } else {
                TranslationToken::NotTranslated
            })),
            TranslationMode::External => Target::new(text).with_state(Some(if same_language {
                TargetState::NeedsAdaptation
            } else {
                TargetState::NeedsTranslation
            })),
            TranslationMode::ReferenceService => {
                if same_language {
                    Target::new(text)
                        .with_state(Some(TargetState::NeedsReviewTranslation))
                        .with_qualifier(Some(StateQualifier::ExactMatch))
                } else {
                    Target::new(text).with_state(Some(TargetState::NeedsTranslation))
                }
            }
        }
    }

    /// Flags a target whose source text changed under it.
    ///
    /// `clear_target` only applies to external mode, where the old text is
    /// dropped and the target goes back to needs-translation.
    pub fn mark_source_changed(self, target: &mut Target, clear_target: bool) {
        match self {
            TranslationMode::Tag => {
                target.state = None;
                target.token = Some(TranslationToken::Review);
            }
            TranslationMode::External if clear_target => {
                target.text.clear();
                target.state = Some(TargetState::NeedsTranslation);
            }
            TranslationMode::External => {
                target.state = Some(TargetState::NeedsAdaptation);
            }
            TranslationMode::ReferenceService => {
                target.state = Some(TargetState::NeedsReviewTranslation);
            }
        }
        target.state_qualifier = None;
    }

    /// Flags a target that failed validation.
    pub fn mark_invalid(self, target: &mut Target) {
        match self {
            TranslationMode::Tag => target.token = Some(TranslationToken::Review),
            TranslationMode::External => {
                target.state = Some(TargetState::NeedsReviewTranslation);
            }
            TranslationMode::ReferenceService => {
                target.state = Some(TargetState::NeedsReviewL10n);
                target.state_qualifier = Some(StateQualifier::RejectedInaccurate);
            }
        }
    }

    /// A finished translation, e.g. one taken from a language comment.
    pub fn accepted_target(self, text: &str) -> Target {
        match self {
            TranslationMode::Tag => Target::new(text),
            TranslationMode::External | TranslationMode::ReferenceService => {
                Target::new(text).with_state(Some(TargetState::Translated))
            }
        }
    }

    /// Converts every target of `unit` to this mode's notation.
    pub fn format_unit(self, unit: &mut Unit) {
        for target in &mut unit.targets {
            self.format_target(target);
        }
    }

    pub fn format_target(self, target: &mut Target) {
        match self {
            TranslationMode::Tag => {
                if target.token.is_none() {
                    target.token = token_for_state(target.state);
                }
                target.state = None;
                target.state_qualifier = None;
            }
            TranslationMode::External | TranslationMode::ReferenceService => {
                if target.state.is_none() && (target.token.is_some() || target.has_content()) {
                    let (state, qualifier) = state_for_token(target.token);
                    target.state = Some(state);
                    target.state_qualifier = qualifier;
                }
                target.token = None;
            }
        }
    }

    /// Whether `unit` still waits for a first translation.
    pub fn needs_translation(self, unit: &Unit) -> bool {
        match self {
            TranslationMode::Tag => unit.token() == Some(TranslationToken::NotTranslated),
            TranslationMode::External | TranslationMode::ReferenceService => {
                unit.state().is_some_and(TargetState::is_untranslated)
            }
        }
    }

    /// Whether `unit` has a translation that someone should look at.
    pub fn needs_review(self, unit: &Unit) -> bool {
        match self {
            TranslationMode::Tag => matches!(
                unit.token(),
                Some(TranslationToken::Review) | Some(TranslationToken::Suggestion)
            ),
            TranslationMode::External | TranslationMode::ReferenceService => unit
                .state()
                .is_some_and(|s| !s.is_accepted() && !s.is_untranslated()),
        }
    }
}

fn token_for_state(state: Option<TargetState>) -> Option<TranslationToken> {
    match state? {
        TargetState::New | TargetState::NeedsTranslation => Some(TranslationToken::NotTranslated),
        TargetState::NeedsAdaptation
        | TargetState::NeedsL10n
        | TargetState::NeedsReviewAdaptation
        | TargetState::NeedsReviewL10n
        | TargetState::NeedsReviewTranslation => Some(TranslationToken::Review),
        TargetState::Translated | TargetState::SignedOff | TargetState::Final => None,
    }
}

fn state_for_token(token: Option<TranslationToken>) -> (TargetState, Option<StateQualifier>) {
    match token {
        Some(TranslationToken::NotTranslated) => (TargetState::NeedsTranslation, None),
        Some(TranslationToken::Review) => (TargetState::NeedsReviewTranslation, None),
        Some(TranslationToken::Suggestion) => {
            (TargetState::Translated, Some(StateQualifier::ExactMatch))
        }
        None => (TargetState::Translated, None),
    }
}

impl FromStr for TranslationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tag" | "nab-tags" => Ok(TranslationMode::Tag),
            "external" => Ok(TranslationMode::External),
            "reference-service" | "dts" => Ok(TranslationMode::ReferenceService),
            _ => Err(format!(
                "Unknown translation mode: {} (expected tag, external or reference-service)",
                s
            )),
        }
    }
}

impl Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_target_per_mode() {
        let tag = TranslationMode::Tag.new_target("Hello", false);
        assert_eq!(tag.raw_text(), "[NAB: NOT TRANSLATED]");
        assert_eq!(tag.state, None);

        let copied = TranslationMode::Tag.new_target("Hello", true);
        assert_eq!(copied.raw_text(), "[NAB: REVIEW]Hello");

        let external = TranslationMode::External.new_target("Hello", false);
        assert_eq!(external.text, "");
        assert_eq!(external.state, Some(TargetState::NeedsTranslation));

        let service = TranslationMode::ReferenceService.new_target("Hello", true);
        assert_eq!(service.text, "Hello");
        assert_eq!(service.state, Some(TargetState::NeedsReviewTranslation));
        assert_eq!(service.state_qualifier, Some(StateQualifier::ExactMatch));
    }

    #[test]
    fn test_new_target_for_empty_source_is_plain() {
        for mode in TranslationMode::ALL {
            assert_eq!(mode.new_target("", false), Target::new(""));
        }
    }

    #[test]
    fn test_source_changed() {
        let mut target = Target::new("Hej").with_qualifier(Some(StateQualifier::ExactMatch));
        TranslationMode::External.mark_source_changed(&mut target, false);
        assert_eq!(target.state, Some(TargetState::NeedsAdaptation));
        assert_eq!(target.text, "Hej");
        assert_eq!(target.state_qualifier, None);

        let mut cleared = Target::new("Hej");
        TranslationMode::External.mark_source_changed(&mut cleared, true);
        assert_eq!(cleared.text, "");
        assert_eq!(cleared.state, Some(TargetState::NeedsTranslation));

        let mut tagged = Target::new("Hej").with_state(Some(TargetState::Translated));
        TranslationMode::Tag.mark_source_changed(&mut tagged, true);
        assert_eq!(tagged.raw_text(), "[NAB: REVIEW]Hej");
        assert_eq!(tagged.state, None);
    }

    #[test]
    fn test_tag_format_derives_token_from_state() {
        let mut target = Target::new("Hej")
            .with_state(Some(TargetState::NeedsReviewL10n))
            .with_qualifier(Some(StateQualifier::FuzzyMatch));
        TranslationMode::Tag.format_target(&mut target);
        assert_eq!(target.token, Some(TranslationToken::Review));
        assert_eq!(target.state, None);
        assert_eq!(target.state_qualifier, None);

        let mut done = Target::new("Hej").with_state(Some(TargetState::Final));
        TranslationMode::Tag.format_target(&mut done);
        assert_eq!(done.token, None);
    }

    #[test]
    fn test_state_format_reads_token() {
        let mut target = Target::new("Hej").with_token(Some(TranslationToken::Suggestion));
        TranslationMode::External.format_target(&mut target);
        assert_eq!(target.token, None);
        assert_eq!(target.state, Some(TargetState::Translated));
        assert_eq!(target.state_qualifier, Some(StateQualifier::ExactMatch));

        let mut stated = Target::new("Hej")
            .with_state(Some(TargetState::SignedOff))
            .with_token(Some(TranslationToken::Review));
        TranslationMode::ReferenceService.format_target(&mut stated);
        assert_eq!(stated.state, Some(TargetState::SignedOff));
        assert_eq!(stated.token, None);
    }

    #[test]
    fn test_review_token_survives_mode_round_trip() {
        for token in TranslationToken::ALL {
            let mut target = Target::new("Hej").with_token(Some(token));
            TranslationMode::External.format_target(&mut target);
            TranslationMode::Tag.format_target(&mut target);
            if token == TranslationToken::Suggestion {
                assert_eq!(target.token, None);
            } else {
                assert_eq!(target.token, Some(token));
            }
        }
    }

    #[test]
    fn test_format_is_idempotent() {
        for mode in TranslationMode::ALL {
            let mut unit = Unit::new("A", "Hello")
                .with_target(Target::new("Hej").with_state(Some(TargetState::NeedsAdaptation)));
            mode.format_unit(&mut unit);
            let once = unit.clone();
            mode.format_unit(&mut unit);
            assert_eq!(unit, once);
        }
    }

    #[test]
    fn test_invalid_marking() {
        let mut target = Target::new("Fel");
        TranslationMode::ReferenceService.mark_invalid(&mut target);
        assert_eq!(target.state, Some(TargetState::NeedsReviewL10n));
        assert_eq!(target.state_qualifier, Some(StateQualifier::RejectedInaccurate));
    }

    #[test]
    fn test_policy_table() {
        assert!(!TranslationMode::ReferenceService.policy().syncs_size_constraints);
        assert!(TranslationMode::Tag.policy().syncs_size_constraints);
        assert!(!TranslationMode::Tag.policy().uses_state);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Reference-Service".parse(), Ok(TranslationMode::ReferenceService));
        assert_eq!("dts".parse(), Ok(TranslationMode::ReferenceService));
        assert_eq!("tag".parse(), Ok(TranslationMode::Tag));
        assert!("xliff".parse::<TranslationMode>().is_err());
    }
}
