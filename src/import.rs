//! Importing a file translated by the reference service.

use crate::{
    dictionary::Dictionary,
    error::Error,
    mode::TranslationMode,
    settings::RefreshSettings,
    types::{Document, StateQualifier},
    validation::validate_unit,
};

/// Import behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Skip incoming units that the target does not have.
    pub ignore_missing_units: bool,
    /// Accept incoming units whose source differs from the target's.
    pub import_with_different_source: bool,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_missing_units(mut self, ignore: bool) -> Self {
        self.ignore_missing_units = ignore;
        self
    }

    pub fn with_import_with_different_source(mut self, import: bool) -> Self {
        self.import_with_different_source = import;
        self
    }
}

/// Merges the translations of `translated` into `target`.
///
/// Units already in a translated state are not overwritten. Every imported
/// unit then goes through the dictionary, the exact-match state override and
/// validation. Returns the number of units taken from `translated`.
pub fn import_translated(
    translated: &Document,
    target: &mut Document,
    settings: &RefreshSettings,
    options: &ImportOptions,
    dictionary: Option<&Dictionary>,
) -> Result<usize, Error> {
    if settings.mode != TranslationMode::ReferenceService {
        return Err(Error::InvalidMode {
            mode: settings.mode.to_string(),
            message: "importing translated files requires reference-service mode".to_string(),
        });
    }

    let target_language = target.target_language.clone();
    let mut updated = 0;
    for incoming in &translated.units {
        let Some(unit) = target.unit_mut(&incoming.id) else {
            if options.ignore_missing_units {
                continue;
            }
            return Err(Error::DataMismatch(format!(
                "trans-unit '{}' does not exist in the {} file",
                incoming.id, target_language
            )));
        };
        if unit.source != incoming.source && !options.import_with_different_source {
            return Err(Error::DataMismatch(format!(
                "trans-unit '{}' has source \"{}\" in the imported file but \"{}\" in the {} file",
                incoming.id, incoming.source, unit.source, target_language
            )));
        }

        let already_translated = unit.state().is_some_and(|s| s.is_accepted());
        if !already_translated {
            if let Some(incoming_target) = incoming.target() {
                match unit.target_mut() {
                    None => unit.targets.push(incoming_target.clone()),
                    Some(current) => {
                        if incoming_target.state_qualifier == Some(StateQualifier::IdMatch) {
                            current.state_qualifier = None;
                        } else {
                            current.state = incoming_target.state;
                            current.state_qualifier = incoming_target.state_qualifier;
                            current.text = incoming_target.text.clone();
                        }
                    }
                }
                updated += 1;
            }
        }

        if let Some(current) = unit.target_mut() {
            if let Some(dictionary) = dictionary {
                current.text = dictionary.search_and_replace(&current.text)?;
            }
            settings.apply_exact_match_state(current);
        }
        validate_unit(unit, settings);
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Target, TargetState, Unit};

    fn service() -> RefreshSettings {
        RefreshSettings::new().with_mode(TranslationMode::ReferenceService)
    }

    fn doc(units: Vec<Unit>) -> Document {
        let mut doc = Document::new("en-US", "sv-SE", "App");
        doc.units = units;
        doc
    }

    fn translated(text: &str, state: TargetState, qualifier: Option<StateQualifier>) -> Target {
        Target::new(text).with_state(Some(state)).with_qualifier(qualifier)
    }

    #[test]
    fn test_requires_reference_service_mode() {
        let err = import_translated(
            &doc(vec![]),
            &mut doc(vec![]),
            &RefreshSettings::default(),
            &ImportOptions::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidMode { .. }));
    }

    #[test]
    fn test_imports_untranslated_units_only() {
        let incoming = doc(vec![
            Unit::new("A", "Name").with_target(translated("Namn", TargetState::Translated, None)),
            Unit::new("B", "Date").with_target(translated("Dag", TargetState::Translated, None)),
        ]);
        let mut target = doc(vec![
            Unit::new("A", "Name")
                .with_target(Target::new("").with_state(Some(TargetState::NeedsTranslation))),
            Unit::new("B", "Date").with_target(translated("Datum", TargetState::SignedOff, None)),
        ]);
        let updated =
            import_translated(&incoming, &mut target, &service(), &ImportOptions::default(), None).unwrap();
        assert_eq!(updated, 1);
        assert_eq!(target.units[0].target_text(), "Namn");
        assert_eq!(target.units[0].state(), Some(TargetState::Translated));
        assert_eq!(target.units[1].target_text(), "Datum");
    }

    #[test]
    fn test_incoming_unit_without_target_is_not_counted() {
        let incoming = doc(vec![Unit::new("A", "Name")]);
        let mut target = doc(vec![Unit::new("A", "Name")
            .with_target(Target::new("").with_state(Some(TargetState::NeedsTranslation)))]);
        let updated =
            import_translated(&incoming, &mut target, &service(), &ImportOptions::default(), None).unwrap();
        assert_eq!(updated, 0);
        assert_eq!(target.units[0].state(), Some(TargetState::NeedsTranslation));
    }

    #[test]
    fn test_id_match_only_clears_qualifier() {
        let incoming = doc(vec![Unit::new("A", "Name").with_target(translated(
            "Namn",
            TargetState::NeedsReviewTranslation,
            Some(StateQualifier::IdMatch),
        ))]);
        let mut target = doc(vec![Unit::new("A", "Name").with_target(translated(
            "Namnet",
            TargetState::NeedsReviewTranslation,
            Some(StateQualifier::FuzzyMatch),
        ))]);
        import_translated(&incoming, &mut target, &service(), &ImportOptions::default(), None).unwrap();
        let target = target.units[0].target().unwrap();
        assert_eq!(target.text, "Namnet");
        assert_eq!(target.state_qualifier, None);
    }

    #[test]
    fn test_missing_and_mismatched_units() {
        let incoming = doc(vec![Unit::new("X", "Name").with_target(Target::new("Namn"))]);
        let mut target = doc(vec![Unit::new("A", "Name")]);
        let err = import_translated(&incoming, &mut target, &service(), &ImportOptions::default(), None)
            .unwrap_err();
        assert!(matches!(err, Error::DataMismatch(ref m) if m.contains("'X'")));
        let ignored = import_translated(
            &incoming,
            &mut target,
            &service(),
            &ImportOptions::new().with_ignore_missing_units(true),
            None,
        )
        .unwrap();
        assert_eq!(ignored, 0);

        let incoming = doc(vec![Unit::new("A", "Other name").with_target(Target::new("Namn"))]);
        assert!(matches!(
            import_translated(&incoming, &mut target, &service(), &ImportOptions::default(), None),
            Err(Error::DataMismatch(_))
        ));
        assert_eq!(
            import_translated(
                &incoming,
                &mut target,
                &service(),
                &ImportOptions::new().with_import_with_different_source(true),
                None
            )
            .unwrap(),
            1
        );
    }

    #[test]
    fn test_dictionary_and_exact_match_override() {
        let mut dictionary = Dictionary::new("sv-SE");
        dictionary.add_word("Kund", "Beställare");
        let incoming = doc(vec![Unit::new("A", "Customer").with_target(translated(
            "Kund",
            TargetState::Translated,
            Some(StateQualifier::ExactMatch),
        ))]);
        let mut target = doc(vec![Unit::new("A", "Customer")]);
        let settings = service().with_exact_match_state(Some(TargetState::NeedsReviewTranslation));
        import_translated(&incoming, &mut target, &settings, &ImportOptions::default(), Some(&dictionary))
            .unwrap();
        let result = target.units[0].target().unwrap();
        assert_eq!(result.text, "Beställare");
        assert_eq!(result.state, Some(TargetState::NeedsReviewTranslation));
        assert_eq!(result.state_qualifier, None);
    }
}
