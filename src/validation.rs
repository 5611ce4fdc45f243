//! Structural checks on translated text.
//!
//! Option captions must keep their comma-separated layout and labels must
//! keep their placeholders. A failed check never drops the translation; it
//! flags the unit for review and leaves a note saying what is wrong.

use std::{collections::BTreeMap, fmt::Display};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{settings::RefreshSettings, types::Unit, xliff_id::UnitKind};

lazy_static! {
    /// `@1@@@@@` and `#2####` style dialog placeholders.
    static ref DIALOG_PLACEHOLDER: Regex = Regex::new(r"(@\d+@[@]+|#\d+#[#]+)").unwrap();
    static ref NUMBERED_PLACEHOLDER: Regex = Regex::new(r"%\d+").unwrap();
}

/// One problem found in a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    OptionCount {
        source: usize,
        target: usize,
    },
    BlankOption {
        index: usize,
        source: String,
        target: String,
    },
    MissingInTarget {
        placeholder: String,
    },
    MissingInSource {
        placeholder: String,
    },
    CountMismatch {
        placeholder: String,
        source: usize,
        target: usize,
    },
    OnlyInTarget {
        placeholder: String,
        target: usize,
    },
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::OptionCount { .. } => write!(
                f,
                "source and target has different number of option captions."
            ),
            Violation::BlankOption {
                index,
                source,
                target,
            } => write!(
                f,
                "Option no. {} of source is \"{}\", but the same option in target is \"{}\". Empty Options must be empty in both source and target.",
                index, source, target
            ),
            Violation::MissingInTarget { placeholder } => write!(
                f,
                "The placeholder \"{}\" was found in source, but not in target.",
                placeholder
            ),
            Violation::MissingInSource { placeholder } => write!(
                f,
                "The placeholder \"{}\" was found in target, but not in source.",
                placeholder
            ),
            Violation::CountMismatch {
                placeholder,
                source,
                target,
            } => write!(
                f,
                "The placeholder \"{}\" was found in source {} times, but {} times in target.",
                placeholder, source, target
            ),
            Violation::OnlyInTarget {
                placeholder,
                target,
            } => write!(
                f,
                "The placeholder \"{}\" was found in target {} times, but was not found in source.",
                placeholder, target
            ),
        }
    }
}

/// Every violation of `target` against `source`, in check order.
pub fn find_violations(kind: UnitKind, source: &str, target: &str) -> Vec<Violation> {
    match kind {
        UnitKind::OptionList => option_violations(source, target),
        UnitKind::Label => placeholder_violations(source, target),
        UnitKind::Other => Vec::new(),
    }
}

fn option_violations(source: &str, target: &str) -> Vec<Violation> {
    let source_options: Vec<&str> = source.split(',').collect();
    let target_options: Vec<&str> = target.split(',').collect();
    if source_options.len() != target_options.len() {
        return vec![Violation::OptionCount {
            source: source_options.len(),
            target: target_options.len(),
        }];
    }
    source_options
        .iter()
        .zip(&target_options)
        .enumerate()
        .filter(|(_, (s, t))| s.is_empty() != t.is_empty())
        .map(|(index, (s, t))| Violation::BlankOption {
            index,
            source: s.to_string(),
            target: t.to_string(),
        })
        .collect()
}

/// Occurrence counts, keyed by placeholder, plus first-seen order.
fn count_matches<'a>(re: &Regex, text: &'a str) -> (Vec<&'a str>, BTreeMap<&'a str, usize>) {
    let mut order = Vec::new();
    let mut counts = BTreeMap::new();
    for m in re.find_iter(text) {
        let count = counts.entry(m.as_str()).or_insert(0);
        if *count == 0 {
            order.push(m.as_str());
        }
        *count += 1;
    }
    (order, counts)
}

fn placeholder_violations(source: &str, target: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    let (source_order, source_counts) = count_matches(&DIALOG_PLACEHOLDER, source);
    let (target_order, target_counts) = count_matches(&DIALOG_PLACEHOLDER, target);
    for placeholder in source_order {
        if !target_counts.contains_key(placeholder) {
            violations.push(Violation::MissingInTarget {
                placeholder: placeholder.to_string(),
            });
        }
    }
    for placeholder in target_order {
        if !source_counts.contains_key(placeholder) {
            violations.push(Violation::MissingInSource {
                placeholder: placeholder.to_string(),
            });
        }
    }

    let (source_order, source_counts) = count_matches(&NUMBERED_PLACEHOLDER, source);
    let (target_order, target_counts) = count_matches(&NUMBERED_PLACEHOLDER, target);
    for placeholder in source_order {
        let in_source = source_counts.get(placeholder).copied().unwrap_or(0);
        match target_counts.get(placeholder).copied().unwrap_or(0) {
            0 => violations.push(Violation::MissingInTarget {
                placeholder: placeholder.to_string(),
            }),
            in_target if in_target != in_source => violations.push(Violation::CountMismatch {
                placeholder: placeholder.to_string(),
                source: in_source,
                target: in_target,
            }),
            _ => {}
        }
    }
    for placeholder in target_order {
        if !source_counts.contains_key(placeholder) {
            violations.push(Violation::OnlyInTarget {
                placeholder: placeholder.to_string(),
                target: target_counts.get(placeholder).copied().unwrap_or(0),
            });
        }
    }
    violations
}

/// Checks the unit's first target and flags it on the first violation.
///
/// Does nothing when detection is off, when the unit has no target, or when
/// the target is empty and already awaiting action. Units without a
/// generator note are not checked.
pub fn validate_unit(unit: &mut Unit, settings: &RefreshSettings) -> Option<Violation> {
    if !settings.detect_invalid_values || !unit.has_targets() {
        return None;
    }
    let check_state = settings.mode.policy().uses_state;
    if unit.target_text().is_empty() && unit.needs_review(check_state) {
        return None;
    }
    let kind = unit.kind()?;
    let violation = find_violations(kind, &unit.source, unit.target_text())
        .into_iter()
        .next()?;
    if let Some(target) = unit.target_mut() {
        settings.mode.mark_invalid(target);
    }
    unit.insert_refresh_hint(&violation.to_string());
    Some(violation)
}
