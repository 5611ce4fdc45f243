//! Aligns one language document with the master document.
//!
//! The output keeps master order: every translatable master unit appears
//! once, taken over from the language document when it exists there and
//! created otherwise. Units the master no longer has are dropped. The
//! function is pure: no I/O, no logging, and the master is not modified.

use crate::{
    error::Error,
    language_comment::{self, CommentStrip, LanguageComment},
    match_map::{MatchMap, SuggestionMaps, apply_suggestions},
    report::{ChangeReport, Counter},
    settings::RefreshSettings,
    types::{Document, NoteFrom, RefreshHint, TargetState, Unit},
    validation::validate_unit,
};

/// Result of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub document: Document,
    /// Developer-note markers consumed by this language; see
    /// [`language_comment::apply_strips`].
    pub comment_strips: Vec<CommentStrip>,
}

struct Context<'a> {
    settings: &'a RefreshSettings,
    same_language: bool,
    comment_code: Option<&'a str>,
}

impl Context<'_> {
    fn comment_for(&self, master_unit: &Unit) -> Option<LanguageComment> {
        self.comment_code
            .and_then(|code| language_comment::extract(master_unit.developer_note_text(), code))
    }

    fn new_hint(&self) -> RefreshHint {
        if self.same_language {
            RefreshHint::NewCopiedSource
        } else {
            RefreshHint::New
        }
    }
}

/// A unit placed in the output that a skip rule may still take out.
struct SkipCandidate {
    id: String,
    delta: ChangeReport,
    had_translation: bool,
}

/// Reconciles `target` against `master`.
///
/// With `sort_only` units are only aligned to master order: nothing is added
/// or updated, but suggestions and hint cleanup still run. Counters are
/// added to `report`.
pub fn reconcile(
    master: &Document,
    target: Document,
    settings: &RefreshSettings,
    maps: &SuggestionMaps,
    report: &mut ChangeReport,
    sort_only: bool,
) -> Result<Reconciled, Error> {
    if settings.strict {
        master.ensure_unique_ids("master document")?;
        target.ensure_unique_ids(&target.target_language)?;
    }

    let language = target.target_language.clone();
    let context = Context {
        settings,
        same_language: target.has_same_target_language(master),
        comment_code: settings.language.comment_code(&language),
    };
    let self_map = settings
        .use_self_matching
        .then(|| MatchMap::from_document(&target));

    let mut output = target.clone_without_units();
    let mut pool = target.units;
    let mut strips = Vec::new();
    let mut skip_candidates = Vec::new();

    for master_unit in master.units.iter().filter(|u| u.translate) {
        let skip_rule_applies = !sort_only
            && master_unit
                .role()
                .is_some_and(|role| settings.language.skips_role(&language, &role));
        let snapshot = skip_rule_applies.then(|| report.clone());

        let existing = pool
            .iter()
            .position(|u| u.id == master_unit.id)
            .map(|pos| pool.remove(pos));
        let had_translation = existing.as_ref().is_some_and(Unit::targets_have_text);

        let unit = match existing {
            Some(mut unit) => {
                if !sort_only {
                    update_unit(&mut unit, master_unit, &context, report, &mut strips);
                }
                unit
            }
            None if sort_only => continue,
            None => new_unit(master_unit, &context, report, &mut strips),
        };

        if let Some(snapshot) = snapshot {
            skip_candidates.push(SkipCandidate {
                id: unit.id.clone(),
                delta: report.delta(&snapshot),
                had_translation,
            });
        }
        output.units.push(unit);
    }
    report.add(Counter::RemovedUnits, pool.len());

    for candidate in skip_candidates {
        if settings.language.keep_translated_on_skip && candidate.had_translation {
            continue;
        }
        if let Some(pos) = output.units.iter().position(|u| u.id == candidate.id) {
            output.units.remove(pos);
            strips.retain(|s| s.unit_id != candidate.id);
            report.subtract(&candidate.delta);
        }
    }

    let mut maps_for_language: Vec<&MatchMap> = maps.for_language(&language).iter().collect();
    if let Some(self_map) = &self_map {
        maps_for_language.push(self_map);
    }
    let suggestions = apply_suggestions(&mut output, &maps_for_language, settings);
    report.add(Counter::SuggestionsAdded, suggestions);

    report.add(Counter::RemovedNotes, clean_stale_hints(&mut output, settings));

    for unit in &output.units {
        if settings.mode.needs_translation(unit) {
            report.increment(Counter::NeedsTranslationTotal);
        } else if settings.mode.needs_review(unit) {
            report.increment(Counter::NeedsReviewTotal);
        }
    }

    Ok(Reconciled {
        document: output,
        comment_strips: strips,
    })
}

/// Targets that hold nothing at all: no text, no token, no state.
fn targets_are_blank(unit: &Unit) -> bool {
    unit.targets
        .iter()
        .all(|t| !t.has_content() && t.token.is_none() && t.state.is_none())
}

fn update_unit(
    unit: &mut Unit,
    master_unit: &Unit,
    context: &Context,
    report: &mut ChangeReport,
    strips: &mut Vec<CommentStrip>,
) {
    let settings = context.settings;
    let mode = settings.mode;
    let comment = context.comment_for(master_unit);
    mode.format_unit(unit);
    let was_pending = unit.needs_review(true);

    let needs_new_target = !unit.has_targets()
        || (!master_unit.source.is_empty() && targets_are_blank(unit));
    if needs_new_target && comment.is_none() {
        unit.targets = vec![mode.new_target(&master_unit.source, context.same_language)];
        if !master_unit.source.is_empty() {
            unit.insert_refresh_hint(context.new_hint().as_str());
        }
        report.increment(Counter::Added);
    }

    if unit.source != master_unit.source {
        if context.same_language && unit.has_targets() && unit.target_matches_source() {
            if let Some(target) = unit.target_mut() {
                target.text = master_unit.source.clone();
            }
        } else if !master_unit.source.is_empty() {
            if let Some(target) = unit.target_mut() {
                mode.mark_source_changed(target, settings.clear_target_when_source_changed);
            }
            unit.insert_refresh_hint(RefreshHint::ModifiedSource.as_str());
        }
        unit.source = master_unit.source.clone();
        report.increment(Counter::UpdatedSources);
    }

    if mode.policy().syncs_size_constraints {
        if unit.max_width != master_unit.max_width {
            unit.max_width = master_unit.max_width;
            report.increment(Counter::UpdatedMaxWidths);
        }
        unit.size_unit = master_unit.size_unit;
    }

    let developer_note = master_unit.developer_note().map(|note| {
        let mut note = note.clone();
        if let Some(comment) = &comment {
            note.text = comment.stripped_note.clone();
        }
        note
    });
    if unit.sync_note(&NoteFrom::Developer, developer_note.as_ref()) {
        report.increment(Counter::UpdatedNotes);
    }
    if unit.sync_note(&NoteFrom::XliffGenerator, master_unit.generator_note()) {
        report.increment(Counter::UpdatedNotes);
    }

    if let Some(comment) = comment {
        apply_comment(unit, master_unit, &comment, context, strips);
    }

    finish_unit(unit, context, report, was_pending);
}

fn new_unit(
    master_unit: &Unit,
    context: &Context,
    report: &mut ChangeReport,
    strips: &mut Vec<CommentStrip>,
) -> Unit {
    let mut unit = master_unit.clone();
    unit.targets.clear();
    unit.remove_refresh_hint();

    match context.comment_for(master_unit) {
        Some(comment) => {
            if let Some(note) = unit.notes.iter_mut().find(|n| n.from == NoteFrom::Developer) {
                note.text = comment.stripped_note.clone();
            }
            apply_comment(&mut unit, master_unit, &comment, context, strips);
        }
        None => {
            unit.targets
                .push(context.settings.mode.new_target(&unit.source, context.same_language));
            if !unit.source.is_empty() {
                unit.insert_refresh_hint(context.new_hint().as_str());
            }
        }
    }

    finish_unit(&mut unit, context, report, false);
    report.increment(Counter::Added);
    unit
}

/// Takes the translation from the developer note as the finished target.
fn apply_comment(
    unit: &mut Unit,
    master_unit: &Unit,
    comment: &LanguageComment,
    context: &Context,
    strips: &mut Vec<CommentStrip>,
) {
    let accepted = context.settings.mode.accepted_target(&comment.translation);
    if unit.targets.len() != 1 || unit.targets[0] != accepted {
        unit.targets = vec![accepted];
    }
    unit.remove_refresh_hint();
    if let Some(code) = context.comment_code {
        strips.push(CommentStrip {
            unit_id: master_unit.id.clone(),
            code: code.to_string(),
        });
    }
}

/// Counts a review only when the unit was not already waiting for one.
fn finish_unit(unit: &mut Unit, context: &Context, report: &mut ChangeReport, was_pending: bool) {
    context.settings.mode.format_unit(unit);
    validate_unit(unit, context.settings);
    if !was_pending && unit.needs_review(true) {
        report.increment(Counter::ReviewsAdded);
    }
}

/// Drops refresh hints from units whose target is settled.
///
/// Returns the number of hints removed.
fn clean_stale_hints(document: &mut Document, settings: &RefreshSettings) -> usize {
    let promotes = settings.mode.policy().promotes_on_cleanup;
    let mut removed = 0;
    for unit in document.units.iter_mut().filter(|u| u.has_refresh_hint()) {
        let settled = unit.target().is_some_and(|t| {
            (t.token.is_none() && t.state.is_none()) || t.state.is_some_and(TargetState::is_accepted)
        });
        if !settled {
            continue;
        }
        unit.remove_refresh_hint();
        if promotes {
            if let Some(target) = unit.target_mut() {
                if matches!(target.state, None | Some(TargetState::Translated)) {
                    target.state = Some(TargetState::Translated);
                    target.state_qualifier = None;
                }
            }
        }
        removed += 1;
    }
    removed
}
