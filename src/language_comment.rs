//! Translations written inline in developer notes, e.g.
//! `Shown on the card, DEU="Auf der Karte", SVE="På kortet"`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Document, NoteFrom};

/// What [`extract`] found for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageComment {
    /// The note with this language's marker and its separator removed.
    pub stripped_note: String,
    pub translation: String,
}

/// A marker to remove from the master's developer note once the batch is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentStrip {
    pub unit_id: String,
    pub code: String,
}

lazy_static! {
    static ref LANGUAGE_MARKER: Regex =
        Regex::new(r#"(?:^|[\s,]+)(?P<code>\w+)="(?P<text>[^"]*)""#).unwrap();
}

/// Looks for `CODE="text"` in `note`. The note itself is not changed.
pub fn extract(note: &str, code: &str) -> Option<LanguageComment> {
    if code.is_empty() {
        return None;
    }
    let captures = LANGUAGE_MARKER
        .captures_iter(note)
        .find(|c| c.name("code").is_some_and(|m| m.as_str() == code))?;
    let whole = captures.get(0)?;
    let translation = captures.name("text")?.as_str().to_string();

    let mut stripped = String::with_capacity(note.len());
    stripped.push_str(&note[..whole.start()]);
    let rest = &note[whole.end()..];
    if whole.start() == 0 {
        stripped.push_str(rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace()));
    } else {
        stripped.push_str(rest);
    }
    let stripped_note = stripped
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string();

    Some(LanguageComment {
        stripped_note,
        translation,
    })
}

/// Removes the recorded markers from `master`'s developer notes.
///
/// Returns the number of notes changed.
pub fn apply_strips(master: &mut Document, strips: &[CommentStrip]) -> usize {
    let mut changed = 0;
    for strip in strips {
        let Some(unit) = master.unit_mut(&strip.unit_id) else {
            continue;
        };
        let Some(comment) = extract(unit.developer_note_text(), &strip.code) else {
            continue;
        };
        if let Some(note) = unit.notes.iter_mut().find(|n| n.from == NoteFrom::Developer) {
            note.text = comment.stripped_note;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;

    #[test]
    fn test_extract_single_marker() {
        let comment = extract(r#"DEU="Die %1 muss 3 Ziffern enthalten.""#, "DEU").unwrap();
        assert_eq!(comment.translation, "Die %1 muss 3 Ziffern enthalten.");
        assert_eq!(comment.stripped_note, "");
    }

    #[test]
    fn test_extract_among_other_text() {
        let note = r#"Shown on the card, DEU="Auf der Karte", SVE="På kortet""#;
        let de = extract(note, "DEU").unwrap();
        assert_eq!(de.translation, "Auf der Karte");
        assert_eq!(de.stripped_note, r#"Shown on the card, SVE="På kortet""#);

        let sv = extract(note, "SVE").unwrap();
        assert_eq!(sv.translation, "På kortet");
        assert_eq!(sv.stripped_note, r#"Shown on the card, DEU="Auf der Karte""#);
    }

    #[test]
    fn test_marker_first() {
        let comment = extract(r#"DEU="Hallo", SVE="Hej""#, "DEU").unwrap();
        assert_eq!(comment.stripped_note, r#"SVE="Hej""#);
    }

    #[test]
    fn test_skips_markers_of_other_codes() {
        let note = r#"Caption="x" ENU="Hi" DEU="Hallo""#;
        let comment = extract(note, "DEU").unwrap();
        assert_eq!(comment.translation, "Hallo");
        assert_eq!(comment.stripped_note, r#"Caption="x" ENU="Hi""#);
        assert_eq!(extract(note, "ENU").unwrap().stripped_note, r#"Caption="x" DEU="Hallo""#);
    }

    #[test]
    fn test_no_marker() {
        assert!(extract("Just a comment", "DEU").is_none());
        assert!(extract(r#"XDEU="nope""#, "DEU").is_none());
        assert!(extract(r#"DEU="x""#, "").is_none());
    }

    #[test]
    fn test_apply_strips_handles_several_languages() {
        let mut master = Document::new("en-US", "en-US", "App.g.xlf");
        master.units.push(Unit::new("A", "Hello").with_note(
            NoteFrom::Developer,
            2,
            r#"Greeting, DEU="Hallo", SVE="Hej""#,
        ));
        let strips = vec![
            CommentStrip {
                unit_id: "A".to_string(),
                code: "DEU".to_string(),
            },
            CommentStrip {
                unit_id: "A".to_string(),
                code: "SVE".to_string(),
            },
            CommentStrip {
                unit_id: "missing".to_string(),
                code: "DEU".to_string(),
            },
        ];
        assert_eq!(apply_strips(&mut master, &strips), 2);
        assert_eq!(master.units[0].developer_note_text(), "Greeting");
    }
}
