//! Tab-separated review export of a translation document.

use std::{io::Write, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    types::{Document, Unit},
};

/// Which units are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFilter {
    #[default]
    All,
    /// Units carrying a token, a refresh hint or (when states are checked)
    /// a state that needs action.
    NeedsReview,
}

impl FromStr for ExportFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ExportFilter::All),
            "needs-review" | "in-need-of-review" => Ok(ExportFilter::NeedsReview),
            _ => Err(format!("Unknown export filter: {} (expected all or needs-review)", s)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReviewRecord<'a> {
    #[serde(rename = "Id")]
    id: &'a str,
    #[serde(rename = "Source")]
    source: &'a str,
    #[serde(rename = "Target")]
    target: &'a str,
    #[serde(rename = "Developer Note")]
    developer_note: &'a str,
    #[serde(rename = "Max Length")]
    max_length: String,
    #[serde(rename = "Comment")]
    comment: &'a str,
    #[serde(rename = "Xliff Generator Note")]
    generator_note: &'a str,
    #[serde(rename = "NAB AL Tool Refresh Xlf")]
    refresh_hint: &'a str,
    #[serde(rename = "State")]
    state: &'static str,
    #[serde(rename = "State Qualifier")]
    state_qualifier: &'static str,
}

fn checked<'a>(value: &'a str, column: &str, unit: &Unit) -> Result<&'a str, Error> {
    if value.contains(['\t', '\n', '\r']) {
        return Err(Error::validation_error(format!(
            "The value of {} in trans-unit with id '{}' has invalid characters (tabs or newlines).",
            column, unit.id
        )));
    }
    Ok(value)
}

impl<'a> ReviewRecord<'a> {
    fn from_unit(unit: &'a Unit) -> Result<Self, Error> {
        let target = unit.target();
        Ok(ReviewRecord {
            id: checked(&unit.id, "Id", unit)?,
            source: checked(&unit.source, "Source", unit)?,
            target: checked(unit.target_text(), "Target", unit)?,
            developer_note: checked(unit.developer_note_text(), "Developer Note", unit)?,
            max_length: unit.max_width.map(|w| w.to_string()).unwrap_or_default(),
            comment: "",
            generator_note: checked(unit.generator_note_text(), "Xliff Generator Note", unit)?,
            refresh_hint: checked(
                unit.refresh_hint().unwrap_or(""),
                "NAB AL Tool Refresh Xlf",
                unit,
            )?,
            state: target.and_then(|t| t.state).map(|s| s.as_str()).unwrap_or(""),
            state_qualifier: target
                .and_then(|t| t.state_qualifier)
                .map(|q| q.as_str())
                .unwrap_or(""),
        })
    }
}

/// Writes the review sheet for `document`. Returns the number of rows.
///
/// `check_state` makes target states count for [`ExportFilter::NeedsReview`].
pub fn export_review_tsv<W: Write>(
    document: &Document,
    filter: ExportFilter,
    check_state: bool,
    writer: W,
) -> Result<usize, Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    let mut rows = 0;
    for unit in &document.units {
        if filter == ExportFilter::NeedsReview && !unit.needs_review(check_state) {
            continue;
        }
        wtr.serialize(ReviewRecord::from_unit(unit)?)?;
        rows += 1;
    }
    if rows == 0 {
        wtr.write_record([
            "Id",
            "Source",
            "Target",
            "Developer Note",
            "Max Length",
            "Comment",
            "Xliff Generator Note",
            "NAB AL Tool Refresh Xlf",
            "State",
            "State Qualifier",
        ])?;
    }
    wtr.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NoteFrom, Target, TargetState, TranslationToken};

    fn sample() -> Document {
        let mut doc = Document::new("en-US", "sv-SE", "App");
        doc.units.push(
            Unit::new("A", "Name")
                .with_target(Target::new("Namn"))
                .with_max_width(Some(30), None)
                .with_note(NoteFrom::Developer, 2, "card caption"),
        );
        let mut pending = Unit::new("B", "Date")
            .with_target(Target::new("").with_token(Some(TranslationToken::NotTranslated)));
        pending.insert_refresh_hint("New translation.");
        doc.units.push(pending);
        doc.units.push(
            Unit::new("C", "Amount")
                .with_target(Target::new("Belopp").with_state(Some(TargetState::NeedsReviewL10n))),
        );
        doc
    }

    fn export(doc: &Document, filter: ExportFilter, check_state: bool) -> (usize, String) {
        let mut out = Vec::new();
        let rows = export_review_tsv(doc, filter, check_state, &mut out).unwrap();
        (rows, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_export_all() {
        let (rows, text) = export(&sample(), ExportFilter::All, false);
        assert_eq!(rows, 3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Id\tSource\tTarget\tDeveloper Note\tMax Length\tComment\tXliff Generator Note\tNAB AL Tool Refresh Xlf\tState\tState Qualifier"
        );
        assert_eq!(lines[1], "A\tName\tNamn\tcard caption\t30\t\t\t\t\t");
        assert_eq!(lines[2], "B\tDate\t\t\t\t\t\tNew translation.\t\t");
        assert_eq!(lines[3], "C\tAmount\tBelopp\t\t\t\t\t\tneeds-review-l10n\t");
    }

    #[test]
    fn test_needs_review_filter() {
        let (rows, _) = export(&sample(), ExportFilter::NeedsReview, false);
        assert_eq!(rows, 1);
        let (rows, text) = export(&sample(), ExportFilter::NeedsReview, true);
        assert_eq!(rows, 2);
        assert!(text.contains("needs-review-l10n"));
    }

    #[test]
    fn test_rejects_tabs_and_newlines() {
        let mut doc = sample();
        doc.units[0].source = "Line\nbreak".to_string();
        let err = export_review_tsv(&doc, ExportFilter::All, false, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("trans-unit with id 'A'"));
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("Needs-Review".parse(), Ok(ExportFilter::NeedsReview));
        assert!("some".parse::<ExportFilter>().is_err());
    }
}
