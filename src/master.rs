//! Updating the master document from freshly extracted units.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    report::{ChangeReport, Counter},
    types::{Document, Note, NoteFrom, SizeUnit, Unit},
};

/// A translatable string as produced by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedUnit {
    pub id: String,
    pub source: String,
    #[serde(default = "default_translate")]
    pub translate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_unit: Option<SizeUnit>,
    #[serde(default)]
    pub notes: Vec<ExtractedNote>,
}

fn default_translate() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedNote {
    pub from: String,
    pub priority: i32,
    #[serde(default)]
    pub text: String,
}

impl ExtractedUnit {
    fn notes(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .map(|n| Note::new(NoteFrom::from(n.from.as_str()), n.priority, &n.text))
            .collect();
        notes.sort_by_key(|n| n.priority);
        notes
    }

    fn to_unit(&self) -> Unit {
        let mut unit = Unit::new(&self.id, &self.source)
            .with_translate(self.translate)
            .with_max_width(self.max_width, self.size_unit);
        unit.notes = self.notes();
        unit
    }
}

/// Reads a JSON array of [`ExtractedUnit`].
pub fn load_extracted_units<P: AsRef<Path>>(path: P) -> Result<Vec<ExtractedUnit>, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::Io(e).in_file(path))?;
    serde_json::from_str(&text)
        .map_err(|e| Error::InvalidResource(format!("{}: {}", path.display(), e)))
}

/// Applies extracted units to the master document.
///
/// Existing units that are no longer translatable are removed; others get
/// source, max width, notes, size unit and translate flag from the record.
/// New translatable units are appended.
pub fn update_master(master: &mut Document, records: &[ExtractedUnit]) -> ChangeReport {
    let mut report = ChangeReport::new();
    for record in records {
        let Some(pos) = master.units.iter().position(|u| u.id == record.id) else {
            if record.translate {
                master.units.push(record.to_unit());
                report.increment(Counter::Added);
            }
            continue;
        };

        if !record.translate {
            master.units.retain(|u| u.id != record.id);
            report.increment(Counter::RemovedUnits);
            continue;
        }

        let unit = &mut master.units[pos];
        if unit.source != record.source {
            unit.source = record.source.clone();
            report.increment(Counter::UpdatedSources);
        }
        if unit.max_width != record.max_width {
            unit.max_width = record.max_width;
            report.increment(Counter::UpdatedMaxWidths);
        }
        let notes = record.notes();
        if unit.notes != notes {
            unit.notes = notes;
            report.increment(Counter::UpdatedNotes);
        }
        unit.size_unit = record.size_unit;
        unit.translate = record.translate;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, source: &str) -> ExtractedUnit {
        ExtractedUnit {
            id: id.to_string(),
            source: source.to_string(),
            translate: true,
            max_width: None,
            size_unit: Some(SizeUnit::Char),
            notes: vec![ExtractedNote {
                from: "Xliff Generator".to_string(),
                priority: 3,
                text: "Table T - Field F - Property Caption".to_string(),
            }],
        }
    }

    #[test]
    fn test_update_master() {
        let mut master = Document::new("en-US", "en-US", "App");
        master.units.push(record("A", "Old").to_unit());
        master.units.push(record("B", "Gone").to_unit());

        let mut hidden = record("B", "Gone");
        hidden.translate = false;
        let mut wider = record("A", "New");
        wider.max_width = Some(20);
        let records = vec![wider, hidden, record("C", "Added"), {
            let mut r = record("D", "Locked");
            r.translate = false;
            r
        }];

        let report = update_master(&mut master, &records);
        let ids: Vec<&str> = master.units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(master.units[0].source, "New");
        assert_eq!(master.units[0].max_width, Some(20));
        assert_eq!(report.get(Counter::UpdatedSources), 1);
        assert_eq!(report.get(Counter::UpdatedMaxWidths), 1);
        assert_eq!(report.get(Counter::RemovedUnits), 1);
        assert_eq!(report.get(Counter::Added), 1);
        assert_eq!(report.get(Counter::UpdatedNotes), 0);
    }

    #[test]
    fn test_parse_records() {
        let json = r#"[{"id": "Table 1 - Field 2 - Property 3", "source": "Name",
            "size_unit": "char",
            "notes": [{"from": "Developer", "priority": 2, "text": "shown on card"}]}]"#;
        let records: Vec<ExtractedUnit> = serde_json::from_str(json).unwrap();
        assert!(records[0].translate);
        let unit = records[0].to_unit();
        assert_eq!(unit.developer_note_text(), "shown on card");
        assert_eq!(unit.size_unit, Some(SizeUnit::Char));
    }
}
