//! Counters describing what a refresh changed.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

/// One named counter of a [`ChangeReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Added,
    UpdatedMaxWidths,
    UpdatedNotes,
    RemovedNotes,
    UpdatedSources,
    RemovedUnits,
    SuggestionsAdded,
    ReviewsAdded,
    CheckedFiles,
    /// Units still waiting for a first translation after the run.
    NeedsTranslationTotal,
    /// Units still waiting for review after the run.
    NeedsReviewTotal,
}

impl Counter {
    pub const ALL: [Counter; 11] = [
        Counter::Added,
        Counter::UpdatedMaxWidths,
        Counter::UpdatedNotes,
        Counter::RemovedNotes,
        Counter::UpdatedSources,
        Counter::RemovedUnits,
        Counter::SuggestionsAdded,
        Counter::ReviewsAdded,
        Counter::CheckedFiles,
        Counter::NeedsTranslationTotal,
        Counter::NeedsReviewTotal,
    ];

    /// Wording used in the summary line; `None` for counters left out of it.
    fn label(self) -> Option<&'static str> {
        match self {
            Counter::Added => Some("inserted translations"),
            Counter::UpdatedMaxWidths => Some("updated maxwidth"),
            Counter::UpdatedNotes => Some("updated notes"),
            Counter::RemovedNotes => Some("removed notes"),
            Counter::UpdatedSources => Some("updated sources"),
            Counter::RemovedUnits => Some("removed translations"),
            Counter::SuggestionsAdded => Some("added suggestions"),
            Counter::ReviewsAdded => Some("targets marked as in need of review"),
            Counter::CheckedFiles | Counter::NeedsTranslationTotal | Counter::NeedsReviewTotal => {
                None
            }
        }
    }

    /// Counts the state of the output rather than a change to it.
    pub fn is_total(self) -> bool {
        matches!(
            self,
            Counter::CheckedFiles | Counter::NeedsTranslationTotal | Counter::NeedsReviewTotal
        )
    }
}

/// A set of named counters.
///
/// Missing counters read as zero. Snapshots are plain clones; [`delta`]
/// and [`subtract`] work field by field over every counter.
///
/// [`delta`]: ChangeReport::delta
/// [`subtract`]: ChangeReport::subtract
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeReport {
    counters: BTreeMap<Counter, usize>,
    /// Named in the summary when no files were counted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_name: Option<String>,
}

impl ChangeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, counter: Counter) -> usize {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counter, amount: usize) {
        if amount > 0 {
            *self.counters.entry(counter).or_insert(0) += amount;
        }
    }

    /// What changed since `earlier`, counter by counter, never below zero.
    pub fn delta(&self, earlier: &ChangeReport) -> ChangeReport {
        let mut delta = ChangeReport::new();
        for counter in Counter::ALL {
            delta.add(counter, self.get(counter).saturating_sub(earlier.get(counter)));
        }
        delta
    }

    /// Takes `other` away from these counters, never below zero.
    pub fn subtract(&mut self, other: &ChangeReport) {
        for counter in Counter::ALL {
            let value = self.get(counter).saturating_sub(other.get(counter));
            if value == 0 {
                self.counters.remove(&counter);
            } else {
                self.counters.insert(counter, value);
            }
        }
    }

    /// Adds all counters of `other`.
    pub fn merge(&mut self, other: &ChangeReport) {
        for counter in Counter::ALL {
            self.add(counter, other.get(counter));
        }
    }

    /// Whether anything other than the totals is non-zero.
    pub fn is_changed(&self) -> bool {
        Counter::ALL
            .iter()
            .filter(|c| !c.is_total())
            .any(|c| self.get(*c) > 0)
    }

    /// Non-zero counters as `(counter, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Counter, usize)> + '_ {
        self.counters.iter().map(|(c, v)| (*c, *v))
    }

    /// One human-readable line, zero counters omitted.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = Counter::ALL
            .iter()
            .filter_map(|c| c.label().map(|label| (self.get(*c), label)))
            .filter(|(value, _)| *value > 0)
            .map(|(value, label)| format!("{} {}", value, label))
            .collect();
        let mut message = if parts.is_empty() {
            "Nothing changed".to_string()
        } else {
            parts.join(", ")
        };
        let checked = self.get(Counter::CheckedFiles);
        if checked > 0 {
            message.push_str(&format!(" in {} XLF files", checked));
        } else if let Some(file_name) = &self.file_name {
            message.push_str(&format!(" in {}", file_name));
        }
        message
    }
}

impl Display for ChangeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}
