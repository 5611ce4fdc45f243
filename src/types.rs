//! Core document model for XLIFF 1.2 translation files.
//! The codec decodes into these types; the reconciliation engine works on them.

use std::{collections::HashSet, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    match_map::MatchMap,
    xliff_id::{UnitKind, XliffIdToken},
};

/// `from` value of the notes the refresh engine writes.
pub const REFRESH_HINT_NOTE: &str = "NAB AL Tool Refresh Xlf";
pub const DEVELOPER_NOTE: &str = "Developer";
pub const GENERATOR_NOTE: &str = "Xliff Generator";

/// Priority the engine gives its own notes.
pub const REFRESH_HINT_PRIORITY: i32 = 3;

/// Texts of the refresh hint note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshHint {
    New,
    NewCopiedSource,
    ModifiedSource,
    Suggestion,
}

impl RefreshHint {
    pub fn as_str(self) -> &'static str {
        match self {
            RefreshHint::New => "New translation.",
            RefreshHint::NewCopiedSource => "New translation. Target copied from source.",
            RefreshHint::ModifiedSource => "Source has been modified.",
            RefreshHint::Suggestion => "Suggested translation inserted.",
        }
    }
}

/// Line ending style of a document, detected on parse and kept on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Looks at the first line break only.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(pos) if pos > 0 && text.as_bytes()[pos - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }
}

/// `<header><tool>` of a `<file>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tool {
    pub tool_id: String,
    pub tool_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_company: Option<String>,
}

/// One XLIFF file: file-level metadata plus its ordered trans-units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub datatype: String,
    pub source_language: String,
    pub target_language: String,
    /// Original-file identifier (`original` attribute).
    pub original: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub product_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub build_num: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool: Option<Tool>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl Document {
    pub fn new(source_language: &str, target_language: &str, original: &str) -> Self {
        Document {
            datatype: "xml".to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            original: original.to_string(),
            tool_id: None,
            product_name: None,
            product_version: None,
            build_num: None,
            request_id: None,
            tool: None,
            units: Vec::new(),
            line_ending: LineEnding::default(),
        }
    }

    /// Looks up a unit by id.
    ///
    /// When ids are duplicated only the first unit is reachable; use
    /// [`Document::ensure_unique_ids`] to reject such documents up front.
    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: &str) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn has_unit(&self, id: &str) -> bool {
        self.unit(id).is_some()
    }

    /// All units whose source text equals `source` exactly.
    pub fn units_by_source(&self, source: &str) -> Vec<&Unit> {
        self.units.iter().filter(|u| u.source == source).collect()
    }

    pub fn source_has_duplicates(&self, source: &str) -> bool {
        self.units_by_source(source).len() > 1
    }

    /// Source → translations, for units that have target text.
    pub fn translation_map(&self) -> MatchMap {
        let mut map = MatchMap::new();
        for unit in &self.units {
            if let Some(target) = unit.targets.iter().find(|t| t.has_content()) {
                map.insert(&unit.source, &target.text);
            }
        }
        map
    }

    /// Copies the file-level metadata into a new document without any units.
    pub fn clone_without_units(&self) -> Self {
        Document {
            datatype: self.datatype.clone(),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            original: self.original.clone(),
            tool_id: self.tool_id.clone(),
            product_name: self.product_name.clone(),
            product_version: self.product_version.clone(),
            build_num: self.build_num.clone(),
            request_id: self.request_id.clone(),
            tool: self.tool.clone(),
            units: Vec::new(),
            line_ending: self.line_ending,
        }
    }

    /// Presentation-only ordering; reconciliation never calls this.
    pub fn sort_units_by_id(&mut self) {
        self.units.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// Ids that occur more than once, in document order of their second occurrence.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for unit in &self.units {
            if !seen.insert(unit.id.as_str()) && !duplicates.contains(&unit.id.as_str()) {
                duplicates.push(unit.id.as_str());
            }
        }
        duplicates
    }

    /// Strict-mode check: fails on the first duplicated id.
    pub fn ensure_unique_ids(&self, name: &str) -> Result<(), Error> {
        match self.duplicate_ids().first() {
            Some(id) => Err(Error::DuplicateId {
                id: id.to_string(),
                document: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Whether this document translates into the same language as `other`.
    ///
    /// Tags are compared as language identifiers when both parse, otherwise
    /// as case-insensitive strings.
    pub fn has_same_target_language(&self, other: &Document) -> bool {
        same_language(&self.target_language, &other.target_language)
    }
}

/// Compares two language tags.
pub fn same_language(a: &str, b: &str) -> bool {
    match (a.parse::<LanguageIdentifier>(), b.parse::<LanguageIdentifier>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.eq_ignore_ascii_case(b),
    }
}

/// One `<trans-unit>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Structural id, e.g. `Table 123 - Field 456 - Property 789`.
    pub id: String,
    pub translate: bool,
    pub source: String,
    /// Usually zero or one; several while suggestions await a choice.
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size_unit: Option<SizeUnit>,
    #[serde(default = "default_xml_space")]
    pub xml_space: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub al_object_target: Option<String>,
}

fn default_xml_space() -> String {
    "preserve".to_string()
}

impl Unit {
    /// A translatable unit with no targets and no notes.
    pub fn new(id: &str, source: &str) -> Self {
        Unit {
            id: id.to_string(),
            translate: true,
            source: source.to_string(),
            targets: Vec::new(),
            notes: Vec::new(),
            size_unit: None,
            xml_space: default_xml_space(),
            max_width: None,
            al_object_target: None,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_note(mut self, from: NoteFrom, priority: i32, text: &str) -> Self {
        self.notes.push(Note::new(from, priority, text));
        self.sort_notes();
        self
    }

    pub fn with_translate(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_max_width(mut self, max_width: Option<u32>, size_unit: Option<SizeUnit>) -> Self {
        self.max_width = max_width;
        self.size_unit = size_unit;
        self
    }

    /// The first target, which carries the unit's translation state.
    pub fn target(&self) -> Option<&Target> {
        self.targets.first()
    }

    pub fn target_mut(&mut self) -> Option<&mut Target> {
        self.targets.first_mut()
    }

    /// Text of the first target, empty when there is none.
    pub fn target_text(&self) -> &str {
        self.target().map(|t| t.text.as_str()).unwrap_or("")
    }

    pub fn token(&self) -> Option<TranslationToken> {
        self.target().and_then(|t| t.token)
    }

    pub fn state(&self) -> Option<TargetState> {
        self.target().and_then(|t| t.state)
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn targets_have_text(&self) -> bool {
        self.targets.iter().any(Target::has_content)
    }

    pub fn target_matches_source(&self) -> bool {
        self.target_text() == self.source
    }

    /// True when the source holds nothing but white-space.
    pub fn source_is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    pub fn target_is_empty(&self) -> bool {
        self.target_text().trim().is_empty()
    }

    pub fn note(&self, from: &NoteFrom) -> Option<&Note> {
        self.notes.iter().find(|n| &n.from == from)
    }

    pub fn developer_note(&self) -> Option<&Note> {
        self.note(&NoteFrom::Developer)
    }

    pub fn developer_note_text(&self) -> &str {
        self.developer_note().map(|n| n.text.as_str()).unwrap_or("")
    }

    pub fn generator_note(&self) -> Option<&Note> {
        self.note(&NoteFrom::XliffGenerator)
    }

    pub fn generator_note_text(&self) -> &str {
        self.generator_note().map(|n| n.text.as_str()).unwrap_or("")
    }

    /// Replaces (or inserts, or removes when `note` is `None`) the note of
    /// `from`'s kind. Returns whether anything changed.
    pub fn sync_note(&mut self, from: &NoteFrom, note: Option<&Note>) -> bool {
        let position = self.notes.iter().position(|n| &n.from == from);
        match (position, note) {
            (Some(pos), Some(note)) => {
                if self.notes[pos].text == note.text {
                    return false;
                }
                self.notes[pos].text = note.text.clone();
            }
            (Some(pos), None) => {
                self.notes.remove(pos);
            }
            (None, Some(note)) => {
                self.notes.push(note.clone());
                self.sort_notes();
            }
            (None, None) => return false,
        }
        true
    }

    /// Inserts the engine's refresh hint, replacing any previous one.
    pub fn insert_refresh_hint(&mut self, text: &str) {
        self.remove_refresh_hint();
        self.notes.insert(
            0,
            Note::new(NoteFrom::RefreshHint, REFRESH_HINT_PRIORITY, text),
        );
        self.sort_notes();
    }

    pub fn remove_refresh_hint(&mut self) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.from != NoteFrom::RefreshHint);
        before != self.notes.len()
    }

    pub fn refresh_hint(&self) -> Option<&str> {
        self.note(&NoteFrom::RefreshHint).map(|n| n.text.as_str())
    }

    pub fn has_refresh_hint(&self) -> bool {
        self.refresh_hint().is_some()
    }

    /// Whether a human should look at this unit: it carries a token, a
    /// refresh hint, or (when `check_state`) a state that needs action.
    pub fn needs_review(&self, check_state: bool) -> bool {
        self.token().is_some()
            || self.has_refresh_hint()
            || (check_state && self.state().is_some_and(|s| !s.is_accepted()))
    }

    /// Id tokens with names from the generator note, `None` without that note.
    pub fn xliff_id_tokens(&self) -> Option<Vec<XliffIdToken>> {
        self.generator_note()
            .map(|note| XliffIdToken::parse(&self.id, &note.text))
    }

    pub fn kind(&self) -> Option<UnitKind> {
        self.xliff_id_tokens()
            .map(|tokens| UnitKind::from_tokens(&tokens))
    }

    /// Structural role used by skip rules, e.g. `ToolTip` or `Label`.
    pub fn role(&self) -> Option<String> {
        self.xliff_id_tokens()
            .and_then(|tokens| tokens.last().map(XliffIdToken::role))
    }

    /// Notes are kept ordered by ascending priority; the sort is stable.
    pub fn sort_notes(&mut self) {
        self.notes.sort_by_key(|n| n.priority);
    }
}

/// One `<target>` rendering of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Target {
    /// Text without any translation token.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<TargetState>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state_qualifier: Option<StateQualifier>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token: Option<TranslationToken>,
}

impl Target {
    /// A plain target without token or state.
    pub fn new(text: &str) -> Self {
        Target {
            text: text.to_string(),
            ..Target::default()
        }
    }

    /// Builds a target from raw element text, splitting off a leading token.
    pub fn from_text(raw: &str) -> Self {
        let (token, text) = TranslationToken::split(raw);
        Target {
            text: text.to_string(),
            token,
            ..Target::default()
        }
    }

    pub fn with_state(mut self, state: Option<TargetState>) -> Self {
        self.state = state;
        self
    }

    pub fn with_qualifier(mut self, state_qualifier: Option<StateQualifier>) -> Self {
        self.state_qualifier = state_qualifier;
        self
    }

    pub fn with_token(mut self, token: Option<TranslationToken>) -> Self {
        self.token = token;
        self
    }

    pub fn has_content(&self) -> bool {
        !self.text.is_empty()
    }

    /// The element text as written to file: token followed by text.
    pub fn raw_text(&self) -> String {
        match self.token {
            Some(token) => format!("{}{}", token.as_str(), self.text),
            None => self.text.clone(),
        }
    }

    /// A token, or a state that is not accepted, marks work in progress.
    pub fn is_in_progress(&self) -> bool {
        self.token.is_some() || self.state.is_some_and(|s| !s.is_accepted())
    }
}

/// Who wrote a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteFrom {
    Developer,
    XliffGenerator,
    /// The engine's own "needs attention" breadcrumb.
    RefreshHint,
    /// Any other provenance, e.g. a language code.
    Other(String),
}

impl NoteFrom {
    pub fn as_str(&self) -> &str {
        match self {
            NoteFrom::Developer => DEVELOPER_NOTE,
            NoteFrom::XliffGenerator => GENERATOR_NOTE,
            NoteFrom::RefreshHint => REFRESH_HINT_NOTE,
            NoteFrom::Other(from) => from,
        }
    }
}

impl From<&str> for NoteFrom {
    fn from(value: &str) -> Self {
        match value {
            DEVELOPER_NOTE => NoteFrom::Developer,
            GENERATOR_NOTE => NoteFrom::XliffGenerator,
            REFRESH_HINT_NOTE => NoteFrom::RefreshHint,
            other => NoteFrom::Other(other.to_string()),
        }
    }
}

impl From<String> for NoteFrom {
    fn from(value: String) -> Self {
        NoteFrom::from(value.as_str())
    }
}

impl From<NoteFrom> for String {
    fn from(value: NoteFrom) -> Self {
        value.as_str().to_string()
    }
}

impl Display for NoteFrom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `<note>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub from: NoteFrom,
    pub annotates: String,
    /// Lower sorts first on serialization.
    pub priority: i32,
    pub text: String,
}

impl Note {
    pub fn new(from: NoteFrom, priority: i32, text: &str) -> Self {
        Note {
            from,
            annotates: "general".to_string(),
            priority,
            text: text.to_string(),
        }
    }
}

/// Inline markers used instead of states in tag mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationToken {
    NotTranslated,
    Suggestion,
    Review,
}

impl TranslationToken {
    pub const ALL: [TranslationToken; 3] = [
        TranslationToken::NotTranslated,
        TranslationToken::Suggestion,
        TranslationToken::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TranslationToken::NotTranslated => "[NAB: NOT TRANSLATED]",
            TranslationToken::Suggestion => "[NAB: SUGGESTION]",
            TranslationToken::Review => "[NAB: REVIEW]",
        }
    }

    /// Splits a leading token off `text`.
    pub fn split(text: &str) -> (Option<Self>, &str) {
        for token in Self::ALL {
            if let Some(rest) = text.strip_prefix(token.as_str()) {
                return (Some(token), rest);
            }
        }
        (None, text)
    }

    /// Whether `text` contains any token anywhere.
    pub fn contained_in(text: &str) -> bool {
        Self::ALL.iter().any(|t| text.contains(t.as_str()))
    }
}

/// XLIFF 1.2 `state` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    Final,
    NeedsAdaptation,
    NeedsL10n,
    NeedsReviewAdaptation,
    NeedsReviewL10n,
    NeedsReviewTranslation,
    NeedsTranslation,
    New,
    SignedOff,
    Translated,
}

impl TargetState {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetState::Final => "final",
            TargetState::NeedsAdaptation => "needs-adaptation",
            TargetState::NeedsL10n => "needs-l10n",
            TargetState::NeedsReviewAdaptation => "needs-review-adaptation",
            TargetState::NeedsReviewL10n => "needs-review-l10n",
            TargetState::NeedsReviewTranslation => "needs-review-translation",
            TargetState::NeedsTranslation => "needs-translation",
            TargetState::New => "new",
            TargetState::SignedOff => "signed-off",
            TargetState::Translated => "translated",
        }
    }

    /// translated, signed-off and final need no further action.
    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            TargetState::Translated | TargetState::SignedOff | TargetState::Final
        )
    }

    /// new and needs-translation: nothing has been translated yet.
    pub fn is_untranslated(self) -> bool {
        matches!(self, TargetState::New | TargetState::NeedsTranslation)
    }
}

impl FromStr for TargetState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "final" => Ok(TargetState::Final),
            "needs-adaptation" => Ok(TargetState::NeedsAdaptation),
            "needs-l10n" => Ok(TargetState::NeedsL10n),
            "needs-review-adaptation" => Ok(TargetState::NeedsReviewAdaptation),
            "needs-review-l10n" => Ok(TargetState::NeedsReviewL10n),
            "needs-review-translation" => Ok(TargetState::NeedsReviewTranslation),
            "needs-translation" => Ok(TargetState::NeedsTranslation),
            "new" => Ok(TargetState::New),
            "signed-off" => Ok(TargetState::SignedOff),
            "translated" => Ok(TargetState::Translated),
            _ => Err(format!("Unknown target state: {}", s)),
        }
    }
}

impl Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// XLIFF 1.2 `state-qualifier` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateQualifier {
    #[serde(rename = "x-microsoft-exact-match")]
    MsExactMatch,
    ExactMatch,
    FuzzyMatch,
    IdMatch,
    LeveragedGlossary,
    LeveragedInherited,
    #[serde(rename = "leveraged-mt")]
    LeveragedMt,
    LeveragedRepository,
    #[serde(rename = "leveraged-tm")]
    LeveragedTm,
    #[serde(rename = "mt-suggestion")]
    MtSuggestion,
    RejectedGrammar,
    RejectedInaccurate,
    RejectedLength,
    RejectedSpelling,
    #[serde(rename = "tm-suggestion")]
    TmSuggestion,
}

impl StateQualifier {
    pub fn as_str(self) -> &'static str {
        match self {
            StateQualifier::MsExactMatch => "x-microsoft-exact-match",
            StateQualifier::ExactMatch => "exact-match",
            StateQualifier::FuzzyMatch => "fuzzy-match",
            StateQualifier::IdMatch => "id-match",
            StateQualifier::LeveragedGlossary => "leveraged-glossary",
            StateQualifier::LeveragedInherited => "leveraged-inherited",
            StateQualifier::LeveragedMt => "leveraged-mt",
            StateQualifier::LeveragedRepository => "leveraged-repository",
            StateQualifier::LeveragedTm => "leveraged-tm",
            StateQualifier::MtSuggestion => "mt-suggestion",
            StateQualifier::RejectedGrammar => "rejected-grammar",
            StateQualifier::RejectedInaccurate => "rejected-inaccurate",
            StateQualifier::RejectedLength => "rejected-length",
            StateQualifier::RejectedSpelling => "rejected-spelling",
            StateQualifier::TmSuggestion => "tm-suggestion",
        }
    }

    pub fn is_exact_match(self) -> bool {
        matches!(self, StateQualifier::ExactMatch | StateQualifier::MsExactMatch)
    }
}

impl FromStr for StateQualifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x-microsoft-exact-match" => Ok(StateQualifier::MsExactMatch),
            "exact-match" => Ok(StateQualifier::ExactMatch),
            "fuzzy-match" => Ok(StateQualifier::FuzzyMatch),
            "id-match" => Ok(StateQualifier::IdMatch),
            "leveraged-glossary" => Ok(StateQualifier::LeveragedGlossary),
            "leveraged-inherited" => Ok(StateQualifier::LeveragedInherited),
            "leveraged-mt" => Ok(StateQualifier::LeveragedMt),
            "leveraged-repository" => Ok(StateQualifier::LeveragedRepository),
            "leveraged-tm" => Ok(StateQualifier::LeveragedTm),
            "mt-suggestion" => Ok(StateQualifier::MtSuggestion),
            "rejected-grammar" => Ok(StateQualifier::RejectedGrammar),
            "rejected-inaccurate" => Ok(StateQualifier::RejectedInaccurate),
            "rejected-length" => Ok(StateQualifier::RejectedLength),
            "rejected-spelling" => Ok(StateQualifier::RejectedSpelling),
            "tm-suggestion" => Ok(StateQualifier::TmSuggestion),
            _ => Err(format!("Unknown state qualifier: {}", s)),
        }
    }
}

impl Display for StateQualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// XLIFF 1.2 `size-unit` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Byte,
    Char,
    Col,
    Cm,
    Dlgunit,
    Em,
    Ex,
    Glyph,
    In,
    Mm,
    Percent,
    Pixel,
    Point,
    Row,
}

impl SizeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::Byte => "byte",
            SizeUnit::Char => "char",
            SizeUnit::Col => "col",
            SizeUnit::Cm => "cm",
            SizeUnit::Dlgunit => "dlgunit",
            SizeUnit::Em => "em",
            SizeUnit::Ex => "ex",
            SizeUnit::Glyph => "glyph",
            SizeUnit::In => "in",
            SizeUnit::Mm => "mm",
            SizeUnit::Percent => "percent",
            SizeUnit::Pixel => "pixel",
            SizeUnit::Point => "point",
            SizeUnit::Row => "row",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "byte" => Ok(SizeUnit::Byte),
            "char" => Ok(SizeUnit::Char),
            "col" => Ok(SizeUnit::Col),
            "cm" => Ok(SizeUnit::Cm),
            "dlgunit" => Ok(SizeUnit::Dlgunit),
            "em" => Ok(SizeUnit::Em),
            "ex" => Ok(SizeUnit::Ex),
            "glyph" => Ok(SizeUnit::Glyph),
            "in" => Ok(SizeUnit::In),
            "mm" => Ok(SizeUnit::Mm),
            "percent" => Ok(SizeUnit::Percent),
            "pixel" => Ok(SizeUnit::Pixel),
            "point" => Ok(SizeUnit::Point),
            "row" => Ok(SizeUnit::Row),
            _ => Err(format!("Unknown size unit: {}", s)),
        }
    }
}

impl Display for SizeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, source: &str, target: Option<&str>) -> Unit {
        let unit = Unit::new(id, source);
        match target {
            Some(text) => unit.with_target(Target::new(text)),
            None => unit,
        }
    }

    fn document(units: Vec<Unit>) -> Document {
        let mut doc = Document::new("en-US", "sv-SE", "App");
        doc.units = units;
        doc
    }

    #[test]
    fn test_unit_lookup_returns_first_duplicate() {
        let doc = document(vec![
            unit("A", "first", None),
            unit("A", "second", None),
        ]);
        assert_eq!(doc.unit("A").unwrap().source, "first");
        assert_eq!(doc.duplicate_ids(), vec!["A"]);
        assert!(matches!(
            doc.ensure_unique_ids("sv-SE.xlf"),
            Err(Error::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_units_by_source_and_duplicates() {
        let doc = document(vec![
            unit("A", "Status", None),
            unit("B", "Status", Some("Tillstånd")),
            unit("C", "Name", None),
        ]);
        assert_eq!(doc.units_by_source("Status").len(), 2);
        assert!(doc.source_has_duplicates("Status"));
        assert!(!doc.source_has_duplicates("Name"));
    }

    #[test]
    fn test_translation_map_skips_empty_targets() {
        let doc = document(vec![
            unit("A", "Status", Some("Tillstånd")),
            unit("B", "Status", Some("Status")),
            unit("C", "Name", Some("")),
            unit("D", "Name", None),
        ]);
        let map = doc.translation_map();
        assert_eq!(
            map.get("Status").unwrap(),
            &["Tillstånd".to_string(), "Status".to_string()]
        );
        assert!(map.get("Name").is_none());
    }

    #[test]
    fn test_clone_without_units_keeps_metadata() {
        let mut doc = document(vec![unit("A", "x", None)]);
        doc.product_name = Some("App".to_string());
        doc.line_ending = LineEnding::CrLf;
        let clone = doc.clone_without_units();
        assert!(clone.units.is_empty());
        assert_eq!(clone.product_name.as_deref(), Some("App"));
        assert_eq!(clone.line_ending, LineEnding::CrLf);
    }

    #[test]
    fn test_refresh_hint_replaces_previous_and_sorts() {
        let mut unit = Unit::new("A", "x")
            .with_note(NoteFrom::Developer, 2, "dev")
            .with_note(NoteFrom::XliffGenerator, 3, "Table T - Field F");
        unit.insert_refresh_hint("first");
        unit.insert_refresh_hint("second");

        let froms: Vec<&NoteFrom> = unit.notes.iter().map(|n| &n.from).collect();
        assert_eq!(
            froms,
            vec![
                &NoteFrom::Developer,
                &NoteFrom::RefreshHint,
                &NoteFrom::XliffGenerator
            ]
        );
        assert_eq!(unit.refresh_hint(), Some("second"));
        assert!(unit.remove_refresh_hint());
        assert!(!unit.remove_refresh_hint());
    }

    #[test]
    fn test_needs_review() {
        let plain = unit("A", "x", Some("y"));
        assert!(!plain.needs_review(true));

        let tokened = Unit::new("A", "x")
            .with_target(Target::new("").with_token(Some(TranslationToken::NotTranslated)));
        assert!(tokened.needs_review(false));

        let stated = Unit::new("A", "x")
            .with_target(Target::new("y").with_state(Some(TargetState::NeedsReviewL10n)));
        assert!(stated.needs_review(true));
        assert!(!stated.needs_review(false));
    }

    #[test]
    fn test_target_from_text_splits_token() {
        let target = Target::from_text("[NAB: SUGGESTION]Tillstånd");
        assert_eq!(target.token, Some(TranslationToken::Suggestion));
        assert_eq!(target.text, "Tillstånd");
        assert_eq!(target.raw_text(), "[NAB: SUGGESTION]Tillstånd");

        let plain = Target::from_text("Hej [NAB: REVIEW]");
        assert_eq!(plain.token, None);
        assert!(TranslationToken::contained_in(&plain.text));
    }

    #[test]
    fn test_sync_note() {
        let mut unit = Unit::new("A", "x").with_note(NoteFrom::Developer, 2, "old");
        let new_note = Note::new(NoteFrom::Developer, 2, "new");
        assert!(unit.sync_note(&NoteFrom::Developer, Some(&new_note)));
        assert!(!unit.sync_note(&NoteFrom::Developer, Some(&new_note)));
        assert_eq!(unit.developer_note_text(), "new");
        assert!(unit.sync_note(&NoteFrom::Developer, None));
        assert!(unit.developer_note().is_none());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(
            "Needs-Review-L10n".parse::<TargetState>(),
            Ok(TargetState::NeedsReviewL10n)
        );
        assert_eq!(
            "x-microsoft-exact-match".parse::<StateQualifier>(),
            Ok(StateQualifier::MsExactMatch)
        );
        assert_eq!("dlgunit".parse::<SizeUnit>(), Ok(SizeUnit::Dlgunit));
        assert!("almost-done".parse::<TargetState>().is_err());
    }

    #[test]
    fn test_line_ending_detection() {
        assert_eq!(LineEnding::detect("<a>\r\n<b/>"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("<a>\n<b/>"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("<a/>"), LineEnding::Lf);
    }

    #[test]
    fn test_same_language() {
        assert!(same_language("sv-SE", "sv-se"));
        assert!(!same_language("sv-SE", "en-US"));
        assert!(same_language("not a tag", "NOT A TAG"));
    }
}
