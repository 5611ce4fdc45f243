use proptest::prelude::*;
use xlfsync::{
    ChangeReport, Counter, Document, RefreshSettings, SuggestionMaps, Target, TranslationMode,
    TranslationToken, Unit, reconcile,
};

const IDS: [&str; 6] = ["U0", "U1", "U2", "U3", "U4", "U5"];
const SOURCES: [&str; 4] = ["Status", "Name", "Posting Date", ""];
const TEXTS: [&str; 3] = ["Tillstånd", "Namn", "Bokföringsdatum"];

#[derive(Debug, Clone)]
enum TargetKind {
    Missing,
    Plain(usize),
    NotTranslated,
    Review(usize),
}

fn target_kind_strategy() -> impl Strategy<Value = TargetKind> {
    prop_oneof![
        Just(TargetKind::Missing),
        (0..TEXTS.len()).prop_map(TargetKind::Plain),
        Just(TargetKind::NotTranslated),
        (0..TEXTS.len()).prop_map(TargetKind::Review),
    ]
}

/// Per id: `None` when the master lacks it, otherwise (source, translate).
fn master_strategy() -> impl Strategy<Value = Vec<Option<(usize, bool)>>> {
    prop::collection::vec(
        prop::option::of((0..SOURCES.len(), prop::bool::weighted(0.85))),
        IDS.len(),
    )
}

/// Per id: `None` when the language file lacks it, otherwise (source, target).
fn language_strategy() -> impl Strategy<Value = Vec<Option<(usize, TargetKind)>>> {
    prop::collection::vec(
        prop::option::of((0..SOURCES.len(), target_kind_strategy())),
        IDS.len(),
    )
}

fn build_master(layout: &[Option<(usize, bool)>]) -> Document {
    let mut doc = Document::new("en-US", "en-US", "App.g.xlf");
    for (id, entry) in IDS.iter().zip(layout) {
        if let Some((source, translate)) = entry {
            doc.units
                .push(Unit::new(id, SOURCES[*source]).with_translate(*translate));
        }
    }
    doc
}

fn build_language(layout: &[Option<(usize, TargetKind)>]) -> Document {
    let mut doc = Document::new("en-US", "sv-SE", "App.g.xlf");
    for (id, entry) in IDS.iter().zip(layout).rev() {
        let Some((source, kind)) = entry else {
            continue;
        };
        let unit = Unit::new(id, SOURCES[*source]);
        doc.units.push(match kind {
            TargetKind::Missing => unit,
            TargetKind::Plain(text) => unit.with_target(Target::new(TEXTS[*text])),
            TargetKind::NotTranslated => unit.with_target(
                Target::new("").with_token(Some(TranslationToken::NotTranslated)),
            ),
            TargetKind::Review(text) => unit.with_target(
                Target::new(TEXTS[*text]).with_token(Some(TranslationToken::Review)),
            ),
        });
    }
    doc
}

fn run(master: &Document, target: Document, settings: &RefreshSettings) -> (Document, ChangeReport) {
    let mut report = ChangeReport::new();
    let document = reconcile(
        master,
        target,
        settings,
        &SuggestionMaps::new(),
        &mut report,
        false,
    )
    .expect("reconcile")
    .document;
    (document, report)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_refresh_is_idempotent(
        master_layout in master_strategy(),
        language_layout in language_strategy(),
    ) {
        let master = build_master(&master_layout);
        let settings = RefreshSettings::default();

        let (once, first_report) = run(&master, build_language(&language_layout), &settings);
        let (twice, second_report) = run(&master, once.clone(), &settings);

        prop_assert_eq!(&twice, &once);
        prop_assert!(!second_report.is_changed(), "second run reported {}", second_report);
        prop_assert_eq!(
            second_report.get(Counter::NeedsTranslationTotal),
            first_report.get(Counter::NeedsTranslationTotal)
        );
        prop_assert_eq!(
            second_report.get(Counter::NeedsReviewTotal),
            first_report.get(Counter::NeedsReviewTotal)
        );
    }

    #[test]
    fn prop_output_holds_every_translatable_master_unit_once(
        master_layout in master_strategy(),
        language_layout in language_strategy(),
        mode in prop::sample::select(TranslationMode::ALL.to_vec()),
    ) {
        let master = build_master(&master_layout);
        let settings = RefreshSettings::new().with_mode(mode);
        let (out, _) = run(&master, build_language(&language_layout), &settings);

        let expected: Vec<&str> = master
            .units
            .iter()
            .filter(|u| u.translate)
            .map(|u| u.id.as_str())
            .collect();
        let actual: Vec<&str> = out.units.iter().map(|u| u.id.as_str()).collect();
        prop_assert_eq!(actual, expected);
    }
}
