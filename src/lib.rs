#![forbid(unsafe_code)]
//! XLIFF 1.2 translation file synchronization.
//!
//! Keeps per-language `.xlf` files aligned with the master file a compiler
//! generates: new units are added, changed sources are flagged, stale units
//! are dropped, translations are suggested from other units and files, and
//! placeholders are validated.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlfsync::{ChangeReport, Document, RefreshSettings, SuggestionMaps, reconcile, traits::Parser};
//!
//! let master = Document::read_from("Translations/App.g.xlf")?;
//! let target = Document::read_from("Translations/App.sv-SE.xlf")?;
//!
//! let mut report = ChangeReport::new();
//! let reconciled = reconcile(
//!     &master,
//!     target,
//!     &RefreshSettings::default(),
//!     &SuggestionMaps::new(),
//!     &mut report,
//!     false,
//! )?;
//! reconciled.document.write_to("Translations/App.sv-SE.xlf")?;
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Translation modes
//!
//! - **Tag**: pending work is marked with `[NAB: ...]` tokens in the target text
//! - **External**: pending work is marked with XLIFF `state` attributes
//! - **Reference service**: `state` plus `state-qualifier`, for files exchanged
//!   with an external translation service
//!
//! For whole directories use [`batch::refresh_files`].

pub mod batch;
pub mod codec;
pub mod dictionary;
pub mod error;
pub mod export;
pub mod import;
pub mod language_comment;
pub mod master;
pub mod match_map;
pub mod mode;
pub mod reconcile;
pub mod report;
pub mod settings;
pub mod traits;
pub mod types;
pub mod validation;
pub mod xliff_id;

// Re-export most used types for easy consumption
pub use crate::{
    batch::{BatchOptions, BatchOutcome, FailurePolicy, refresh_files},
    codec::{WriteOptions, parse, serialize},
    error::Error,
    match_map::{MatchMap, SuggestionMaps},
    mode::TranslationMode,
    reconcile::{Reconciled, reconcile},
    report::{ChangeReport, Counter},
    settings::{LanguageSettings, RefreshSettings, SuggestionSettings},
    types::{Document, Note, NoteFrom, StateQualifier, Target, TargetState, TranslationToken, Unit},
};
