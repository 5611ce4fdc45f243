mod export;
mod import;
mod refresh;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xlfsync::{TranslationMode, export::ExportFilter};
use xlfsync_cli::load_config;

use crate::export::{ExportCommandOptions, run_export_command};
use crate::import::{ImportCommandOptions, run_import_command};
use crate::refresh::{RefreshOptions, run_refresh_command};

/// Exit code for `refresh --fail-on-change` when a file was updated.
const EXIT_CHANGED: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./xlfsync.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Bring language files in line with the generated master file.
    Refresh {
        /// The generated master file (*.g.xlf)
        #[arg(short, long)]
        master: PathBuf,

        /// Language files or glob patterns (defaults to every .xlf beside the master)
        targets: Vec<String>,

        /// Translation mode: tag, external or reference-service
        #[arg(long)]
        mode: Option<TranslationMode>,

        /// Only reorder units to master order
        #[arg(long)]
        sort_only: bool,

        /// Translated file to take suggestions from
        #[arg(long)]
        match_file: Option<PathBuf>,

        /// Folders of translated files to take suggestions from
        #[arg(long = "suggestions", num_args = 1..)]
        suggestions: Vec<PathBuf>,

        /// Local reference corpus cache (one <language>.json per language)
        #[arg(long)]
        corpus_dir: Option<PathBuf>,

        /// Update the master from extracted units (JSON) before refreshing
        #[arg(long)]
        regenerate_master: Option<PathBuf>,

        /// Exit with code 2 when any language file changed
        #[arg(long)]
        fail_on_change: bool,

        /// Keep going when a file fails
        #[arg(long)]
        continue_on_error: bool,

        /// Reject files with duplicate trans-unit ids
        #[arg(long)]
        strict: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge a file returned by the translation service into a language file.
    Import {
        /// The translated file
        #[arg(long)]
        translated: PathBuf,

        /// The language file to update
        #[arg(long)]
        target: PathBuf,

        /// Dictionary JSON applied to every imported translation
        #[arg(long)]
        dictionary: Option<PathBuf>,

        /// Translation mode (import requires reference-service)
        #[arg(long)]
        mode: Option<TranslationMode>,

        /// Skip units the language file does not have
        #[arg(long)]
        ignore_missing_units: bool,

        /// Accept units whose source text differs
        #[arg(long)]
        import_with_different_source: bool,
    },

    /// Write a tab-separated review sheet of a language file.
    Export {
        /// The language file
        #[arg(short, long)]
        input: PathBuf,

        /// The sheet to write
        #[arg(short, long)]
        output: PathBuf,

        /// Which units to export: all or needs-review
        #[arg(long, default_value = "all")]
        filter: ExportFilter,

        /// Translation mode, decides whether states count as pending
        #[arg(long)]
        mode: Option<TranslationMode>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    debug!(?config, "configuration loaded");

    let result = match args.commands {
        Commands::Refresh {
            master,
            targets,
            mode,
            sort_only,
            match_file,
            suggestions,
            corpus_dir,
            regenerate_master,
            fail_on_change,
            continue_on_error,
            strict,
            json,
        } => run_refresh_command(
            RefreshOptions {
                master,
                targets,
                mode,
                sort_only,
                match_file,
                suggestion_folders: suggestions,
                corpus_dir,
                regenerate_master,
                continue_on_error,
                strict,
                json,
            },
            &config,
        )
        .map(|changed| if fail_on_change && changed { EXIT_CHANGED } else { 0 }),
        Commands::Import {
            translated,
            target,
            dictionary,
            mode,
            ignore_missing_units,
            import_with_different_source,
        } => run_import_command(
            ImportCommandOptions {
                translated,
                target,
                dictionary,
                mode,
                ignore_missing_units,
                import_with_different_source,
            },
            &config,
        )
        .map(|_| 0),
        Commands::Export {
            input,
            output,
            filter,
            mode,
        } => run_export_command(
            ExportCommandOptions {
                input,
                output,
                filter,
                mode,
            },
            &config,
        )
        .map(|_| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
