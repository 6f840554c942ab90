//! Command line importer for LinguaLeo vocabulary
//!
//! Logs in, downloads the selected collections and prints every imported
//! word to stdout, one per line, while media files land in the media
//! directory. Progress and failures go to stderr.
//!
//! # Usage
//!
//! ```bash
//! leo-import --email user@example.com --password secret --status unstudied
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingualeo_importer::cli::{ImportArgs, run_import_mode};
use lingualeo_importer::types::ProgressFilter;

#[derive(Parser)]
#[command(author, version, about = "Import vocabulary from LinguaLeo", long_about = None)]
#[command(name = "leo-import")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Account email (overrides config and LINGUALEO_EMAIL)
    #[arg(short, long, value_name = "EMAIL")]
    email: Option<String>,

    /// Account password (overrides config and LINGUALEO_PASSWORD)
    #[arg(short, long, value_name = "PASSWORD")]
    password: Option<String>,

    /// Keep only words with this learning status
    #[arg(long, value_name = "any|studied|unstudied", default_value = "any")]
    status: String,

    /// Import only these collections (repeatable)
    #[arg(long = "wordset-id", value_name = "ID")]
    wordset_ids: Vec<u64>,

    /// Import from every collection of the account
    #[arg(long)]
    all_wordsets: bool,

    /// Use the legacy flat word listing
    #[arg(long)]
    legacy_api: bool,

    /// Import words even when a host store already has them
    #[arg(long)]
    force_update: bool,

    /// Directory for audio and picture files
    #[arg(long, value_name = "DIR", default_value = "lingualeo_media")]
    media_dir: PathBuf,

    /// Do not download any media
    #[arg(long)]
    skip_media: bool,

    /// Cookie file path (overrides config and LINGUALEO_COOKIE_FILE)
    #[arg(long, value_name = "FILE")]
    cookie_file: Option<PathBuf>,

    /// Page size for the word listing endpoints
    #[arg(long, value_name = "N")]
    words_per_request: Option<usize>,

    /// Print words as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr so stdout stays parseable
    if cli.verbose {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let args = build_import_args(cli)?;
    if let Err(error) = run_import_mode(args).await {
        eprintln!("Import failed: {error}");
        std::process::exit(1);
    }

    Ok(())
}

/// Build import arguments from CLI flags.
fn build_import_args(cli: Cli) -> anyhow::Result<ImportArgs> {
    let status: ProgressFilter = cli.status.parse()?;
    let media_dir = if cli.skip_media {
        None
    } else {
        Some(cli.media_dir)
    };

    Ok(ImportArgs {
        config_file: cli.config,
        email: cli.email,
        password: cli.password,
        status,
        wordset_ids: cli.wordset_ids,
        all_wordsets: cli.all_wordsets,
        legacy_api: cli.legacy_api,
        force_update: cli.force_update,
        media_dir,
        cookie_file: cli.cookie_file,
        words_per_request: cli.words_per_request,
        json: cli.json,
    })
}
