//! Folio CLI - chapter extraction and annotation from the command line

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use folio_core::FolioConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file (defaults to $FOLIO_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Extraction and numbering overrides
#[derive(Args)]
struct ExtractArgs {
    /// Visibility threshold in characters for display numbering
    #[arg(short, long)]
    threshold: Option<usize>,

    /// Drop chapters shorter than this many characters at extraction
    #[arg(long)]
    min_length: Option<usize>,
}

impl ExtractArgs {
    fn apply(&self, config: &mut FolioConfig) {
        if let Some(threshold) = self.threshold {
            config.reader.visibility_threshold = threshold;
        }
        if let Some(min) = self.min_length {
            config.decomposer.min_content_length = min;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the numbered chapters of an EPUB
    Info {
        /// EPUB file path
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Print one chapter by display number
    Chapter {
        /// EPUB file path
        input: PathBuf,

        /// Display number as shown by `folio info`
        number: u32,

        /// Print rendered HTML instead of the raw text
        #[arg(long)]
        html: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Render a chapter text file with an annotation document
    Annotate {
        /// Raw chapter text file
        text: PathBuf,

        /// Annotation document (JSON)
        tags: PathBuf,

        /// Output html, anchors, cards and stats as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout carries command output only
    let filter = if cli.verbose {
        "folio=debug,folio_core=debug"
    } else {
        "folio=info,folio_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = FolioConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info {
            input,
            json,
            extract,
        } => {
            extract.apply(&mut config);
            commands::info(&input, json, &config).await
        }

        Commands::Chapter {
            input,
            number,
            html,
            extract,
        } => {
            extract.apply(&mut config);
            commands::chapter(&input, number, html, &config).await
        }

        Commands::Annotate { text, tags, json } => commands::annotate(&text, &tags, json, &config).await,
    }
}
