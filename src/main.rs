//! # people-graph CLI (`pgraph`)
//!
//! Imports a newline-delimited JSON export of person profiles into a
//! property graph.
//!
//! ## Usage
//!
//! ```bash
//! pgraph                                   # run the import with ./config/pgraph.toml
//! pgraph ingest --dry-run --limit 100      # import into memory, print counts
//! pgraph skills "Built services with Python and Kubernetes"
//! ```
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use people_graph::config;
use people_graph::ingest::{self, IngestOptions};
use people_graph::progress::ProgressMode;

/// Import scraped person profiles into a property graph.
///
/// With no command, runs `ingest` against the configured graph.
#[derive(Parser)]
#[command(
    name = "pgraph",
    about = "Import scraped person profiles into a property graph",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/pgraph.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/pgraph.toml")]
    config: PathBuf,

    /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the configured input file.
    ///
    /// Safe to re-run: every node and relationship is merged on a
    /// content-derived id.
    Ingest {
        /// Import into an in-memory graph and print node/relationship counts.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of non-blank lines to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the skills the configured vocabulary finds in TEXT.
    Skills {
        /// Free text, e.g. a job description.
        text: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command.unwrap_or(Commands::Ingest {
        dry_run: false,
        limit: None,
    }) {
        Commands::Ingest { dry_run, limit } => {
            let mode = ProgressMode::resolve(cli.progress);
            let reporter = mode.reporter();
            let options = IngestOptions {
                dry_run,
                limit,
                progress_interval: cfg.ingest.progress_interval,
            };
            let stats = ingest::run_ingest(&cfg, &options, reporter.as_ref()).await?;
            tracing::info!(
                written = stats.records_written,
                malformed = stats.malformed,
                failed = stats.failed,
                "import finished"
            );
        }
        Commands::Skills { text } => {
            let vocabulary = ingest::load_vocabulary(&cfg)?;
            let skills = vocabulary.extract(&text);
            if skills.is_empty() {
                println!("(no skills found)");
            }
            for skill in skills {
                println!("{}", skill);
            }
        }
    }

    Ok(())
}
