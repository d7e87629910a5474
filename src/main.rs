//! # guideline-rag CLI (`grag`)
//!
//! The `grag` binary drives the document preparation pipeline.
//!
//! ## Usage
//!
//! ```bash
//! grag [--config ./grag.toml] [--progress off|human|json] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `grag init` | Scaffold `configs/` templates and `data/` directories |
//! | `grag sources` | List configured sources and whether their files are present |
//! | `grag ingest` | Load, clean and write every source to `data/processed/` |
//! | `grag chunk` | Split processed text into token windows in `data/chunks/` |
//! | `grag run` | `ingest` followed by `chunk` |
//! | `grag stats` | Summarize the chunk output |
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use guideline_rag::chunk_cmd::{self, ChunkOptions};
use guideline_rag::config;
use guideline_rag::ingest::{self, IngestOptions};
use guideline_rag::progress::ProgressMode;
use guideline_rag::{scaffold, sources, stats};

/// guideline-rag: ingestion and token-window chunking for guideline
/// documents.
#[derive(Parser)]
#[command(
    name = "grag",
    about = "guideline-rag: ingest guideline documents and chunk them into token windows",
    version,
    long_about = "Loads the PDF, HTML, DOCX and text documents listed in configs/sources.yaml, \
    normalizes their text into data/processed/, and splits it into overlapping token windows \
    written as JSON Lines in data/chunks/, ready for embedding."
)]
struct Cli {
    /// Path to the project file (TOML).
    ///
    /// Defaults to `./grag.toml` when present, otherwise built-in defaults
    /// rooted at the current directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress output on stderr. Defaults to `human` on a terminal,
    /// `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold config templates and data directories.
    ///
    /// Never overwrites an existing file.
    Init,

    /// List configured sources and their status.
    Sources,

    /// Stage 1: load, clean and write every configured source.
    ///
    /// Missing files and documents that fail to extract are skipped with a
    /// warning.
    Ingest(IngestArgs),

    /// Stage 2: chunk processed text into JSONL token windows.
    Chunk {
        #[command(flatten)]
        args: ChunkArgs,

        /// Count chunks without writing any files.
        #[arg(long)]
        dry_run: bool,
    },

    /// Run ingest and chunk in sequence.
    Run {
        #[command(flatten)]
        ingest_args: IngestArgs,
        #[command(flatten)]
        chunk_args: ChunkArgs,
    },

    /// Summarize chunk files in the chunks directory.
    Stats,
}

#[derive(Args, Clone)]
struct IngestArgs {
    /// Only ingest the named source (repeatable).
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,

    /// Maximum number of sources to process.
    #[arg(long)]
    limit: Option<usize>,

    /// Load and clean without writing any files.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Clone)]
struct ChunkArgs {
    /// Override `chunk_size` from chunking.yaml.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Override `chunk_overlap` from chunking.yaml.
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Override `tokenizer_name` from chunking.yaml.
    #[arg(long)]
    tokenizer: Option<String>,
}

impl IngestArgs {
    fn options(&self) -> IngestOptions {
        IngestOptions {
            only: self.only.clone(),
            limit: self.limit,
            dry_run: self.dry_run,
        }
    }
}

impl ChunkArgs {
    fn options(&self, dry_run: bool) -> ChunkOptions {
        ChunkOptions {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            tokenizer: self.tokenizer.clone(),
            dry_run,
        }
    }
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let cfg = config::load_project(cli.config.as_deref())?;
    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let reporter = progress.reporter();

    match cli.command {
        Commands::Init => {
            scaffold::scaffold_project(&cfg)?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Ingest(args) => {
            ingest::run_ingest(&cfg, &args.options(), reporter.as_ref())?;
        }
        Commands::Chunk { args, dry_run } => {
            chunk_cmd::run_chunking(&cfg, &args.options(dry_run), reporter.as_ref())?;
        }
        Commands::Run {
            ingest_args,
            chunk_args,
        } => {
            // Reject a bad chunking config before any ingest work.
            let chunk_options = chunk_args.options(ingest_args.dry_run);
            chunk_cmd::resolve_chunking(&cfg, &chunk_options)?;
            ingest::run_ingest(&cfg, &ingest_args.options(), reporter.as_ref())?;
            chunk_cmd::run_chunking(&cfg, &chunk_options, reporter.as_ref())?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
    }

    Ok(())
}
