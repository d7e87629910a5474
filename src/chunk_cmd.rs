//! Stage 2: chunk every processed text file into `<chunks_dir>/<stem>.jsonl`.

use anyhow::{Context, Result};

use crate::chunk::chunk_text;
use crate::config::{self, ChunkingConfig, Config};
use crate::output;
use crate::progress::{ProgressEvent, ProgressReporter, Stage};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Default)]
pub struct ChunkOptions {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub tokenizer: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub files: usize,
    pub chunks: usize,
    /// Tokens across all processed files (overlap not double counted).
    pub tokens: usize,
}

/// Load `chunking.yaml`, apply overrides and validate.
pub fn resolve_chunking(config: &Config, options: &ChunkOptions) -> Result<ChunkingConfig> {
    let path = config.chunking_path();
    let settings = config::load_chunking(&path)?.with_overrides(
        options.chunk_size,
        options.chunk_overlap,
        options.tokenizer.clone(),
    );
    settings
        .validate()
        .with_context(|| format!("Invalid chunking config: {}", path.display()))?;
    Ok(settings)
}

pub fn run_chunking(
    config: &Config,
    options: &ChunkOptions,
    reporter: &dyn ProgressReporter,
) -> Result<ChunkReport> {
    tracing::info!("chunking: starting");

    let processed_dir = config.processed_dir();
    let chunks_dir = config.chunks_dir();

    let settings = resolve_chunking(config, options)?;
    let tokenizer = Tokenizer::from_name(&settings.tokenizer_name)?;
    tracing::info!(
        "Loaded chunking config: size={}, overlap={}, tokenizer={}",
        settings.chunk_size,
        settings.chunk_overlap,
        tokenizer.name()
    );

    if !options.dry_run {
        std::fs::create_dir_all(&chunks_dir)
            .with_context(|| format!("Failed to create chunks dir: {}", chunks_dir.display()))?;
    }

    let files = output::discover_files(&processed_dir, &config.chunk.include_globs)?;
    let mut report = ChunkReport::default();
    if files.is_empty() {
        tracing::warn!("No processed text files found in {}", processed_dir.display());
        print_summary(&report, options.dry_run);
        return Ok(report);
    }

    let total = files.len() as u64;
    for (i, file) in files.iter().enumerate() {
        let source_name = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::info!("Chunking file: {}", source_name);

        let text = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let chunks = chunk_text(
            &text,
            settings.chunk_size,
            settings.chunk_overlap,
            &tokenizer,
            &source_name,
        )?;

        report.files += 1;
        report.chunks += chunks.len();
        report.tokens += chunks.last().map(|c| c.token_end).unwrap_or(0);

        if !options.dry_run {
            let output_path = chunks_dir.join(format!("{}.jsonl", source_name));
            output::write_atomic(&output_path, &output::chunks_to_jsonl(&chunks)?)?;
            tracing::info!("Wrote {} chunks → {}", chunks.len(), output_path.display());
        }

        reporter.report(ProgressEvent {
            stage: Stage::Chunk,
            item: source_name,
            n: i as u64 + 1,
            total,
        });
    }

    print_summary(&report, options.dry_run);
    Ok(report)
}

fn print_summary(report: &ChunkReport, dry_run: bool) {
    if dry_run {
        println!("chunk (dry-run)");
    } else {
        println!("chunk");
    }
    println!("  files: {}", report.files);
    println!("  chunks written: {}", if dry_run { 0 } else { report.chunks });
    if dry_run {
        println!("  estimated chunks: {}", report.chunks);
    }
    println!("  tokens: {}", report.tokens);
    println!("ok");
}
