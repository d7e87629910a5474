//! Stage 1: load every configured source, clean it, and write
//! `<processed_dir>/<name>.txt`.
//!
//! A source whose file is missing is skipped with a warning; so is one whose
//! extraction fails. Configuration and write errors abort the run.

use anyhow::{bail, Context, Result};

use crate::clean::clean_text;
use crate::config::{self, Config};
use crate::extract;
use crate::models::SourceSpec;
use crate::output;
use crate::progress::{ProgressEvent, ProgressReporter, Stage};

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Restrict the run to these source names.
    pub only: Vec<String>,
    pub limit: Option<usize>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub sources: usize,
    pub written: usize,
    pub skipped_missing: usize,
    pub failed: usize,
    /// Characters of cleaned text produced (written or, in a dry run, would be).
    pub chars: usize,
}

pub fn run_ingest(
    config: &Config,
    options: &IngestOptions,
    reporter: &dyn ProgressReporter,
) -> Result<IngestReport> {
    let sources_path = config.sources_path();
    let processed_dir = config.processed_dir();

    let sources = config::load_sources(&sources_path)?;
    tracing::info!("Loaded {} sources from {}", sources.len(), sources_path.display());

    let sources = select_sources(sources, options)?;

    if !options.dry_run {
        std::fs::create_dir_all(&processed_dir).with_context(|| {
            format!("Failed to create processed dir: {}", processed_dir.display())
        })?;
    }

    let mut report = IngestReport {
        sources: sources.len(),
        ..Default::default()
    };
    let total = sources.len() as u64;

    for (i, source) in sources.iter().enumerate() {
        tracing::info!("Processing source: {}", source.name);
        let path = config.resolve(&source.path);

        match extract::load_document(source, &path, config.ingest.max_extract_bytes) {
            Ok(raw) => {
                let cleaned = clean_text(&raw);
                report.chars += cleaned.chars().count();
                if cleaned.is_empty() {
                    tracing::warn!("{}: no text extracted", source.name);
                }

                if options.dry_run {
                    tracing::debug!("{}: {} chars (dry run)", source.name, cleaned.len());
                } else {
                    let output_path = processed_dir.join(format!("{}.txt", source.name));
                    output::write_atomic(&output_path, cleaned.as_bytes())?;
                    tracing::info!("Wrote cleaned text → {}", output_path.display());
                    report.written += 1;
                }
            }
            Err(e) if e.is_missing() => {
                tracing::warn!("Skipping {}: {}", source.name, e);
                report.skipped_missing += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", source.name, e);
                report.failed += 1;
            }
        }

        reporter.report(ProgressEvent {
            stage: Stage::Ingest,
            item: source.name.clone(),
            n: i as u64 + 1,
            total,
        });
    }

    print_summary(&report, options.dry_run);
    Ok(report)
}

fn select_sources(sources: Vec<SourceSpec>, options: &IngestOptions) -> Result<Vec<SourceSpec>> {
    for name in &options.only {
        if !sources.iter().any(|s| &s.name == name) {
            bail!("Unknown source: '{}'", name);
        }
    }

    let mut selected: Vec<SourceSpec> = if options.only.is_empty() {
        sources
    } else {
        sources
            .into_iter()
            .filter(|s| options.only.contains(&s.name))
            .collect()
    };

    if let Some(limit) = options.limit {
        selected.truncate(limit);
    }
    Ok(selected)
}

fn print_summary(report: &IngestReport, dry_run: bool) {
    if dry_run {
        println!("ingest (dry-run)");
    } else {
        println!("ingest");
    }
    println!("  sources: {}", report.sources);
    println!("  written: {}", report.written);
    println!("  skipped (missing): {}", report.skipped_missing);
    println!("  failed: {}", report.failed);
    println!("  characters: {}", report.chars);
    println!("ok");
}
