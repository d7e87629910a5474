//! Chunk output statistics.
//!
//! Summarizes what the chunking stage produced: per-file chunk counts, token
//! and character coverage, and when each file was last written. Used by
//! `grag stats` to check a run before handing chunks to an embedder.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::output;

/// Per-file summary of one JSONL chunk file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub source: String,
    pub chunks: usize,
    pub tokens: usize,
    pub chars: usize,
    pub bytes: u64,
    pub modified_ts: Option<i64>,
}

pub fn collect_stats(chunks_dir: &Path) -> Result<Vec<FileStats>> {
    let files = output::discover_files(chunks_dir, &["*.jsonl".to_string()])?;
    let mut stats = Vec::with_capacity(files.len());

    for file in files {
        let chunks = output::read_jsonl(&file)?;
        let metadata = std::fs::metadata(&file)?;
        let modified_ts = metadata
            .modified()
            .ok()
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp());

        stats.push(FileStats {
            source: file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
            chunks: chunks.len(),
            tokens: chunks.iter().map(|c| c.token_end).max().unwrap_or(0),
            chars: chunks.iter().map(|c| c.char_end).max().unwrap_or(0),
            bytes: metadata.len(),
            modified_ts,
        });
    }

    Ok(stats)
}

/// Run the stats command: read every chunk file and print a summary.
pub fn run_stats(config: &Config) -> Result<Vec<FileStats>> {
    let chunks_dir = config.chunks_dir();
    let stats = collect_stats(&chunks_dir)?;

    let total_chunks: usize = stats.iter().map(|s| s.chunks).sum();
    let total_tokens: usize = stats.iter().map(|s| s.tokens).sum();
    let total_bytes: u64 = stats.iter().map(|s| s.bytes).sum();

    println!("Chunk output — {}", chunks_dir.display());
    println!();
    println!("  Files:   {}", stats.len());
    println!("  Chunks:  {}", total_chunks);
    println!("  Tokens:  {}", total_tokens);
    println!("  Size:    {}", format_bytes(total_bytes));

    if !stats.is_empty() {
        println!();
        println!(
            "  {:<32} {:>7} {:>9} {:>10}   WRITTEN",
            "SOURCE", "CHUNKS", "TOKENS", "CHARS"
        );
        for s in &stats {
            let written = s
                .modified_ts
                .map(format_ts_relative)
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "  {:<32} {:>7} {:>9} {:>10}   {}",
                s.source, s.chunks, s.tokens, s.chars, written
            );
        }
    }
    println!();

    Ok(stats)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;

    if delta < 0 {
        format_ts_iso(ts)
    } else if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
