//! `grag sources`: check every configured source before ingestion.
//!
//! Reports whether each file exists and fits under `max_extract_bytes`.

use anyhow::Result;

use crate::config::{self, Config};

/// Health of one configured source as seen before ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Ok,
    Missing,
    TooLarge,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Ok => "OK",
            SourceStatus::Missing => "MISSING",
            SourceStatus::TooLarge => "TOO LARGE",
        }
    }
}

pub fn source_status(config: &Config, path: &std::path::Path) -> SourceStatus {
    match std::fs::metadata(config.resolve(path)) {
        Ok(m) if !m.is_file() => SourceStatus::Missing,
        Ok(m) if m.len() > config.ingest.max_extract_bytes => SourceStatus::TooLarge,
        Ok(_) => SourceStatus::Ok,
        Err(_) => SourceStatus::Missing,
    }
}

pub fn list_sources(config: &Config) -> Result<Vec<SourceStatus>> {
    let sources = config::load_sources(&config.sources_path())?;

    println!("{:<32} {:<10} {:<10} PATH", "SOURCE", "TYPE", "STATUS");
    let mut statuses = Vec::with_capacity(sources.len());
    for source in &sources {
        let status = source_status(config, &source.path);
        println!(
            "{:<32} {:<10} {:<10} {}",
            source.name,
            source.kind.as_str(),
            status.as_str(),
            source.path.display()
        );
        statuses.push(status);
    }

    Ok(statuses)
}
