//! Core data types that flow through the pipeline.
//!
//! [`SourceSpec`] entries come from `sources.yaml` and feed ingestion;
//! [`Chunk`] records are produced by the chunker and serialized one per line
//! into the JSONL output.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Kind of document a source points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Pdf,
    Html,
    Text,
    Markdown,
    Docx,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pdf => "pdf",
            SourceType::Html => "html",
            SourceType::Text => "text",
            SourceType::Markdown => "markdown",
            SourceType::Docx => "docx",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(SourceType::Pdf),
            "html" | "htm" => Ok(SourceType::Html),
            "text" | "txt" => Ok(SourceType::Text),
            "markdown" | "md" => Ok(SourceType::Markdown),
            "docx" => Ok(SourceType::Docx),
            other => Err(format!("Unsupported source type: {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for SourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One entry of `sources.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    /// Stable identifier; becomes the processed file stem and the chunk
    /// `source` field.
    pub name: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: SourceType,
}

/// A token window of a processed document.
///
/// Field order is the JSONL column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source: String,
    pub char_start: usize,
    pub char_end: usize,
    pub token_start: usize,
    pub token_end: usize,
}

impl Chunk {
    pub fn make_id(source: &str, index: usize) -> String {
        format!("{}-{:04}", source, index)
    }
}
