//! Configuration loading.
//!
//! Three files drive a run:
//!
//! - the optional project file (`grag.toml`, TOML) with paths and limits,
//! - `configs/sources.yaml`, listing the documents to ingest,
//! - `configs/chunking.yaml`, holding the token window parameters.
//!
//! Relative paths in the project file are resolved against `paths.root`.

use anyhow::{bail, Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::models::SourceSpec;

/// Name of the project file looked up in the working directory when
/// `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "grag.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub chunk: ChunkDiscoveryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_sources")]
    pub sources: PathBuf,
    #[serde(default = "default_chunking")]
    pub chunking: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_chunks_dir")]
    pub chunks_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            sources: default_sources(),
            chunking: default_chunking(),
            processed_dir: default_processed_dir(),
            chunks_dir: default_chunks_dir(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_sources() -> PathBuf {
    PathBuf::from("configs/sources.yaml")
}
fn default_chunking() -> PathBuf {
    PathBuf::from("configs/chunking.yaml")
}
fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}
fn default_chunks_dir() -> PathBuf {
    PathBuf::from("data/chunks")
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Source files larger than this are skipped.
    #[serde(default = "default_max_extract_bytes")]
    pub max_extract_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_extract_bytes: default_max_extract_bytes(),
        }
    }
}

fn default_max_extract_bytes() -> u64 {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkDiscoveryConfig {
    /// Globs (matched against file names in `processed_dir`) selecting the
    /// files the chunking stage picks up.
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

impl Default for ChunkDiscoveryConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["*.txt".to_string()]
}

impl Config {
    /// All defaults, rooted at the current directory. Used when no project
    /// file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Resolve a configured path against `paths.root`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.paths.root.join(path)
        }
    }

    pub fn sources_path(&self) -> PathBuf {
        self.resolve(&self.paths.sources)
    }

    pub fn chunking_path(&self) -> PathBuf {
        self.resolve(&self.paths.chunking)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.resolve(&self.paths.processed_dir)
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.resolve(&self.paths.chunks_dir)
    }
}

/// Load the project file from an explicit path, or fall back to
/// `./grag.toml` and then to [`Config::minimal`].
pub fn load_project(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_config(default_path)
            } else {
                tracing::debug!("no {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Ok(Config::minimal())
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.ingest.max_extract_bytes == 0 {
        bail!("ingest.max_extract_bytes must be > 0");
    }

    if config.chunk.include_globs.is_empty() {
        bail!("chunk.include_globs must contain at least one pattern");
    }
    for pattern in &config.chunk.include_globs {
        Glob::new(pattern)
            .with_context(|| format!("Invalid glob in chunk.include_globs: '{}'", pattern))?;
    }

    Ok(config)
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Option<Vec<SourceSpec>>,
}

/// Load the list of sources from a `sources.yaml` file.
pub fn load_sources(path: &Path) -> Result<Vec<SourceSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sources file: {}", path.display()))?;
    parse_sources(&content).with_context(|| format!("Invalid sources file: {}", path.display()))
}

fn parse_sources(content: &str) -> Result<Vec<SourceSpec>> {
    let file: Option<SourcesFile> = serde_yaml::from_str(content)?;
    let Some(sources) = file.and_then(|f| f.sources) else {
        bail!("sources.yaml must contain a top-level 'sources:' key");
    };

    let mut seen = HashSet::new();
    for source in &sources {
        if source.name.trim().is_empty() {
            bail!("source name must not be empty (path: {})", source.path.display());
        }
        if source.name.contains(['/', '\\']) {
            bail!("source name '{}' must not contain a path separator", source.name);
        }
        if !seen.insert(source.name.as_str()) {
            bail!("duplicate source name: '{}'", source.name);
        }
    }

    Ok(sources)
}

/// Token window parameters from `chunking.yaml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    #[serde(default = "default_tokenizer_name")]
    pub tokenizer_name: String,
}

pub fn default_tokenizer_name() -> String {
    "cl100k_base".to_string()
}

impl ChunkingConfig {
    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        chunk_size: Option<usize>,
        chunk_overlap: Option<usize>,
        tokenizer_name: Option<String>,
    ) -> Self {
        if let Some(size) = chunk_size {
            self.chunk_size = size;
        }
        if let Some(overlap) = chunk_overlap {
            self.chunk_overlap = overlap;
        }
        if let Some(name) = tokenizer_name {
            self.tokenizer_name = name;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("chunk_size must be positive");
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        Ok(())
    }
}

/// Load the chunking parameters. Validation is left to the caller so that
/// command-line overrides can be applied first.
pub fn load_chunking(path: &Path) -> Result<ChunkingConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chunking config: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse chunking config: {}", path.display()))
}
