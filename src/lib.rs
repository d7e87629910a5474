//! # guideline-rag
//!
//! Document preparation for a retrieval-augmented QA system over clinical
//! and policy guideline documents.
//!
//! The crate turns a YAML list of source documents (PDF, HTML, DOCX, plain
//! text) into cleaned text files, then splits those into overlapping token
//! windows written as JSON Lines, ready for an embedding step.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   ┌──────────────┐
//! │ sources.yaml │──▶│    ingest    │──▶│ data/processed │──▶│    chunk     │──▶ data/chunks/*.jsonl
//! │ pdf/html/txt │   │ extract+clean│   │    *.txt       │   │ token windows│
//! └──────────────┘   └──────────────┘   └────────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! grag init          # scaffold configs/ and data/
//! grag sources       # check every listed document is present
//! grag ingest        # stage 1
//! grag chunk         # stage 2
//! grag run           # both stages
//! grag stats         # summarize data/chunks
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Project (TOML), sources and chunking (YAML) configuration |
//! | [`models`] | Source and chunk types |
//! | [`extract`] | PDF, HTML, DOCX and text loading |
//! | [`clean`] | Whitespace normalization |
//! | [`tokenizer`] | BPE encoding selection |
//! | [`chunk`] | Token-window chunking |
//! | [`ingest`] | Stage 1 pipeline |
//! | [`chunk_cmd`] | Stage 2 pipeline |
//! | [`output`] | Atomic file and JSONL writing |
//! | [`progress`] | Stage progress on stderr |
//! | [`sources`] | Source health listing |
//! | [`stats`] | Chunk output summary |
//! | [`scaffold`] | Project initialization |

pub mod chunk;
pub mod chunk_cmd;
pub mod clean;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod models;
pub mod output;
pub mod progress;
pub mod scaffold;
pub mod sources;
pub mod stats;
pub mod tokenizer;
