//! BPE tokenizer selection.
//!
//! Wraps a `tiktoken` encoding chosen by name. Building an encoding parses a
//! large rank table, so callers build one [`Tokenizer`] per run and share it.

use anyhow::{bail, Result};
use tiktoken_rs::{CoreBPE, Rank};

/// Encodings accepted in `tokenizer_name`.
pub const SUPPORTED_ENCODINGS: [&str; 5] = [
    "cl100k_base",
    "o200k_base",
    "p50k_base",
    "p50k_edit",
    "r50k_base",
];

pub struct Tokenizer {
    name: String,
    bpe: CoreBPE,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").field("name", &self.name).finish()
    }
}

impl Tokenizer {
    pub fn from_name(name: &str) -> Result<Self> {
        let bpe = match name {
            "cl100k_base" => tiktoken_rs::cl100k_base()?,
            "o200k_base" => tiktoken_rs::o200k_base()?,
            "p50k_base" => tiktoken_rs::p50k_base()?,
            "p50k_edit" => tiktoken_rs::p50k_edit()?,
            "r50k_base" | "gpt2" => tiktoken_rs::r50k_base()?,
            other => bail!(
                "Unknown tokenizer: '{}'. Supported: {}",
                other,
                SUPPORTED_ENCODINGS.join(", ")
            ),
        };
        tracing::debug!(tokenizer = name, "tokenizer loaded");
        Ok(Self {
            name: name.to_string(),
            bpe,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode without special-token handling: text such as `<|endoftext|>`
    /// is tokenized as ordinary characters.
    pub fn encode(&self, text: &str) -> Vec<Rank> {
        self.bpe.encode_ordinary(text)
    }

    pub fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    /// Byte length of each token. For tokens produced by [`Tokenizer::encode`]
    /// the lengths sum to the byte length of the encoded text.
    pub fn token_byte_lengths(&self, tokens: &[Rank]) -> Vec<usize> {
        self.bpe
            ._decode_native_and_split(tokens.to_vec())
            .map(|bytes| bytes.len())
            .collect()
    }
}
