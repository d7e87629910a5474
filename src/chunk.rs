//! Token-window text chunker.
//!
//! Splits a processed document into overlapping windows of at most
//! `chunk_size` tokens. The document is encoded once; each window's text is
//! cut from the original bytes using per-token byte lengths, so no prefix is
//! ever re-decoded.
//!
//! # Algorithm
//!
//! 1. Encode the whole text. Zero tokens yields no chunks.
//! 2. If the text fits in one window, emit it verbatim as a single chunk.
//! 3. Otherwise emit `[start, min(start + chunk_size, n))` and set the next
//!    `start` to `end - chunk_overlap`. After the window that reaches token
//!    `n`, one last window `[n - chunk_overlap, n)` holding only the overlap
//!    tail is emitted, unless `chunk_overlap` is zero.
//!
//! Character offsets count Unicode scalar values. A multi-byte character
//! cut by a window edge decodes to U+FFFD inside that chunk.
//!
//! # Example
//!
//! ```rust,no_run
//! use guideline_rag::chunk::chunk_text;
//! use guideline_rag::tokenizer::Tokenizer;
//!
//! let tok = Tokenizer::from_name("cl100k_base").unwrap();
//! let chunks = chunk_text("Short note.", 400, 50, &tok, "note").unwrap();
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].id, "note-0000");
//! ```

use thiserror::Error;

use crate::models::Chunk;
use crate::tokenizer::Tokenizer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk_size must be positive")]
    ZeroChunkSize,
    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// Split `text` into overlapping token windows.
///
/// # Guarantees
///
/// - Chunk ids are `<source_name>-0000`, `-0001`, … in order.
/// - The first chunk starts at token 0 and the last ends at the token count.
/// - `token_start[i + 1] == token_end[i] - chunk_overlap`.
/// - Every chunk spans at most `chunk_size` tokens.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    tokenizer: &Tokenizer,
    source_name: &str,
) -> Result<Vec<Chunk>, ChunkError> {
    if chunk_size == 0 {
        return Err(ChunkError::ZeroChunkSize);
    }
    if chunk_overlap >= chunk_size {
        return Err(ChunkError::OverlapTooLarge {
            size: chunk_size,
            overlap: chunk_overlap,
        });
    }

    let tokens = tokenizer.encode(text);
    let num_tokens = tokens.len();

    if num_tokens == 0 {
        return Ok(Vec::new());
    }

    if num_tokens <= chunk_size {
        return Ok(vec![Chunk {
            id: Chunk::make_id(source_name, 0),
            text: text.to_string(),
            source: source_name.to_string(),
            char_start: 0,
            char_end: text.chars().count(),
            token_start: 0,
            token_end: num_tokens,
        }]);
    }

    // byte_offsets[i] is where token i starts; byte_offsets[n] == text.len()
    let mut byte_offsets = Vec::with_capacity(num_tokens + 1);
    byte_offsets.push(0usize);
    for len in tokenizer.token_byte_lengths(&tokens) {
        let last = *byte_offsets.last().unwrap_or(&0);
        byte_offsets.push(last + len);
    }

    let bytes = text.as_bytes();
    let mut cursor = CharCursor::new(text);
    let mut chunks = Vec::new();
    let mut token_start = 0usize;

    loop {
        let token_end = (token_start + chunk_size).min(num_tokens);
        let byte_start = byte_offsets[token_start];
        let byte_end = byte_offsets[token_end];

        let chunk_text = String::from_utf8_lossy(&bytes[byte_start..byte_end]).into_owned();
        let char_start = cursor.prefix_len(byte_start);
        let char_end = char_start + chunk_text.chars().count();

        chunks.push(Chunk {
            id: Chunk::make_id(source_name, chunks.len()),
            text: chunk_text,
            source: source_name.to_string(),
            char_start,
            char_end,
            token_start,
            token_end,
        });

        // Once a window reaches the end, one more window covering only its
        // overlap tail is emitted; that window stops the loop.
        let next_start = token_end - chunk_overlap;
        if next_start <= token_start || next_start >= num_tokens {
            break;
        }
        token_start = next_start;
    }

    Ok(chunks)
}

/// Character length of lossily-decoded byte prefixes of one text, for
/// non-decreasing prefix lengths.
struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn prefix_len(&mut self, byte: usize) -> usize {
        let mut floor = byte;
        while !self.text.is_char_boundary(floor) {
            floor -= 1;
        }
        if floor > self.byte {
            self.chars += self.text[self.byte..floor].chars().count();
            self.byte = floor;
        }
        // A truncated trailing character decodes to a single U+FFFD.
        self.chars + usize::from(floor != byte)
    }
}
