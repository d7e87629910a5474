//! Output file writing for both pipeline stages.
//!
//! Files are written to a sibling temp file and renamed into place, so a
//! reader (or the next stage) never sees a half-written document or JSONL.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::models::Chunk;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path`, replacing any existing file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

/// Serialize chunks as JSON Lines: one object per line, UTF-8 kept verbatim.
pub fn chunks_to_jsonl(chunks: &[Chunk]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for chunk in chunks {
        serde_json::to_writer(&mut buf, chunk)
            .with_context(|| format!("Failed to serialize chunk {}", chunk.id))?;
        buf.write_all(b"\n")?;
    }
    Ok(buf)
}

/// Parse a JSONL chunk file. Blank lines are ignored; a malformed line is an
/// error naming its 1-based line number.
pub fn read_jsonl(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut chunks = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let chunk: Chunk = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: malformed chunk record", path.display(), i + 1))?;
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Direct children of `dir` whose file name matches one of `globs`, sorted.
/// A missing directory yields no files.
pub fn discover_files(dir: &Path, globs: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let include = build_globset(globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if include.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(i: usize, text: &str) -> Chunk {
        Chunk {
            id: Chunk::make_id("s", i),
            text: text.to_string(),
            source: "s".to_string(),
            char_start: i * 10,
            char_end: i * 10 + text.chars().count(),
            token_start: i * 4,
            token_end: i * 4 + 5,
        }
    }

    #[test]
    fn jsonl_keeps_non_ascii_and_escapes_newlines() {
        let bytes = chunks_to_jsonl(&[chunk(0, "Größe\nzwei"), chunk(1, "≥ 140")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Größe\\nzwei"));
        assert!(lines[1].contains("≥ 140"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        let chunks = vec![chunk(0, "a"), chunk(1, "b")];
        write_atomic(&path, &chunks_to_jsonl(&chunks).unwrap()).unwrap();
        assert_eq!(read_jsonl(&path).unwrap(), chunks);
        assert!(!dir.path().join("s.jsonl.tmp").exists());
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        let good = String::from_utf8(chunks_to_jsonl(&[chunk(0, "a")]).unwrap()).unwrap();
        std::fs::write(&path, format!("{}{{not json\n", good)).unwrap();
        let err = read_jsonl(&path).unwrap_err();
        assert!(err.to_string().contains("bad.jsonl:2"));
    }

    #[test]
    fn discovery_is_sorted_and_shallow() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("b.txt"), "b").unwrap();
        std::fs::write(dir.join("a.txt"), "a").unwrap();
        std::fs::write(dir.join("nested/c.txt"), "c").unwrap();
        let files = discover_files(dir, &["*.txt".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
