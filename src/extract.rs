//! Document loading: turns a source file into raw UTF-8 text.
//!
//! Supports PDF, HTML, DOCX and plain text/Markdown. Extraction never
//! panics; every failure is an [`ExtractError`] and the ingest stage decides
//! whether to skip the source or abort.

use std::io::Read;
use std::path::{Path, PathBuf};

use scraper::{Html, Node};
use thiserror::Error;

use crate::models::{SourceSpec, SourceType};

/// Maximum decompressed bytes read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Elements whose text never reaches the reader.
const HTML_HIDDEN_TAGS: [&str; 2] = ["script", "style"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Source file {} is {size} bytes, over the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8", .0.display())]
    Encoding(PathBuf),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

impl ExtractError {
    /// Missing files are an expected condition (sources listed ahead of
    /// download); everything else is a real failure.
    pub fn is_missing(&self) -> bool {
        matches!(self, ExtractError::NotFound(_))
    }
}

/// Load a source's text, dispatching on its declared type.
///
/// `path` is the already-resolved location of `source.path`.
pub fn load_document(
    source: &SourceSpec,
    path: &Path,
    max_bytes: u64,
) -> Result<String, ExtractError> {
    let bytes = read_bounded(path, max_bytes)?;
    extract_text(&bytes, source.kind, path)
}

fn read_bounded(path: &Path, max_bytes: u64) -> Result<Vec<u8>, ExtractError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractError::NotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(ExtractError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    if !metadata.is_file() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }
    if metadata.len() > max_bytes {
        return Err(ExtractError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_bytes,
        });
    }
    std::fs::read(path).map_err(|e| ExtractError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Extract text from in-memory file contents. `origin` is only used in
/// error messages.
pub fn extract_text(bytes: &[u8], kind: SourceType, origin: &Path) -> Result<String, ExtractError> {
    match kind {
        SourceType::Pdf => extract_pdf(bytes),
        SourceType::Html => {
            let html = decode_utf8(bytes, origin)?;
            Ok(extract_html(&html))
        }
        SourceType::Text | SourceType::Markdown => decode_utf8(bytes, origin),
        SourceType::Docx => extract_docx(bytes),
    }
}

fn decode_utf8(bytes: &[u8], origin: &Path) -> Result<String, ExtractError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::Encoding(origin.to_path_buf()))
}

/// Page texts joined by a newline; an empty page contributes an empty line.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(pages.join("\n"))
}

/// Visible text of an HTML document: every text node outside `<script>`
/// and `<style>`, one per line.
pub fn extract_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HTML_HIDDEN_TAGS.contains(&el.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }

    parts.join("\n")
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }

    extract_docx_paragraphs(&doc_xml)
}

/// Concatenate `<w:t>` runs, ending each `<w:p>` with a newline.
fn extract_docx_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    // Runs carry significant leading/trailing spaces.
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_t = true,
            Ok(Event::Text(te)) if in_t => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Docx(e.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"br" => out.push('\n'),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn spec(kind: SourceType) -> SourceSpec {
        SourceSpec {
            name: "t".into(),
            path: PathBuf::from("t"),
            kind,
        }
    }

    #[test]
    fn html_drops_script_and_style() {
        let html = r#"<html><head><title>Guideline</title>
<style>body { color: red; }</style>
<script>var hidden = "do not index";</script></head>
<body><h1>Hypertension</h1><p>Measure <b>twice</b>.</p></body></html>"#;
        let text = extract_html(html);
        assert!(text.contains("Guideline"));
        assert!(text.contains("Hypertension"));
        assert!(text.contains("Measure \ntwice\n."));
        assert!(!text.contains("do not index"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn html_entities_are_decoded() {
        let text = extract_html("<p>5 &lt; 10 &amp; caf&eacute;</p>");
        assert_eq!(text, "5 < 10 & café");
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract_text(b"not a pdf", SourceType::Pdf, Path::new("x.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn invalid_utf8_text_returns_error() {
        let err = extract_text(&[0xff, 0xfe, 0x00], SourceType::Text, Path::new("x.txt"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Encoding(_)));
    }

    #[test]
    fn invalid_zip_returns_error_for_docx() {
        let err = extract_text(b"not a zip", SourceType::Docx, Path::new("x.docx")).unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }

    #[test]
    fn docx_paragraphs_become_lines() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Step one</w:t></w:r><w:r><w:t xml:space="preserve"> and more</w:t></w:r></w:p><w:p><w:r><w:t>Step two</w:t></w:r></w:p></w:body></w:document>"#,
            )
            .unwrap();
            zip.finish().unwrap();
        }
        let text = extract_text(&buf, SourceType::Docx, Path::new("x.docx")).unwrap();
        assert_eq!(text, "Step one and more\nStep two\n");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.pdf");
        let err = load_document(&spec(SourceType::Pdf), &path, 1024).unwrap_err();
        assert!(err.is_missing());
        assert!(err.to_string().contains("Source file not found"));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "x".repeat(64)).unwrap();
        let err = load_document(&spec(SourceType::Text), &path, 16).unwrap_err();
        assert!(matches!(err, ExtractError::TooLarge { size: 64, limit: 16, .. }));
        assert!(!err.is_missing());
    }

    #[test]
    fn text_file_loads_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "line one\r\nline two").unwrap();
        let text = load_document(&spec(SourceType::Text), &path, 1024).unwrap();
        assert_eq!(text, "line one\r\nline two");
    }
}
