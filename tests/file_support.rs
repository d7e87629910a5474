//! Integration tests for binary document formats: DOCX extraction, corrupt
//! PDFs and the extract size limit, all driven through `grag run`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn grag_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.push("grag");
    path
}

fn minimal_docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
            body
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn setup_env(sources_yaml: &str, max_extract_bytes: u64) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::create_dir_all(root.join("configs")).unwrap();
    fs::create_dir_all(root.join("files")).unwrap();
    fs::write(root.join("configs/sources.yaml"), sources_yaml).unwrap();
    fs::write(
        root.join("configs/chunking.yaml"),
        "chunk_size: 64\nchunk_overlap: 16\n",
    )
    .unwrap();

    let config_path = root.join("grag.toml");
    fs::write(
        &config_path,
        format!(
            "[paths]\nroot = \"{}\"\n\n[ingest]\nmax_extract_bytes = {}\n",
            root.display(),
            max_extract_bytes
        ),
    )
    .unwrap();

    (tmp, config_path)
}

fn run_grag(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(grag_binary())
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run grag: {}", e));
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn docx_paragraphs_reach_the_chunks() {
    let (tmp, config_path) = setup_env(
        "sources:\n  - { name: policy, path: files/policy.docx, type: docx }\n",
        1_000_000,
    );
    fs::write(
        tmp.path().join("files/policy.docx"),
        minimal_docx_with_paragraphs(&["Antibiotic stewardship", "Review at 48 hours."]),
    )
    .unwrap();

    let (stdout, stderr, success) = run_grag(&config_path, &["run"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("written: 1"));

    let processed = fs::read_to_string(tmp.path().join("data/processed/policy.txt")).unwrap();
    assert_eq!(processed, "Antibiotic stewardship\nReview at 48 hours.");

    let jsonl = fs::read_to_string(tmp.path().join("data/chunks/policy.jsonl")).unwrap();
    assert_eq!(jsonl.lines().count(), 1);
    assert!(jsonl.contains("Review at 48 hours."));
}

#[test]
fn corrupt_pdf_is_skipped_and_run_succeeds() {
    let (tmp, config_path) = setup_env(
        r#"sources:
  - { name: bad, path: files/bad.pdf, type: pdf }
  - { name: good, path: files/good.txt, type: text }
"#,
        1_000_000,
    );
    fs::write(tmp.path().join("files/bad.pdf"), b"not a valid pdf").unwrap();
    fs::write(tmp.path().join("files/good.txt"), "Good content.").unwrap();

    let (stdout, stderr, success) = run_grag(&config_path, &["run"]);
    assert!(success, "run must succeed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("failed: 1"), "{}", stdout);
    assert!(stdout.contains("written: 1"), "{}", stdout);
    assert!(stderr.contains("PDF extraction failed"));
    assert!(tmp.path().join("data/chunks/good.jsonl").exists());
    assert!(!tmp.path().join("data/chunks/bad.jsonl").exists());
}

#[test]
fn oversized_source_is_skipped() {
    let (tmp, config_path) = setup_env(
        r#"sources:
  - { name: big, path: files/big.txt, type: text }
  - { name: small, path: files/small.txt, type: text }
"#,
        1000,
    );
    fs::write(tmp.path().join("files/big.txt"), "x ".repeat(2000)).unwrap();
    fs::write(tmp.path().join("files/small.txt"), "Ok.").unwrap();

    let (stdout, _, success) = run_grag(&config_path, &["ingest"]);
    assert!(success);
    assert!(stdout.contains("failed: 1"), "{}", stdout);
    assert!(stdout.contains("written: 1"), "{}", stdout);
    assert!(!tmp.path().join("data/processed/big.txt").exists());
}
