//! `grag init`: lay out a fresh project.
//!
//! Creates the config templates and data directories under `paths.root`.
//! Existing files are left untouched so `init` is safe to re-run.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Paths created (files and directories) by one `init` run.
#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

pub fn scaffold_project(config: &Config) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();
    let stamp = chrono::Utc::now().format("%Y-%m-%d");

    let dirs = [
        config.resolve(Path::new("data/raw")),
        config.processed_dir(),
        config.chunks_dir(),
    ];
    for dir in dirs {
        if dir.exists() {
            report.kept.push(dir);
        } else {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            report.created.push(dir);
        }
    }

    let sources = format!(
        r#"# Documents to ingest. Generated by `grag init` on {stamp}.
#
# type: pdf | html | text | markdown | docx
# Relative paths resolve against the project root. Missing files are
# skipped with a warning, so sources may be listed before download.
sources:
  - name: example-guideline
    path: data/raw/example-guideline.pdf
    type: pdf
"#
    );
    write_if_absent(&config.sources_path(), &sources, &mut report)?;

    let chunking = format!(
        r#"# Token window parameters. Generated by `grag init` on {stamp}.
chunk_size: 400
chunk_overlap: 50
tokenizer_name: cl100k_base
"#
    );
    write_if_absent(&config.chunking_path(), &chunking, &mut report)?;

    for path in &report.created {
        println!("created {}", path.display());
    }
    for path in &report.kept {
        println!("exists  {}", path.display());
    }

    Ok(report)
}

fn write_if_absent(path: &Path, contents: &str, report: &mut ScaffoldReport) -> Result<()> {
    if path.exists() {
        report.kept.push(path.to_path_buf());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    report.created.push(path.to_path_buf());
    Ok(())
}
