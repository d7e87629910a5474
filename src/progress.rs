//! Stage progress reporting.
//!
//! Reports how far `grag ingest` / `grag chunk` have got so long runs over
//! large PDFs are observable. Progress is emitted on **stderr** so stdout
//! (the run summary) remains parseable for scripts.

use std::io::Write;

/// Pipeline stage a progress event belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Ingest,
    Chunk,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Chunk => "chunk",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            Stage::Ingest => "sources",
            Stage::Chunk => "files",
        }
    }
}

/// `n` of `total` items finished; `item` is the one just processed.
#[derive(Clone, Debug)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub item: String,
    pub n: u64,
    pub total: u64,
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "ingest  3 / 12 sources  (who-2021)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", human_line(&event));
        let _ = stderr.flush();
    }
}

fn human_line(event: &ProgressEvent) -> String {
    format!(
        "{}  {} / {} {}  ({})",
        event.stage.as_str(),
        format_number(event.n),
        format_number(event.total),
        event.stage.unit(),
        event.item
    )
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", json_line(&event));
        let _ = stderr.flush();
    }
}

fn json_line(event: &ProgressEvent) -> serde_json::Value {
    serde_json::json!({
        "event": "progress",
        "stage": event.stage.as_str(),
        "item": event.item,
        "n": event.n,
        "total": event.total,
    })
}

pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    fn event(stage: Stage, n: u64, total: u64) -> ProgressEvent {
        ProgressEvent {
            stage,
            item: "who-2021".to_string(),
            n,
            total,
        }
    }

    #[test]
    fn human_line_format() {
        assert_eq!(
            human_line(&event(Stage::Ingest, 3, 12)),
            "ingest  3 / 12 sources  (who-2021)"
        );
        assert_eq!(
            human_line(&event(Stage::Chunk, 1200, 4000)),
            "chunk  1,200 / 4,000 files  (who-2021)"
        );
    }

    #[test]
    fn json_line_fields() {
        let line = json_line(&event(Stage::Chunk, 2, 5)).to_string();
        assert!(!line.contains('\n'));
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["event"], "progress");
        assert_eq!(v["stage"], "chunk");
        assert_eq!(v["item"], "who-2021");
        assert_eq!(v["n"], 2);
        assert_eq!(v["total"], 5);
    }

    #[test]
    fn reporter_per_mode() {
        // Smoke: every mode yields a reporter that accepts events.
        for mode in [ProgressMode::Off, ProgressMode::Human, ProgressMode::Json] {
            mode.reporter().report(event(Stage::Ingest, 1, 1));
        }
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::Ingest.as_str(), "ingest");
        assert_eq!(Stage::Chunk.unit(), "files");
    }
}
