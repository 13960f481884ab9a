//! Import progress reporting.
//!
//! The driver counts the input lines in a first pass, then reports how far
//! the import pass has got and how many records it has written. Progress is
//! emitted on **stderr** so stdout keeps only the run summary.

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// A single progress event for an import run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestProgressEvent {
    /// Counting pass finished: the file holds `total` lines.
    Counted { path: String, total: u64 },
    /// Import pass: `n` of `total` lines handled, `written` records so far.
    Ingesting { n: u64, total: u64, written: u64 },
}

/// Receives progress events from the driver loop.
pub trait IngestProgressReporter: Send + Sync {
    fn report(&self, event: IngestProgressEvent);
}

/// Human progress on stderr, e.g.
/// `profiles.jsonl  1,234/5,000 lines  24%  1,180 written`.
///
/// Lines are prefixed with the input's file name, learned from `Counted`.
#[derive(Default)]
pub struct StderrProgress {
    label: Mutex<String>,
}

impl StderrProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IngestProgressReporter for StderrProgress {
    fn report(&self, event: IngestProgressEvent) {
        let mut label = self.label.lock().unwrap();
        if let IngestProgressEvent::Counted { path, .. } = &event {
            *label = file_label(path);
        }
        let line = human_line(&label, &event);
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
        let _ = stderr.flush();
    }
}

fn file_label(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn human_line(label: &str, event: &IngestProgressEvent) -> String {
    match event {
        IngestProgressEvent::Counted { total, .. } => {
            format!("{label}  {} lines to import", group_thousands(*total))
        }
        IngestProgressEvent::Ingesting { n, total, written } => format!(
            "{label}  {}/{} lines  {}%  {} written",
            group_thousands(*n),
            group_thousands(*total),
            percent(*n, *total),
            group_thousands(*written)
        ),
    }
}

/// One JSON object per line on stderr, tagged `"event": "progress"`.
pub struct JsonProgress;

impl IngestProgressReporter for JsonProgress {
    fn report(&self, event: IngestProgressEvent) {
        let obj = match &event {
            IngestProgressEvent::Counted { path, total } => serde_json::json!({
                "event": "progress",
                "phase": "counted",
                "path": path,
                "total": total
            }),
            IngestProgressEvent::Ingesting { n, total, written } => serde_json::json!({
                "event": "progress",
                "phase": "ingesting",
                "n": n,
                "total": total,
                "written": written
            }),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{obj}");
        let _ = stderr.flush();
    }
}

/// Discards every event.
pub struct NoProgress;

impl IngestProgressReporter for NoProgress {
    fn report(&self, _event: IngestProgressEvent) {}
}

/// `1234567` → `1,234,567`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn percent(n: u64, total: u64) -> u64 {
    if total == 0 {
        100
    } else {
        n.saturating_mul(100) / total
    }
}

/// Value of `--progress`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// The requested mode, or human on a terminal and off when piped.
    pub fn resolve(requested: Option<Self>) -> Self {
        requested.unwrap_or_else(|| {
            if atty::is(atty::Stream::Stderr) {
                ProgressMode::Human
            } else {
                ProgressMode::Off
            }
        })
    }

    pub fn reporter(self) -> Box<dyn IngestProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress::new()),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(123_456), "123,456");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn percent_of_total() {
        assert_eq!(percent(50, 200), 25);
        assert_eq!(percent(200, 200), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn human_lines_carry_file_and_written_count() {
        let label = file_label("/data/exports/profiles.jsonl");
        assert_eq!(label, "profiles.jsonl");
        assert_eq!(
            human_line(
                &label,
                &IngestProgressEvent::Counted {
                    path: "/data/exports/profiles.jsonl".to_string(),
                    total: 5000
                }
            ),
            "profiles.jsonl  5,000 lines to import"
        );
        assert_eq!(
            human_line(
                &label,
                &IngestProgressEvent::Ingesting {
                    n: 1234,
                    total: 5000,
                    written: 1180
                }
            ),
            "profiles.jsonl  1,234/5,000 lines  24%  1,180 written"
        );
    }

    #[test]
    fn explicit_mode_wins() {
        assert_eq!(
            ProgressMode::resolve(Some(ProgressMode::Json)),
            ProgressMode::Json
        );
    }
}
