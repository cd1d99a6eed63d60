//! Diagnostic snapshots emitted on each cadence tick.
//!
//! Snapshots are a product surface, not logs: they render as one fixed-format
//! line and go to whichever sink the caller injects.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Line emitted once when the control loop starts.
pub const START_LINE: &str = "Start";

/// Controller state as seen at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub threshold: u16,
    pub dial: u16,
    pub light: u16,
    /// Last position written to the servo; 0 before the first write.
    pub servo: u8,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Threshold: {} Dial: {} Light: {} Servo: {}",
            self.threshold, self.dial, self.light, self.servo
        )
    }
}

/// Receives the start marker and one snapshot per tick.
///
/// Sinks never fail the loop; delivery problems are logged and dropped.
pub trait DiagnosticSink {
    fn start(&mut self) {}
    fn report(&mut self, snapshot: &Snapshot);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Box<T> {
    fn start(&mut self) {
        (**self).start();
    }
    fn report(&mut self, snapshot: &Snapshot) {
        (**self).report(snapshot);
    }
}

/// Routes snapshots to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn start(&mut self) {
        tracing::info!(target: "fan::diagnostics", "{START_LINE}");
    }

    fn report(&mut self, s: &Snapshot) {
        tracing::info!(
            target: "fan::diagnostics",
            threshold = s.threshold,
            dial = s.dial,
            light = s.light,
            servo = s.servo,
            "{s}"
        );
    }
}

/// Writes each line to any `io::Write` (stdout in the CLI).
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "diagnostic line dropped");
        }
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn start(&mut self) {
        self.line(START_LINE);
    }

    fn report(&mut self, snapshot: &Snapshot) {
        self.line(&snapshot.to_string());
    }
}

/// Appends lines to a file, reopening it for every line.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) {
        let res = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(e) = res {
            tracing::warn!(error = %e, path = %self.path.display(), "diagnostic line dropped");
        }
    }
}

impl DiagnosticSink for FileSink {
    fn start(&mut self) {
        self.append(START_LINE);
    }

    fn report(&mut self, snapshot: &Snapshot) {
        self.append(&snapshot.to_string());
    }
}

/// Captures lines in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines captured so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|l| l.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn push(&self, line: String) {
        match self.lines.lock() {
            Ok(mut l) => l.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn start(&mut self) {
        self.push(START_LINE.to_string());
    }

    fn report(&mut self, snapshot: &Snapshot) {
        self.push(snapshot.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap() -> Snapshot {
        Snapshot {
            threshold: 900,
            dial: 800,
            light: 600,
            servo: 93,
        }
    }

    #[test]
    fn snapshot_line_format() {
        assert_eq!(
            snap().to_string(),
            "Threshold: 900 Dial: 800 Light: 600 Servo: 93"
        );
    }

    #[test]
    fn writer_sink_emits_lines() {
        let mut sink = WriterSink::new(Vec::new());
        sink.start();
        sink.report(&snap());
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "Start\nThreshold: 900 Dial: 800 Light: 600 Servo: 93\n");
    }

    #[test]
    fn memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut boxed: Box<dyn DiagnosticSink> = Box::new(sink.clone());
        boxed.start();
        boxed.report(&snap());
        assert_eq!(sink.lines().len(), 2);
        assert_eq!(sink.lines()[0], "Start");
    }

    #[test]
    fn file_sink_appends() {
        let dir = std::env::temp_dir().join(format!("fan_diag_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("diag.log");
        let _ = std::fs::remove_file(&path);
        let mut sink = FileSink::new(&path);
        sink.start();
        sink.report(&snap());
        sink.report(&snap());
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("Start\n"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
