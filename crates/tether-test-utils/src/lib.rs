//! Test utilities for Tether crates.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file named `name` with given content.
pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Collects formatted tracing output in memory so tests can assert on it.
///
/// Clones share one buffer.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a plain-text subscriber at `TRACE` for the current thread.
    pub fn set_default(&self) -> DefaultGuard {
        self.set_default_at(LevelFilter::TRACE)
    }

    /// Install a plain-text subscriber with the given maximum level for the
    /// current thread.
    pub fn set_default_at(&self, level: LevelFilter) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(level)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().expect("log capture poisoned");
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Non-empty output lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Lines containing `needle`.
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.lines().into_iter().filter(|l| l.contains(needle)).collect()
    }

    pub fn clear(&self) {
        self.buf.lock().expect("log capture poisoned").clear();
    }
}

/// Writer handed out by [`LogCapture`].
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log capture poisoned"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file_creation() {
        let (_dir, path) = temp_file("tether.yaml", "database: {}");
        assert!(path.is_file());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "database: {}");
    }

    #[test]
    fn test_capture_collects_lines() {
        let capture = LogCapture::new();
        {
            let _guard = capture.set_default();
            tracing::info!(answer = 42, "first");
            tracing::warn!("second");
        }
        let lines = capture.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("answer=42"));
        assert!(lines[1].contains("WARN"));
        assert_eq!(capture.lines_containing("second").len(), 1);
    }

    #[test]
    fn test_capture_respects_level() {
        let capture = LogCapture::new();
        {
            let _guard = capture.set_default_at(LevelFilter::WARN);
            tracing::info!("hidden");
            tracing::error!("shown");
        }
        assert!(!capture.contents().contains("hidden"));
        assert!(capture.contents().contains("shown"));
    }

    #[test]
    fn test_clones_share_buffer() {
        let capture = LogCapture::new();
        let other = capture.clone();
        {
            let _guard = other.set_default();
            tracing::info!("shared");
        }
        assert!(capture.contents().contains("shared"));
        capture.clear();
        assert!(other.contents().is_empty());
    }

    #[test]
    fn test_assert_macros() {
        let ok: Result<u8, &str> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);
        let err: Result<u8, &str> = Err("nope");
        assert_eq!(assert_err!(err), "nope");
    }
}
