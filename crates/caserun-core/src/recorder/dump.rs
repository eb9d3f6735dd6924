use super::CaseRecorder;
use crate::model::Case;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Sink for [`DumpRecorder`]. Standard streams and shared buffers are
/// borrowed, never owned: `close` must not touch them. A `File` sink was
/// opened by the recorder and is released on close.
pub enum DumpSink {
    Stdout,
    Stderr,
    File(LineWriter<File>),
    Buffer(Arc<Mutex<Vec<u8>>>),
}

/// Writes the human-readable rendering of every recorded case to one
/// sink. After `close` (or when constructed disabled) recording silently
/// does nothing.
pub struct DumpRecorder {
    sink: Option<DumpSink>,
}

impl DumpRecorder {
    pub fn stdout() -> Self {
        Self {
            sink: Some(DumpSink::Stdout),
        }
    }

    pub fn stderr() -> Self {
        Self {
            sink: Some(DumpSink::Stderr),
        }
    }

    /// Open `path` for writing. The recorder owns the handle and releases
    /// it on close.
    pub fn to_path(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to open dump file {}", path.display()))?;
        Ok(Self {
            sink: Some(DumpSink::File(LineWriter::new(file))),
        })
    }

    /// Write into a caller-owned buffer. The buffer and its contents
    /// survive `close`.
    pub fn buffer(buf: Arc<Mutex<Vec<u8>>>) -> Self {
        Self {
            sink: Some(DumpSink::Buffer(buf)),
        }
    }

    /// Recorder that discards everything.
    pub fn disabled() -> Self {
        Self { sink: None }
    }
}

impl CaseRecorder for DumpRecorder {
    fn record(&mut self, case: &Case) -> Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        match sink {
            DumpSink::Stdout => {
                let mut out = std::io::stdout().lock();
                write!(out, "{}", case).context("failed to write case to stdout")?;
            }
            DumpSink::Stderr => {
                let mut out = std::io::stderr().lock();
                write!(out, "{}", case).context("failed to write case to stderr")?;
            }
            DumpSink::File(w) => {
                write!(w, "{}", case).context("failed to write case to dump file")?;
            }
            DumpSink::Buffer(buf) => {
                let mut guard = buf.lock().unwrap();
                write!(guard, "{}", case).context("failed to write case to buffer")?;
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Only a privately opened file is ours to release; standard
        // streams and caller-provided buffers stay untouched.
        match self.sink.take() {
            Some(DumpSink::File(mut w)) => {
                w.flush().context("failed to flush dump file")?;
            }
            Some(_) | None => {}
        }
        Ok(())
    }
}
