use super::CaseRecorder;
use crate::model::Case;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

/// Records one JSON case per line, suitable for replaying later through
/// `JsonlSource`.
pub struct JsonlRecorder {
    path: PathBuf,
    out: Option<LineWriter<File>>,
}

impl JsonlRecorder {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create case log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: Some(LineWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaseRecorder for JsonlRecorder {
    fn record(&mut self, case: &Case) -> Result<()> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        let line = serde_json::to_string(case).context("failed to encode case")?;
        writeln!(out, "{}", line)
            .with_context(|| format!("failed to write case to {}", self.path.display()))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()
                .with_context(|| format!("failed to flush case log {}", self.path.display()))?;
        }
        Ok(())
    }
}
