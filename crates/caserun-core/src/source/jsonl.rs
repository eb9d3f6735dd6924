use super::{CaseIter, CaseSource};
use crate::model::Case;
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Case stream stored as one JSON object per line. Blank lines are
/// skipped.
///
/// The file is opened lazily on each `cases` call, so the source restarts
/// from the top for every run. An unreadable file or a malformed line
/// comes back as an `Err` item.
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaseSource for JsonlSource {
    fn cases(&mut self) -> CaseIter<'_> {
        let file = match File::open(&self.path)
            .with_context(|| format!("failed to open case file {}", self.path.display()))
        {
            Ok(f) => f,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        let path = self.path.clone();
        let lines = BufReader::new(file).lines();
        Box::new(lines.enumerate().filter_map(move |(idx, line)| {
            let line = match line
                .with_context(|| format!("failed to read {} line {}", path.display(), idx + 1))
            {
                Ok(l) => l,
                Err(e) => return Some(Err(e)),
            };
            if line.trim().is_empty() {
                return None;
            }
            Some(serde_json::from_str::<Case>(&line).with_context(|| {
                format!("malformed case at {} line {}", path.display(), idx + 1)
            }))
        }))
    }
}
