use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::HistoryError;
use crate::model::GameResult;

/// Append-only CSV log of finished rounds
#[derive(Debug, Clone)]
pub struct GameLog {
    path: PathBuf,
}

impl GameLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, result: &GameResult) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        // an empty file needs a header row, even if it already existed
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(result)?;
        writer.flush()?;
        Ok(())
    }

    /// The last `limit` rounds, oldest first. A missing log is empty.
    pub fn recent(&self, limit: usize) -> Result<Vec<GameResult>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut results = reader
            .deserialize::<GameResult>()
            .collect::<Result<Vec<_>, _>>()?;

        let skip = results.len().saturating_sub(limit);
        Ok(results.split_off(skip))
    }
}
