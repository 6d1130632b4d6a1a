use std::path::PathBuf;

use crate::engine::validate_file_name;
use crate::foundation::error::{TrimError, TrimResult};

/// Receives the finished render, as a browser download would.
pub trait DownloadSink {
    /// Save `bytes` as `file_name`. Returns where it ended up.
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> TrimResult<PathBuf>;
}

/// Writes downloads into a directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    /// Save into `dir`, overwriting existing files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: true,
        }
    }

    /// Refuse to replace an existing file.
    pub fn keep_existing(mut self) -> Self {
        self.overwrite = false;
        self
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> TrimResult<PathBuf> {
        use anyhow::Context as _;

        validate_file_name(file_name)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create download directory '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        if !self.overwrite && path.exists() {
            return Err(TrimError::validation(format!(
                "output file '{}' already exists",
                path.display()
            )));
        }

        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "download saved");
        Ok(path)
    }
}

/// Keeps downloads in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDownload {
    files: Vec<(String, Vec<u8>)>,
}

impl InMemoryDownload {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved `(file_name, bytes)` pairs in save order.
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }
}

impl DownloadSink for InMemoryDownload {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> TrimResult<PathBuf> {
        self.files.push((file_name.to_owned(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}
