//! Timestamped transcript loaded once at startup.

use std::collections::BTreeMap;
use std::path::Path;

use crate::foundation::error::{TrimError, TrimResult};

/// Immutable transcript: start second -> line of dialogue, ascending by key.
///
/// The JSON form is an object keyed by string-encoded integer seconds:
/// `{"0": "Hello", "5": "World"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct Transcript {
    lines: BTreeMap<u64, String>,
    timestamps: Vec<u64>,
}

impl Transcript {
    /// Build from `(seconds, line)` pairs. Later duplicates win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        let lines: BTreeMap<u64, String> = entries
            .into_iter()
            .map(|(ts, line)| (ts, line.into()))
            .collect();
        let timestamps = lines.keys().copied().collect();
        Self { lines, timestamps }
    }

    /// Parse the JSON object form.
    ///
    /// Malformed JSON is a [`TrimError::Serde`]; well-formed JSON with bad timestamp keys is a
    /// [`TrimError::Transcript`].
    pub fn from_json_str(s: &str) -> TrimResult<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(s)
            .map_err(|e| TrimError::serde(format!("parse transcript: {e}")))?;
        Self::try_from(raw)
    }

    /// Read and parse a transcript JSON file.
    pub fn from_json_path(path: &Path) -> TrimResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read transcript '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Sorted start timestamps.
    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }

    /// Text for the entry starting at `ts`.
    pub fn line(&self, ts: u64) -> Option<&str> {
        self.lines.get(&ts).map(String::as_str)
    }

    /// Resolve keys to `(seconds, text)`, skipping keys that are not in the transcript.
    pub fn lines_for<'a>(&'a self, keys: &'a [u64]) -> impl Iterator<Item = (u64, &'a str)> + 'a {
        keys.iter()
            .filter_map(|&ts| self.line(ts).map(|line| (ts, line)))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Return `true` when the transcript has no entries.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for Transcript {
    type Error = TrimError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut lines = BTreeMap::new();
        for (key, line) in raw {
            let ts: u64 = key.trim().parse().map_err(|_| {
                TrimError::transcript(format!(
                    "timestamp key '{key}' is not a non-negative integer number of seconds"
                ))
            })?;
            if lines.insert(ts, line).is_some() {
                return Err(TrimError::transcript(format!(
                    "timestamp {ts} appears more than once"
                )));
            }
        }
        let timestamps = lines.keys().copied().collect();
        Ok(Self { lines, timestamps })
    }
}
