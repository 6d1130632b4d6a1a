//! Media engine seam.
//!
//! The engine owns a flat namespace of staged files, runs one filter/encode job at a time and
//! reports log lines and progress through registered listeners. Listeners run on the thread
//! that called [`MediaEngine::exec`].

use std::path::{Path, PathBuf};

use crate::foundation::error::{TrimError, TrimResult};

/// System `ffmpeg` process engine.
pub mod ffmpeg;
/// Scripted engine for tests and dry runs.
pub mod memory;

/// Progress sample reported while a job runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressEvent {
    /// Completed fraction, nominally `0..=1`. Not clamped.
    pub progress: f64,
    /// Amount of output rendered so far, in microseconds.
    pub time_us: i64,
}

/// Notification emitted during [`MediaEngine::exec`].
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// One line of engine log output.
    Log(String),
    /// A progress sample.
    Progress(ProgressEvent),
}

/// Callback registered with [`MediaEngine::on_event`].
pub type EventListener = Box<dyn FnMut(&EngineEvent) + Send>;

/// Handle for removing one listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Where the engine lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineLocation {
    /// Engine executable.
    pub program: PathBuf,
    /// Directory used as the engine's file namespace. When absent the engine stages into a
    /// private temporary directory that is deleted together with the engine.
    pub workdir: Option<PathBuf>,
}

impl EngineLocation {
    /// Location for `program` with a throwaway staging directory.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: None,
        }
    }

    /// Stage into `workdir` instead. The directory is kept after the engine is dropped.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// The configured staging directory, if any.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }
}

/// External media-processing capability.
///
/// `load` must succeed before any other operation; the rest fail with
/// [`TrimError::Engine`] until then.
pub trait MediaEngine: Send {
    /// Prepare the engine and set the ready flag.
    fn load(&mut self, location: &EngineLocation) -> TrimResult<()>;
    /// Return `true` once `load` has succeeded.
    fn is_loaded(&self) -> bool;
    /// Register a listener for log and progress events.
    fn on_event(&mut self, listener: EventListener) -> ListenerId;
    /// Drop the listener registered under `id`. Returns `false` if it was already gone.
    fn remove_listener(&mut self, id: ListenerId) -> bool;
    /// Stage `data` under `name` for the next job.
    fn write_file(&mut self, name: &str, data: &[u8]) -> TrimResult<()>;
    /// Run one job with the given argument list.
    fn exec(&mut self, args: &[String]) -> TrimResult<()>;
    /// Read a file produced by the last job.
    fn read_file(&mut self, name: &str) -> TrimResult<Vec<u8>>;
}

/// Registered listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, EventListener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: EventListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn dispatch(&mut self, event: &EngineEvent) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }
}

/// Staged names are flat: no separators, no `.`/`..`.
pub(crate) fn validate_file_name(name: &str) -> TrimResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(TrimError::validation(format!(
            "'{name}' is not a valid engine file name"
        )));
    }
    Ok(())
}
