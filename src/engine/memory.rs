use std::collections::BTreeMap;

use crate::engine::{
    EngineEvent, EngineLocation, EventListener, ListenerId, Listeners, MediaEngine, ProgressEvent,
    validate_file_name,
};
use crate::foundation::error::{TrimError, TrimResult};

/// What an [`InMemoryEngine`] does when driven.
#[derive(Clone, Debug, Default)]
pub struct EngineScript {
    /// Make `load` fail with this message.
    pub fail_load: Option<String>,
    /// Make `exec` fail with this message after replaying events.
    pub fail_exec: Option<String>,
    /// Log lines replayed on every `exec`.
    pub logs: Vec<String>,
    /// Progress samples replayed on every `exec`, after the logs.
    pub progress: Vec<ProgressEvent>,
    /// Bytes written under the last argument when `exec` succeeds.
    pub output: Vec<u8>,
}

/// Engine that keeps files in memory and replays an [`EngineScript`].
///
/// Every `-i` input must have been staged, mirroring a real engine's missing-input failure.
#[derive(Default)]
pub struct InMemoryEngine {
    script: EngineScript,
    loaded: bool,
    files: BTreeMap<String, Vec<u8>>,
    listeners: Listeners,
    submitted: Vec<Vec<String>>,
}

impl InMemoryEngine {
    /// Create an unloaded engine following `script`.
    pub fn new(script: EngineScript) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Staged and produced files.
    pub fn files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.files
    }

    /// Argument lists passed to `exec`, in order.
    pub fn submitted(&self) -> &[Vec<String>] {
        &self.submitted
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn ensure_loaded(&self) -> TrimResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(TrimError::engine("media engine is not loaded"))
        }
    }
}

impl MediaEngine for InMemoryEngine {
    fn load(&mut self, _location: &EngineLocation) -> TrimResult<()> {
        if let Some(msg) = &self.script.fail_load {
            return Err(TrimError::engine(msg.clone()));
        }
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn on_event(&mut self, listener: EventListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> TrimResult<()> {
        self.ensure_loaded()?;
        validate_file_name(name)?;
        self.files.insert(name.to_owned(), data.to_vec());
        Ok(())
    }

    fn exec(&mut self, args: &[String]) -> TrimResult<()> {
        self.ensure_loaded()?;
        self.submitted.push(args.to_vec());

        for pair in args.windows(2) {
            if pair[0] == "-i" && !self.files.contains_key(&pair[1]) {
                return Err(TrimError::engine(format!("{}: No such file", pair[1])));
            }
        }

        for line in &self.script.logs {
            self.listeners.dispatch(&EngineEvent::Log(line.clone()));
        }
        for p in &self.script.progress {
            self.listeners.dispatch(&EngineEvent::Progress(*p));
        }

        if let Some(msg) = &self.script.fail_exec {
            return Err(TrimError::engine(msg.clone()));
        }

        let out = args
            .last()
            .ok_or_else(|| TrimError::engine("empty argument list"))?;
        self.files.insert(out.clone(), self.script.output.clone());
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> TrimResult<Vec<u8>> {
        self.ensure_loaded()?;
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| TrimError::engine(format!("file '{name}' does not exist")))
    }
}
