use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crate::assets::{AssetSlot, RenderAsset, RenderAssets, blank_png};
use crate::engine::{EngineEvent, EventListener, MediaEngine};
use crate::filter_graph::FilterTemplate;
use crate::foundation::error::{TrimError, TrimResult};
use crate::render::download::DownloadSink;
use crate::render::job::{BASE_VIDEO_NAME, JobArgs, PLACEHOLDER_NAME, RenderOpts};
use crate::render::progress::{RenderStatus, format_progress};

/// Collects the optional assets and submits one compositing job to a [`MediaEngine`].
///
/// Clones share the render status, so a clone handed to a worker thread keeps the original's
/// busy flag and progress message up to date.
#[derive(Clone, Debug)]
pub struct RenderRequestBuilder {
    base_video: RenderAsset,
    placeholder: RenderAsset,
    assets: RenderAssets,
    opts: RenderOpts,
    status: Arc<Mutex<RenderStatus>>,
}

impl RenderRequestBuilder {
    /// Create a builder for `base_video`, filling empty slots with `placeholder`.
    pub fn new(base_video: RenderAsset, placeholder: RenderAsset, opts: RenderOpts) -> Self {
        Self {
            base_video,
            placeholder,
            assets: RenderAssets::default(),
            opts,
            status: Arc::new(Mutex::new(RenderStatus::default())),
        }
    }

    /// Like [`RenderRequestBuilder::new`] with a generated transparent placeholder.
    pub fn with_blank_placeholder(base_video: RenderAsset, opts: RenderOpts) -> TrimResult<Self> {
        let placeholder = RenderAsset::new(PLACEHOLDER_NAME, blank_png()?);
        Ok(Self::new(base_video, placeholder, opts))
    }

    /// Record a file for `slot`. Content is not inspected.
    pub fn select_asset(&mut self, slot: AssetSlot, asset: RenderAsset) {
        tracing::debug!(slot = slot.label(), name = asset.name(), "asset selected");
        self.assets.select(slot, asset);
    }

    /// Forget the file in `slot`.
    pub fn clear_asset(&mut self, slot: AssetSlot) {
        self.assets.clear(slot);
    }

    /// Selected assets.
    pub fn assets(&self) -> &RenderAssets {
        &self.assets
    }

    /// Render options.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// The render trigger is enabled once any optional asset is chosen.
    pub fn can_render(&self) -> bool {
        self.assets.has_any()
    }

    /// Graph shape the current selection produces.
    pub fn template(&self) -> FilterTemplate {
        FilterTemplate::select(self.assets.has_intro())
    }

    /// Snapshot of the busy flag and progress message.
    pub fn status(&self) -> RenderStatus {
        lock(&self.status).clone()
    }

    /// The job the current selection would submit.
    pub fn job_args(&self) -> JobArgs {
        JobArgs::plan(&self.assets, &self.opts)
    }

    /// Stage inputs, run the job and hand the result to `sink`.
    ///
    /// `on_progress` receives every formatted progress message. The busy flag is set for the
    /// duration of the call and cleared on every exit path. The listener registered here is
    /// removed before returning; listeners the caller added to the engine stay in place.
    #[tracing::instrument(skip_all, fields(template = ?self.template()))]
    pub fn render<E, S, F>(&self, engine: &mut E, sink: &mut S, on_progress: F) -> TrimResult<PathBuf>
    where
        E: MediaEngine + ?Sized,
        S: DownloadSink + ?Sized,
        F: FnMut(&str) + Send + 'static,
    {
        if !engine.is_loaded() {
            return Err(TrimError::engine("media engine is not loaded"));
        }
        if !self.can_render() {
            return Err(TrimError::validation(
                "select an intro clip or an overlay image before rendering",
            ));
        }
        self.check_asset_names()?;

        let _busy = BusyGuard::acquire(&self.status)?;
        let listener = engine.on_event(self.progress_listener(on_progress));
        let result = self.run_job(engine, sink);
        engine.remove_listener(listener);

        match &result {
            Ok(path) => tracing::info!(path = %path.display(), "render finished"),
            Err(e) => tracing::warn!(error = %e, "render failed"),
        }
        result
    }

    /// Run [`RenderRequestBuilder::render`] on a worker thread.
    ///
    /// Progress messages arrive on the returned task's channel while the caller stays free.
    pub fn spawn_render<E, S>(&self, mut engine: E, mut sink: S) -> RenderTask<E, S>
    where
        E: MediaEngine + 'static,
        S: DownloadSink + Send + 'static,
    {
        let builder = self.clone();
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            let result = builder.render(&mut engine, &mut sink, move |msg| {
                let _ = tx.send(msg.to_owned());
            });
            RenderOutcome {
                result,
                engine,
                sink,
            }
        });
        RenderTask {
            updates: rx,
            handle,
        }
    }

    /// Listener that mirrors engine progress into the status and `on_progress`.
    fn progress_listener<F>(&self, mut on_progress: F) -> EventListener
    where
        F: FnMut(&str) + Send + 'static,
    {
        let status = Arc::clone(&self.status);
        Box::new(move |event: &EngineEvent| match event {
            EngineEvent::Log(line) => tracing::debug!(target: "trimreel::engine", "{line}"),
            EngineEvent::Progress(p) => {
                let msg = format_progress(p.progress, p.time_us);
                lock(&status).progress_message.clone_from(&msg);
                on_progress(&msg);
            }
        })
    }

    fn run_job<E, S>(&self, engine: &mut E, sink: &mut S) -> TrimResult<PathBuf>
    where
        E: MediaEngine + ?Sized,
        S: DownloadSink + ?Sized,
    {
        engine.write_file(BASE_VIDEO_NAME, self.base_video.bytes())?;
        engine.write_file(PLACEHOLDER_NAME, self.placeholder.bytes())?;
        for (slot, asset) in self.assets.selected() {
            tracing::debug!(slot = slot.label(), name = asset.name(), "staging asset");
            engine.write_file(asset.name(), asset.bytes())?;
        }

        let args = self.job_args().to_args();
        engine.exec(&args)?;

        let output = engine.read_file(&self.opts.output_name)?;
        sink.save(&self.opts.output_name, &output)
    }

    fn check_asset_names(&self) -> TrimResult<()> {
        for (slot, asset) in self.assets.selected() {
            let name = asset.name();
            if name == BASE_VIDEO_NAME || name == PLACEHOLDER_NAME || name == self.opts.output_name
            {
                return Err(TrimError::validation(format!(
                    "{} file name '{name}' is reserved; rename the file",
                    slot.label()
                )));
            }
            crate::engine::validate_file_name(name)?;
        }
        Ok(())
    }
}

/// Everything a spawned render hands back.
pub struct RenderOutcome<E, S> {
    /// Where the download was saved, or why the render failed.
    pub result: TrimResult<PathBuf>,
    /// The engine, ready for another job.
    pub engine: E,
    /// The download sink.
    pub sink: S,
}

/// Handle to a render running on a worker thread.
pub struct RenderTask<E, S> {
    updates: mpsc::Receiver<String>,
    handle: JoinHandle<RenderOutcome<E, S>>,
}

impl<E, S> RenderTask<E, S> {
    /// Progress messages as they arrive. Ends when the render stops reporting.
    pub fn updates(&self) -> impl Iterator<Item = String> + '_ {
        self.updates.iter()
    }

    /// Wait for the render to finish.
    pub fn join(self) -> TrimResult<RenderOutcome<E, S>> {
        self.handle
            .join()
            .map_err(|_| TrimError::engine("render thread panicked"))
    }
}

struct BusyGuard<'a> {
    status: &'a Mutex<RenderStatus>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(status: &'a Mutex<RenderStatus>) -> TrimResult<Self> {
        let mut s = lock(status);
        if s.is_rendering {
            return Err(TrimError::validation("a render is already in progress"));
        }
        s.is_rendering = true;
        s.progress_message = format_progress(0.0, 0);
        Ok(Self { status })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut s = lock(self.status);
        s.is_rendering = false;
        s.progress_message.clear();
    }
}

fn lock(status: &Mutex<RenderStatus>) -> MutexGuard<'_, RenderStatus> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}
