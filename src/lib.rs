//! Trimreel trims and decorates a video that comes with a timestamped transcript.
//!
//! Two halves:
//!
//! - [`Synchronizer`] keeps the visible transcript slice in step with the playback cursor and
//!   the trim range, and keeps the cursor inside that range.
//! - [`RenderRequestBuilder`] stages an optional intro clip and two corner overlays, submits a
//!   filter-graph job to a [`MediaEngine`] and reports progress while it runs.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Optional render inputs.
pub mod assets;
/// Configuration file.
pub mod config;
/// Media engine trait and implementations.
pub mod engine;
/// Filter-graph templates.
pub mod filter_graph;
/// Playback cursor and trim range synchronization.
pub mod playback;
/// Render requests.
pub mod render;
/// Transcript loading.
pub mod transcript;

pub use crate::foundation::core::{FrameSize, Seconds, TrimRange};
pub use crate::foundation::error::{TrimError, TrimResult};

pub use crate::assets::{AssetSlot, RenderAsset, RenderAssets, blank_png};
pub use crate::config::EditorConfig;
pub use crate::engine::ffmpeg::{FfmpegEngine, is_ffmpeg_on_path};
pub use crate::engine::memory::{EngineScript, InMemoryEngine};
pub use crate::engine::{
    EngineEvent, EngineLocation, EventListener, ListenerId, MediaEngine, ProgressEvent,
};
pub use crate::filter_graph::{FilterGraph, FilterTemplate};
pub use crate::playback::{
    MediaControl, PlaybackClock, PlaybackEvent, RangeAction, SyncUpdate, Synchronizer,
    enforce_range, visible_window,
};
pub use crate::render::{
    DirectorySink, DownloadSink, InMemoryDownload, JobArgs, Preset, RenderOpts, RenderOutcome,
    RenderRequestBuilder, RenderStatus, RenderTask, format_progress,
};
pub use crate::transcript::Transcript;
