//! Render request assembly, submission and progress reporting.

/// The request builder and its worker-thread task.
pub mod builder;
/// Where finished renders go.
pub mod download;
/// Engine argument lists and render options.
pub mod job;
/// Busy flag and progress text.
pub mod progress;

pub use builder::{RenderOutcome, RenderRequestBuilder, RenderTask};
pub use download::{DirectorySink, DownloadSink, InMemoryDownload};
pub use job::{
    BASE_VIDEO_NAME, DEFAULT_OUTPUT_NAME, JobArgs, PLACEHOLDER_NAME, Preset, RenderOpts,
};
pub use progress::{RenderStatus, format_progress};
