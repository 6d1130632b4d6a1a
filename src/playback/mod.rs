//! Playback cursor, trim range and the visible transcript slice.
//!
//! [`Synchronizer`] is the stateful side; [`visible_window`] and [`enforce_range`] are the pure
//! rules it applies after every event.

/// Simulated media element.
pub mod clock;
/// Event-driven synchronizer.
pub mod sync;
/// Window predicate and range clamp.
pub mod window;

pub use clock::PlaybackClock;
pub use sync::{MediaControl, PlaybackEvent, SyncUpdate, Synchronizer, apply_action};
pub use window::{RangeAction, enforce_range, visible_window};
