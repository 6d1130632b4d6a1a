use crate::foundation::error::{TrimError, TrimResult};

/// Playback position or duration in seconds.
///
/// Media elements report fractional, possibly non-finite values; they are carried as-is.
pub type Seconds = f64;

/// User-selected `[start, end]` trim range in seconds.
///
/// `end` stays unset until the media duration is known.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrimRange {
    /// Inclusive range start.
    pub start: Seconds,
    /// Inclusive range end, `None` until a duration or explicit range arrives.
    pub end: Option<Seconds>,
}

impl TrimRange {
    /// Create a range with both bounds set.
    pub fn new(start: Seconds, end: Seconds) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// End used by predicates; an unset end behaves like `0`.
    pub fn effective_end(self) -> Seconds {
        self.end.unwrap_or(0.0)
    }

    /// Return `true` when the end has never been chosen (unset, zero or NaN).
    pub fn end_is_unset(self) -> bool {
        match self.end {
            None => true,
            Some(end) => end == 0.0 || end.is_nan(),
        }
    }
}

/// Output frame size used to normalise the base video and the intro clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl FrameSize {
    /// Check the size is usable for yuv420p output.
    pub fn validate(self) -> TrimResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TrimError::validation("frame width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(TrimError::validation(
                "frame width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}
