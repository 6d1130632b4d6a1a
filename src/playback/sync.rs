use crate::foundation::core::{Seconds, TrimRange};
use crate::playback::window::{RangeAction, enforce_range, visible_window};
use crate::transcript::Transcript;

/// Discrete input from the media element or the range control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackEvent {
    /// The media element reported a new playback position.
    TimeUpdate(Seconds),
    /// Media metadata loaded (or changed) with a new duration.
    DurationChange(Seconds),
    /// The user moved either handle of the range control.
    RangeChange {
        /// New range start.
        start: Seconds,
        /// New range end.
        end: Seconds,
    },
}

/// Result of applying one event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncUpdate {
    /// Visible transcript keys after the event, ascending.
    pub visible: Vec<u64>,
    /// Clamp the media element must perform, if any.
    pub action: Option<RangeAction>,
}

/// The media element side of the synchronizer.
pub trait MediaControl {
    /// Move the playback position.
    fn seek(&mut self, position: Seconds);
    /// Stop playback.
    fn pause(&mut self);
}

/// Keeps the visible transcript slice consistent with the playback cursor and the trim range,
/// and keeps the cursor inside the range.
#[derive(Clone, Debug)]
pub struct Synchronizer {
    transcript: Transcript,
    current_time: Seconds,
    duration: Seconds,
    range: TrimRange,
    visible: Vec<u64>,
}

impl Synchronizer {
    /// Start at time `0` with no duration and an unset range end.
    pub fn new(transcript: Transcript) -> Self {
        let mut sync = Self {
            transcript,
            current_time: 0.0,
            duration: 0.0,
            range: TrimRange::default(),
            visible: Vec::new(),
        };
        sync.recompute();
        sync
    }

    /// The loaded transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Last reported (or forced) playback position.
    pub fn current_time(&self) -> Seconds {
        self.current_time
    }

    /// Media duration, `0` until known.
    pub fn duration(&self) -> Seconds {
        self.duration
    }

    /// Current trim range.
    pub fn range(&self) -> TrimRange {
        self.range
    }

    /// Visible transcript keys as of the last event.
    pub fn visible(&self) -> &[u64] {
        &self.visible
    }

    /// Visible keys paired with their text. The first item is the current line.
    pub fn visible_lines(&self) -> Vec<(u64, &str)> {
        self.transcript.lines_for(&self.visible).collect()
    }

    /// Apply one event.
    pub fn handle(&mut self, event: PlaybackEvent) -> SyncUpdate {
        match event {
            PlaybackEvent::TimeUpdate(t) => self.on_time_update(t),
            PlaybackEvent::DurationChange(d) => self.on_duration_change(d),
            PlaybackEvent::RangeChange { start, end } => self.on_range_change(start, end),
        }
    }

    /// Accept the media element's position as-is, then clamp and recompute.
    pub fn on_time_update(&mut self, current_time: Seconds) -> SyncUpdate {
        self.current_time = current_time;
        self.settle()
    }

    /// Record a new duration.
    ///
    /// The returned window uses `duration` as the range end. The range end snaps to `duration`
    /// when it was never chosen or exceeds it.
    pub fn on_duration_change(&mut self, duration: Seconds) -> SyncUpdate {
        self.duration = duration;
        self.visible = visible_window(
            self.transcript.timestamps(),
            self.current_time,
            self.range.start,
            duration,
        );

        let exceeds = self.range.end.is_some_and(|end| end > duration);
        if !(self.range.end_is_unset() || exceeds) {
            return SyncUpdate {
                visible: self.visible.clone(),
                action: None,
            };
        }

        self.range.end = Some(duration);
        let action = self.enforce();
        if action.is_some() {
            self.recompute();
        }
        SyncUpdate {
            visible: self.visible.clone(),
            action,
        }
    }

    /// Replace both range bounds. Ordering against the duration is the caller's concern.
    pub fn on_range_change(&mut self, start: Seconds, end: Seconds) -> SyncUpdate {
        self.range = TrimRange::new(start, end);
        self.settle()
    }

    /// Feed `events` in order, applying every clamp to `control`. Returns the last update.
    pub fn drive<I, C>(&mut self, events: I, control: &mut C) -> SyncUpdate
    where
        I: IntoIterator<Item = PlaybackEvent>,
        C: MediaControl + ?Sized,
    {
        let mut last = SyncUpdate {
            visible: self.visible.clone(),
            action: None,
        };
        for event in events {
            last = self.handle(event);
            if let Some(action) = last.action {
                apply_action(control, action);
            }
        }
        last
    }

    fn settle(&mut self) -> SyncUpdate {
        let action = self.enforce();
        self.recompute();
        SyncUpdate {
            visible: self.visible.clone(),
            action,
        }
    }

    fn enforce(&mut self) -> Option<RangeAction> {
        let action = enforce_range(
            self.current_time,
            self.range.start,
            self.range.effective_end(),
        )?;
        tracing::trace!(from = self.current_time, ?action, "playback clamped to trim range");
        self.current_time = action.position();
        Some(action)
    }

    fn recompute(&mut self) {
        self.visible = visible_window(
            self.transcript.timestamps(),
            self.current_time,
            self.range.start,
            self.range.effective_end(),
        );
    }
}

/// Perform `action` on a media element.
pub fn apply_action<C: MediaControl + ?Sized>(control: &mut C, action: RangeAction) {
    match action {
        RangeAction::Seek(t) => control.seek(t),
        RangeAction::PauseAndSeek(t) => {
            control.pause();
            control.seek(t);
        }
    }
}
