use crate::foundation::core::Seconds;
use crate::playback::sync::{MediaControl, PlaybackEvent};

/// Simulated media element that advances by a fixed tick while playing.
#[derive(Clone, Debug)]
pub struct PlaybackClock {
    position: Seconds,
    duration: Seconds,
    tick: Seconds,
    playing: bool,
}

impl PlaybackClock {
    /// A paused clock at `0` for media of length `duration`.
    pub fn new(duration: Seconds, tick: Seconds) -> Self {
        Self {
            position: 0.0,
            duration,
            tick,
            playing: false,
        }
    }

    /// Current position.
    pub fn position(&self) -> Seconds {
        self.position
    }

    /// Return `true` while playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Event announcing the media duration, as a media element does once metadata loads.
    pub fn metadata(&self) -> PlaybackEvent {
        PlaybackEvent::DurationChange(self.duration)
    }

    /// Advance one tick. Returns the time update, or `None` when paused.
    ///
    /// Playback stops by itself at the end of the media.
    pub fn advance(&mut self) -> Option<PlaybackEvent> {
        if !self.playing {
            return None;
        }
        self.position += self.tick;
        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
        }
        Some(PlaybackEvent::TimeUpdate(self.position))
    }
}

impl MediaControl for PlaybackClock {
    fn seek(&mut self, position: Seconds) {
        self.position = position;
    }

    fn pause(&mut self) {
        self.playing = false;
    }
}
