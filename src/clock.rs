//! Wall-clock driven playback for a timeline.
//!
//! The clock is runtime state, not part of the serializable document; it is
//! fed explicit `Instant`s by the caller's frame scheduler so it stays
//! deterministic under test and free of embedded timers.

use std::time::Instant;

use crate::timeline::Timeline;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Advances a query time forward using wall-clock deltas.
///
/// Scrubbing and "a keyframe is selected for editing" are tracked here too,
/// because together with playback they decide whether the interpolation
/// engine needs to run at all ([`PlaybackClock::should_animate`]).
#[derive(Debug)]
pub struct PlaybackClock {
    state: PlaybackState,
    start: Option<Instant>,
    /// Query-time offset captured when playback last started.
    offset: f64,
    time: f64,
    scrubbing: bool,
    active_keyframe: Option<String>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            state: PlaybackState::Stopped,
            start: None,
            offset: 0.0,
            time: 0.0,
            scrubbing: false,
            active_keyframe: None,
        }
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current query time, clamped against the timeline on read. A duration
    /// shortened below the stored time is corrected here, lazily.
    pub fn time(&self, timeline: &Timeline) -> f64 {
        self.time.clamp(0.0, timeline.duration)
    }

    pub fn play(&mut self, now: Instant) {
        if self.state == PlaybackState::Playing {
            return;
        }
        self.start = Some(now);
        self.offset = self.time;
        self.state = PlaybackState::Playing;
        self.scrubbing = false;
        tracing::debug!(offset = self.offset, "playback started");
    }

    /// Cancels the per-frame advance. Idempotent: pausing an already-stopped
    /// clock is a no-op, not an error.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.state = PlaybackState::Paused;
        self.start = None;
        self.offset = self.time;
        tracing::debug!(time = self.time, "playback paused");
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.start = None;
        self.offset = 0.0;
        self.time = 0.0;
    }

    /// One scheduled tick while playing: `offset + (now − start) × speed`.
    ///
    /// When the timeline loops the time wraps via modulo into
    /// `[0, duration)`; otherwise it clamps to the duration and the clock
    /// parks paused-at-end, leaving the scene showing its final state.
    pub fn tick(&mut self, now: Instant, timeline: &Timeline) -> f64 {
        let (PlaybackState::Playing, Some(start)) = (self.state, self.start) else {
            return self.time(timeline);
        };

        let elapsed = now.saturating_duration_since(start).as_secs_f64() * timeline.speed;
        let t = self.offset + elapsed;
        if t >= timeline.duration {
            if timeline.looping {
                self.time = t.rem_euclid(timeline.duration);
            } else {
                self.time = timeline.duration;
                self.offset = timeline.duration;
                self.start = None;
                self.state = PlaybackState::Paused;
                tracing::debug!("playback reached end");
            }
        } else {
            self.time = t;
        }
        self.time
    }

    /// Manual time-dragging. Starting a scrub implicitly pauses playback so
    /// the two never advance the query time concurrently.
    pub fn begin_scrub(&mut self) {
        self.pause();
        self.scrubbing = true;
    }

    pub fn scrub_to(&mut self, time: f64, timeline: &Timeline) {
        self.time = time.clamp(0.0, timeline.duration);
        self.offset = self.time;
    }

    pub fn end_scrub(&mut self) {
        self.scrubbing = false;
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    pub fn set_active_keyframe(&mut self, id: Option<String>) {
        self.active_keyframe = id;
    }

    pub fn active_keyframe(&self) -> Option<&str> {
        self.active_keyframe.as_deref()
    }

    /// True while the interpolation engine must run: playing, scrubbing, or
    /// a keyframe is selected for editing.
    pub fn should_animate(&self) -> bool {
        self.state == PlaybackState::Playing || self.scrubbing || self.active_keyframe.is_some()
    }
}
