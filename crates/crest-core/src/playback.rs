//! Transport state and track-end policy

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}

impl RepeatMode {
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "Repeat: Off",
            RepeatMode::One => "Repeat: One",
            RepeatMode::All => "Repeat: All",
        }
    }
}

/// What to do when the current track reaches its end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEnd {
    /// Restart the same track from the beginning
    Restart,
    /// Move to the given playlist index
    Advance(usize),
    /// Stop playback
    Stop,
}

#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Playhead position in seconds
    pub position_seconds: f64,
    pub repeat: RepeatMode,
    /// Advance to the next track when one ends
    pub auto_next: bool,
    /// Duration of the loaded track, if any
    pub duration_seconds: Option<f64>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            position_seconds: 0.0,
            repeat: RepeatMode::Off,
            auto_next: true,
            duration_seconds: None,
        }
    }
}

impl PlaybackState {
    pub fn new(repeat: RepeatMode, auto_next: bool) -> Self {
        Self {
            repeat,
            auto_next,
            ..Default::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn play(&mut self) {
        self.status = PlaybackStatus::Playing;
    }

    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
        }
    }

    pub fn toggle(&mut self) {
        match self.status {
            PlaybackStatus::Playing => self.status = PlaybackStatus::Paused,
            PlaybackStatus::Paused | PlaybackStatus::Stopped => {
                self.status = PlaybackStatus::Playing
            }
        }
    }

    /// Stop and reset the playhead
    pub fn stop(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.position_seconds = 0.0;
    }

    /// Clamp a seek target into the track
    pub fn seek(&mut self, seconds: f64) {
        let max = self.duration_seconds.unwrap_or(0.0);
        self.position_seconds = seconds.clamp(0.0, max);
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.cycle();
    }

    /// Decide what happens when the current track finishes
    pub fn on_track_end(&self, current_index: usize, track_count: usize) -> TrackEnd {
        if self.repeat == RepeatMode::One {
            return TrackEnd::Restart;
        }
        let has_next = current_index + 1 < track_count;
        if has_next && (self.auto_next || self.repeat == RepeatMode::All) {
            return TrackEnd::Advance(current_index + 1);
        }
        if !has_next && self.repeat == RepeatMode::All && track_count > 0 {
            return TrackEnd::Advance(0);
        }
        TrackEnd::Stop
    }
}

/// Format seconds as "m:ss" or "h:mm:ss" for the transport display
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_from_stopped_plays() {
        let mut state = PlaybackState::default();
        state.toggle();
        assert_eq!(state.status, PlaybackStatus::Playing);
        state.toggle();
        assert_eq!(state.status, PlaybackStatus::Paused);
    }

    #[test]
    fn test_stop_resets_position() {
        let mut state = PlaybackState::default();
        state.duration_seconds = Some(100.0);
        state.play();
        state.seek(42.0);
        state.stop();
        assert_eq!(state.status, PlaybackStatus::Stopped);
        assert_eq!(state.position_seconds, 0.0);
    }

    #[test]
    fn test_seek_clamped() {
        let mut state = PlaybackState::default();
        state.duration_seconds = Some(60.0);
        state.seek(-5.0);
        assert_eq!(state.position_seconds, 0.0);
        state.seek(500.0);
        assert_eq!(state.position_seconds, 60.0);
    }

    #[test]
    fn test_repeat_cycle() {
        assert_eq!(RepeatMode::Off.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::Off);
    }

    #[test]
    fn test_track_end_repeat_one_restarts() {
        let mut state = PlaybackState::default();
        state.repeat = RepeatMode::One;
        assert_eq!(state.on_track_end(0, 3), TrackEnd::Restart);
    }

    #[test]
    fn test_track_end_auto_next_advances() {
        let state = PlaybackState::default();
        assert!(state.auto_next);
        assert_eq!(state.on_track_end(0, 3), TrackEnd::Advance(1));
        assert_eq!(state.on_track_end(2, 3), TrackEnd::Stop);
    }

    #[test]
    fn test_track_end_without_auto_next_stops() {
        let mut state = PlaybackState::default();
        state.auto_next = false;
        assert_eq!(state.on_track_end(0, 3), TrackEnd::Stop);
    }

    #[test]
    fn test_track_end_repeat_all_wraps() {
        let mut state = PlaybackState::default();
        state.repeat = RepeatMode::All;
        state.auto_next = false;
        assert_eq!(state.on_track_end(1, 3), TrackEnd::Advance(2));
        assert_eq!(state.on_track_end(2, 3), TrackEnd::Advance(0));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.4), "1:05");
        assert_eq!(format_time(3661.0), "1:01:01");
    }
}
