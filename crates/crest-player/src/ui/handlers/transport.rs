//! Transport message handlers

use iced::Task;

use crate::ui::app::PlayerApp;
use crate::ui::message::Message;

use super::track_loading;

pub fn toggle_play(app: &mut PlayerApp) -> Task<Message> {
    // Nothing selected yet: start the first track
    if app.playlist.current_index().is_none() {
        if app.playlist.is_empty() {
            return Task::none();
        }
        return track_loading::select(app, 0, true);
    }

    // Selected but still loading: flip the pending intent
    if app.loaded.is_none() {
        app.pending_play = !app.pending_play;
        return Task::none();
    }

    app.playback.toggle();
    if let Some(ref output) = app.output {
        if app.playback.is_playing() {
            output.play();
        } else {
            output.pause();
        }
    }
    Task::none()
}

pub fn stop(app: &mut PlayerApp) -> Task<Message> {
    app.playback.stop();
    app.pending_play = false;
    if let Some(ref output) = app.output {
        output.pause();
        output.seek_to_frame(0);
    }
    Task::none()
}

pub fn next_track(app: &mut PlayerApp) -> Task<Message> {
    let keep_playing = app.playback.is_playing() || app.pending_play;
    match app.playlist.next_index() {
        Some(index) => track_loading::select(app, index, keep_playing),
        None => Task::none(),
    }
}

pub fn previous_track(app: &mut PlayerApp) -> Task<Message> {
    let keep_playing = app.playback.is_playing() || app.pending_play;
    match app.playlist.previous_index() {
        Some(index) => track_loading::select(app, index, keep_playing),
        None => Task::none(),
    }
}

pub fn cycle_repeat(app: &mut PlayerApp) -> Task<Message> {
    app.playback.cycle_repeat();
    app.config.playback.repeat = app.playback.repeat;
    persist_config(app);
    Task::none()
}

pub fn set_auto_next(app: &mut PlayerApp, enabled: bool) -> Task<Message> {
    app.playback.auto_next = enabled;
    app.config.playback.auto_next = enabled;
    persist_config(app);
    Task::none()
}

/// Seek to a fraction (0.0 - 1.0) of the current track
pub fn seek(app: &mut PlayerApp, fraction: f64) -> Task<Message> {
    let Some(duration) = app.playback.duration_seconds else {
        return Task::none();
    };
    app.playback.seek(fraction.clamp(0.0, 1.0) * duration);

    if let Some(ref output) = app.output {
        let frame = (app.playback.position_seconds * output.sample_rate() as f64) as u64;
        output.seek_to_frame(frame);
    }
    Task::none()
}

fn persist_config(app: &mut PlayerApp) {
    if let Err(e) = crest_core::config::save_config(&app.config) {
        log::warn!("Failed to save config: {}", e);
    }
}
