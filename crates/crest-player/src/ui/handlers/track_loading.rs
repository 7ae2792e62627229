//! Playlist and track loading handlers

use std::path::PathBuf;

use iced::Task;

use crest_core::playlist::scan_directory;
use crest_core::track::{is_audio_file, probe_track};

use crate::ui::app::{PlayerApp, WaveformDisplay};
use crate::ui::message::Message;

/// Add the path in the input field: a file is probed directly, a folder is
/// scanned recursively for audio files.
pub fn add_path(app: &mut PlayerApp) -> Task<Message> {
    let input = app.path_input.trim().to_string();
    if input.is_empty() {
        return Task::none();
    }
    let path = PathBuf::from(&input);

    let candidates: Vec<PathBuf> = if path.is_dir() {
        scan_directory(&path)
    } else if is_audio_file(&path) {
        vec![path]
    } else {
        app.status = format!("Not an audio file or folder: {}", input);
        return Task::none();
    };

    if candidates.is_empty() {
        app.status = "No audio files found".to_string();
        return Task::none();
    }

    let was_empty = app.playlist.is_empty();
    let mut added = 0usize;
    for candidate in candidates {
        match probe_track(&candidate) {
            Ok(track) => {
                if app.playlist.add(track) {
                    added += 1;
                }
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", candidate.display(), e);
            }
        }
    }

    app.status = format!("Added {} tracks", added);
    app.path_input.clear();

    if was_empty && !app.playlist.is_empty() {
        return select(app, 0, false);
    }
    Task::none()
}

/// Select a playlist entry, kick off its waveform and playback load
pub fn select(app: &mut PlayerApp, index: usize, play: bool) -> Task<Message> {
    let Some(track) = app.playlist.select(index) else {
        return Task::none();
    };
    let path = track.path.clone();
    let title = track.title.clone();
    // Container duration is a good estimate until the decoded buffer lands
    let duration = track.duration_seconds;

    app.playback.stop();
    app.playback.duration_seconds = duration;
    app.loaded = None;
    app.pending_play = play;
    if let Some(ref output) = app.output {
        output.pause();
        output.clear_track();
    }

    app.request_waveform_for_current();
    app.loader.load(path);
    app.status = format!("Loading {}", title);
    Task::none()
}

pub fn remove(app: &mut PlayerApp, index: usize) -> Task<Message> {
    let removing_current = app.playlist.current_index() == Some(index);
    let Some(path) = app.playlist.remove(index) else {
        return Task::none();
    };
    app.cache.remove(&path);

    if removing_current {
        app.playback.stop();
        app.pending_play = false;
        app.loaded = None;
        app.display = WaveformDisplay::Empty;
        if let Some(ref output) = app.output {
            output.clear_track();
        }
    }
    Task::none()
}

pub fn clear(app: &mut PlayerApp) -> Task<Message> {
    app.playlist.clear();
    app.cache.clear();
    app.worker.clear_queue();
    app.playback.stop();
    app.playback.duration_seconds = None;
    app.pending_play = false;
    app.loaded = None;
    app.display = WaveformDisplay::Empty;
    if let Some(ref output) = app.output {
        output.clear_track();
    }
    app.status = "Playlist cleared".to_string();
    Task::none()
}
