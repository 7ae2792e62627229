//! Tick message handler
//!
//! The ~30fps tick drains every cross-thread channel:
//! - waveform worker progress/results
//! - the track loader
//! - playhead position and track-end detection from the output stream
//! - MIDI remote events (actions and learn captures)
//! - feedback submission and update check results

use std::sync::mpsc::TryRecvError;

use iced::Task;

use crest_core::loader::LoadResult;
use crest_core::playback::TrackEnd;
use crest_core::track::file_signature;
use crest_core::update::UpdateStatus;
use crest_core::waveform::WaveformEvent;
use crest_midi::{RemoteEvent, TransportAction};

use crate::ui::app::{PlayerApp, WaveformDisplay};
use crate::ui::message::Message;

use super::{track_loading, transport};

pub fn handle(app: &mut PlayerApp) -> Task<Message> {
    let mut tasks = Vec::new();

    drain_waveform_events(app);
    drain_loader(app);
    sync_playhead(app, &mut tasks);
    drain_midi(app, &mut tasks);
    drain_feedback(app);
    drain_update_check(app);

    if tasks.is_empty() {
        Task::none()
    } else {
        Task::batch(tasks)
    }
}

fn drain_waveform_events(app: &mut PlayerApp) {
    let latest = app.worker.latest_request();

    for event in app.worker.poll_events() {
        match event {
            WaveformEvent::Finished {
                request_id,
                path,
                data,
            } => {
                // Every finish (foreground or preload) feeds the cache,
                // keyed by the resolution the data was actually built at so
                // a result from before a resolution change stays a stale miss
                match file_signature(&path, data.resolution) {
                    Ok(signature) => {
                        app.cache.insert(path.clone(), signature, data.clone());
                    }
                    Err(e) => log::warn!("Could not stat {}: {}", path.display(), e),
                }
                let is_current = app
                    .playlist
                    .current_track()
                    .map(|t| t.path == path)
                    .unwrap_or(false);
                if is_current && request_id == latest {
                    app.display = WaveformDisplay::Ready(data);
                }
            }
            WaveformEvent::Progress {
                request_id,
                path,
                snapshot,
                filled,
                total,
            } => {
                let is_current = app
                    .playlist
                    .current_track()
                    .map(|t| t.path == path)
                    .unwrap_or(false);
                // Stale progress is dropped on the floor
                if is_current && request_id == latest {
                    app.display = WaveformDisplay::Loading {
                        snapshot: Some(snapshot),
                        filled,
                        total,
                    };
                }
            }
            WaveformEvent::Failed {
                request_id,
                path,
                error,
            } => {
                let is_current = app
                    .playlist
                    .current_track()
                    .map(|t| t.path == path)
                    .unwrap_or(false);
                if is_current && request_id == latest {
                    app.status = format!("Waveform failed: {}", error);
                    app.display = WaveformDisplay::Failed(error);
                } else {
                    log::warn!("Preload failed for {}: {}", path.display(), error);
                }
            }
        }
    }
}

fn drain_loader(app: &mut PlayerApp) {
    while let Some(result) = app.loader.try_recv() {
        match result {
            LoadResult::Loaded(audio) => {
                let is_current = app
                    .playlist
                    .current_track()
                    .map(|t| t.path == audio.path)
                    .unwrap_or(false);
                if is_current {
                    app.status = format!("Loaded {}", audio.path.display());
                    app.install_loaded(audio);
                }
            }
            LoadResult::Failed { path, error } => {
                app.status = format!("Cannot play {}: {}", path.display(), error);
                app.pending_play = false;
            }
        }
    }
}

fn sync_playhead(app: &mut PlayerApp, tasks: &mut Vec<Task<Message>>) {
    let (position, finished) = match app.output {
        Some(ref output) => (
            output.position_frames() as f64 / output.sample_rate() as f64,
            output.take_finished(),
        ),
        None => return,
    };

    if app.loaded.is_some() && app.playback.is_playing() {
        app.playback.position_seconds = position;
    }

    if finished {
        let current = app.playlist.current_index().unwrap_or(0);
        match app.playback.on_track_end(current, app.playlist.len()) {
            TrackEnd::Restart => {
                app.playback.position_seconds = 0.0;
                if let Some(ref output) = app.output {
                    output.seek_to_frame(0);
                    output.play();
                }
                app.playback.play();
            }
            TrackEnd::Advance(index) => {
                tasks.push(track_loading::select(app, index, true));
            }
            TrackEnd::Stop => {
                app.playback.stop();
                if let Some(ref output) = app.output {
                    output.seek_to_frame(0);
                }
            }
        }
    }
}

fn drain_midi(app: &mut PlayerApp, tasks: &mut Vec<Task<Message>>) {
    for event in app.midi.poll_events() {
        match event {
            RemoteEvent::Action(action) => {
                tasks.push(apply_action(app, action));
            }
            RemoteEvent::Learned { action, note } => {
                app.status = format!("Bound {} to note {}", action.label(), note);
                if let Err(e) = app.midi.save() {
                    log::warn!("Failed to save MIDI config: {}", e);
                }
            }
        }
    }
}

fn apply_action(app: &mut PlayerApp, action: TransportAction) -> Task<Message> {
    match action {
        TransportAction::PreviousTrack => transport::previous_track(app),
        TransportAction::Play => {
            if !app.playback.is_playing() {
                transport::toggle_play(app)
            } else {
                Task::none()
            }
        }
        TransportAction::Pause => {
            if app.playback.is_playing() {
                transport::toggle_play(app)
            } else {
                Task::none()
            }
        }
        TransportAction::TogglePlay => transport::toggle_play(app),
        TransportAction::NextTrack => transport::next_track(app),
        TransportAction::Stop => transport::stop(app),
        TransportAction::CycleRepeat => transport::cycle_repeat(app),
        TransportAction::ToggleAutoNext => {
            let enabled = !app.playback.auto_next;
            transport::set_auto_next(app, enabled)
        }
    }
}

fn drain_feedback(app: &mut PlayerApp) {
    let Some(rx) = app.feedback_rx.take() else {
        return;
    };
    match rx.try_recv() {
        Ok(result) => {
            app.feedback.sending = false;
            match result {
                Ok(()) => {
                    app.feedback.status = "Thanks! Feedback sent.".to_string();
                    app.feedback.summary.clear();
                    app.feedback.details.clear();
                }
                Err(error) => {
                    app.feedback.status = format!("Could not send: {}", error);
                }
            }
        }
        Err(TryRecvError::Empty) => {
            // Still in flight; put the receiver back
            app.feedback_rx = Some(rx);
        }
        Err(TryRecvError::Disconnected) => {
            // The submit thread died without reporting; unblock resubmission
            app.feedback.sending = false;
            app.feedback.status = "Could not send: submission thread exited".to_string();
        }
    }
}

fn drain_update_check(app: &mut PlayerApp) {
    let Some(rx) = app.update_rx.take() else {
        return;
    };
    match rx.try_recv() {
        Ok(result) => {
            app.update_status = match result {
                Ok(UpdateStatus::UpToDate) => "You are on the latest version".to_string(),
                Ok(UpdateStatus::Available { version, url }) => {
                    format!("Version {} available: {}", version, url)
                }
                Err(error) => format!("Update check failed: {}", error),
            };
        }
        Err(TryRecvError::Empty) => {
            app.update_rx = Some(rx);
        }
        Err(TryRecvError::Disconnected) => {
            app.update_status = "Update check failed: worker exited".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;

    use crest_core::config::PlayerConfig;

    #[test]
    fn test_dead_feedback_channel_unblocks_resubmission() {
        let mut app = PlayerApp::new(PlayerConfig::default());
        let (tx, rx) = mpsc::channel::<Result<(), String>>();
        drop(tx);
        app.feedback.sending = true;
        app.feedback_rx = Some(rx);

        drain_feedback(&mut app);

        assert!(!app.feedback.sending);
        assert!(app.feedback_rx.is_none());
        assert!(app.feedback.status.contains("Could not send"));
    }

    #[test]
    fn test_in_flight_feedback_keeps_receiver() {
        let mut app = PlayerApp::new(PlayerConfig::default());
        let (_tx, rx) = mpsc::channel::<Result<(), String>>();
        app.feedback.sending = true;
        app.feedback_rx = Some(rx);

        drain_feedback(&mut app);

        assert!(app.feedback.sending);
        assert!(app.feedback_rx.is_some());
    }
}
