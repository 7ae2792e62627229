//! Main iced application for the Crest player
//!
//! Owns all state: playlist, playback, the waveform worker and cache, the
//! audio output stream, and the MIDI remote. Messages are dispatched to
//! handler modules; everything cross-thread is polled from the Tick handler.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use iced::widget::{button, canvas, column, container, row, text, Space};
use iced::{time, Alignment, Element, Length, Subscription, Task, Theme};

use crest_core::config::PlayerConfig;
use crest_core::loader::{LoadedAudio, TrackLoader};
use crest_core::output::OutputStream;
use crest_core::playback::PlaybackState;
use crest_core::playlist::Playlist;
use crest_core::routing::RoutingMatrix;
use crest_core::track::file_signature;
use crest_core::update::UpdateStatus;
use crest_core::waveform::{WaveformCache, WaveformData, WaveformWorker};
use crest_midi::MidiRemote;

use super::feedback_view::{self, FeedbackState};
use super::handlers;
use super::message::Message;
use super::overlay::with_modal_overlay;
use super::playlist_view;
use super::settings::{self, SettingsState};
use super::theme;
use super::transport;
use super::waveform::WaveformView;

/// What the waveform area is currently showing
pub enum WaveformDisplay {
    Empty,
    Loading {
        snapshot: Option<Arc<WaveformData>>,
        filled: usize,
        total: usize,
    },
    Ready(Arc<WaveformData>),
    Failed(String),
}

pub struct PlayerApp {
    pub config: PlayerConfig,
    pub playlist: Playlist,
    pub playback: PlaybackState,
    pub cache: WaveformCache,
    pub worker: WaveformWorker,
    pub loader: TrackLoader,
    pub output: Option<OutputStream>,
    pub midi: MidiRemote,
    pub display: WaveformDisplay,
    /// Decoded buffer for the current track
    pub loaded: Option<LoadedAudio>,
    /// Start playback once the pending load completes
    pub pending_play: bool,
    pub settings: SettingsState,
    pub feedback: FeedbackState,
    pub feedback_rx: Option<Receiver<Result<(), String>>>,
    pub update_rx: Option<Receiver<Result<UpdateStatus, String>>>,
    pub update_status: String,
    pub status: String,
    pub path_input: String,
}

impl PlayerApp {
    pub fn new(config: PlayerConfig) -> Self {
        let playback = PlaybackState::new(config.playback.repeat, config.playback.auto_next);

        // Nothing is loaded yet; Auto starts stereo and reopens per track
        let desired_channels = config.audio.routing.desired_channels(2);
        let output = match OutputStream::open(config.audio.output_device.as_deref(), desired_channels)
        {
            Ok(stream) => Some(stream),
            Err(e) => {
                log::warn!("Audio output unavailable, UI-only mode: {}", e);
                None
            }
        };
        let target_rate = output.as_ref().map(|o| o.sample_rate()).unwrap_or(48000);

        let midi = MidiRemote::new();
        let settings = SettingsState::from_config(
            &config,
            midi.config().enabled,
            midi.config().channel,
        );

        let status = if output.is_some() {
            "Ready".to_string()
        } else {
            "No audio output (UI-only mode)".to_string()
        };

        Self {
            config,
            playlist: Playlist::new(),
            playback,
            cache: WaveformCache::new(),
            worker: WaveformWorker::spawn(),
            loader: TrackLoader::spawn(target_rate),
            output,
            midi,
            display: WaveformDisplay::Empty,
            loaded: None,
            pending_play: false,
            settings,
            feedback: FeedbackState::default(),
            feedback_rx: None,
            update_rx: None,
            update_status: String::new(),
            status,
            path_input: String::new(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => handlers::tick::handle(self),

            Message::PathInputChanged(value) => {
                self.path_input = value;
                Task::none()
            }
            Message::AddPath => handlers::track_loading::add_path(self),
            Message::SelectTrack(index) => handlers::track_loading::select(self, index, true),
            Message::RemoveTrack(index) => handlers::track_loading::remove(self, index),
            Message::MoveTrackUp(index) => {
                self.playlist.move_up(index);
                Task::none()
            }
            Message::MoveTrackDown(index) => {
                self.playlist.move_down(index);
                Task::none()
            }
            Message::ClearPlaylist => handlers::track_loading::clear(self),

            Message::TogglePlay => handlers::transport::toggle_play(self),
            Message::Stop => handlers::transport::stop(self),
            Message::NextTrack => handlers::transport::next_track(self),
            Message::PreviousTrack => handlers::transport::previous_track(self),
            Message::CycleRepeat => handlers::transport::cycle_repeat(self),
            Message::ToggleAutoNext(enabled) => handlers::transport::set_auto_next(self, enabled),
            Message::Seek(fraction) => handlers::transport::seek(self, fraction),

            Message::OpenSettings => handlers::settings::open(self),
            Message::CloseSettings => handlers::settings::close(self),
            Message::SaveSettings => handlers::settings::save(self),
            Message::UpdateSettingsDark(dark) => {
                self.settings.draft_dark = dark;
                Task::none()
            }
            Message::UpdateSettingsAccent(accent) => {
                self.settings.draft_accent = accent;
                Task::none()
            }
            Message::UpdateSettingsResolution(resolution) => {
                self.settings.draft_resolution = resolution;
                Task::none()
            }
            Message::UpdateSettingsViewMode(mode) => {
                self.settings.draft_view_mode = mode;
                Task::none()
            }
            Message::UpdateSettingsDevice(device) => {
                self.settings.draft_device = device;
                Task::none()
            }
            Message::UpdateSettingsRouting(mode) => {
                self.settings.draft_routing = mode;
                Task::none()
            }
            Message::UpdateSettingsMidiEnabled(enabled) => {
                self.settings.draft_midi_enabled = enabled;
                Task::none()
            }
            Message::UpdateSettingsMidiChannel(channel) => {
                self.settings.draft_midi_channel = channel;
                Task::none()
            }

            Message::StartLearn(action) => handlers::midi::start_learn(self, action),
            Message::CancelLearn => handlers::midi::cancel_learn(self),
            Message::UnbindAction(action) => handlers::midi::unbind(self, action),

            Message::OpenFeedback => handlers::feedback::open(self),
            Message::CloseFeedback => handlers::feedback::close(self),
            Message::SetFeedbackKind(kind) => {
                self.feedback.kind = kind;
                Task::none()
            }
            Message::FeedbackSummaryChanged(value) => {
                self.feedback.summary = value;
                Task::none()
            }
            Message::FeedbackDetailsChanged(value) => {
                self.feedback.details = value;
                Task::none()
            }
            Message::FeedbackContactChanged(value) => {
                self.feedback.contact = value;
                Task::none()
            }
            Message::SubmitFeedback => handlers::feedback::submit(self),

            Message::CheckForUpdates => handlers::settings::check_for_updates(self),
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        // ~30fps is enough for a smooth playhead
        time::every(Duration::from_millis(33)).map(|_| Message::Tick)
    }

    pub fn theme(&self) -> Theme {
        theme::app_theme(self.config.theme.dark)
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = self.view_header();
        let waveform_area = self.view_waveform_area();
        let transport_bar = transport::view(
            &self.playback,
            self.playlist.current_track().map(|t| t.title.as_str()),
        );
        let playlist = playlist_view::view(&self.playlist, &self.path_input);
        let status_bar = text(&self.status).size(12);

        let base: Element<Message> = container(
            column![header, waveform_area, transport_bar, playlist, status_bar].spacing(12),
        )
        .padding(14)
        .width(Length::Fill)
        .height(Length::Fill)
        .into();

        if self.settings.is_open {
            with_modal_overlay(
                base,
                settings::view(&self.settings, &self.midi, &self.update_status),
                Message::CloseSettings,
            )
        } else if self.feedback.is_open {
            with_modal_overlay(
                base,
                feedback_view::view(&self.feedback),
                Message::CloseFeedback,
            )
        } else {
            base
        }
    }

    fn view_header(&self) -> Element<'_, Message> {
        let title = text("Crest").size(22);
        let feedback_btn = button(text("Feedback").size(12))
            .on_press(Message::OpenFeedback)
            .style(button::secondary);
        let settings_btn = button(text("Settings").size(12))
            .on_press(Message::OpenSettings)
            .style(button::secondary);

        row![
            title,
            Space::new().width(Length::Fill),
            feedback_btn,
            settings_btn,
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    }

    fn view_waveform_area(&self) -> Element<'_, Message> {
        let data = match &self.display {
            WaveformDisplay::Ready(data) => Some(data.as_ref()),
            WaveformDisplay::Loading { snapshot, .. } => snapshot.as_deref(),
            WaveformDisplay::Empty | WaveformDisplay::Failed(_) => None,
        };

        let view = WaveformView::new(
            data,
            self.playhead_fraction(),
            self.config.waveform.view_mode,
        );
        let canvas_widget = canvas(view)
            .width(Length::Fill)
            .height(Length::Fixed(180.0));

        let caption: Element<Message> = match &self.display {
            WaveformDisplay::Loading { filled, total, .. } if *total > 0 => {
                let percent = *filled * 100 / *total;
                text(format!("Building waveform... {}%", percent))
                    .size(12)
                    .into()
            }
            WaveformDisplay::Loading { .. } => {
                text("Building waveform...").size(12).into()
            }
            WaveformDisplay::Failed(error) => {
                text(format!("Waveform unavailable: {}", error)).size(12).into()
            }
            _ => Space::new().height(14).into(),
        };

        column![canvas_widget, caption].spacing(4).into()
    }

    /// Playhead as a fraction of the current track
    pub fn playhead_fraction(&self) -> f32 {
        match self.playback.duration_seconds {
            Some(duration) if duration > 0.0 => {
                (self.playback.position_seconds / duration) as f32
            }
            _ => 0.0,
        }
    }

    /// Effective waveform resolution from config
    pub fn resolution(&self) -> usize {
        self.config.waveform.effective_resolution()
    }

    /// Show the waveform for the current track: cache hit renders at once,
    /// otherwise a worker request starts and the playlist's other tracks
    /// are queued for preload.
    pub fn request_waveform_for_current(&mut self) {
        let Some(track) = self.playlist.current_track() else {
            self.display = WaveformDisplay::Empty;
            return;
        };
        let path = track.path.clone();
        let resolution = self.resolution();

        match file_signature(&path, resolution) {
            Ok(signature) => {
                if let Some(data) = self.cache.get(&path, signature) {
                    self.display = WaveformDisplay::Ready(data);
                    return;
                }
            }
            Err(e) => log::warn!("Could not stat {}: {}", path.display(), e),
        }

        self.worker.request(path.clone(), resolution);
        self.display = WaveformDisplay::Loading {
            snapshot: None,
            filled: 0,
            total: 0,
        };
        self.worker
            .enqueue_preload(self.playlist.other_paths(&path), resolution);
    }

    /// Wire a freshly loaded buffer into the output stream
    pub fn install_loaded(&mut self, audio: LoadedAudio) {
        self.playback.duration_seconds = Some(audio.duration_seconds);
        self.playback.position_seconds = 0.0;

        // In Auto mode the stream must follow the source layout, so a track
        // with a different channel count reopens the stream. The reload it
        // triggers comes back through here with a matching desired count.
        let want = self.config.audio.routing.desired_channels(audio.channels);
        let needs_reopen = self
            .output
            .as_ref()
            .is_some_and(|output| want != output.desired_channels());
        if needs_reopen {
            self.loaded = Some(audio);
            self.rebuild_output();
            return;
        }

        if let Some(ref output) = self.output {
            let matrix = RoutingMatrix::for_layout(audio.channels, output.output_channels());
            output.set_track(Arc::clone(&audio.samples), audio.channels, matrix);
            if self.pending_play {
                output.play();
                self.playback.play();
            }
        } else if self.pending_play {
            // UI-only mode still tracks transport state
            self.playback.play();
        }
        self.pending_play = false;
        self.loaded = Some(audio);
    }

    /// Tear down and rebuild the output stream from current config
    pub fn rebuild_output(&mut self) {
        let source_channels = self.loaded.as_ref().map(|a| a.channels).unwrap_or(2);
        let desired = self.config.audio.routing.desired_channels(source_channels);

        self.output = None;
        match OutputStream::open(self.config.audio.output_device.as_deref(), desired) {
            Ok(stream) => {
                self.loader.set_target_rate(stream.sample_rate());
                self.output = Some(stream);
                // The loaded buffer may be at the wrong rate now; reload it
                if let Some(track) = self.playlist.current_track() {
                    self.pending_play = self.pending_play || self.playback.is_playing();
                    self.playback.pause();
                    self.loader.load(track.path.clone());
                }
            }
            Err(e) => {
                log::warn!("Audio output unavailable, UI-only mode: {}", e);
                self.status = format!("Audio output unavailable: {}", e);
            }
        }
    }
}
