//! Application message enum

use crest_core::config::WaveformViewMode;
use crest_core::feedback::ReportKind;
use crest_core::routing::RoutingMode;
use crest_midi::TransportAction;

#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic UI update (~30fps)
    Tick,

    // Playlist
    PathInputChanged(String),
    AddPath,
    SelectTrack(usize),
    RemoveTrack(usize),
    MoveTrackUp(usize),
    MoveTrackDown(usize),
    ClearPlaylist,

    // Transport
    TogglePlay,
    Stop,
    NextTrack,
    PreviousTrack,
    CycleRepeat,
    ToggleAutoNext(bool),
    /// Seek to a fraction of the track (0.0 - 1.0)
    Seek(f64),

    // Settings modal
    OpenSettings,
    CloseSettings,
    SaveSettings,
    UpdateSettingsDark(bool),
    UpdateSettingsAccent(String),
    UpdateSettingsResolution(usize),
    UpdateSettingsViewMode(WaveformViewMode),
    UpdateSettingsDevice(Option<String>),
    UpdateSettingsRouting(RoutingMode),
    UpdateSettingsMidiEnabled(bool),
    UpdateSettingsMidiChannel(Option<u8>),

    // MIDI learn
    StartLearn(TransportAction),
    CancelLearn,
    UnbindAction(TransportAction),

    // Feedback modal
    OpenFeedback,
    CloseFeedback,
    SetFeedbackKind(ReportKind),
    FeedbackSummaryChanged(String),
    FeedbackDetailsChanged(String),
    FeedbackContactChanged(String),
    SubmitFeedback,

    // Update check
    CheckForUpdates,
}
