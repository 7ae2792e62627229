//! Settings modal handlers

use iced::Task;

use crest_core::config::save_config;
use crest_core::output::list_output_devices;
use crest_core::update::check_in_background;
use crest_core::waveform::clamp_resolution;

use crate::ui::app::PlayerApp;
use crate::ui::message::Message;
use crate::ui::settings::SettingsState;

pub fn open(app: &mut PlayerApp) -> Task<Message> {
    app.settings = SettingsState::from_config(
        &app.config,
        app.midi.config().enabled,
        app.midi.config().channel,
    );
    app.settings.devices = list_output_devices().unwrap_or_default();
    app.settings.is_open = true;
    Task::none()
}

pub fn close(app: &mut PlayerApp) -> Task<Message> {
    app.midi.cancel_learn();
    app.settings.is_open = false;
    Task::none()
}

pub fn save(app: &mut PlayerApp) -> Task<Message> {
    let draft = app.settings.clone();

    let resolution_changed =
        clamp_resolution(draft.draft_resolution) != app.config.waveform.effective_resolution();
    let output_changed = draft.draft_device != app.config.audio.output_device
        || draft.draft_routing != app.config.audio.routing;
    let accent_changed = draft.draft_accent != app.config.theme.accent;

    app.config.theme.dark = draft.draft_dark;
    app.config.theme.accent = draft.draft_accent;
    app.config.waveform.resolution = draft.draft_resolution;
    app.config.waveform.view_mode = draft.draft_view_mode;
    app.config.audio.output_device = draft.draft_device;
    app.config.audio.routing = draft.draft_routing;

    app.midi.set_enabled(draft.draft_midi_enabled);
    app.midi.set_channel(draft.draft_midi_channel);
    if let Err(e) = app.midi.save() {
        log::warn!("Failed to save MIDI config: {}", e);
    }

    if let Err(e) = save_config(&app.config) {
        app.settings.status = format!("Save failed: {}", e);
        return Task::none();
    }

    if resolution_changed {
        // Every cached waveform was built at the old resolution
        app.cache.clear();
        app.worker.clear_queue();
        app.request_waveform_for_current();
    }
    if output_changed {
        app.rebuild_output();
    }

    app.status = if accent_changed {
        "Settings saved (accent color applies on restart)".to_string()
    } else {
        "Settings saved".to_string()
    };
    app.settings.is_open = false;
    Task::none()
}

pub fn check_for_updates(app: &mut PlayerApp) -> Task<Message> {
    if app.update_rx.is_none() {
        app.update_status = "Checking...".to_string();
        app.update_rx = Some(check_in_background());
    }
    Task::none()
}
