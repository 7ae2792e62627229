//! MIDI learn-mode handlers
//!
//! Learn capture itself happens in the tick handler when the remote is
//! drained; these only arm and disarm.

use iced::Task;

use crest_midi::TransportAction;

use crate::ui::app::PlayerApp;
use crate::ui::message::Message;

pub fn start_learn(app: &mut PlayerApp, action: TransportAction) -> Task<Message> {
    if !app.midi.is_connected() {
        app.settings.status = "Connect a MIDI device first".to_string();
        return Task::none();
    }
    app.midi.arm_learn(action);
    app.settings.status = format!("Press a key for {}", action.label());
    Task::none()
}

pub fn cancel_learn(app: &mut PlayerApp) -> Task<Message> {
    app.midi.cancel_learn();
    app.settings.status.clear();
    Task::none()
}

pub fn unbind(app: &mut PlayerApp, action: TransportAction) -> Task<Message> {
    app.midi.unbind(action);
    if let Err(e) = app.midi.save() {
        log::warn!("Failed to save MIDI config: {}", e);
    }
    Task::none()
}
