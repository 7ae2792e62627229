//! MIDI remote control for the Crest player
//!
//! ```text
//! MIDI device → midir callback → flume channel → UI tick → app.update()
//! ```
//!
//! The midir callback only parses bytes and pushes events into a bounded
//! flume channel; all mapping, debounce, and learn-mode logic runs on the
//! UI thread when it drains the channel every tick.

mod config;
mod connection;
mod input;
mod learn;
mod mapping;

pub use config::{default_midi_config_path, load_midi_config, save_midi_config, RemoteConfig};
pub use connection::{find_input_port, list_input_ports, MidiConnectionError};
pub use input::MidiInputEvent;
pub use learn::LearnState;
pub use mapping::{ActionMap, MappingEngine, TransportAction};

use flume::Receiver;
use midir::MidiInputConnection;

/// Error type for MIDI remote operations
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("Failed to load MIDI config: {0}")]
    ConfigError(#[from] anyhow::Error),

    #[error("MIDI connection error: {0}")]
    ConnectionError(#[from] MidiConnectionError),
}

/// Something the remote wants the player to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEvent {
    /// A bound note was pressed
    Action(TransportAction),
    /// Learn mode captured a binding
    Learned { action: TransportAction, note: u8 },
}

/// MIDI remote facade
///
/// Owns the device connection, the action mapping, and learn-mode state.
/// Designed to be polled from the UI tick.
pub struct MidiRemote {
    config: RemoteConfig,
    engine: MappingEngine,
    learn: LearnState,
    event_rx: Option<Receiver<MidiInputEvent>>,
    connection: Option<MidiInputConnection<()>>,
    port_name: Option<String>,
}

impl MidiRemote {
    /// Create the remote from the config file.
    ///
    /// Returns Ok even when no device is present (graceful degradation);
    /// the player runs without MIDI support until `reconnect` succeeds.
    pub fn new() -> Self {
        let config = load_midi_config();
        let engine = MappingEngine::new(config.bindings.clone(), config.channel);

        let mut remote = Self {
            config,
            engine,
            learn: LearnState::new(),
            event_rx: None,
            connection: None,
            port_name: None,
        };

        if remote.config.enabled {
            if let Err(e) = remote.reconnect() {
                log::info!("MIDI: no device connected ({}), running without remote", e);
            }
        }

        remote
    }

    /// (Re)connect to the configured port, or the first available one
    pub fn reconnect(&mut self) -> Result<(), MidiError> {
        self.disconnect();

        let (midi_in, port, port_name) = find_input_port(self.config.port.as_deref())?;

        let (event_tx, event_rx) = flume::bounded::<MidiInputEvent>(256);
        let connection = midi_in
            .connect(
                &port,
                "crest-midi-input",
                move |_timestamp, message, _| {
                    if let Some(event) = MidiInputEvent::parse(message) {
                        // Bounded channel: drop events if the UI stalls
                        let _ = event_tx.try_send(event);
                    }
                },
                (),
            )
            .map_err(|e| MidiConnectionError::ConnectionError(e.to_string()))?;

        log::info!("MIDI: Connected to {}", port_name);
        self.event_rx = Some(event_rx);
        self.connection = Some(connection);
        self.port_name = Some(port_name);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
        self.event_rx = None;
        self.port_name = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if enabled && !self.is_connected() {
            if let Err(e) = self.reconnect() {
                log::info!("MIDI: no device connected ({})", e);
            }
        } else if !enabled {
            self.disconnect();
        }
    }

    pub fn set_channel(&mut self, channel: Option<u8>) {
        self.config.channel = channel;
        self.engine.set_channel(channel);
    }

    pub fn bindings(&self) -> &ActionMap {
        self.engine.map()
    }

    /// Enter learn mode for an action; the next NoteOn binds to it
    pub fn arm_learn(&mut self, action: TransportAction) {
        self.learn.arm(action);
    }

    pub fn cancel_learn(&mut self) {
        self.learn.cancel();
    }

    pub fn learn_pending(&self) -> Option<TransportAction> {
        self.learn.pending()
    }

    /// Clear the binding for one action
    pub fn unbind(&mut self, action: TransportAction) {
        self.engine.map_mut().unbind(action);
        self.config.bindings = self.engine.map().clone();
    }

    /// Persist the current bindings and settings
    pub fn save(&mut self) -> Result<(), MidiError> {
        self.config.bindings = self.engine.map().clone();
        save_midi_config(&self.config)?;
        Ok(())
    }

    /// Drain pending device events into remote events.
    ///
    /// Call from the UI tick. While learn mode is armed, the next accepted
    /// NoteOn becomes a binding instead of an action.
    pub fn poll_events(&mut self) -> Vec<RemoteEvent> {
        let Some(event_rx) = self.event_rx.as_ref() else {
            return Vec::new();
        };

        let raw: Vec<MidiInputEvent> = event_rx.try_iter().collect();
        let mut events = Vec::new();

        for event in raw {
            if !self.engine.accepts(&event) {
                continue;
            }
            if self.learn.is_armed() {
                if let Some((action, note)) = self.learn.capture(&event) {
                    self.engine.map_mut().bind(action, note);
                    self.config.bindings = self.engine.map().clone();
                    events.push(RemoteEvent::Learned { action, note });
                }
                continue;
            }
            if let Some(action) = self.engine.map_event(&event) {
                events.push(RemoteEvent::Action(action));
            }
        }

        events
    }
}

impl Default for MidiRemote {
    fn default() -> Self {
        Self::new()
    }
}
