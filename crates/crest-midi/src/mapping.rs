//! Transport actions and the note-to-action map

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::input::MidiInputEvent;

/// Minimum interval between accepted presses of the same note
const NOTE_DEBOUNCE: Duration = Duration::from_millis(90);

/// Player operations a MIDI note can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportAction {
    PreviousTrack,
    Play,
    Pause,
    TogglePlay,
    NextTrack,
    Stop,
    CycleRepeat,
    ToggleAutoNext,
}

impl TransportAction {
    pub const ALL: [TransportAction; 8] = [
        TransportAction::PreviousTrack,
        TransportAction::Play,
        TransportAction::Pause,
        TransportAction::TogglePlay,
        TransportAction::NextTrack,
        TransportAction::Stop,
        TransportAction::CycleRepeat,
        TransportAction::ToggleAutoNext,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TransportAction::PreviousTrack => "Previous track",
            TransportAction::Play => "Play",
            TransportAction::Pause => "Pause",
            TransportAction::TogglePlay => "Play/Pause",
            TransportAction::NextTrack => "Next track",
            TransportAction::Stop => "Stop",
            TransportAction::CycleRepeat => "Cycle repeat mode",
            TransportAction::ToggleAutoNext => "Toggle auto-next",
        }
    }
}

/// Bindings from action to note number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMap {
    bindings: HashMap<TransportAction, u8>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_for(&self, action: TransportAction) -> Option<u8> {
        self.bindings.get(&action).copied()
    }

    pub fn action_for(&self, note: u8) -> Option<TransportAction> {
        self.bindings
            .iter()
            .find(|(_, &bound)| bound == note)
            .map(|(&action, _)| action)
    }

    /// Bind an action to a note, evicting any other action already bound
    /// to that note (one action per note)
    pub fn bind(&mut self, action: TransportAction, note: u8) {
        self.bindings.retain(|_, &mut bound| bound != note);
        self.bindings.insert(action, note);
    }

    pub fn unbind(&mut self, action: TransportAction) {
        self.bindings.remove(&action);
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Applies channel filtering, debounce, and the action map to raw events
#[derive(Debug)]
pub struct MappingEngine {
    map: ActionMap,
    /// Accept events only from this channel (0-15); `None` accepts all
    channel: Option<u8>,
    last_note_at: HashMap<u8, Instant>,
}

impl MappingEngine {
    pub fn new(map: ActionMap, channel: Option<u8>) -> Self {
        Self {
            map,
            channel,
            last_note_at: HashMap::new(),
        }
    }

    pub fn map(&self) -> &ActionMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut ActionMap {
        &mut self.map
    }

    pub fn set_channel(&mut self, channel: Option<u8>) {
        self.channel = channel;
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Channel filter; NoteOff and CC pass through it too so learn mode
    /// sees the same subset of traffic
    pub fn accepts(&self, event: &MidiInputEvent) -> bool {
        match self.channel {
            Some(channel) => event.channel() == channel,
            None => true,
        }
    }

    /// Resolve an incoming event to a bound action.
    ///
    /// Only NoteOn triggers actions; repeats of the same note inside the
    /// debounce window are dropped (hardware chatter).
    pub fn map_event(&mut self, event: &MidiInputEvent) -> Option<TransportAction> {
        if !self.accepts(event) {
            return None;
        }
        let MidiInputEvent::NoteOn { note, .. } = *event else {
            return None;
        };

        let now = Instant::now();
        if let Some(&last) = self.last_note_at.get(&note) {
            if now.duration_since(last) < NOTE_DEBOUNCE {
                return None;
            }
        }
        self.last_note_at.insert(note, now);

        self.map.action_for(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(channel: u8, note: u8) -> MidiInputEvent {
        MidiInputEvent::NoteOn {
            channel,
            note,
            velocity: 100,
        }
    }

    #[test]
    fn test_bind_evicts_note_conflict() {
        let mut map = ActionMap::new();
        map.bind(TransportAction::Play, 60);
        map.bind(TransportAction::Stop, 60);
        assert_eq!(map.note_for(TransportAction::Play), None);
        assert_eq!(map.note_for(TransportAction::Stop), Some(60));
        assert_eq!(map.action_for(60), Some(TransportAction::Stop));
    }

    #[test]
    fn test_rebind_action_replaces_note() {
        let mut map = ActionMap::new();
        map.bind(TransportAction::Play, 60);
        map.bind(TransportAction::Play, 62);
        assert_eq!(map.note_for(TransportAction::Play), Some(62));
        assert_eq!(map.action_for(60), None);
    }

    #[test]
    fn test_map_event_note_on_only() {
        let mut map = ActionMap::new();
        map.bind(TransportAction::TogglePlay, 60);
        let mut engine = MappingEngine::new(map, None);

        assert_eq!(
            engine.map_event(&note_on(0, 60)),
            Some(TransportAction::TogglePlay)
        );
        assert_eq!(
            engine.map_event(&MidiInputEvent::NoteOff {
                channel: 0,
                note: 60
            }),
            None
        );
    }

    #[test]
    fn test_channel_filter() {
        let mut map = ActionMap::new();
        map.bind(TransportAction::Play, 60);
        let mut engine = MappingEngine::new(map, Some(2));

        assert_eq!(engine.map_event(&note_on(0, 60)), None);
        assert_eq!(engine.map_event(&note_on(2, 60)), Some(TransportAction::Play));
    }

    #[test]
    fn test_debounce_drops_rapid_repeats() {
        let mut map = ActionMap::new();
        map.bind(TransportAction::NextTrack, 61);
        let mut engine = MappingEngine::new(map, None);

        assert_eq!(
            engine.map_event(&note_on(0, 61)),
            Some(TransportAction::NextTrack)
        );
        // Immediate repeat is chatter
        assert_eq!(engine.map_event(&note_on(0, 61)), None);
        // A different note is unaffected
        engine.map_mut().bind(TransportAction::Stop, 62);
        assert_eq!(engine.map_event(&note_on(0, 62)), Some(TransportAction::Stop));
    }

    #[test]
    fn test_unbound_note_maps_to_nothing() {
        let mut engine = MappingEngine::new(ActionMap::new(), None);
        assert_eq!(engine.map_event(&note_on(0, 99)), None);
    }

    #[test]
    fn test_action_map_yaml_round_trip() {
        let mut map = ActionMap::new();
        map.bind(TransportAction::TogglePlay, 60);
        map.bind(TransportAction::NextTrack, 62);
        let yaml = serde_yaml::to_string(&map).unwrap();
        let parsed: ActionMap = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, map);
    }
}
