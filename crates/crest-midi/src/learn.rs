//! Learn mode
//!
//! Arming an action puts the remote in learn mode; the next accepted NoteOn
//! binds its note to that action and disarms. Cancelable at any time.

use crate::input::MidiInputEvent;
use crate::mapping::TransportAction;

#[derive(Debug, Clone, Copy, Default)]
pub struct LearnState {
    pending: Option<TransportAction>,
}

impl LearnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, action: TransportAction) {
        self.pending = Some(action);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<TransportAction> {
        self.pending
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Try to capture a note from an incoming event. On a NoteOn, returns
    /// the armed action and note, and disarms. Other events are ignored.
    pub fn capture(&mut self, event: &MidiInputEvent) -> Option<(TransportAction, u8)> {
        let action = self.pending?;
        let MidiInputEvent::NoteOn { note, .. } = *event else {
            return None;
        };
        self.pending = None;
        Some((action, note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_binds_and_disarms() {
        let mut learn = LearnState::new();
        learn.arm(TransportAction::Play);
        assert!(learn.is_armed());

        let event = MidiInputEvent::NoteOn {
            channel: 0,
            note: 60,
            velocity: 100,
        };
        assert_eq!(learn.capture(&event), Some((TransportAction::Play, 60)));
        assert!(!learn.is_armed());
        // Second event after disarm captures nothing
        assert_eq!(learn.capture(&event), None);
    }

    #[test]
    fn test_non_note_on_ignored_while_armed() {
        let mut learn = LearnState::new();
        learn.arm(TransportAction::Stop);

        let off = MidiInputEvent::NoteOff {
            channel: 0,
            note: 60,
        };
        assert_eq!(learn.capture(&off), None);
        assert!(learn.is_armed());
    }

    #[test]
    fn test_cancel() {
        let mut learn = LearnState::new();
        learn.arm(TransportAction::Stop);
        learn.cancel();
        assert!(!learn.is_armed());
    }
}
