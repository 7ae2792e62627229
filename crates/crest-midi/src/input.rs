//! Raw MIDI message parsing

/// A parsed MIDI input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiInputEvent {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
}

impl MidiInputEvent {
    /// Parse a raw MIDI message. Returns `None` for unsupported or
    /// truncated messages.
    ///
    /// NoteOn with velocity 0 is folded to NoteOff per the MIDI spec.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 3 {
            return None;
        }
        let status = data[0] & 0xF0;
        let channel = data[0] & 0x0F;

        match status {
            0x90 => {
                let (note, velocity) = (data[1], data[2]);
                if velocity == 0 {
                    Some(MidiInputEvent::NoteOff { channel, note })
                } else {
                    Some(MidiInputEvent::NoteOn {
                        channel,
                        note,
                        velocity,
                    })
                }
            }
            0x80 => Some(MidiInputEvent::NoteOff {
                channel,
                note: data[1],
            }),
            0xB0 => Some(MidiInputEvent::ControlChange {
                channel,
                controller: data[1],
                value: data[2],
            }),
            _ => None,
        }
    }

    /// MIDI channel (0-15) this event arrived on
    pub fn channel(&self) -> u8 {
        match self {
            MidiInputEvent::NoteOn { channel, .. }
            | MidiInputEvent::NoteOff { channel, .. }
            | MidiInputEvent::ControlChange { channel, .. } => *channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let event = MidiInputEvent::parse(&[0x90, 60, 100]).unwrap();
        assert_eq!(
            event,
            MidiInputEvent::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            }
        );
    }

    #[test]
    fn test_note_on_velocity_zero_is_note_off() {
        let event = MidiInputEvent::parse(&[0x93, 60, 0]).unwrap();
        assert_eq!(
            event,
            MidiInputEvent::NoteOff {
                channel: 3,
                note: 60
            }
        );
    }

    #[test]
    fn test_parse_note_off() {
        let event = MidiInputEvent::parse(&[0x85, 64, 40]).unwrap();
        assert_eq!(
            event,
            MidiInputEvent::NoteOff {
                channel: 5,
                note: 64
            }
        );
    }

    #[test]
    fn test_parse_control_change() {
        let event = MidiInputEvent::parse(&[0xB2, 7, 127]).unwrap();
        assert_eq!(
            event,
            MidiInputEvent::ControlChange {
                channel: 2,
                controller: 7,
                value: 127
            }
        );
    }

    #[test]
    fn test_unsupported_and_truncated() {
        assert_eq!(MidiInputEvent::parse(&[0xF8]), None); // clock
        assert_eq!(MidiInputEvent::parse(&[0x90, 60]), None); // truncated
        assert_eq!(MidiInputEvent::parse(&[0xE0, 0, 64]), None); // pitch bend
    }
}
