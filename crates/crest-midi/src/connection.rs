//! MIDI port discovery and connection
//!
//! Uses midir for cross-platform MIDI input (ALSA on Linux, CoreMIDI on
//! macOS, WinMM on Windows).

use midir::{MidiInput, MidiInputPort};

/// Error type for MIDI connection operations
#[derive(Debug, thiserror::Error)]
pub enum MidiConnectionError {
    #[error("Failed to initialize MIDI input: {0}")]
    InputInitError(String),

    #[error("No MIDI input ports available")]
    NoInputPorts,

    #[error("No MIDI port found matching: {0}")]
    PortNotFound(String),

    #[error("Failed to connect to MIDI port: {0}")]
    ConnectionError(String),
}

/// List all available MIDI input port names
pub fn list_input_ports() -> Result<Vec<String>, MidiConnectionError> {
    let midi_in = MidiInput::new("crest-midi-list")
        .map_err(|e| MidiConnectionError::InputInitError(e.to_string()))?;

    let ports: Vec<String> = midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect();

    Ok(ports)
}

/// Find an input port, returning the MidiInput so the caller can attach
/// its callback.
///
/// `preferred` is matched case-insensitively as a substring of port names;
/// `None` takes the first available port.
pub fn find_input_port(
    preferred: Option<&str>,
) -> Result<(MidiInput, MidiInputPort, String), MidiConnectionError> {
    let midi_in = MidiInput::new("crest-midi-in")
        .map_err(|e| MidiConnectionError::InputInitError(e.to_string()))?;

    let in_ports = midi_in.ports();
    if in_ports.is_empty() {
        return Err(MidiConnectionError::NoInputPorts);
    }

    let port = match preferred {
        Some(pattern) => {
            let lowered = pattern.to_lowercase();
            in_ports
                .into_iter()
                .find(|port| {
                    midi_in
                        .port_name(port)
                        .map(|name| name.to_lowercase().contains(&lowered))
                        .unwrap_or(false)
                })
                .ok_or_else(|| MidiConnectionError::PortNotFound(pattern.to_string()))?
        }
        None => in_ports.into_iter().next().ok_or(MidiConnectionError::NoInputPorts)?,
    };

    let port_name = midi_in
        .port_name(&port)
        .unwrap_or_else(|_| "unknown".to_string());

    log::info!("MIDI: Found input port: {}", port_name);

    Ok((midi_in, port, port_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ports() {
        // Just verifies enumeration does not crash; availability depends
        // on the system
        let _ports = list_input_ports();
    }
}
