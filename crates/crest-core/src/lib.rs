//! Core library for the Crest audio player
//!
//! Decode, waveform acquisition, playback state, playlist, output routing,
//! configuration, and the small network services (feedback, update check).

pub mod config;
pub mod decode;
pub mod feedback;
pub mod loader;
pub mod output;
pub mod playback;
pub mod playlist;
pub mod routing;
pub mod track;
pub mod update;
pub mod waveform;
