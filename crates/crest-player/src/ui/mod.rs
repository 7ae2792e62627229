//! UI modules for the Crest player

pub mod app;
pub mod feedback_view;
pub mod handlers;
pub mod message;
pub mod overlay;
pub mod playlist_view;
pub mod settings;
pub mod theme;
pub mod transport;
pub mod waveform;

pub use app::PlayerApp;
