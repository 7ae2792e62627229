//! Message handlers for PlayerApp
//!
//! Each handler module covers one category of messages. Handlers receive
//! `&mut PlayerApp` and return `Task<Message>`.

pub mod feedback;
pub mod midi;
pub mod settings;
pub mod tick;
pub mod track_loading;
pub mod transport;
