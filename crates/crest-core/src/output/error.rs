//! Audio output error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output devices available")]
    NoDevices,

    #[error("no default output device")]
    NoDefaultDevice,

    #[error("output device not found: {0}")]
    DeviceNotFound(String),

    #[error("unsupported stream configuration: {0}")]
    ConfigError(String),

    #[error("failed to build output stream: {0}")]
    StreamBuildError(String),

    #[error("failed to start output stream: {0}")]
    StreamPlayError(String),
}

pub type AudioResult<T> = Result<T, AudioError>;
