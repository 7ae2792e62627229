//! Audio output: device enumeration and the cpal stream

pub mod device;
pub mod error;
pub mod stream;

pub use device::{list_output_devices, OutputDevice};
pub use error::AudioError;
pub use stream::OutputStream;
