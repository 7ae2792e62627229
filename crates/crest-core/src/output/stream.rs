//! cpal output stream
//!
//! One stream per selected device. The loaded track is swapped through a
//! mutex-guarded slot; the audio callback takes the lock with `try_lock` and
//! emits silence on contention so a swap never blocks the callback. Playhead
//! position and transport flags are shared atomics polled by the UI tick.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};

use super::device::find_device;
use super::error::{AudioError, AudioResult};
use crate::routing::{RoutingMatrix, MAX_ROUTING_CHANNELS};

/// State shared between the audio callback and the UI thread
struct OutputShared {
    /// Playhead in source frames
    position_frames: AtomicU64,
    playing: AtomicBool,
    /// Set by the callback when the track buffer is exhausted
    finished: AtomicBool,
}

/// The decoded track currently wired to the callback
struct ActiveTrack {
    /// Interleaved samples at the stream's sample rate
    samples: Arc<Vec<f32>>,
    /// Source channel count (interleave stride)
    channels: usize,
    matrix: RoutingMatrix,
}

pub struct OutputStream {
    _stream: cpal::Stream,
    shared: Arc<OutputShared>,
    slot: Arc<Mutex<Option<ActiveTrack>>>,
    sample_rate: u32,
    output_channels: usize,
    /// Channel count requested at open, before device negotiation
    desired_channels: usize,
}

impl OutputStream {
    /// Build and start a stream on the named device (or the default).
    ///
    /// Requests `desired_channels` outputs; falls back to the device's
    /// default channel count when the device cannot do that many.
    pub fn open(device_name: Option<&str>, desired_channels: usize) -> AudioResult<Self> {
        let device = find_device(device_name)?;

        let default_config = device
            .default_output_config()
            .map_err(|e| AudioError::ConfigError(e.to_string()))?;
        let sample_rate = default_config.sample_rate().0;

        let desired = desired_channels.clamp(1, MAX_ROUTING_CHANNELS) as u16;
        let supports_desired = device
            .supported_output_configs()
            .map(|mut configs| {
                configs.any(|c| {
                    c.channels() == desired
                        && sample_rate >= c.min_sample_rate().0
                        && sample_rate <= c.max_sample_rate().0
                })
            })
            .unwrap_or(false);
        let channels = if supports_desired {
            desired
        } else {
            default_config.channels()
        };

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Default,
        };

        let shared = Arc::new(OutputShared {
            position_frames: AtomicU64::new(0),
            playing: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        });
        let slot: Arc<Mutex<Option<ActiveTrack>>> = Arc::new(Mutex::new(None));

        let callback_shared = Arc::clone(&shared);
        let callback_slot = Arc::clone(&slot);
        let output_channels = channels as usize;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    fill_output(data, output_channels, &callback_shared, &callback_slot);
                },
                |e| log::error!("Audio stream error: {}", e),
                None,
            )
            .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

        log::info!(
            "Opened output stream: {} ch @ {} Hz on {}",
            channels,
            sample_rate,
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        Ok(Self {
            _stream: stream,
            shared,
            slot,
            sample_rate,
            output_channels,
            desired_channels: desired as usize,
        })
    }

    /// Sample rate the loaded track must be resampled to
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// What `open` was asked for; the device may have negotiated down.
    /// Comparing against this instead of `output_channels` keeps a
    /// reopen-on-mismatch caller from reopening in a loop.
    pub fn desired_channels(&self) -> usize {
        self.desired_channels
    }

    /// Swap in a decoded track; resets the playhead
    pub fn set_track(&self, samples: Arc<Vec<f32>>, channels: usize, matrix: RoutingMatrix) {
        self.shared.position_frames.store(0, Ordering::SeqCst);
        self.shared.finished.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(ActiveTrack {
                samples,
                channels: channels.max(1),
                matrix,
            });
        }
    }

    pub fn clear_track(&self) {
        self.shared.playing.store(false, Ordering::SeqCst);
        self.shared.position_frames.store(0, Ordering::SeqCst);
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }

    pub fn play(&self) {
        self.shared.playing.store(true, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.shared.playing.store(false, Ordering::SeqCst);
    }

    pub fn seek_to_frame(&self, frame: u64) {
        self.shared.position_frames.store(frame, Ordering::SeqCst);
        self.shared.finished.store(false, Ordering::SeqCst);
    }

    pub fn position_frames(&self) -> u64 {
        self.shared.position_frames.load(Ordering::SeqCst)
    }

    /// Returns true once per track end
    pub fn take_finished(&self) -> bool {
        self.shared.finished.swap(false, Ordering::SeqCst)
    }
}

fn fill_output(
    data: &mut [f32],
    output_channels: usize,
    shared: &OutputShared,
    slot: &Mutex<Option<ActiveTrack>>,
) {
    data.fill(0.0);

    if !shared.playing.load(Ordering::Relaxed) {
        return;
    }

    // Never block the callback; a swap in progress just yields silence
    let Ok(guard) = slot.try_lock() else {
        return;
    };
    let Some(track) = guard.as_ref() else {
        return;
    };

    let total_frames = (track.samples.len() / track.channels) as u64;
    let mut position = shared.position_frames.load(Ordering::Relaxed);

    for frame_out in data.chunks_mut(output_channels) {
        if position >= total_frames {
            shared.finished.store(true, Ordering::Relaxed);
            shared.playing.store(false, Ordering::Relaxed);
            break;
        }
        let start = position as usize * track.channels;
        let frame_in = &track.samples[start..start + track.channels];
        track.matrix.apply(frame_in, frame_out);
        position += 1;
    }

    shared.position_frames.store(position, Ordering::Relaxed);
}
