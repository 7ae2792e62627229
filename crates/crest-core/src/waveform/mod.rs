//! Waveform downsampling
//!
//! Decoded audio is folded into per-channel peak buckets at the requested
//! resolution. The builder works incrementally so the worker thread can emit
//! progress snapshots and abort between chunks.

pub mod cache;
pub mod worker;

pub use cache::WaveformCache;
pub use worker::{WaveformEvent, WaveformWorker};


/// Lower bound on bucket resolution
pub const MIN_RESOLUTION: usize = 1200;
/// Upper bound on bucket resolution
pub const MAX_RESOLUTION: usize = 24000;

/// Clamp a configured resolution into the supported range.
///
/// Applied at the settings layer; the builder itself honors whatever
/// resolution it is handed.
pub fn clamp_resolution(resolution: usize) -> usize {
    resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION)
}

/// Finished waveform: per-channel peak buckets in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformData {
    /// One bucket vector per channel; every vector has `resolution` entries
    pub channels: Vec<Vec<f32>>,
    pub resolution: usize,
    pub duration_seconds: f64,
}

impl WaveformData {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Per-bucket max across channels, for the combined (mono) view
    pub fn combined(&self) -> Vec<f32> {
        let mut out = vec![0.0f32; self.resolution];
        for channel in &self.channels {
            for (slot, &peak) in out.iter_mut().zip(channel.iter()) {
                if peak > *slot {
                    *slot = peak;
                }
            }
        }
        out
    }
}

/// Incremental bucket folder.
///
/// `total_frames` fixes the bucket width up front; tracks shorter than the
/// resolution produce fewer real buckets and are padded by replicating the
/// last bucket so every waveform has exactly `resolution` entries.
pub struct WaveformBuilder {
    buckets: Vec<Vec<f32>>,
    resolution: usize,
    frames_per_bucket: u64,
    real_buckets: usize,
    total_frames: u64,
    frames_seen: u64,
    sample_rate: u32,
}

impl WaveformBuilder {
    pub fn new(total_frames: u64, channels: usize, sample_rate: u32, resolution: usize) -> Self {
        let resolution = resolution.max(1);
        let channels = channels.max(1);
        let frames_per_bucket = (total_frames.div_ceil(resolution as u64)).max(1);
        let real_buckets = if total_frames == 0 {
            0
        } else {
            total_frames.div_ceil(frames_per_bucket) as usize
        };
        Self {
            buckets: vec![vec![0.0; real_buckets]; channels],
            resolution,
            frames_per_bucket,
            real_buckets,
            total_frames,
            frames_seen: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Fold one decoded chunk's samples into their buckets
    pub fn push_chunk(&mut self, channels: &[Vec<f32>], frames: usize) {
        for (channel_index, samples) in channels.iter().enumerate() {
            let Some(buckets) = self.buckets.get_mut(channel_index) else {
                continue;
            };
            for (i, &sample) in samples.iter().take(frames).enumerate() {
                let frame = self.frames_seen + i as u64;
                let bucket = ((frame / self.frames_per_bucket) as usize).min(
                    self.real_buckets.saturating_sub(1),
                );
                if let Some(slot) = buckets.get_mut(bucket) {
                    let peak = sample.abs().min(1.0);
                    if peak > *slot {
                        *slot = peak;
                    }
                }
            }
        }
        self.frames_seen += frames as u64;
    }

    /// Buckets whose final value is known (every earlier frame consumed)
    pub fn filled_buckets(&self) -> usize {
        if self.frames_seen >= self.total_frames {
            return self.real_buckets;
        }
        ((self.frames_seen / self.frames_per_bucket) as usize).min(self.real_buckets)
    }

    pub fn total_buckets(&self) -> usize {
        self.real_buckets
    }

    /// Completion percentage for the loading overlay
    pub fn progress_percent(&self) -> u8 {
        if self.total_frames == 0 {
            return 100;
        }
        ((self.frames_seen.min(self.total_frames) * 100) / self.total_frames) as u8
    }

    /// Current (possibly partial) waveform for progressive rendering
    pub fn snapshot(&self) -> WaveformData {
        self.build()
    }

    /// Final waveform, padded to the full resolution
    pub fn finish(self) -> WaveformData {
        self.build()
    }

    fn build(&self) -> WaveformData {
        let duration_seconds = self.total_frames as f64 / self.sample_rate as f64;
        let channels = self
            .buckets
            .iter()
            .map(|buckets| pad_to_resolution(buckets, self.resolution))
            .collect();
        WaveformData {
            channels,
            resolution: self.resolution,
            duration_seconds,
        }
    }
}

/// Pad a bucket vector up to `resolution` by repeating the final bucket.
/// Empty input (zero-length track) becomes all-silent buckets.
fn pad_to_resolution(buckets: &[f32], resolution: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(resolution);
    out.extend_from_slice(&buckets[..buckets.len().min(resolution)]);
    let fill = out.last().copied().unwrap_or(0.0);
    out.resize(resolution, fill);
    out
}

/// Downsample fully-buffered planar audio in one pass.
///
/// Used when the container does not report a frame count and the worker had
/// to accumulate the whole stream before bucketing.
pub fn downsample_buckets(
    channels: &[Vec<f32>],
    sample_rate: u32,
    resolution: usize,
) -> WaveformData {
    let total_frames = channels.iter().map(|c| c.len()).max().unwrap_or(0) as u64;
    let mut builder = WaveformBuilder::new(
        total_frames,
        channels.len().max(1),
        sample_rate,
        resolution,
    );
    builder.push_chunk(channels, total_frames as usize);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ramp(frames: usize) -> Vec<f32> {
        (0..frames).map(|i| i as f32 / frames as f32).collect()
    }

    #[test]
    fn test_resolution_clamp() {
        assert_eq!(clamp_resolution(10), MIN_RESOLUTION);
        assert_eq!(clamp_resolution(4000), 4000);
        assert_eq!(clamp_resolution(1_000_000), MAX_RESOLUTION);
    }

    #[test]
    fn test_exact_bucket_count_long_input() {
        // 3 minutes of stereo at 44.1k, far more frames than buckets
        let frames = 44100 * 180;
        let channels = vec![ramp(frames), ramp(frames)];
        let data = downsample_buckets(&channels, 44100, 2000);
        assert_eq!(data.channels.len(), 2);
        for channel in &data.channels {
            assert_eq!(channel.len(), 2000);
        }
        assert!((data.duration_seconds - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_requested_resolution_honored_exactly() {
        // The builder never rounds the request up, even below the settings
        // floor of MIN_RESOLUTION
        let frames = 44100 * 180;
        let channels = vec![ramp(frames), ramp(frames)];
        let data = downsample_buckets(&channels, 44100, 1000);
        assert_eq!(data.resolution, 1000);
        assert_eq!(data.channels.len(), 2);
        for channel in &data.channels {
            assert_eq!(channel.len(), 1000);
        }
    }

    #[test]
    fn test_short_input_padded() {
        // Fewer frames than buckets: padded by replication, never an error
        let channels = vec![vec![0.5f32; 10]];
        let data = downsample_buckets(&channels, 44100, 4000);
        assert_eq!(data.channels[0].len(), 4000);
        assert!(data.channels[0].iter().all(|&b| (b - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_zero_length_input() {
        let channels = vec![Vec::new(), Vec::new()];
        let data = downsample_buckets(&channels, 44100, 2000);
        assert_eq!(data.channels.len(), 2);
        for channel in &data.channels {
            assert_eq!(channel.len(), 2000);
            assert!(channel.iter().all(|&b| b == 0.0));
        }
        assert_eq!(data.duration_seconds, 0.0);
    }

    #[test]
    fn test_peaks_clipped_to_unit() {
        let channels = vec![vec![2.0f32, -3.0, 0.25]];
        let data = downsample_buckets(&channels, 44100, MIN_RESOLUTION);
        assert!(data.channels[0].iter().all(|&b| b <= 1.0));
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let frames = 50_000;
        let samples = ramp(frames);
        let one_shot = downsample_buckets(&[samples.clone()], 44100, 1500);

        let mut builder = WaveformBuilder::new(frames as u64, 1, 44100, 1500);
        for chunk in samples.chunks(1024) {
            builder.push_chunk(&[chunk.to_vec()], chunk.len());
        }
        let incremental = builder.finish();

        assert_eq!(one_shot, incremental);
    }

    #[test]
    fn test_progress_monotonic() {
        let frames = 10_000u64;
        let mut builder = WaveformBuilder::new(frames, 1, 44100, MIN_RESOLUTION);
        let mut last = 0u8;
        for _ in 0..10 {
            builder.push_chunk(&[vec![0.1; 1000]], 1000);
            let pct = builder.progress_percent();
            assert!(pct >= last);
            last = pct;
        }
        assert_eq!(last, 100);
        assert_eq!(builder.filled_buckets(), builder.total_buckets());
    }

    #[test]
    fn test_combined_takes_channel_max() {
        let channels = vec![vec![0.2f32; 100], vec![0.8f32; 100]];
        let data = downsample_buckets(&channels, 44100, MIN_RESOLUTION);
        let combined = data.combined();
        assert_eq!(combined.len(), MIN_RESOLUTION);
        assert!((combined[0] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_shared_data_is_cheap_to_clone() {
        let data = Arc::new(downsample_buckets(&[vec![0.5; 64]], 44100, MIN_RESOLUTION));
        let clone = Arc::clone(&data);
        assert!(Arc::ptr_eq(&data, &clone));
    }
}
