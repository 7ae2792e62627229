//! Background track loader for playback
//!
//! Decoding a whole file and resampling it to the output stream rate takes
//! long enough to stutter the UI, so it runs on its own thread. Requests go
//! in over an mpsc channel, finished buffers come back over another, and the
//! UI polls with `try_recv` from its tick.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::decode::{decode_all, DecodeError};

/// A fully decoded track, resampled to the output stream rate
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    pub path: PathBuf,
    /// Interleaved f32 samples at `sample_rate`
    pub samples: Arc<Vec<f32>>,
    pub channels: usize,
    pub sample_rate: u32,
    pub duration_seconds: f64,
}

pub enum LoadResult {
    Loaded(LoadedAudio),
    Failed { path: PathBuf, error: String },
}

pub struct TrackLoader {
    request_tx: Sender<PathBuf>,
    result_rx: Receiver<LoadResult>,
    target_rate: Arc<AtomicU32>,
    _handle: thread::JoinHandle<()>,
}

impl TrackLoader {
    /// Spawn the loader thread targeting the given output sample rate
    pub fn spawn(target_rate: u32) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<PathBuf>();
        let (result_tx, result_rx) = mpsc::channel::<LoadResult>();
        let target_rate = Arc::new(AtomicU32::new(target_rate));
        let worker_rate = Arc::clone(&target_rate);

        let handle = thread::Builder::new()
            .name("track-loader".to_string())
            .spawn(move || {
                while let Ok(path) = request_rx.recv() {
                    let rate = worker_rate.load(Ordering::SeqCst);
                    let result = match load_track(&path, rate) {
                        Ok(audio) => LoadResult::Loaded(audio),
                        Err(e) => LoadResult::Failed {
                            path: path.clone(),
                            error: e.to_string(),
                        },
                    };
                    if result_tx.send(result).is_err() {
                        return;
                    }
                }
            })
            .unwrap_or_else(|e| panic!("Failed to spawn track loader: {}", e));

        Self {
            request_tx,
            result_rx,
            target_rate,
            _handle: handle,
        }
    }

    /// Update the resampling target after the output stream is rebuilt
    pub fn set_target_rate(&self, rate: u32) {
        self.target_rate.store(rate, Ordering::SeqCst);
    }

    pub fn load(&self, path: PathBuf) {
        if self.request_tx.send(path).is_err() {
            log::error!("Track loader thread has died");
        }
    }

    /// Poll for a finished load without blocking
    pub fn try_recv(&self) -> Option<LoadResult> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::error!("Track loader channel disconnected");
                None
            }
        }
    }
}

fn load_track(path: &PathBuf, target_rate: u32) -> Result<LoadedAudio, DecodeError> {
    let started = Instant::now();
    let (samples, spec) = decode_all(path)?;

    let channels = spec.channels.max(1);
    let samples = if spec.sample_rate != target_rate && !samples.is_empty() {
        resample(&samples, channels, spec.sample_rate, target_rate)
    } else {
        samples
    };

    let frames = samples.len() / channels;
    let duration_seconds = frames as f64 / target_rate.max(1) as f64;

    log::info!(
        "[PERF] Loaded {} ({:.1}s @ {} Hz) in {:.1}ms",
        path.display(),
        duration_seconds,
        target_rate,
        started.elapsed().as_secs_f64() * 1000.0
    );

    Ok(LoadedAudio {
        path: path.clone(),
        samples: Arc::new(samples),
        channels,
        sample_rate: target_rate,
        duration_seconds,
    })
}

/// Offline sinc resample of an interleaved buffer
fn resample(samples: &[f32], channels: usize, from_rate: u32, to_rate: u32) -> Vec<f32> {
    let frames = samples.len() / channels;

    // De-interleave into planar buffers for rubato
    let mut planar: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame.iter()) {
            channel.push(sample);
        }
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = match SincFixedIn::<f32>::new(ratio, 2.0, params, 1024, channels) {
        Ok(resampler) => resampler,
        Err(e) => {
            log::warn!("Resampler init failed, using source rate: {}", e);
            return samples.to_vec();
        }
    };

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity((frames as f64 * ratio) as usize); channels];
    let mut position = 0usize;

    loop {
        let needed = resampler.input_frames_next();
        let remaining = frames - position;

        let result = if remaining >= needed {
            let chunk: Vec<&[f32]> = planar
                .iter()
                .map(|c| &c[position..position + needed])
                .collect();
            position += needed;
            resampler.process(&chunk, None)
        } else {
            // Tail shorter than a full chunk, then flush the filter state
            let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[position..]).collect();
            position = frames;
            resampler.process_partial(Some(&chunk), None)
        };

        match result {
            Ok(blocks) => {
                for (channel, block) in output.iter_mut().zip(blocks.into_iter()) {
                    channel.extend_from_slice(&block);
                }
            }
            Err(e) => {
                log::warn!("Resampling failed, using source rate: {}", e);
                return samples.to_vec();
            }
        }

        if position >= frames {
            match resampler.process_partial::<&[f32]>(None, None) {
                Ok(blocks) => {
                    for (channel, block) in output.iter_mut().zip(blocks.into_iter()) {
                        channel.extend_from_slice(&block);
                    }
                }
                Err(e) => log::warn!("Resampler flush failed: {}", e),
            }
            break;
        }
    }

    // Re-interleave
    let out_frames = output.first().map(|c| c.len()).unwrap_or(0);
    let mut interleaved = Vec::with_capacity(out_frames * channels);
    for frame in 0..out_frames {
        for channel in &output {
            interleaved.push(channel[frame]);
        }
    }
    interleaved
}
