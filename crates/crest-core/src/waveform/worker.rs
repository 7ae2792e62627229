//! Background waveform worker
//!
//! One thread decodes and downsamples off the UI thread. Requests arrive on
//! an mpsc channel; progress and results flow back on a second channel that
//! the UI drains every tick. A shared generation counter supersedes stale
//! work: the active job checks it between chunks and stops decoding as soon
//! as a newer request exists.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::decode::AudioDecoder;
use crate::waveform::{downsample_buckets, WaveformBuilder, WaveformData};

/// Minimum interval between progress events for one job
const PROGRESS_INTERVAL: Duration = Duration::from_millis(120);

/// Request id used by preload jobs; never matches a foreground request
const PRELOAD_ID: u64 = 0;

enum WorkerCommand {
    Load {
        request_id: u64,
        path: PathBuf,
        resolution: usize,
    },
    Preload {
        paths: Vec<PathBuf>,
        resolution: usize,
    },
    ClearQueue,
}

/// Events delivered back to the UI thread
#[derive(Debug, Clone)]
pub enum WaveformEvent {
    Progress {
        request_id: u64,
        path: PathBuf,
        snapshot: Arc<WaveformData>,
        filled: usize,
        total: usize,
    },
    Finished {
        request_id: u64,
        path: PathBuf,
        data: Arc<WaveformData>,
    },
    Failed {
        request_id: u64,
        path: PathBuf,
        error: String,
    },
}

enum JobOutcome {
    Done,
    Cancelled,
}

pub struct WaveformWorker {
    command_tx: Sender<WorkerCommand>,
    event_rx: Receiver<WaveformEvent>,
    generation: Arc<AtomicU64>,
    latest_request: u64,
    _handle: thread::JoinHandle<()>,
}

impl WaveformWorker {
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let generation = Arc::new(AtomicU64::new(0));
        let worker_generation = Arc::clone(&generation);

        let handle = thread::Builder::new()
            .name("waveform-worker".to_string())
            .spawn(move || {
                worker_loop(command_rx, event_tx, worker_generation);
            })
            .unwrap_or_else(|e| panic!("Failed to spawn waveform worker: {}", e));

        Self {
            command_tx,
            event_rx,
            generation,
            latest_request: 0,
            _handle: handle,
        }
    }

    /// Request a waveform for the current track, superseding any active job.
    /// Returns the request id; events carrying an older id are stale.
    pub fn request(&mut self, path: PathBuf, resolution: usize) -> u64 {
        let request_id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest_request = request_id;
        if self
            .command_tx
            .send(WorkerCommand::Load {
                request_id,
                path,
                resolution,
            })
            .is_err()
        {
            log::error!("Waveform worker thread has died");
        }
        request_id
    }

    /// Latest foreground request id; events with a different id are stale
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// Queue non-current tracks for low-priority background rendering
    pub fn enqueue_preload(&self, paths: Vec<PathBuf>, resolution: usize) {
        if paths.is_empty() {
            return;
        }
        let _ = self
            .command_tx
            .send(WorkerCommand::Preload { paths, resolution });
    }

    /// Drop any queued preloads (playlist cleared or resolution changed)
    pub fn clear_queue(&self) {
        let _ = self.command_tx.send(WorkerCommand::ClearQueue);
    }

    /// Drain all pending events without blocking
    pub fn poll_events(&self) -> Vec<WaveformEvent> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::error!("Waveform worker channel disconnected");
                    break;
                }
            }
        }
        events
    }
}

fn worker_loop(
    command_rx: Receiver<WorkerCommand>,
    event_tx: Sender<WaveformEvent>,
    generation: Arc<AtomicU64>,
) {
    let mut preload_queue: VecDeque<(PathBuf, usize)> = VecDeque::new();

    loop {
        // Block only when there is no queued preload work to fall back to
        let command = if preload_queue.is_empty() {
            match command_rx.recv() {
                Ok(command) => Some(command),
                Err(_) => return,
            }
        } else {
            match command_rx.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => return,
            }
        };

        match command {
            Some(WorkerCommand::Load {
                request_id,
                path,
                resolution,
            }) => {
                // Already superseded before we even started
                if generation.load(Ordering::SeqCst) != request_id {
                    continue;
                }
                run_job(
                    &path,
                    resolution,
                    request_id,
                    &event_tx,
                    &generation,
                    |gen| gen != request_id,
                    true,
                );
            }
            Some(WorkerCommand::Preload { paths, resolution }) => {
                for path in paths {
                    preload_queue.push_back((path, resolution));
                }
            }
            Some(WorkerCommand::ClearQueue) => {
                preload_queue.clear();
            }
            None => {
                let Some((path, resolution)) = preload_queue.pop_front() else {
                    continue;
                };
                let start_generation = generation.load(Ordering::SeqCst);
                let outcome = run_job(
                    &path,
                    resolution,
                    PRELOAD_ID,
                    &event_tx,
                    &generation,
                    |gen| gen != start_generation,
                    false,
                );
                // A foreground request preempted us; retry this track later
                if matches!(outcome, JobOutcome::Cancelled) {
                    preload_queue.push_front((path, resolution));
                }
            }
        }
    }
}

fn run_job(
    path: &PathBuf,
    resolution: usize,
    request_id: u64,
    event_tx: &Sender<WaveformEvent>,
    generation: &AtomicU64,
    cancelled: impl Fn(u64) -> bool,
    emit_progress: bool,
) -> JobOutcome {
    let started = Instant::now();

    let mut decoder = match AudioDecoder::open(path) {
        Ok(decoder) => decoder,
        Err(e) => {
            let _ = event_tx.send(WaveformEvent::Failed {
                request_id,
                path: path.clone(),
                error: e.to_string(),
            });
            return JobOutcome::Done;
        }
    };
    let spec = decoder.spec();

    let data = match spec.total_frames {
        Some(total_frames) => {
            let mut builder =
                WaveformBuilder::new(total_frames, spec.channels, spec.sample_rate, resolution);
            let mut last_progress = Instant::now();

            loop {
                if cancelled(generation.load(Ordering::SeqCst)) {
                    return JobOutcome::Cancelled;
                }
                match decoder.next_chunk() {
                    Ok(Some(chunk)) => {
                        builder.push_chunk(&chunk.channels, chunk.frames);
                        if emit_progress && last_progress.elapsed() >= PROGRESS_INTERVAL {
                            last_progress = Instant::now();
                            let _ = event_tx.send(WaveformEvent::Progress {
                                request_id,
                                path: path.clone(),
                                snapshot: Arc::new(builder.snapshot()),
                                filled: builder.filled_buckets(),
                                total: builder.total_buckets(),
                            });
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = event_tx.send(WaveformEvent::Failed {
                            request_id,
                            path: path.clone(),
                            error: e.to_string(),
                        });
                        return JobOutcome::Done;
                    }
                }
            }
            builder.finish()
        }
        None => {
            // No frame count from the container: buffer everything, then
            // bucket in one pass. No intermediate progress in this mode.
            let mut channels: Vec<Vec<f32>> = vec![Vec::new(); spec.channels.max(1)];
            loop {
                if cancelled(generation.load(Ordering::SeqCst)) {
                    return JobOutcome::Cancelled;
                }
                match decoder.next_chunk() {
                    Ok(Some(chunk)) => {
                        for (dst, src) in channels.iter_mut().zip(chunk.channels.iter()) {
                            dst.extend_from_slice(src);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = event_tx.send(WaveformEvent::Failed {
                            request_id,
                            path: path.clone(),
                            error: e.to_string(),
                        });
                        return JobOutcome::Done;
                    }
                }
            }
            downsample_buckets(&channels, spec.sample_rate, resolution)
        }
    };

    log::info!(
        "[PERF] Waveform for {} built in {:.1}ms",
        path.display(),
        started.elapsed().as_secs_f64() * 1000.0
    );

    let _ = event_tx.send(WaveformEvent::Finished {
        request_id,
        path: path.clone(),
        data: Arc::new(data),
    });
    JobOutcome::Done
}
