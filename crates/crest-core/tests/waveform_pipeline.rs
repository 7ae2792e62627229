//! End-to-end waveform pipeline tests over a generated WAV file

use std::f32::consts::TAU;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crest_core::decode::{decode_all, AudioDecoder};
use crest_core::track::{file_signature, probe_track};
use crest_core::waveform::{
    downsample_buckets, WaveformBuilder, WaveformCache, WaveformEvent, WaveformWorker,
};

const SAMPLE_RATE: u32 = 44100;
const FRAMES: usize = 44100; // one second

/// Write a one-second stereo sine WAV and return its directory guard
fn write_test_wav(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tone.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..FRAMES {
        let t = i as f32 / SAMPLE_RATE as f32;
        let left = (0.5 * (440.0 * TAU * t).sin() * i16::MAX as f32) as i16;
        let right = (0.25 * (880.0 * TAU * t).sin() * i16::MAX as f32) as i16;
        writer.write_sample(left).unwrap();
        writer.write_sample(right).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn probe_reports_container_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_wav(&dir);

    let track = probe_track(&path).unwrap();
    assert_eq!(track.sample_rate, SAMPLE_RATE);
    assert_eq!(track.channels, 2);
    assert_eq!(track.format, "WAV");
    let duration = track.duration_seconds.unwrap();
    assert!((duration - 1.0).abs() < 0.01, "duration was {}", duration);
}

#[test]
fn probe_missing_file_fails() {
    assert!(probe_track(Path::new("/nonexistent/file.wav")).is_err());
}

#[test]
fn decode_all_yields_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_wav(&dir);

    let (samples, spec) = decode_all(&path).unwrap();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(samples.len(), FRAMES * 2);
    // Peaks stay near the written amplitudes
    let peak = samples.iter().cloned().fold(0.0f32, |a, s| a.max(s.abs()));
    assert!(peak > 0.45 && peak <= 0.51, "peak was {}", peak);
}

#[test]
fn streaming_decode_matches_builder_expectations() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_wav(&dir);

    let mut decoder = AudioDecoder::open(&path).unwrap();
    let spec = decoder.spec();
    let total = spec.total_frames.unwrap();
    assert_eq!(total, FRAMES as u64);

    let mut builder = WaveformBuilder::new(total, spec.channels, spec.sample_rate, 2000);
    while let Some(chunk) = decoder.next_chunk().unwrap() {
        builder.push_chunk(&chunk.channels, chunk.frames);
    }
    assert_eq!(builder.filled_buckets(), builder.total_buckets());
    assert_eq!(builder.progress_percent(), 100);

    let data = builder.finish();
    assert_eq!(data.channels.len(), 2);
    for channel in &data.channels {
        assert_eq!(channel.len(), 2000);
    }
    // Left channel carries twice the amplitude of the right
    let left_peak = data.channels[0].iter().cloned().fold(0.0f32, f32::max);
    let right_peak = data.channels[1].iter().cloned().fold(0.0f32, f32::max);
    assert!(left_peak > right_peak);
    assert!((data.duration_seconds - 1.0).abs() < 0.01);
}

#[test]
fn worker_delivers_finished_waveform() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_wav(&dir);

    let mut worker = WaveformWorker::spawn();
    let request_id = worker.request(path.clone(), 2000);

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut finished = None;
    while Instant::now() < deadline && finished.is_none() {
        for event in worker.poll_events() {
            match event {
                WaveformEvent::Finished {
                    request_id: id,
                    path: event_path,
                    data,
                } => {
                    assert_eq!(id, request_id);
                    assert_eq!(event_path, path);
                    finished = Some(data);
                }
                WaveformEvent::Progress {
                    request_id: id,
                    filled,
                    total,
                    ..
                } => {
                    assert_eq!(id, request_id);
                    assert!(filled <= total);
                }
                WaveformEvent::Failed { error, .. } => panic!("worker failed: {}", error),
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    let data = finished.expect("worker never finished");
    assert_eq!(data.channels.len(), 2);
    assert_eq!(data.resolution, 2000);
}

#[test]
fn superseded_request_never_outranks_latest() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_wav(&dir);

    let mut worker = WaveformWorker::spawn();
    let first = worker.request(path.clone(), 2000);
    let second = worker.request(path.clone(), 4000);
    assert!(second > first);
    assert_eq!(worker.latest_request(), second);

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut latest_finished = false;
    while Instant::now() < deadline && !latest_finished {
        for event in worker.poll_events() {
            if let WaveformEvent::Finished {
                request_id, data, ..
            } = event
            {
                // The first job may have completed before being superseded;
                // its events are identifiable as stale and get dropped
                if request_id == worker.latest_request() {
                    assert_eq!(data.resolution, 4000);
                    latest_finished = true;
                } else {
                    assert_eq!(request_id, first);
                }
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(latest_finished, "latest request never finished");
}

#[test]
fn worker_reports_failure_for_bad_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.wav");
    std::fs::write(&path, b"this is not a wav file").unwrap();

    let mut worker = WaveformWorker::spawn();
    let request_id = worker.request(path.clone(), 2000);

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        assert!(Instant::now() < deadline, "worker never reported failure");
        let mut failed = false;
        for event in worker.poll_events() {
            if let WaveformEvent::Failed {
                request_id: id, ..
            } = event
            {
                assert_eq!(id, request_id);
                failed = true;
            }
        }
        if failed {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn result_built_at_old_resolution_is_a_stale_miss() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_wav(&dir);

    // A build that finishes after the user raised the resolution enters the
    // cache under the resolution it was built at, never the current setting
    let old = Arc::new(downsample_buckets(&[vec![0.5f32; 1024]], SAMPLE_RATE, 2000));
    let mut cache = WaveformCache::new();
    let signature = file_signature(&path, old.resolution).unwrap();
    cache.insert(path.clone(), signature, old);

    assert!(cache
        .get(&path, file_signature(&path, 4000).unwrap())
        .is_none());
    assert!(cache
        .get(&path, file_signature(&path, 2000).unwrap())
        .is_some());
}

#[test]
fn signature_tracks_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_wav(&dir);

    let a = file_signature(&path, 2000).unwrap();
    let b = file_signature(&path, 2000).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, file_signature(&path, 4000).unwrap());
}
