//! Per-track waveform cache
//!
//! UI-thread-only map from file path to the finished waveform. Entries carry
//! the signature they were built under; a mismatched signature (file changed
//! on disk, or the resolution setting changed) is a stale miss.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::track::FileSignature;
use crate::waveform::WaveformData;

struct CacheEntry {
    signature: FileSignature,
    data: Arc<WaveformData>,
}

#[derive(Default)]
pub struct WaveformCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl WaveformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached waveform; stale signatures miss
    pub fn get(&self, path: &Path, signature: FileSignature) -> Option<Arc<WaveformData>> {
        self.entries
            .get(path)
            .filter(|entry| entry.signature == signature)
            .map(|entry| Arc::clone(&entry.data))
    }

    pub fn contains(&self, path: &Path, signature: FileSignature) -> bool {
        self.get(path, signature).is_some()
    }

    /// Insert or replace the entry for a path
    pub fn insert(&mut self, path: PathBuf, signature: FileSignature, data: Arc<WaveformData>) {
        self.entries.insert(path, CacheEntry { signature, data });
    }

    /// Evict one track (playlist removal)
    pub fn remove(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    /// Evict everything (resolution change)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::downsample_buckets;

    fn sig(resolution: usize) -> FileSignature {
        FileSignature {
            file_size: 1000,
            modified_secs: 42,
            resolution,
        }
    }

    #[test]
    fn test_hit_returns_same_arc() {
        let mut cache = WaveformCache::new();
        let data = Arc::new(downsample_buckets(&[vec![0.5; 64]], 44100, 2000));
        let path = PathBuf::from("/music/a.flac");

        cache.insert(path.clone(), sig(2000), Arc::clone(&data));
        let hit = cache.get(&path, sig(2000)).unwrap();
        assert!(Arc::ptr_eq(&hit, &data));
    }

    #[test]
    fn test_stale_signature_misses() {
        let mut cache = WaveformCache::new();
        let data = Arc::new(downsample_buckets(&[vec![0.5; 64]], 44100, 2000));
        let path = PathBuf::from("/music/a.flac");

        cache.insert(path.clone(), sig(2000), data);
        assert!(cache.get(&path, sig(4000)).is_none());
        let changed = FileSignature {
            file_size: 2000,
            ..sig(2000)
        };
        assert!(cache.get(&path, changed).is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut cache = WaveformCache::new();
        let path = PathBuf::from("/music/a.flac");
        let first = Arc::new(downsample_buckets(&[vec![0.1; 8]], 44100, 2000));
        let second = Arc::new(downsample_buckets(&[vec![0.9; 8]], 44100, 2000));

        cache.insert(path.clone(), sig(2000), first);
        cache.insert(path.clone(), sig(2000), Arc::clone(&second));
        assert_eq!(cache.len(), 1);
        let hit = cache.get(&path, sig(2000)).unwrap();
        assert!(Arc::ptr_eq(&hit, &second));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = WaveformCache::new();
        let data = Arc::new(downsample_buckets(&[vec![0.5; 8]], 44100, 2000));
        cache.insert(PathBuf::from("/a"), sig(2000), Arc::clone(&data));
        cache.insert(PathBuf::from("/b"), sig(2000), data);

        cache.remove(Path::new("/a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
