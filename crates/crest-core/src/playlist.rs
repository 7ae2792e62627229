//! Ordered playlist with an optional current selection

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::track::{is_audio_file, Track};

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Add a track unless its path is already present. Returns whether it
    /// was added.
    pub fn add(&mut self, track: Track) -> bool {
        if self.tracks.iter().any(|t| t.path == track.path) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Remove a track, adjusting the current index. Returns the removed
    /// track's path so the caller can evict its cache entry.
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);
        self.current = match self.current {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        Some(removed.path)
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.tracks.len() {
            return false;
        }
        self.tracks.swap(index, index - 1);
        self.current = self.current.map(|c| {
            if c == index {
                index - 1
            } else if c == index - 1 {
                index
            } else {
                c
            }
        });
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.tracks.len() {
            return false;
        }
        self.tracks.swap(index, index + 1);
        self.current = self.current.map(|c| {
            if c == index {
                index + 1
            } else if c == index + 1 {
                index
            } else {
                c
            }
        });
        true
    }

    pub fn select(&mut self, index: usize) -> Option<&Track> {
        if index < self.tracks.len() {
            self.current = Some(index);
            self.tracks.get(index)
        } else {
            None
        }
    }

    /// Index after the current one, clamped at the last track
    pub fn next_index(&self) -> Option<usize> {
        let current = self.current?;
        if current + 1 < self.tracks.len() {
            Some(current + 1)
        } else {
            None
        }
    }

    /// Index before the current one, clamped at the first track
    pub fn previous_index(&self) -> Option<usize> {
        match self.current? {
            0 => None,
            current => Some(current - 1),
        }
    }

    /// Paths of every track except the given one, in playlist order.
    /// Used to seed waveform preloading.
    pub fn other_paths(&self, except: &Path) -> Vec<PathBuf> {
        self.tracks
            .iter()
            .filter(|t| t.path != except)
            .map(|t| t.path.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }
}

/// Recursively collect audio file paths under a directory, sorted
pub fn scan_directory(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_audio_file(path))
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str) -> Track {
        Track {
            path: PathBuf::from(format!("/music/{}.flac", name)),
            title: name.to_string(),
            format: "FLAC".to_string(),
            duration_seconds: Some(180.0),
            sample_rate: 44100,
            channels: 2,
            file_size: 1000,
        }
    }

    #[test]
    fn test_add_dedup_by_path() {
        let mut playlist = Playlist::new();
        assert!(playlist.add(track("a")));
        assert!(!playlist.add(track("a")));
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn test_remove_adjusts_current() {
        let mut playlist = Playlist::new();
        playlist.add(track("a"));
        playlist.add(track("b"));
        playlist.add(track("c"));
        playlist.select(2);

        playlist.remove(0);
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(playlist.current_track().map(|t| t.title.as_str()), Some("c"));

        playlist.remove(1);
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn test_move_follows_selection() {
        let mut playlist = Playlist::new();
        playlist.add(track("a"));
        playlist.add(track("b"));
        playlist.select(0);

        assert!(playlist.move_down(0));
        assert_eq!(playlist.current_index(), Some(1));
        assert!(playlist.move_up(1));
        assert_eq!(playlist.current_index(), Some(0));
        assert!(!playlist.move_up(0));
    }

    #[test]
    fn test_next_previous_clamped() {
        let mut playlist = Playlist::new();
        playlist.add(track("a"));
        playlist.add(track("b"));

        playlist.select(0);
        assert_eq!(playlist.previous_index(), None);
        assert_eq!(playlist.next_index(), Some(1));

        playlist.select(1);
        assert_eq!(playlist.next_index(), None);
        assert_eq!(playlist.previous_index(), Some(0));
    }

    #[test]
    fn test_other_paths_skips_current() {
        let mut playlist = Playlist::new();
        playlist.add(track("a"));
        playlist.add(track("b"));
        let others = playlist.other_paths(Path::new("/music/a.flac"));
        assert_eq!(others, vec![PathBuf::from("/music/b.flac")]);
    }
}
