//! Playlist rows shown under the player controls.

use crate::format::{format_duration, track_secs};
use crate::player::TrackInfo;

/// Render-ready playlist state.
#[derive(Debug, Default)]
pub struct EntryList {
    entries: Vec<TrackInfo>,
    current: Option<usize>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all rows and the current marker.
    pub fn truncate(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    pub fn add(&mut self, track: TrackInfo) {
        self.entries.push(track);
    }

    /// Mark the playing row. Out-of-range indices clear the marker.
    pub fn set_currently_playing(&mut self, index: Option<usize>) {
        self.current = index.filter(|i| *i < self.entries.len());
    }

    pub fn currently_playing(&self) -> Option<usize> {
        self.current
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, track)| entry_label(i, track))
            .collect()
    }
}

fn entry_label(index: usize, track: &TrackInfo) -> String {
    let title = track.title.as_deref().unwrap_or("n/a");
    let artist = track.artist.as_deref().unwrap_or("n/a");
    match track.duration {
        Some(len) => format!(
            "{:>2}. {artist} - {title}  [{}]",
            index + 1,
            format_duration(track_secs(len))
        ),
        None => format!("{:>2}. {artist} - {title}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn track(title: &str, secs: Option<u64>) -> TrackInfo {
        TrackInfo {
            title: Some(title.to_string()),
            artist: Some("Nick Drake".to_string()),
            duration: secs.map(Duration::from_secs),
        }
    }

    #[test]
    fn labels_include_position_and_duration() {
        let mut list = EntryList::new();
        list.add(track("Pink Moon", Some(125)));
        list.add(track("Road", None));

        assert_eq!(
            list.labels(),
            vec![
                " 1. Nick Drake - Pink Moon  [02:05]".to_string(),
                " 2. Nick Drake - Road".to_string(),
            ]
        );
    }

    #[test]
    fn fractional_length_rounds_up_like_the_countdown() {
        let mut list = EntryList::new();
        list.add(TrackInfo {
            duration: Some(Duration::from_millis(125_400)),
            ..track("Pink Moon", None)
        });
        assert_eq!(list.labels(), vec![" 1. Nick Drake - Pink Moon  [02:06]".to_string()]);
    }

    #[test]
    fn missing_metadata_uses_placeholder() {
        let mut list = EntryList::new();
        list.add(TrackInfo::default());
        assert_eq!(list.labels(), vec![" 1. n/a - n/a".to_string()]);
    }

    #[test]
    fn truncate_clears_rows_and_marker() {
        let mut list = EntryList::new();
        list.add(track("Pink Moon", None));
        list.set_currently_playing(Some(0));

        list.truncate();

        assert!(list.is_empty());
        assert_eq!(list.currently_playing(), None);
    }

    #[test]
    fn out_of_range_marker_is_ignored() {
        let mut list = EntryList::new();
        list.add(track("Pink Moon", None));
        list.set_currently_playing(Some(3));
        assert_eq!(list.currently_playing(), None);
        list.set_currently_playing(Some(0));
        assert_eq!(list.currently_playing(), Some(0));
    }
}
