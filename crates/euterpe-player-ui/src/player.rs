//! Capability contract the panel consumes from a player.

use std::time::Duration;

use tokio::sync::broadcast;

/// Notifications a player publishes to its observers.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// Play/pause/active/ended state changed.
    StateChanged,
    /// Playback position as a fraction of the track length.
    Progress(f64),
    /// A different track became current.
    TrackChanged,
    /// The playlist was replaced or edited.
    PlaylistChanged,
}

/// Metadata for one track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration: Option<Duration>,
}

pub trait Player: Send + Sync {
    /// Subscribe to this player's notifications.
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;
    fn is_active(&self) -> bool;
    fn is_playing(&self) -> bool;
    fn has_ended(&self) -> bool;
    fn has_next(&self) -> bool;
    fn has_previous(&self) -> bool;
    fn playlist(&self) -> Vec<TrackInfo>;
    /// Current track, if any.
    fn track_info(&self) -> Option<TrackInfo>;
    /// Position of the current track in the playlist.
    fn track_index(&self) -> Option<usize>;
    /// Jump to a position given as a fraction of the track length.
    fn seek(&self, position: f64);
    fn play_index(&self, index: usize);
}
