//! Player panel: relays player state into the view and gestures back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::entry_list::EntryList;
use crate::format::{UNKNOWN_TIME, clamp_progress, progress_labels};
use crate::player::{Player, PlayerEvent};
use crate::view::{PanelView, PlayIcon, SeekGesture};

const NOT_PLAYING: &str = "Not Playing";
const NO_ARTIST: &str = "--";
const MISSING_TAG: &str = "n/a";

/// Signals the panel emits to its container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelSignal {
    /// The user asked to collapse the panel.
    PanDown,
}

pub struct PlayerPanel<V: PanelView> {
    view: V,
    player: Option<Arc<dyn Player>>,
    events: Option<broadcast::Receiver<PlayerEvent>>,
    track_len: Option<Duration>,
    entries: EntryList,
    signals: broadcast::Sender<PanelSignal>,
}

impl<V: PanelView> PlayerPanel<V> {
    pub fn new(view: V) -> Self {
        let (signals, _) = broadcast::channel(16);
        Self {
            view,
            player: None,
            events: None,
            track_len: None,
            entries: EntryList::new(),
            signals,
        }
    }

    /// Attach a player and start listening to its notifications.
    ///
    /// Events from a previously attached player are dropped with its
    /// subscription.
    pub fn set_player(&mut self, player: Arc<dyn Player>) {
        self.events = Some(player.subscribe());
        self.player = Some(player);
    }

    /// Apply every pending player notification. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let Some(events) = self.events.as_mut() else {
                return handled;
            };
            match events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => return handled,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "player events lagged; resyncing panel");
                    self.resync();
                }
                Err(TryRecvError::Closed) => {
                    tracing::debug!("player event channel closed");
                    self.events = None;
                    return handled;
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::StateChanged => self.on_state_changed(),
            PlayerEvent::Progress(progress) => self.change_progress(progress),
            PlayerEvent::TrackChanged => self.on_track_changed(),
            PlayerEvent::PlaylistChanged => self.on_playlist_changed(),
        }
    }

    /// Move the seek bar and refresh the time labels.
    pub fn change_progress(&mut self, progress: f64) {
        let progress = clamp_progress(progress);
        self.view.set_progress(progress);
        match self.track_len {
            Some(len) => {
                let (elapsed, remaining) = progress_labels(len, progress);
                self.view.set_time_labels(&elapsed, &remaining);
            }
            None => self.view.set_time_labels(UNKNOWN_TIME, UNKNOWN_TIME),
        }
    }

    pub fn on_state_changed(&mut self) {
        let Some(player) = self.player.clone() else {
            return;
        };

        if player.is_active() {
            self.view.set_seek_enabled(true);
            self.view.set_play_pause_enabled(true);
            self.view.set_next_enabled(player.has_next());
            self.view.set_previous_enabled(player.has_previous());
        }

        let icon = if player.is_playing() {
            PlayIcon::Pause
        } else {
            PlayIcon::Play
        };
        self.view.set_play_icon(icon);

        if player.has_ended() {
            self.show_nothing_playing();
            self.change_progress(0.0);
        }
    }

    pub fn on_playlist_changed(&mut self) {
        let Some(player) = self.player.clone() else {
            return;
        };
        self.entries.truncate();
        for track in player.playlist() {
            self.entries.add(track);
        }
        self.entries.set_currently_playing(player.track_index());
        self.view.set_playlist(&self.entries.labels());
        self.view.set_current_row(self.entries.currently_playing());
    }

    pub fn show_nothing_playing(&mut self) {
        self.view.set_track_labels(NOT_PLAYING, NO_ARTIST);
        self.view.set_seek_enabled(false);
        self.track_len = None;
    }

    pub fn on_track_changed(&mut self) {
        let Some(player) = self.player.clone() else {
            return;
        };
        let Some(track) = player.track_info() else {
            return;
        };

        self.view.set_track_labels(
            track.title.as_deref().unwrap_or(MISSING_TAG),
            track.artist.as_deref().unwrap_or(MISSING_TAG),
        );
        self.track_len = track.duration;

        self.entries.set_currently_playing(player.track_index());
        self.view.set_current_row(self.entries.currently_playing());
    }

    /// Seek bar gesture. Only absolute jumps reach the player.
    ///
    /// Always returns `false` so the toolkit still moves the slider.
    pub fn on_seek(&self, gesture: SeekGesture, value: f64) -> bool {
        if gesture != SeekGesture::Jump {
            return false;
        }
        if let Some(player) = self.player.as_ref() {
            player.seek(clamp_progress(value));
        }
        false
    }

    /// A playlist row was activated.
    pub fn on_track_clicked(&self, index: usize) {
        match self.player.as_ref() {
            Some(player) => player.play_index(index),
            None => tracing::warn!(index, "track clicked without a player"),
        }
    }

    pub fn on_pan_down(&self) {
        let _ = self.signals.send(PanelSignal::PanDown);
    }

    /// Subscribe to panel signals such as [`PanelSignal::PanDown`].
    pub fn subscribe(&self) -> broadcast::Receiver<PanelSignal> {
        self.signals.subscribe()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    /// Current track length, when known.
    pub fn track_len(&self) -> Option<Duration> {
        self.track_len
    }

    fn resync(&mut self) {
        self.on_playlist_changed();
        self.on_track_changed();
        self.on_state_changed();
    }
}
