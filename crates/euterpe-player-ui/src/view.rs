//! View-update interface implemented by the toolkit layer.

/// Icon shown on the play/pause button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

/// How the user moved the seek bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekGesture {
    /// Click or drag to an absolute position.
    Jump,
    /// Incremental steps (keyboard, scroll wheel).
    Step,
}

/// Widget updates driven by the panel.
pub trait PanelView {
    /// Seek bar position in `[0, 1]`.
    fn set_progress(&mut self, value: f64);
    fn set_time_labels(&mut self, elapsed: &str, remaining: &str);
    fn set_track_labels(&mut self, title: &str, artist: &str);
    fn set_seek_enabled(&mut self, enabled: bool);
    fn set_play_pause_enabled(&mut self, enabled: bool);
    fn set_next_enabled(&mut self, enabled: bool);
    fn set_previous_enabled(&mut self, enabled: bool);
    fn set_play_icon(&mut self, icon: PlayIcon);
    /// Replace the rendered playlist rows.
    fn set_playlist(&mut self, rows: &[String]);
    /// Highlight the row at `index`, or none.
    fn set_current_row(&mut self, index: Option<usize>);
}
