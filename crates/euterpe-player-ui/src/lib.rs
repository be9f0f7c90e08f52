//! "Now playing" panel glue.
//!
//! The panel relays notifications from a [`Player`] into a [`PanelView`]
//! and forwards user gestures back to the player. Widget construction and
//! layout belong to whatever toolkit implements the view.

pub mod entry_list;
pub mod format;
pub mod panel;
pub mod player;
pub mod view;

pub use entry_list::EntryList;
pub use format::{format_duration, progress_labels, track_secs};
pub use panel::{PanelSignal, PlayerPanel};
pub use player::{Player, PlayerEvent, TrackInfo};
pub use view::{PanelView, PlayIcon, SeekGesture};
