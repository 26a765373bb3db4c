//! In-memory host used by the simulator binary and the tests
//!
//! Stands in for the host application: a song of clips, a session grid
//! that scrolls over it, a bank overview and four mixer sub-modes.

mod render;
mod session;
mod song;

pub use render::{render, Snapshot};
pub use session::{SimMixerModes, SimOverview, SimSession, MIXER_SUB_MODES};
pub use song::{SimClip, SimSong};

use crate::selector::ModeSelector;

/// Selector wired to the in-memory host
pub type SimSelector = ModeSelector<SimSession, SimOverview, SimMixerModes>;
