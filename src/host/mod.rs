//! Collaborator interfaces the mode selector drives
//!
//! The host's track/scene model, the session grid, the zoomed overview and the
//! mixer sub-mode selector all live outside this crate. These traits are the
//! boundary: the selector calls them, never the other way around.

use thiserror::Error;

use crate::surface::{Control, Surface};

/// Errors reported by the host when a clip operation cannot be carried out
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("no clip slot at track {track}, scene {scene}")]
    NoSuchSlot { track: usize, scene: usize },
    #[error("host rejected the operation: {0}")]
    Rejected(String),
}

/// Track/scene model of the host (consulted, not owned)
pub trait Song {
    fn track_count(&self) -> usize;
    fn scene_count(&self) -> usize;

    fn selected_track(&self) -> Option<usize>;
    fn select_track(&mut self, track: usize);

    fn fire_scene(&mut self, scene: usize);

    /// Whether a slot exists at the given absolute position
    fn has_slot(&self, track: usize, scene: usize) -> bool {
        track < self.track_count() && scene < self.scene_count()
    }

    fn has_clip(&self, track: usize, scene: usize) -> bool;
    fn delete_clip(&mut self, track: usize, scene: usize) -> Result<(), HostError>;

    /// Copy the clip at `from_scene` into `to_scene` on the same track
    fn duplicate_clip(
        &mut self,
        track: usize,
        from_scene: usize,
        to_scene: usize,
    ) -> Result<(), HostError>;
}

/// LED values a clip slot uses for its states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipSlotColors {
    pub triggered_to_play: u8,
    pub triggered_to_record: u8,
    pub stopped: u8,
    pub started: u8,
    pub recording: u8,
}

/// The 8x8 session grid mapped onto a bank of the song
pub trait SessionView {
    /// Suspend or resume LED redraws while the surface is being rewired
    fn set_allow_update(&mut self, allow: bool);

    fn set_stop_clip_value(&mut self, value: u8);
    fn set_stop_clip_triggered_value(&mut self, value: u8);
    fn set_scene_triggered_value(&mut self, scene: usize, value: u8);
    fn set_scene_name(&mut self, scene: usize, name: String);
    fn set_clip_slot_colors(&mut self, track: usize, scene: usize, colors: ClipSlotColors);
    fn set_clip_slot_name(&mut self, track: usize, scene: usize, name: String);

    /// Stop buttons render no colors while the bottom row doubles as stop row
    fn set_stop_clip_leds_suppressed(&mut self, suppressed: bool);

    fn launch_clip(&mut self, track: usize, scene: usize, value: u8);
    fn stop_track_clips(&mut self, track: usize, value: u8);

    fn scroll_tracks(&mut self, delta: isize);
    fn scroll_scenes(&mut self, delta: isize);

    fn track_offset(&self) -> usize;
    fn scene_offset(&self) -> usize;

    /// Absolute song position of a grid cell
    fn slot_position(&self, track: usize, scene: usize) -> (usize, usize) {
        (self.track_offset() + track, self.scene_offset() + scene)
    }
}

/// Input the zoomed overview can consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewInput {
    ZoomButton,
    Matrix { col: usize, row: usize },
    SceneBank(usize),
    Nav(usize),
}

/// LED values the overview uses for bank cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverviewColors {
    pub empty: u8,
    pub stopped: u8,
    pub selected: u8,
    pub playing: u8,
}

/// Bank overview reached by holding the zoom button in session mode
pub trait ZoomOverview {
    fn set_allow_update(&mut self, allow: bool);
    fn set_colors(&mut self, colors: OverviewColors);

    /// Attach or detach the overview from the hardware
    fn set_engaged(&mut self, engaged: bool);
    fn is_engaged(&self) -> bool;

    /// Whether the overview currently owns the matrix
    fn is_zoomed(&self) -> bool;

    /// Returns true when the input was consumed
    fn handle(&mut self, input: OverviewInput, value: u8, session: &mut dyn SessionView) -> bool;

    fn refresh(&mut self);
}

/// Mixer sub-mode selector (volume, pan, sends...)
pub trait SubModeSelector {
    /// `None` leaves the selector waiting for a sub-mode choice
    fn set_mode(&mut self, mode: Option<usize>);
    fn mode(&self) -> Option<usize>;
    fn mode_count(&self) -> usize;

    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;

    /// Handle a matrix or side button while mixer mode owns them.
    /// Returns true when the input was consumed.
    fn handle(&mut self, control: Control, value: u8, surface: &mut Surface) -> bool;
}
