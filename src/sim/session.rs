//! Session grid, overview and mixer sub-modes for the simulator

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::host::{
    ClipSlotColors, OverviewColors, OverviewInput, SessionView, SubModeSelector, ZoomOverview,
};
use crate::surface::{Control, Surface, GRID_SIZE};

/// Session grid over a bank of the song
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimSession {
    tracks: usize,
    scenes: usize,
    track_offset: usize,
    scene_offset: usize,
    allow_update: bool,
    stop_leds_suppressed: bool,
    stop_clip_value: u8,
    stop_clip_triggered_value: u8,
    scene_names: HashMap<usize, String>,
    #[serde(skip)]
    slot_colors: HashMap<(usize, usize), ClipSlotColors>,
    /// (track, scene, value) for every launch button event
    launched: Vec<(usize, usize, u8)>,
    /// (track, value) for every stop button event
    stopped: Vec<(usize, u8)>,
    /// allow_update transitions, oldest first
    #[serde(skip)]
    update_log: Vec<bool>,
}

impl SimSession {
    /// Session over a song of `tracks` x `scenes`
    pub fn new(tracks: usize, scenes: usize) -> Self {
        Self {
            tracks,
            scenes,
            allow_update: true,
            ..Default::default()
        }
    }

    pub fn launched(&self) -> &[(usize, usize, u8)] {
        &self.launched
    }

    pub fn stopped(&self) -> &[(usize, u8)] {
        &self.stopped
    }

    pub fn allows_update(&self) -> bool {
        self.allow_update
    }

    pub fn update_log(&self) -> &[bool] {
        &self.update_log
    }

    pub fn stop_leds_suppressed(&self) -> bool {
        self.stop_leds_suppressed
    }

    pub fn scene_name(&self, scene: usize) -> Option<&str> {
        self.scene_names.get(&scene).map(String::as_str)
    }

    pub fn clip_slot_colors(&self, track: usize, scene: usize) -> Option<ClipSlotColors> {
        self.slot_colors.get(&(track, scene)).copied()
    }

    pub fn stop_clip_values(&self) -> (u8, u8) {
        (self.stop_clip_value, self.stop_clip_triggered_value)
    }

    fn clamp_offset(offset: isize, size: usize) -> usize {
        let max = size.saturating_sub(1);
        offset.clamp(0, max as isize) as usize
    }
}

impl SessionView for SimSession {
    fn set_allow_update(&mut self, allow: bool) {
        self.allow_update = allow;
        self.update_log.push(allow);
    }

    fn set_stop_clip_value(&mut self, value: u8) {
        self.stop_clip_value = value;
    }

    fn set_stop_clip_triggered_value(&mut self, value: u8) {
        self.stop_clip_triggered_value = value;
    }

    fn set_scene_triggered_value(&mut self, _scene: usize, _value: u8) {}

    fn set_scene_name(&mut self, scene: usize, name: String) {
        self.scene_names.insert(scene, name);
    }

    fn set_clip_slot_colors(&mut self, track: usize, scene: usize, colors: ClipSlotColors) {
        self.slot_colors.insert((track, scene), colors);
    }

    fn set_clip_slot_name(&mut self, _track: usize, _scene: usize, _name: String) {}

    fn set_stop_clip_leds_suppressed(&mut self, suppressed: bool) {
        self.stop_leds_suppressed = suppressed;
    }

    fn launch_clip(&mut self, track: usize, scene: usize, value: u8) {
        self.launched.push((track, scene, value));
    }

    fn stop_track_clips(&mut self, track: usize, value: u8) {
        self.stopped.push((track, value));
    }

    fn scroll_tracks(&mut self, delta: isize) {
        self.track_offset = Self::clamp_offset(self.track_offset as isize + delta, self.tracks);
        debug!("Track offset → {}", self.track_offset);
    }

    fn scroll_scenes(&mut self, delta: isize) {
        self.scene_offset = Self::clamp_offset(self.scene_offset as isize + delta, self.scenes);
        debug!("Scene offset → {}", self.scene_offset);
    }

    fn track_offset(&self) -> usize {
        self.track_offset
    }

    fn scene_offset(&self) -> usize {
        self.scene_offset
    }
}

/// Bank overview: each matrix cell is one 8x8 bank
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimOverview {
    engaged: bool,
    zoomed: bool,
    allow_update: bool,
    #[serde(skip)]
    colors: OverviewColors,
    refreshes: usize,
}

impl SimOverview {
    pub fn new() -> Self {
        Self {
            allow_update: true,
            ..Default::default()
        }
    }

    pub fn colors(&self) -> OverviewColors {
        self.colors
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl ZoomOverview for SimOverview {
    fn set_allow_update(&mut self, allow: bool) {
        self.allow_update = allow;
    }

    fn set_colors(&mut self, colors: OverviewColors) {
        self.colors = colors;
    }

    fn set_engaged(&mut self, engaged: bool) {
        self.engaged = engaged;
        if !engaged {
            self.zoomed = false;
        }
    }

    fn is_engaged(&self) -> bool {
        self.engaged
    }

    fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    fn handle(&mut self, input: OverviewInput, value: u8, session: &mut dyn SessionView) -> bool {
        if !self.engaged {
            return false;
        }

        let page = GRID_SIZE as isize;
        match input {
            OverviewInput::ZoomButton => {
                self.zoomed = value != 0;
                debug!("Overview {}", if self.zoomed { "shown" } else { "hidden" });
                true
            }
            _ if !self.zoomed => false,
            _ if value == 0 => true,
            OverviewInput::Matrix { col, row } => {
                session.scroll_tracks(col as isize * page - session.track_offset() as isize);
                session.scroll_scenes(row as isize * page - session.scene_offset() as isize);
                true
            }
            OverviewInput::SceneBank(row) => {
                session.scroll_scenes(row as isize * page - session.scene_offset() as isize);
                true
            }
            OverviewInput::Nav(index) => {
                match index {
                    0 => session.scroll_scenes(-page),
                    1 => session.scroll_scenes(page),
                    2 => session.scroll_tracks(-page),
                    _ => session.scroll_tracks(page),
                }
                true
            }
        }
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

/// Number of mixer sub-modes (volume, pan, send A, send B)
pub const MIXER_SUB_MODES: usize = 4;

/// Mixer sub-modes: side buttons 0-3 pick a sub-mode, matrix columns set levels
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimMixerModes {
    mode: Option<usize>,
    enabled: bool,
    /// Level 0-7 per sub-mode and track
    levels: [[u8; GRID_SIZE]; MIXER_SUB_MODES],
}

impl SimMixerModes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, sub_mode: usize, track: usize) -> Option<u8> {
        self.levels.get(sub_mode)?.get(track).copied()
    }

    fn paint(&self, surface: &mut Surface) {
        for (index, id) in surface.side_buttons().to_vec().into_iter().enumerate() {
            if let Some(button) = surface.button_mut(id) {
                if Some(index) == self.mode {
                    button.turn_on();
                } else {
                    button.turn_off();
                }
            }
        }

        let Some(mode) = self.mode else {
            return;
        };
        for col in 0..GRID_SIZE {
            let level = self.levels[mode][col] as usize;
            for row in 0..GRID_SIZE {
                let id = surface.matrix_button(col, row);
                if let Some(button) = surface.button_mut(id) {
                    if GRID_SIZE - row <= level {
                        button.turn_on();
                    } else {
                        button.turn_off();
                    }
                }
            }
        }
    }
}

impl SubModeSelector for SimMixerModes {
    fn set_mode(&mut self, mode: Option<usize>) {
        self.mode = mode.filter(|m| *m < MIXER_SUB_MODES);
    }

    fn mode(&self) -> Option<usize> {
        self.mode
    }

    fn mode_count(&self) -> usize {
        MIXER_SUB_MODES
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn handle(&mut self, control: Control, value: u8, surface: &mut Surface) -> bool {
        if !self.enabled {
            return false;
        }

        match control {
            Control::Side(index) if index < MIXER_SUB_MODES => {
                if value != 0 {
                    self.set_mode(Some(index));
                    self.paint(surface);
                }
                true
            }
            Control::Matrix { col, row } => {
                let Some(mode) = self.mode else {
                    return false;
                };
                if value != 0 {
                    self.levels[mode][col] = (GRID_SIZE - row) as u8;
                    self.paint(surface);
                }
                true
            }
            _ => false,
        }
    }
}
