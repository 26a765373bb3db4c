//! Terminal rendering and JSON snapshots of the simulated surface

use colored::*;
use serde::Serialize;

use super::{SimSelector, SimSong};
use crate::host::{SessionView, Song, SubModeSelector, ZoomOverview};
use crate::selector::Mode;
use crate::surface::{ButtonId, Surface};

/// Launchpad velocity → terminal color (red in bits 0-1, green in bits 4-5)
fn led(surface: &Surface, id: ButtonId, glyph: &str) -> ColoredString {
    let Some(button) = surface.button(id) else {
        return glyph.normal();
    };
    if !button.is_lit() {
        return glyph.dimmed();
    }

    let value = button.last_sent().unwrap_or(0);
    let red = value & 0x03;
    let green = (value >> 4) & 0x03;
    match (red > 0, green > 0) {
        (true, true) => glyph.yellow().bold(),
        (true, false) => glyph.red().bold(),
        (false, true) => glyph.green().bold(),
        (false, false) => glyph.white().bold(),
    }
}

/// Draw the top row, the 8x8 grid (clip slots as ■/□) and the side column
pub fn render(selector: &SimSelector, song: &SimSong) -> String {
    let surface = selector.surface();
    let session = selector.session_component();
    let mut out = String::new();

    out.push_str(&format!(
        "{} {}  {} {}  {} {}\n",
        "mode".dimmed(),
        selector.mode().to_string().cyan().bold(),
        "channel".dimmed(),
        selector.channel_for_current_mode().to_string().green(),
        "bank".dimmed(),
        format!("{}/{}", session.track_offset(), session.scene_offset()).white()
    ));

    out.push(' ');
    for id in surface.nav_buttons() {
        out.push_str(&format!(" {}", led(surface, *id, "▲")));
    }
    for id in surface.mode_buttons() {
        out.push_str(&format!(" {}", led(surface, *id, "●")));
    }
    out.push('\n');

    for row in 0..surface.height() {
        out.push(' ');
        for col in 0..surface.width() {
            let (track, scene) = session.slot_position(col, row);
            let glyph = if song.has_clip(track, scene) { "■" } else { "□" };
            out.push_str(&format!(" {}", led(surface, surface.matrix_button(col, row), glyph)));
        }
        out.push_str(&format!("  {}\n", led(surface, surface.side_buttons()[row], "▶")));
    }

    let mut flags = Vec::new();
    if selector.delete_armed() {
        flags.push("delete armed".red().to_string());
    }
    if selector.overview().is_zoomed() {
        flags.push("overview".yellow().to_string());
    }
    if let Some(sub_mode) = selector.sub_modes().mode() {
        flags.push(format!("sub-mode {}", sub_mode).blue().to_string());
    }
    if !flags.is_empty() {
        out.push_str(&format!("  {}\n", flags.join(" · ")));
    }

    out
}

/// Machine-readable selector state
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub channel: u8,
    pub sub_mode: Option<usize>,
    pub connected: bool,
    pub delete_armed: bool,
    pub overview_zoomed: bool,
    pub held_scene_buttons: usize,
    pub track_offset: usize,
    pub scene_offset: usize,
    pub selected_track: Option<usize>,
    pub fired_scenes: Vec<usize>,
    /// (track, scene, name) for every clip in the song
    pub clips: Vec<(usize, usize, String)>,
}

impl Snapshot {
    pub fn capture(selector: &SimSelector, song: &SimSong) -> Self {
        let session = selector.session_component();
        let mut clips = Vec::new();
        for track in 0..song.track_count() {
            for scene in 0..song.scene_count() {
                if let Some(clip) = song.clip(track, scene) {
                    clips.push((track, scene, clip.name.clone()));
                }
            }
        }

        Self {
            mode: selector.mode(),
            channel: selector.channel_for_current_mode(),
            sub_mode: selector.sub_modes().mode(),
            connected: selector.is_connected(),
            delete_armed: selector.delete_armed(),
            overview_zoomed: selector.overview().is_zoomed(),
            held_scene_buttons: selector.held_buttons(),
            track_offset: session.track_offset(),
            scene_offset: session.scene_offset(),
            selected_track: song.selected_track(),
            fired_scenes: song.fired_scenes().to_vec(),
            clips,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
