//! Session mode: clip launching, scene gestures and the delete gesture

use tracing::{debug, info, warn};

use super::bindings::{DELETE_BUTTON, STOP_ROW};
use super::gesture::Gesture;
use crate::host::{ClipSlotColors, OverviewColors, SessionView, Song, SubModeSelector, ZoomOverview};
use crate::surface::{ButtonEvent, GRID_SIZE};

impl<V, Z, M> super::ModeSelector<V, Z, M>
where
    V: SessionView,
    Z: ZoomOverview,
    M: SubModeSelector,
{
    /// Seed the session grid and overview with names and colors
    pub(crate) fn init_session(&mut self) {
        let palette = self.config.palette;

        self.session.set_stop_clip_value(palette.amber_third);
        self.session.set_stop_clip_triggered_value(palette.amber_blink);

        let colors = ClipSlotColors {
            triggered_to_play: palette.green_blink,
            triggered_to_record: palette.red_blink,
            stopped: palette.amber_full,
            started: palette.green_full,
            recording: palette.red_full,
        };
        for scene in 0..self.surface.height() {
            self.session.set_scene_triggered_value(scene, palette.green_blink);
            self.session.set_scene_name(scene, format!("Scene_{}", scene));
            for track in 0..self.surface.width() {
                self.session.set_clip_slot_colors(track, scene, colors);
                self.session
                    .set_clip_slot_name(track, scene, format!("{}_Clip_Slot_{}", track, scene));
            }
        }

        self.zoom.set_colors(OverviewColors {
            empty: palette.led_off,
            stopped: palette.red_full,
            selected: palette.amber_full,
            playing: palette.green_full,
        });
    }

    /// Attach or detach the session grid.
    ///
    /// `active` hands the matrix and side buttons to the session; `enabled`
    /// keeps the bank buttons live (session and mixer modes).
    pub(crate) fn setup_session(&mut self, active: bool, enabled: bool) {
        let palette = self.config.palette;

        // The bottom row serves as stop buttons while the session is active
        self.session.set_stop_clip_leds_suppressed(active);

        let nav = self.surface.nav_buttons().to_vec();
        self.surface.for_each(&nav, |button| {
            if enabled {
                button.set_on_off_values(palette.green_full, palette.green_third);
            } else {
                button.set_on_off_values(palette.full, palette.led_off);
            }
        });

        if active {
            let side = self.surface.side_buttons().to_vec();
            for (index, id) in side.iter().enumerate() {
                let Some(button) = self.surface.button_mut(*id) else {
                    continue;
                };
                if index == DELETE_BUTTON {
                    button.set_on_off_values(palette.red_full, palette.red_full);
                    button.turn_on();
                } else {
                    button.set_on_off_values(palette.full, palette.led_off);
                }
            }

            for row in 0..self.surface.height() {
                for col in 0..self.surface.width() {
                    let id = self.surface.matrix_button(col, row);
                    let Some(button) = self.surface.button_mut(id) else {
                        continue;
                    };
                    if row == STOP_ROW {
                        button.turn_off();
                    } else {
                        button.set_on_off_values(palette.full, palette.led_off);
                    }
                }
            }

            self.zoom.set_engaged(true);
            self.zoom.refresh();
        } else {
            self.zoom.set_engaged(false);
            if self.delete_armed {
                debug!("Leaving session mode, delete disarmed");
                self.delete_armed = false;
            }
        }
    }

    /// Matrix press: select the column's track, then consume an armed delete
    pub(crate) fn on_matrix_pressed(&mut self, col: usize, row: usize, song: &mut dyn Song) {
        if col < song.track_count() {
            song.select_track(col);
        }

        if self.delete_armed {
            self.delete_clip(col, row, song);
            self.delete_armed = false;
        }
    }

    /// Arm delete mode; the next matrix press deletes its clip
    pub(crate) fn arm_delete(&mut self) {
        self.delete_armed = true;
        debug!("🗑️  Delete armed");
    }

    /// Delete the clip at an absolute song position, if there is one
    pub(crate) fn delete_clip(&mut self, track: usize, scene: usize, song: &mut dyn Song) {
        if !song.has_slot(track, scene) {
            debug!("No slot at track {} scene {}, nothing to delete", track, scene);
            return;
        }
        if !song.has_clip(track, scene) {
            return;
        }

        match song.delete_clip(track, scene) {
            Ok(()) => info!("Deleted clip at track {} scene {}", track, scene),
            Err(e) => warn!("Failed to delete clip at track {} scene {}: {}", track, scene, e),
        }
    }

    /// Scene button: record presses, classify releases
    pub(crate) fn on_scene_button(&mut self, scene: usize, event: ButtonEvent, song: &mut dyn Song) {
        if event.is_press() {
            self.gestures.press(event.button, event.timestamp);
            return;
        }

        match self.gestures.release(event.button, event.timestamp) {
            Gesture::Tap => {
                if scene < song.scene_count() {
                    debug!("Scene {} tapped → fire", scene);
                    song.fire_scene(scene);
                }
            }
            Gesture::Hold => {
                debug!("Scene {} held → duplicate row", scene);
                self.duplicate_row(scene, song);
            }
        }
    }

    /// Copy every clip of a grid row into the row below.
    ///
    /// Best effort per column: a column the host rejects is logged and
    /// skipped, columns already copied stay copied.
    pub(crate) fn duplicate_row(&mut self, source_row: usize, song: &mut dyn Song) {
        let target_row = source_row + 1;
        if target_row >= GRID_SIZE {
            debug!("Row {} is the last row, nothing to duplicate into", source_row);
            return;
        }

        let mut copied = 0;
        for col in 0..self.surface.width() {
            let (track, source_scene) = self.session.slot_position(col, source_row);
            let (_, target_scene) = self.session.slot_position(col, target_row);

            if !song.has_slot(track, source_scene) || !song.has_slot(track, target_scene) {
                continue;
            }
            if !song.has_clip(track, source_scene) {
                continue;
            }

            if song.has_clip(track, target_scene) {
                if let Err(e) = song.delete_clip(track, target_scene) {
                    warn!(
                        "Could not clear track {} scene {} before duplicating: {}",
                        track, target_scene, e
                    );
                    continue;
                }
            }

            match song.duplicate_clip(track, source_scene, target_scene) {
                Ok(()) => copied += 1,
                Err(e) => warn!(
                    "Failed to duplicate track {} scene {} → {}: {}",
                    track, source_scene, target_scene, e
                ),
            }
        }

        info!(
            "Duplicated row {} → {} ({} clip(s))",
            source_row, target_row, copied
        );
    }
}
