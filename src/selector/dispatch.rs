//! Hardware event routing through the active binding table

use tracing::{trace, warn};

use super::bindings::{overview_input, Binding};
use super::mode::ActiveMode;
use crate::host::{OverviewInput, SessionView, Song, SubModeSelector, ZoomOverview};
use crate::surface::{ButtonEvent, Control};

/// What happened to a hardware event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A binding of the active mode handled it
    Handled,
    /// The mixer sub-mode selector consumed it
    Forwarded,
    /// Nothing in this mode owns the button; an external layer may take it
    Released(Control),
    /// Selector disabled, disconnected, or the button is unknown
    Ignored,
}

impl<V, Z, M> super::ModeSelector<V, Z, M>
where
    V: SessionView,
    Z: ZoomOverview,
    M: SubModeSelector,
{
    /// Process one hardware event to completion
    pub fn handle_event(&mut self, event: ButtonEvent, song: &mut dyn Song) -> Dispatch {
        if !self.connected || !self.enabled {
            trace!("Dropping event for {:?}: selector inactive", event.button);
            return Dispatch::Ignored;
        }

        let Some(control) = self.surface.resolve(event.button) else {
            warn!("Event from unknown button {:?}", event.button);
            return Dispatch::Ignored;
        };

        trace!("{:?} value={} in {}", control, event.value, self.mode());

        let outcome = self.route(control, event, song);

        // A released button is never left in the press table, whatever mode handled it
        if !event.is_press() {
            self.gestures.forget(event.button);
        }

        outcome
    }

    fn route(&mut self, control: Control, event: ButtonEvent, song: &mut dyn Song) -> Dispatch {
        // A new press clears any leftover entry whose release never came
        let overview_owned = self.overview_presses.remove(&event.button) && !event.is_press();

        if self.mode == ActiveMode::Session && self.zoom.is_zoomed() {
            if let Some(input) = overview_input(control) {
                if self.zoom.handle(input, event.value, &mut self.session) {
                    if event.is_press() {
                        self.overview_presses.insert(event.button);
                    }
                    return Dispatch::Handled;
                }
            }
        }

        // The overview took the press, so the release belongs to it even after un-zooming
        if overview_owned {
            trace!("Dropping release of {:?}, pressed in the overview", control);
            return Dispatch::Handled;
        }

        let enabled = self
            .surface
            .button(event.button)
            .is_some_and(|button| button.is_enabled());
        if !enabled {
            return Dispatch::Released(control);
        }

        let bindings = self.bindings.for_mode(self.mode).get(event.button).to_vec();
        if bindings.is_empty() {
            return Dispatch::Released(control);
        }

        let mut outcome = Dispatch::Handled;
        for binding in bindings {
            match binding {
                Binding::SelectMode(index) => {
                    if event.is_press() {
                        self.set_mode_index(index);
                    }
                }
                Binding::ZoomButton => {
                    self.zoom
                        .handle(OverviewInput::ZoomButton, event.value, &mut self.session);
                }
                Binding::MatrixPress { col, row } => {
                    if event.is_press() {
                        self.on_matrix_pressed(col, row, song);
                    }
                }
                Binding::LaunchClip { track, scene } => {
                    self.session.launch_clip(track, scene, event.value);
                }
                Binding::StopTrack(track) => {
                    self.session.stop_track_clips(track, event.value);
                }
                Binding::SceneGesture(scene) => {
                    self.on_scene_button(scene, event, song);
                }
                Binding::ArmDelete => {
                    if event.is_press() {
                        self.arm_delete();
                    }
                }
                Binding::TrackBank(delta) => {
                    if event.is_press() {
                        self.session.scroll_tracks(delta);
                    }
                }
                Binding::SceneBank(delta) => {
                    if event.is_press() {
                        self.session.scroll_scenes(delta);
                    }
                }
                Binding::SubMode => {
                    outcome = self.forward_to_sub_modes(control, event.value);
                }
            }
        }

        outcome
    }

    /// Let the mixer sub-modes handle a button and follow any sub-mode change
    fn forward_to_sub_modes(&mut self, control: Control, value: u8) -> Dispatch {
        let before = self.sub_modes.mode();
        let consumed = self.sub_modes.handle(control, value, &mut self.surface);
        if self.sub_modes.mode() != before {
            self.update_control_channels();
        }

        if consumed {
            Dispatch::Forwarded
        } else {
            Dispatch::Released(control)
        }
    }
}
