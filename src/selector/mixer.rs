//! Mixer and user mode setup

use tracing::{debug, warn};

use crate::host::{SessionView, SubModeSelector, ZoomOverview};

impl<V, Z, M> super::ModeSelector<V, Z, M>
where
    V: SessionView,
    Z: ZoomOverview,
    M: SubModeSelector,
{
    /// Hand the grid to the mixer sub-modes, or take it back
    pub(crate) fn setup_mixer(&mut self, active: bool) {
        if active && self.sub_modes.is_enabled() {
            // Clear the previous sub-mode before the selector rebinds
            self.sub_modes.set_mode(None);
        }
        self.sub_modes.set_enabled(active);
    }

    /// Blank the grid so an external assignment layer can claim it.
    ///
    /// With `release_buttons` the buttons are also disabled and the host is
    /// told to switch to its user layout.
    pub(crate) fn setup_user(&mut self, release_buttons: bool) {
        let palette = self.config.palette;
        let routed = self.surface.routed_buttons();
        self.surface.for_each(&routed, |button| {
            button.set_on_off_values(palette.full, palette.led_off);
            button.turn_off();
            button.set_enabled(!release_buttons);
        });

        let config_button = self.surface.config_button();
        let values = self.config.config_button.clone();
        if let Some(button) = self.surface.button_mut(config_button) {
            if release_buttons {
                button.send_value(values.user_layout_value, false);
            }
            button.send_value(values.user_value, true);
        }

        if release_buttons {
            warn!("User mode releasing grid buttons (user_mode.release_buttons is set)");
        } else {
            debug!("User mode: grid blanked, buttons stay enabled");
        }
    }
}
