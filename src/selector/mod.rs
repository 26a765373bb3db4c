//! Mode selector - decides which function owns the grid
//!
//! The ModeSelector is the central state machine that manages:
//! - Mode switching between session, mixer and user modes (User 1 aliases mixer volume)
//! - Selecting the binding table that routes button events for the active mode
//! - Routing channel broadcast to every owned button
//! - Scene button tap/hold gestures and the two-step delete gesture
//! - Teardown of all bindings and LEDs on disconnect

mod bindings;
mod channel;
mod dispatch;
mod gesture;
mod mixer;
mod mode;
mod session;

pub use bindings::{Binding, BindingTable, DELETE_BUTTON, STOP_ROW};
pub use channel::{channel, CHANNEL_OFFSET};
pub use dispatch::Dispatch;
pub use gesture::{Gesture, GestureTracker, DEFAULT_HOLD_THRESHOLD};
pub use mode::{ActiveMode, Mode, VOLUME_SUB_MODE};


use crate::config::{ConfigChange, SelectorConfig};
use crate::host::{SessionView, SubModeSelector, ZoomOverview};
use crate::surface::{ButtonId, LayoutError, Surface, SurfaceShape};
use bindings::ModeBindings;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Owns the surface and routes it between session, mixer and user modes
pub struct ModeSelector<V, Z, M> {
    /// Every button on the hardware
    pub(crate) surface: Surface,
    /// Session grid
    pub(crate) session: V,
    /// Bank overview (zoom)
    pub(crate) zoom: Z,
    /// Mixer sub-modes
    pub(crate) sub_modes: M,
    pub(crate) config: SelectorConfig,
    /// Binding tables, built once
    pub(crate) bindings: ModeBindings,
    /// Steady mode owning the hardware
    pub(crate) mode: ActiveMode,
    /// Sub-mode to force once the mixer is set up (User 1 alias)
    pub(crate) pending_sub_mode: Option<usize>,
    /// Scene button press timestamps
    pub(crate) gestures: GestureTracker,
    /// Buttons whose press went to the zoomed overview
    pub(crate) overview_presses: HashSet<ButtonId>,
    /// Armed by the delete button, consumed by the next matrix press
    pub(crate) delete_armed: bool,
    pub(crate) enabled: bool,
    pub(crate) connected: bool,
}

impl<V, Z, M> ModeSelector<V, Z, M>
where
    V: SessionView,
    Z: ZoomOverview,
    M: SubModeSelector,
{
    /// Bind the selector to hardware of the given shape.
    ///
    /// Any shape other than an 8x8 matrix with 8 top and 8 side buttons is
    /// rejected; the selector cannot exist in a malformed configuration.
    pub fn new(
        shape: SurfaceShape,
        session: V,
        zoom: Z,
        sub_modes: M,
        config: SelectorConfig,
    ) -> Result<Self, LayoutError> {
        let surface = Surface::new(shape)?;
        let bindings = ModeBindings::build(&surface);
        let gestures = GestureTracker::new(config.gesture.hold_threshold());

        let mut selector = Self {
            surface,
            session,
            zoom,
            sub_modes,
            config,
            bindings,
            mode: ActiveMode::Session,
            pending_sub_mode: None,
            gestures,
            overview_presses: HashSet::new(),
            delete_armed: false,
            enabled: true,
            connected: true,
        };

        selector.apply_palette();
        selector.init_session();
        selector.update();

        info!(
            "✅ Mode selector ready ({} buttons, hold threshold {:?})",
            selector.surface.buttons().len(),
            selector.gestures.threshold()
        );
        Ok(selector)
    }

    pub fn number_of_modes(&self) -> usize {
        Mode::COUNT
    }

    /// Observable mode (never User 1)
    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn active_mode(&self) -> ActiveMode {
        self.mode
    }

    /// Switch modes.
    ///
    /// Re-selecting the current mode does nothing, except for the mixer which
    /// always re-runs its setup. User 1 selects the mixer with the volume
    /// sub-mode.
    pub fn set_mode(&mut self, mode: Mode) {
        if !self.connected {
            debug!("Ignoring set_mode({}) after disconnect", mode);
            return;
        }

        let (target, forced_sub_mode) = mode.resolve();
        if target == self.mode && target != ActiveMode::Mixer {
            debug!("Mode {} already active", mode);
            return;
        }

        if mode == Mode::User1 {
            debug!("User 1 selected → mixer (volume)");
        }

        self.mode = target;
        if let Some(sub_mode) = forced_sub_mode {
            self.sub_modes.set_mode(Some(sub_mode));
            self.pending_sub_mode = Some(sub_mode);
        }
        self.update();
        info!("Active mode: {}", self.mode());
    }

    /// Switch modes by mode-button index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below `number_of_modes()`.
    pub fn set_mode_index(&mut self, index: usize) {
        let mode = Mode::from_index(index).unwrap_or_else(|| {
            panic!("mode index {} out of range (0..{})", index, Mode::COUNT)
        });
        self.set_mode(mode);
    }

    /// Rewire the whole surface for the active mode
    pub fn update(&mut self) {
        if !self.enabled || !self.connected {
            return;
        }

        let active_index = self.mode.index();
        let mode_buttons = self.surface.mode_buttons().to_vec();
        for (index, id) in mode_buttons.iter().enumerate() {
            if let Some(button) = self.surface.button_mut(*id) {
                button.set_force_next_value();
                if index == active_index {
                    button.turn_on();
                } else {
                    button.turn_off();
                }
            }
        }

        let routed = self.surface.routed_buttons();
        self.surface.for_each(&routed, |button| button.set_enabled(true));

        self.session.set_allow_update(false);
        self.zoom.set_allow_update(false);

        let config_button = self.surface.config_button();
        let context_values = self.config.config_button.context_values.clone();
        if let Some(button) = self.surface.button_mut(config_button) {
            for value in context_values {
                button.send_value(value, false);
            }
        }

        match self.mode {
            ActiveMode::Session => {
                self.setup_mixer(false);
                self.setup_session(true, true);
            }
            ActiveMode::User2 => {
                self.setup_session(false, false);
                self.setup_mixer(false);
                self.setup_user(self.config.user_mode.release_buttons);
            }
            ActiveMode::Mixer => {
                self.setup_session(false, true);
                self.setup_mixer(true);
                if let Some(sub_mode) = self.pending_sub_mode.take() {
                    self.sub_modes.set_mode(Some(sub_mode));
                }
            }
        }

        self.session.set_allow_update(true);
        self.zoom.set_allow_update(true);
        self.update_control_channels();

        debug!(
            "🔄 Surface rewired for {} (channel {})",
            self.mode(),
            self.channel_for_current_mode()
        );
    }

    /// Enable or disable the selector. Disabled selectors ignore events.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.update();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Apply a reloaded configuration.
    ///
    /// A threshold-only change takes effect on the next release without
    /// touching the surface; anything visual rewires it.
    pub fn reconfigure(&mut self, config: SelectorConfig) {
        let change = ConfigChange::between(&self.config, &config);
        if change.is_empty() {
            debug!("Reloaded configuration is unchanged");
            return;
        }

        self.config = config;
        if change.gesture {
            self.gestures.set_threshold(self.config.gesture.hold_threshold());
            info!("⏱️  Hold threshold → {:?}", self.gestures.threshold());
        }
        if change.surface {
            self.apply_palette();
            self.init_session();
            self.update();
            info!("🔄 Surface rewired for new palette/config button values");
        }
        if change.session {
            warn!("Session size changed; takes effect on restart");
        }
    }

    /// Unbind everything and blank the surface.
    ///
    /// After this call no event reaches a handler and `update` does nothing.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }

        self.gestures.clear();
        self.overview_presses.clear();
        self.delete_armed = false;
        self.pending_sub_mode = None;
        self.sub_modes.set_enabled(false);
        self.zoom.set_engaged(false);
        self.session.set_stop_clip_leds_suppressed(false);

        let palette = self.config.palette;
        let mut owned = self.surface.routed_buttons();
        owned.extend_from_slice(self.surface.mode_buttons());
        self.surface.for_each(&owned, |button| {
            button.set_on_off_values(palette.full, palette.led_off);
            // Forced: user mode may have disabled the grid
            button.send_value(palette.led_off, true);
        });

        let config_button = self.surface.config_button();
        if let Some(button) = self.surface.button_mut(config_button) {
            button.turn_off();
        }

        self.connected = false;
        info!("Mode selector disconnected");
    }

    /// Bindings currently routing events (none after disconnect)
    pub fn active_bindings(&self) -> Option<&BindingTable> {
        self.connected.then(|| self.bindings.for_mode(self.mode))
    }

    pub fn session_component(&self) -> &V {
        &self.session
    }

    pub fn session_component_mut(&mut self) -> &mut V {
        &mut self.session
    }

    pub fn overview(&self) -> &Z {
        &self.zoom
    }

    pub fn sub_modes(&self) -> &M {
        &self.sub_modes
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn delete_armed(&self) -> bool {
        self.delete_armed
    }

    pub fn gestures(&self) -> &GestureTracker {
        &self.gestures
    }

    /// Scene buttons currently held down
    pub fn held_buttons(&self) -> usize {
        self.gestures.held_count()
    }

    /// Default on/off values for every routed and mode button
    fn apply_palette(&mut self) {
        let palette = self.config.palette;
        let mut owned = self.surface.routed_buttons();
        owned.extend_from_slice(self.surface.mode_buttons());
        self.surface.for_each(&owned, |button| {
            button.set_on_off_values(palette.full, palette.led_off);
        });
    }
}
