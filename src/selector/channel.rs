//! Routing channel derived from the active mode and mixer sub-mode

use tracing::debug;

use super::mode::ActiveMode;
use crate::host::{SessionView, SubModeSelector, ZoomOverview};

/// Added to every non-zero channel so channel 0 stays reserved for session mode
pub const CHANNEL_OFFSET: usize = 3;

/// Channel for a mode index and sub-mode index
pub fn channel(mode_index: usize, sub_mode: usize) -> u8 {
    let raw = mode_index.saturating_add(sub_mode);
    let routed = if raw > 0 {
        raw.saturating_add(CHANNEL_OFFSET)
    } else {
        raw
    };
    u8::try_from(routed).unwrap_or(u8::MAX)
}

impl<V, Z, M> super::ModeSelector<V, Z, M>
where
    V: SessionView,
    Z: ZoomOverview,
    M: SubModeSelector,
{
    /// Channel the routed buttons report on right now.
    ///
    /// An unset mixer sub-mode counts as 0, so re-entering the mixer (which
    /// clears the sub-mode) reports channel 6. It never drops to 5, which
    /// belongs to User 2.
    pub fn channel_for_current_mode(&self) -> u8 {
        let sub_mode = match self.mode {
            ActiveMode::Mixer => self.sub_modes.mode().unwrap_or(0),
            _ => 0,
        };
        channel(self.mode.index(), sub_mode)
    }

    /// Push the current channel to every routed button and re-emit its LED
    pub(crate) fn update_control_channels(&mut self) {
        let new_channel = self.channel_for_current_mode();
        let routed = self.surface.routed_buttons();
        self.surface.for_each(&routed, |button| {
            button.set_channel(new_channel);
            button.set_force_next_value();
            button.refresh();
        });
        debug!("Routing channel → {} ({} buttons)", new_channel, routed.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_table() {
        assert_eq!(channel(0, 0), 0);
        assert_eq!(channel(1, 0), 4);
        assert_eq!(channel(2, 0), 5);
        assert_eq!(channel(3, 0), 6);
        assert_eq!(channel(3, 1), 7);
        assert_eq!(channel(3, 2), 8);
        assert_eq!(channel(3, 3), 9);
    }

    #[test]
    fn test_offset_only_when_positive() {
        // A session sub-mode would still be offset: the rule is on the raw sum
        assert_eq!(channel(0, 1), 4);
        assert_eq!(channel(0, 0), 0);
    }
}
