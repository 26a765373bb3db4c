//! Single addressable button element
//!
//! Tracks what the hardware LED is currently showing and queues outgoing
//! values. The transport drains the queue through `Surface::drain_output`.

use serde::Serialize;

use super::ButtonId;

/// Default "on" display value for a freshly created button
pub const DEFAULT_ON_VALUE: u8 = 127;
/// Default "off" display value for a freshly created button
pub const DEFAULT_OFF_VALUE: u8 = 0;

/// LED value queued for the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedMessage {
    pub button: ButtonId,
    /// Routing channel the button was bound to when the value was queued
    pub channel: u8,
    pub value: u8,
}

/// Input/output element with on/off display values and a routing channel
#[derive(Debug, Clone, Serialize)]
pub struct Button {
    id: ButtonId,
    name: String,
    on_value: u8,
    off_value: u8,
    enabled: bool,
    channel: u8,
    force_next: bool,
    last_sent: Option<u8>,
    #[serde(skip)]
    outgoing: Vec<LedMessage>,
}

impl Button {
    pub fn new(id: ButtonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            on_value: DEFAULT_ON_VALUE,
            off_value: DEFAULT_OFF_VALUE,
            enabled: true,
            channel: 0,
            force_next: false,
            last_sent: None,
            outgoing: Vec::new(),
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_on_off_values(&mut self, on_value: u8, off_value: u8) {
        self.on_value = on_value;
        self.off_value = off_value;
    }

    pub fn on_off_values(&self) -> (u8, u8) {
        (self.on_value, self.off_value)
    }

    pub fn turn_on(&mut self) {
        self.send_value(self.on_value, false);
    }

    pub fn turn_off(&mut self) {
        self.send_value(self.off_value, false);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_channel(&mut self, channel: u8) {
        self.channel = channel;
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Make the next `send_value` emit even if the value did not change
    pub fn set_force_next_value(&mut self) {
        self.force_next = true;
    }

    /// Last value written to the hardware, if any
    pub fn last_sent(&self) -> Option<u8> {
        self.last_sent
    }

    /// Whether the button currently displays its "on" value
    pub fn is_lit(&self) -> bool {
        self.last_sent.is_some_and(|v| v != self.off_value)
    }

    /// Queue a display value
    ///
    /// Disabled buttons stay silent unless `force` is set. Unchanged values are
    /// skipped unless forced or a forced refresh is pending.
    pub fn send_value(&mut self, value: u8, force: bool) {
        if !(self.enabled || force) {
            return;
        }
        if self.last_sent == Some(value) && !force && !self.force_next {
            return;
        }

        self.force_next = false;
        self.last_sent = Some(value);
        self.outgoing.push(LedMessage {
            button: self.id,
            channel: self.channel,
            value,
        });
    }

    /// Re-emit the current display value so the LED follows a channel change
    pub fn refresh(&mut self) {
        if let Some(value) = self.last_sent {
            self.send_value(value, false);
        }
    }

    pub(crate) fn take_outgoing(&mut self) -> std::vec::Drain<'_, LedMessage> {
        self.outgoing.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> Button {
        Button::new(ButtonId(0), "Test_Button")
    }

    #[test]
    fn test_unchanged_value_is_not_resent() {
        let mut b = button();
        b.send_value(60, false);
        b.send_value(60, false);
        assert_eq!(b.take_outgoing().count(), 1);
    }

    #[test]
    fn test_force_next_value_resends_once() {
        let mut b = button();
        b.turn_on();
        b.set_force_next_value();
        b.turn_on();
        b.turn_on();
        let sent: Vec<_> = b.take_outgoing().map(|m| m.value).collect();
        assert_eq!(sent, vec![127, 127]);
    }

    #[test]
    fn test_disabled_button_is_silent_unless_forced() {
        let mut b = button();
        b.set_enabled(false);
        b.turn_on();
        assert_eq!(b.take_outgoing().count(), 0);

        b.send_value(32, true);
        let sent: Vec<_> = b.take_outgoing().collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].value, 32);
    }

    #[test]
    fn test_refresh_uses_new_channel() {
        let mut b = button();
        b.set_on_off_values(60, 4);
        b.turn_off();
        b.set_channel(6);
        b.set_force_next_value();
        b.refresh();

        let sent: Vec<_> = b.take_outgoing().collect();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].channel, 6);
        assert_eq!(sent[1].value, 4);
        assert!(!b.is_lit());
    }
}
