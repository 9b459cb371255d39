/// Z80 CTC (counter/timer circuit), timer mode only.
///
/// Four independent channels share the board's single interrupt line.
/// Time advances through `tick`, called once per CPU clock cycle by the bus;
/// reads and writes only inspect or program a channel.
use std::any::Any;

use super::bus::Device;
use crate::error::StateError;
use crate::interrupts::InterruptManager;

/// Save-state size of one channel.
pub const CTC_CHANNEL_STATE_LEN: usize = 8;
/// Save-state size of the whole CTC.
pub const CTC_STATE_LEN: usize = CTC_CHANNEL_STATE_LEN * CHANNELS;

const CHANNELS: usize = 4;

const CONTROL_WORD: u8 = 0b0000_0001;
const SOFTWARE_RESET: u8 = 0b0000_0010;
const TIME_CONSTANT_FOLLOWS: u8 = 0b0000_0100;
const PRESCALE_256: u8 = 0b0010_0000;
const INTERRUPT_ENABLE: u8 = 0b1000_0000;

/// Prescale factor selected when bit 5 of the control word is clear. The
/// other setting stores 0, which wraps through 255 and divides by 256.
const DEFAULT_PRESCALE: u8 = 16;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CtcChannel {
    prescale: u8,
    counter: u8,
    /// Counts cycles down to the next decrement of `counter`.
    prescale_counter: u8,
    time_constant: u8,
    running: bool,
    interrupt_enabled: bool,
    /// Set after raising; the channel is frozen until the CPU acknowledges.
    waiting_for_ack: bool,
    /// Set by a control word with bit 2; the next write is a time constant.
    waiting_for_time_constant: bool,
}

impl Default for CtcChannel {
    fn default() -> Self {
        Self {
            prescale: DEFAULT_PRESCALE,
            counter: 0,
            prescale_counter: DEFAULT_PRESCALE,
            time_constant: 0,
            running: false,
            interrupt_enabled: false,
            waiting_for_ack: false,
            waiting_for_time_constant: false,
        }
    }
}

impl CtcChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current down-counter value.
    #[inline]
    pub fn read(&self) -> u8 {
        self.counter
    }

    pub fn write(&mut self, value: u8) {
        if self.waiting_for_time_constant {
            self.time_constant = value;
            self.counter = value;
            self.waiting_for_time_constant = false;
            self.running = true;
            log::debug!("CTC time constant {:#04X}, channel running", value);
            return;
        }

        if value & CONTROL_WORD == 0 {
            // Interrupt vector word. Mode 1 always vectors to 0x0038.
            log::debug!("CTC vector word {:#04X} ignored", value);
            return;
        }

        if value & SOFTWARE_RESET != 0 {
            self.reset();
        }

        if value & TIME_CONSTANT_FOLLOWS != 0 {
            self.waiting_for_time_constant = true;
        } else {
            self.running = true;
        }

        self.prescale = if value & PRESCALE_256 == 0 {
            DEFAULT_PRESCALE
        } else {
            0
        };
        self.prescale_counter = self.prescale;
        self.interrupt_enabled = value & INTERRUPT_ENABLE != 0;

        log::debug!(
            "CTC control {:#04X}: prescale {}, interrupts {}",
            value,
            if self.prescale == 0 { 256 } else { 16 },
            if self.interrupt_enabled { "on" } else { "off" }
        );
    }

    /// Advance one clock cycle.
    pub fn tick(&mut self, irq: &mut InterruptManager) {
        self.observe_acknowledge(irq);
        self.count(irq);
    }

    /// Release the channel once the CPU has accepted its request.
    fn observe_acknowledge(&mut self, irq: &mut InterruptManager) {
        if self.waiting_for_ack && irq.is_acknowledge_pending() {
            self.waiting_for_ack = false;
            irq.clear_acknowledge();
        }
    }

    fn count(&mut self, irq: &mut InterruptManager) {
        if !self.running || self.waiting_for_ack {
            return;
        }

        self.prescale_counter = self.prescale_counter.wrapping_sub(1);
        if self.prescale_counter != 0 {
            return;
        }
        self.prescale_counter = self.prescale;

        self.counter = self.counter.wrapping_sub(1);
        if self.counter != 0 {
            return;
        }
        self.counter = self.time_constant;

        if self.interrupt_enabled && irq.raise_interrupt() {
            self.waiting_for_ack = true;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn is_waiting_for_ack(&self) -> bool {
        self.waiting_for_ack
    }

    pub fn save_state(&self) -> [u8; CTC_CHANNEL_STATE_LEN] {
        [
            self.prescale,
            self.counter,
            self.prescale_counter,
            self.time_constant,
            self.running as u8,
            self.interrupt_enabled as u8,
            self.waiting_for_ack as u8,
            self.waiting_for_time_constant as u8,
        ]
    }

    pub fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let state: [u8; CTC_CHANNEL_STATE_LEN] =
            data.try_into().map_err(|_| StateError::LengthMismatch {
                expected: CTC_CHANNEL_STATE_LEN,
                actual: data.len(),
            })?;

        self.prescale = state[0];
        self.counter = state[1];
        self.prescale_counter = state[2];
        self.time_constant = state[3];
        self.running = state[4] != 0;
        self.interrupt_enabled = state[5] != 0;
        self.waiting_for_ack = state[6] != 0;
        self.waiting_for_time_constant = state[7] != 0;
        Ok(())
    }
}

/// The four-channel CTC as mapped on the port bus. `offset % 4` selects
/// the channel.
#[derive(Clone, Debug, Default)]
pub struct Ctc {
    channels: [CtcChannel; CHANNELS],
}

impl Ctc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, index: usize) -> Option<&CtcChannel> {
        self.channels.get(index)
    }

    #[inline]
    fn select(offset: u16) -> usize {
        offset as usize % CHANNELS
    }
}

impl Device for Ctc {
    fn read(&mut self, offset: u16) -> u8 {
        self.channels[Self::select(offset)].read()
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.channels[Self::select(offset)].write(value);
    }

    /// The acknowledge goes to its owner before any channel counts, so a
    /// raise from a lower channel cannot clear it first.
    fn tick(&mut self, irq: &mut InterruptManager) {
        for channel in self.channels.iter_mut() {
            channel.observe_acknowledge(irq);
        }
        for channel in self.channels.iter_mut() {
            channel.count(irq);
        }
    }

    fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }
    }

    fn state_len(&self) -> usize {
        CTC_STATE_LEN
    }

    fn save_state(&self) -> Vec<u8> {
        self.channels
            .iter()
            .flat_map(|channel| channel.save_state())
            .collect()
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        if data.len() != CTC_STATE_LEN {
            return Err(StateError::LengthMismatch {
                expected: CTC_STATE_LEN,
                actual: data.len(),
            });
        }
        for (channel, block) in self
            .channels
            .iter_mut()
            .zip(data.chunks_exact(CTC_CHANNEL_STATE_LEN))
        {
            channel.load_state(block)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn programmed(control: u8, time_constant: u8) -> CtcChannel {
        let mut channel = CtcChannel::new();
        channel.write(control);
        channel.write(time_constant);
        channel
    }

    #[test]
    fn terminal_count_raises_once_and_waits_for_ack() {
        let mut irq = InterruptManager::new();
        let mut channel = programmed(0x87, 0x05);
        assert!(channel.is_running());

        for _ in 0..5 * 16 - 1 {
            channel.tick(&mut irq);
        }
        assert!(!irq.is_interrupt_pending());
        channel.tick(&mut irq);
        assert!(irq.is_interrupt_pending());
        assert!(channel.is_waiting_for_ack());
        assert_eq!(channel.read(), 0x05);

        // Frozen until the CPU acknowledges.
        for _ in 0..1000 {
            channel.tick(&mut irq);
        }
        assert_eq!(channel.read(), 0x05);

        irq.acknowledge_interrupt();
        channel.tick(&mut irq);
        assert!(!channel.is_waiting_for_ack());
        assert!(!irq.is_acknowledge_pending());
    }

    #[test]
    fn reset_while_pending_does_not_block_later_raises() {
        let mut irq = InterruptManager::new();
        let mut channel = programmed(0x87, 0x01);
        for _ in 0..16 {
            channel.tick(&mut irq);
        }
        assert!(irq.is_interrupt_pending());

        // Software reset drops the channel's claim, then the CPU accepts
        // the stale request. Nobody is left to clear the acknowledge.
        channel.write(0x03);
        irq.acknowledge_interrupt();
        assert!(!channel.is_waiting_for_ack());

        channel.write(0x87);
        channel.write(0x01);
        for _ in 0..16 {
            channel.tick(&mut irq);
        }
        assert!(irq.is_interrupt_pending());
        assert!(!irq.is_acknowledge_pending());
        assert!(channel.is_waiting_for_ack());
    }

    #[test]
    fn channels_share_one_request_line() {
        let mut irq = InterruptManager::new();
        let mut ctc = Ctc::new();
        // Channel 0 expires every 16 cycles, channel 1 every 32.
        ctc.write(0, 0x87);
        ctc.write(0, 0x01);
        ctc.write(1, 0x87);
        ctc.write(1, 0x02);

        for _ in 0..16 {
            ctc.tick(&mut irq);
        }
        assert!(irq.is_interrupt_pending());
        assert!(ctc.channels[0].is_waiting_for_ack());

        // Channel 1 reaches terminal count while channel 0's request is
        // still pending: its raise is dropped and it keeps counting.
        for _ in 0..16 {
            ctc.tick(&mut irq);
        }
        assert!(!ctc.channels[1].is_waiting_for_ack());
        assert!(ctc.channels[1].is_running());
        assert_eq!(ctc.channels[1].read(), 0x02);
        assert_eq!(ctc.channels[0].read(), 0x01);

        irq.acknowledge_interrupt();
        ctc.tick(&mut irq);
        assert!(!ctc.channels[0].is_waiting_for_ack());
        assert!(!irq.is_acknowledge_pending());
        assert!(!irq.is_interrupt_pending());

        // With channel 0's interrupts off, channel 1's next expiry gets
        // through.
        ctc.write(0, 0x03);
        for _ in 0..31 {
            ctc.tick(&mut irq);
        }
        assert!(irq.is_interrupt_pending());
        assert!(ctc.channels[1].is_waiting_for_ack());
    }

    #[test]
    fn acknowledge_reaches_owner_before_another_channel_raises() {
        let mut irq = InterruptManager::new();
        let mut ctc = Ctc::new();
        // Channel 1 raises first; channel 0 expires on the very cycle after
        // the CPU accepts channel 1's request.
        ctc.write(1, 0x87);
        ctc.write(1, 0x01);
        for _ in 0..16 {
            ctc.tick(&mut irq);
        }
        assert!(ctc.channels[1].is_waiting_for_ack());

        ctc.write(0, 0x87);
        ctc.write(0, 0x01);
        for _ in 0..15 {
            ctc.tick(&mut irq);
        }
        irq.acknowledge_interrupt();
        ctc.tick(&mut irq);

        assert!(!ctc.channels[1].is_waiting_for_ack());
        assert!(ctc.channels[0].is_waiting_for_ack());
        assert!(irq.is_interrupt_pending());
        assert!(!irq.is_acknowledge_pending());
    }

    #[test]
    fn interrupts_disabled_still_reloads() {
        let mut irq = InterruptManager::new();
        let mut channel = programmed(0x07, 0x05);

        for _ in 0..5 * 16 {
            channel.tick(&mut irq);
        }
        assert!(!irq.is_interrupt_pending());
        assert_eq!(channel.read(), 0x05);
        for _ in 0..16 {
            channel.tick(&mut irq);
        }
        assert_eq!(channel.read(), 0x04);
    }

    #[test]
    fn prescale_256_divides_by_256() {
        let mut irq = InterruptManager::new();
        let mut channel = programmed(0xA7, 0x02);

        for _ in 0..255 {
            channel.tick(&mut irq);
        }
        assert_eq!(channel.read(), 0x02);
        channel.tick(&mut irq);
        assert_eq!(channel.read(), 0x01);
    }

    #[test]
    fn vector_word_is_ignored() {
        let mut channel = CtcChannel::new();
        channel.write(0x10);
        assert_eq!(channel, CtcChannel::new());
    }

    #[test]
    fn channel_state_length_is_checked() {
        let mut channel = programmed(0x87, 0x33);
        let before = channel.clone();
        let err = channel.load_state(&[0; 7]).unwrap_err();
        assert_eq!(
            err,
            StateError::LengthMismatch {
                expected: 8,
                actual: 7
            }
        );
        assert_eq!(channel, before);
    }

    #[test]
    fn ctc_state_round_trip() {
        let mut ctc = Ctc::new();
        ctc.write(1, 0x87);
        ctc.write(1, 0x40);
        ctc.write(6, 0x25);

        let state = ctc.save_state();
        assert_eq!(state.len(), CTC_STATE_LEN);
        assert_eq!(&state[8..12], &[16, 0x40, 16, 0x40]);

        let mut restored = Ctc::new();
        restored.load_state(&state).unwrap();
        assert_eq!(restored.channels, ctc.channels);

        assert!(restored.load_state(&state[..31]).is_err());
        assert_eq!(restored.channels, ctc.channels);
    }
}
