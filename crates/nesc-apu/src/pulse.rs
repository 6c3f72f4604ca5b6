// Pulse (square wave) channel, $4000-$4007. Pulse 1 and pulse 2 are
// identical except for which end of the sweep unit's negate math they
// use; both are built from this one type parameterized by PulseChannel.

use crate::{
    envelope::Envelope,
    length_counter::LengthCounter,
    sweep::{PulseChannel, Sweep},
    timer::Timer,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Eight-step duty waveforms, read high (play) to low (mute) per step.
const DUTY_SEQUENCES: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0], // 12.5%
    [0, 1, 1, 0, 0, 0, 0, 0], // 25%
    [0, 1, 1, 1, 1, 0, 0, 0], // 50%
    [1, 0, 0, 1, 1, 1, 1, 1], // 75% (25% inverted)
];

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(dead_code)] // channel kept for Debug output, not read back
pub struct Pulse {
    channel: PulseChannel,
    envelope: Envelope,
    sweep: Sweep,
    length_counter: LengthCounter,
    timer: Timer,
    duty: u8,
    step: u8,
}

impl Pulse {
    #[must_use]
    pub fn new(channel: PulseChannel) -> Self {
        Self {
            channel,
            envelope: Envelope::new(),
            sweep: Sweep::new(channel),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            duty: 0,
            step: 0,
        }
    }

    /// `$4000`/`$4004`: duty select and envelope. The loop flag doubles
    /// as the length counter's halt bit on every channel that has one.
    pub fn write_ctrl(&mut self, value: u8) {
        self.duty = (value >> 6) & 0x03;
        self.envelope.write(value);
        self.length_counter.set_halt(self.envelope.loop_flag());
    }

    /// `$4001`/`$4005`: sweep unit control.
    pub fn write_sweep(&mut self, value: u8) {
        self.sweep.write(value);
    }

    /// `$4002`/`$4006`: timer period, low byte.
    pub fn write_timer_lo(&mut self, value: u8) {
        self.timer.set_period_lo(value);
    }

    /// `$4003`/`$4007`: length counter load and timer period high bits.
    /// Also restarts the envelope and resets the duty step, per hardware.
    pub fn write_timer_hi(&mut self, value: u8) {
        self.timer.set_period_hi(value);
        self.length_counter.load(value >> 3);
        self.envelope.start();
        self.step = 0;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.length_counter.set_enabled(enabled);
    }

    #[must_use]
    pub fn active(&self) -> bool {
        self.length_counter.active()
    }

    /// Every APU cycle (CPU/2): advance the duty step on each timer pulse.
    pub fn clock_timer(&mut self) {
        if self.timer.clock() {
            self.step = (self.step + 1) & 0x07;
        }
    }

    /// Quarter frame.
    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    /// Half frame.
    pub fn clock_length(&mut self) {
        self.length_counter.clock();
    }

    /// Half frame: apply a sweep retarget if one is due.
    pub fn clock_sweep(&mut self) {
        if let Some(new_period) = self.sweep.clock(self.timer.period()) {
            self.timer.set_period(new_period);
        }
    }

    /// Current sample (0-15): silent unless the length counter is
    /// running, the sweep isn't muting, and the duty step is high.
    #[must_use]
    pub fn output(&self) -> u8 {
        if !self.length_counter.active() {
            return 0;
        }
        if self.sweep.muted(self.timer.period()) {
            return 0;
        }
        if DUTY_SEQUENCES[self.duty as usize][self.step as usize] == 0 {
            return 0;
        }
        self.envelope.output()
    }

    #[must_use]
    pub fn length_counter_value(&self) -> u8 {
        self.length_counter.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_step_count(duty: usize) -> usize {
        DUTY_SEQUENCES[duty].iter().filter(|&&s| s == 1).count()
    }

    #[test]
    fn duty_sequences_match_their_named_percentages() {
        assert_eq!(high_step_count(0), 1); // 12.5% of 8 steps
        assert_eq!(high_step_count(1), 2); // 25%
        assert_eq!(high_step_count(2), 4); // 50%
        assert_eq!(high_step_count(3), 6); // 75%
    }

    fn enabled_pulse(period_lo: u8) -> Pulse {
        let mut pulse = Pulse::new(PulseChannel::One);
        pulse.set_enabled(true);
        pulse.write_ctrl(0x3F); // duty 0, constant volume 15
        pulse.write_timer_lo(period_lo);
        pulse.write_timer_hi(0xF8); // load length counter, reset step
        pulse
    }

    #[test]
    fn duty_zero_is_silent_except_at_step_one() {
        let mut pulse = enabled_pulse(0x10); // period clear of the sweep floor
        for step in 0..8u8 {
            pulse.step = step;
            let expected = if step == 1 { 15 } else { 0 };
            assert_eq!(pulse.output(), expected, "step {step}");
        }
    }

    #[test]
    fn disabled_channel_is_always_silent() {
        let mut pulse = Pulse::new(PulseChannel::One);
        pulse.set_enabled(false);
        pulse.write_ctrl(0x3F);
        pulse.write_timer_lo(0x00);
        pulse.write_timer_hi(0xF8);
        pulse.step = 1;
        assert_eq!(pulse.output(), 0);
    }

    #[test]
    fn low_period_is_silenced_by_the_sweep_floor_not_the_duty_table() {
        let mut pulse = enabled_pulse(0x01); // period 1, below the sweep's floor of 8
        pulse.step = 1; // a step that would otherwise be audible
        assert_eq!(pulse.output(), 0);
    }
}
