// Pulse sweep unit: periodically retargets a pulse channel's timer period
// to bend its pitch, muting the channel outright if the new period would
// fall outside the range a pulse timer can represent.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which pulse channel this sweep belongs to. The two channels compute a
/// negated period differently (one's complement vs two's complement),
/// which is the one asymmetry between otherwise-identical pulse units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PulseChannel {
    One,
    Two,
}

/// Sweep unit state, written from `$4001`/`$4005`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sweep {
    enabled: bool,
    divider_period: u8,
    negate: bool,
    shift: u8,
    reload_pending: bool,
    divider: u8,
    channel: PulseChannel,
}

impl Sweep {
    #[must_use]
    pub const fn new(channel: PulseChannel) -> Self {
        Self {
            enabled: false,
            divider_period: 0,
            negate: false,
            shift: 0,
            reload_pending: false,
            divider: 0,
            channel,
        }
    }

    /// `EPPP NSSS`: enable, divider period (stored value + 1 reloads),
    /// negate, shift count. Any write arms a divider reload on the next
    /// half-frame clock.
    pub fn write(&mut self, value: u8) {
        self.enabled = value & 0x80 != 0;
        self.divider_period = (value >> 4) & 0x07;
        self.negate = value & 0x08 != 0;
        self.shift = value & 0x07;
        self.reload_pending = true;
    }

    /// What the timer period would become if the sweep fired right now,
    /// or `None` if that value would overflow the 11-bit period.
    #[must_use]
    pub fn target_period(&self, current_period: u16) -> Option<u16> {
        let delta = current_period >> self.shift;
        let target = if self.negate {
            match self.channel {
                PulseChannel::One => current_period.wrapping_sub(delta).wrapping_sub(1),
                PulseChannel::Two => current_period.wrapping_sub(delta),
            }
        } else {
            current_period.wrapping_add(delta)
        };
        (target <= 0x7FF).then_some(target)
    }

    /// A pulse channel goes silent under sweep whenever its period is too
    /// low to represent an audible pitch, or its target period overflows.
    #[must_use]
    pub fn muted(&self, current_period: u16) -> bool {
        current_period < 8 || self.target_period(current_period).is_none()
    }

    /// Run one half-frame tick. Returns the new period when the divider
    /// has just expired and the sweep is armed to actually retarget
    /// (enabled, non-zero shift, and not currently muted).
    pub fn clock(&mut self, current_period: u16) -> Option<u16> {
        let fire = self.divider == 0 && self.enabled && self.shift > 0;
        let next_period = if fire && !self.muted(current_period) {
            self.target_period(current_period)
        } else {
            None
        };

        if self.divider == 0 || self.reload_pending {
            self.divider = self.divider_period;
            self.reload_pending = false;
        } else {
            self.divider -= 1;
        }

        next_period
    }
}

impl Default for Sweep {
    fn default() -> Self {
        Self::new(PulseChannel::One)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_sweep_adds_shifted_period() {
        let mut sweep = Sweep::new(PulseChannel::One);
        sweep.write(0x01); // shift 1, no negate
        assert_eq!(sweep.target_period(400), Some(600));
    }

    #[test]
    fn pulse_one_negate_subtracts_an_extra_one() {
        let mut sweep = Sweep::new(PulseChannel::One);
        sweep.write(0x09); // shift 1, negate
        assert_eq!(sweep.target_period(400), Some(199));
    }

    #[test]
    fn pulse_two_negate_omits_the_extra_one() {
        let mut sweep = Sweep::new(PulseChannel::Two);
        sweep.write(0x09);
        assert_eq!(sweep.target_period(400), Some(200));
    }

    #[test]
    fn target_above_eleven_bits_is_rejected() {
        let mut sweep = Sweep::new(PulseChannel::One);
        sweep.write(0x01);
        assert_eq!(sweep.target_period(0x700), None);
    }

    #[test]
    fn muting_follows_the_low_period_floor_and_the_overflow_ceiling() {
        let sweep = Sweep::new(PulseChannel::One);
        assert!(sweep.muted(7));
        assert!(!sweep.muted(8));

        let mut overflowing = Sweep::new(PulseChannel::One);
        overflowing.write(0x01);
        assert!(overflowing.muted(0x700));
    }

    #[test]
    fn armed_sweep_retargets_on_first_clock() {
        let mut sweep = Sweep::new(PulseChannel::One);
        sweep.write(0x81); // enabled, divider period 0, shift 1
        assert_eq!(sweep.clock(400), Some(600));
    }

    #[test]
    fn disabled_sweep_never_retargets() {
        let mut sweep = Sweep::new(PulseChannel::One);
        sweep.write(0x01); // shift 1 but not enabled
        for _ in 0..8 {
            assert_eq!(sweep.clock(400), None);
        }
    }

    #[test]
    fn zero_shift_never_retargets_even_when_enabled() {
        let mut sweep = Sweep::new(PulseChannel::One);
        sweep.write(0x80); // enabled, shift 0
        assert_eq!(sweep.clock(400), None);
    }
}
