// Auto-silencing timer used by the pulse, triangle, and noise channels.
// Loading a 5-bit index from the register write looks up a duration in
// the table below; a half-frame clock decrements it to zero unless the
// channel's halt flag is set.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Duration table, indexed by the 5-bit value written alongside the
/// length counter load. Values are in half-frame clocks.
const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LengthCounter {
    remaining: u8,
    halt: bool,
    enabled: bool,
}

impl LengthCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: 0,
            halt: false,
            enabled: false,
        }
    }

    /// Look up `index` in the duration table and load it, unless the
    /// channel is disabled via `$4015` — a disabled channel ignores
    /// length loads entirely.
    pub fn load(&mut self, index: u8) {
        if self.enabled {
            self.remaining = LENGTH_TABLE[(index & 0x1F) as usize];
        }
    }

    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /// Disabling a channel also zeroes its length counter immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.remaining = 0;
        }
    }

    /// Half-frame clock.
    pub fn clock(&mut self) {
        if !self.halt && self.remaining > 0 {
            self.remaining -= 1;
        }
    }

    #[must_use]
    #[inline]
    pub const fn active(&self) -> bool {
        self.remaining > 0
    }

    /// Alias for [`LengthCounter::active`].
    #[must_use]
    #[inline]
    pub const fn is_active(&self) -> bool {
        self.active()
    }

    #[must_use]
    #[inline]
    pub const fn value(&self) -> u8 {
        self.remaining
    }

    #[must_use]
    #[inline]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    #[inline]
    pub const fn is_halted(&self) -> bool {
        self.halt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_endpoints_match_the_documented_nes_values() {
        assert_eq!(LENGTH_TABLE[0], 10);
        assert_eq!(LENGTH_TABLE[1], 254);
        assert_eq!(LENGTH_TABLE[30], 32);
        assert_eq!(LENGTH_TABLE[31], 30);
    }

    #[test]
    fn load_only_takes_effect_while_enabled() {
        let mut lc = LengthCounter::new();
        lc.load(1);
        assert_eq!(lc.value(), 0, "disabled channel ignores the load");

        lc.set_enabled(true);
        lc.load(1);
        assert_eq!(lc.value(), 254);
    }

    #[test]
    fn clock_counts_down_to_zero_and_sticks() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.load(0); // 10

        for expected in (0..10).rev() {
            lc.clock();
            assert_eq!(lc.value(), expected);
        }
        lc.clock();
        assert_eq!(lc.value(), 0);
    }

    #[test]
    fn halt_freezes_the_count() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.load(0);
        lc.set_halt(true);

        lc.clock();
        lc.clock();
        assert_eq!(lc.value(), 10);
    }

    #[test]
    fn active_tracks_whether_any_count_remains() {
        let mut lc = LengthCounter::new();
        assert!(!lc.active());

        lc.set_enabled(true);
        lc.load(0);
        assert!(lc.active());
    }

    #[test]
    fn disabling_a_running_counter_zeroes_it_immediately() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.load(0);
        assert!(lc.active());

        lc.set_enabled(false);
        assert!(!lc.active());
        assert_eq!(lc.value(), 0);
    }
}
