// Volume envelope shared by the pulse and noise channels. Either holds a
// fixed volume or decays 15 -> 0 on its own divider, looping back to 15
// if the loop flag (aliased with the owning channel's length-halt bit)
// is set.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Envelope {
    restart: bool,
    divider: u8,
    decay_level: u8,
    period: u8,
    loop_flag: bool,
    constant: bool,
}

impl Envelope {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            restart: false,
            divider: 0,
            decay_level: 0,
            period: 0,
            loop_flag: false,
            constant: false,
        }
    }

    /// `--LC VVVV`: loop/halt, constant-volume select, volume or period.
    pub fn write(&mut self, value: u8) {
        self.loop_flag = value & 0x20 != 0;
        self.constant = value & 0x10 != 0;
        self.period = value & 0x0F;
    }

    /// Arm a restart for the next clock; triggered by loading the owning
    /// channel's length counter.
    pub fn start(&mut self) {
        self.restart = true;
    }

    /// Quarter-frame clock: restart takes priority, then the divider
    /// counts down to decrement (or loop) the decay level.
    pub fn clock(&mut self) {
        if self.restart {
            self.restart = false;
            self.decay_level = 15;
            self.divider = self.period;
            return;
        }

        if self.divider > 0 {
            self.divider -= 1;
            return;
        }

        self.divider = self.period;
        match self.decay_level {
            0 if self.loop_flag => self.decay_level = 15,
            0 => {}
            n => self.decay_level = n - 1,
        }
    }

    #[must_use]
    #[inline]
    pub const fn output(&self) -> u8 {
        if self.constant { self.period } else { self.decay_level }
    }

    #[must_use]
    #[inline]
    pub const fn loop_flag(&self) -> bool {
        self.loop_flag
    }

    /// Alias for [`Envelope::write`], used by channels whose own register
    /// layout calls the same byte something other than "envelope".
    pub fn write_register(&mut self, value: u8) {
        self.write(value);
    }

    #[must_use]
    #[inline]
    pub const fn is_constant_volume(&self) -> bool {
        self.constant
    }

    #[must_use]
    #[inline]
    pub const fn is_start_flag_set(&self) -> bool {
        self.restart
    }
}
