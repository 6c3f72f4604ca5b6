//! CPU status register (P) flags.
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt disable
//! │  │  │  │  └────────── Decimal (accepted but never changes ALU behavior)
//! │  │  │  └───────────── Break (1 when pushed by PHP/BRK, 0 by IRQ/NMI)
//! │  │  └──────────────── Unused, always 1 on the stack
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```

use bitflags::bitflags;

bitflags! {
    /// CPU status register flags.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable.
        const I = 1 << 2;
        /// Decimal mode.
        const D = 1 << 3;
        /// Break.
        const B = 1 << 4;
        /// Unused, always set when pushed.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative.
        const N = 1 << 7;
    }
}

impl Status {
    /// Flags set immediately after power-on / reset.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Creates the power-on status value.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Sets Z and N from the given result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set_flag(Self::Z, value == 0);
        self.set_flag(Self::N, value & 0x80 != 0);
    }

    /// Sets or clears a single flag.
    #[inline]
    pub fn set_flag(&mut self, flag: Self, value: bool) {
        if value {
            *self |= flag;
        } else {
            *self &= !flag;
        }
    }

    /// Byte pushed to the stack by PHP/BRK, with U always set and B set
    /// only when pushed for a software interrupt.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if brk {
            value |= Self::B.bits();
        }
        value
    }

    /// Status reconstructed from a byte pulled off the stack. B is
    /// discarded and U is forced on, matching real 6502 behavior.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_sets_interrupt_disable_and_unused() {
        let status = Status::new();
        assert!(status.contains(Status::I));
        assert!(status.contains(Status::U));
        assert!(!status.contains(Status::C));
    }

    #[test]
    fn set_zn_tracks_zero_and_sign() {
        let mut status = Status::empty();
        status.set_zn(0);
        assert!(status.contains(Status::Z));
        assert!(!status.contains(Status::N));

        status.set_zn(0x80);
        assert!(!status.contains(Status::Z));
        assert!(status.contains(Status::N));
    }

    #[test]
    fn stack_roundtrip_discards_break_forces_unused() {
        let status = Status::C | Status::Z;
        let pushed = status.to_stack_byte(true);
        assert_eq!(pushed & Status::B.bits(), Status::B.bits());

        let restored = Status::from_stack_byte(pushed);
        assert!(!restored.contains(Status::B));
        assert!(restored.contains(Status::U));
        assert!(restored.contains(Status::C));
        assert!(restored.contains(Status::Z));
    }
}
