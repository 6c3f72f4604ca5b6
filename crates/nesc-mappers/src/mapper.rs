//! Cartridge mapper trait and nametable mirroring modes.
//!
//! A mapper owns the cartridge's PRG and CHR storage and decides how CPU and
//! PPU addresses are translated into offsets within that storage. Every
//! cartridge board implements [`Mapper`]; the console only ever talks to the
//! trait object.

/// Nametable mirroring mode exposed by a cartridge.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mirroring {
    /// Horizontal mirroring (vertical arrangement of nametables).
    #[default]
    Horizontal,
    /// Vertical mirroring (horizontal arrangement of nametables).
    Vertical,
    /// Single-screen, lower $2000 bank used for both nametables.
    SingleScreenLower,
    /// Single-screen, upper $2400 bank used for both nametables.
    SingleScreenUpper,
    /// Four distinct nametables backed by on-cartridge RAM.
    FourScreen,
}

/// A cartridge mapper.
///
/// Implementors own PRG-ROM/RAM and CHR-ROM/RAM and translate CPU addresses
/// in `$6000-$FFFF` and PPU addresses in `$0000-$1FFF` into reads and writes
/// against that storage. Mappers with no bank-switching state still
/// implement every method; the default bodies below cover the common case
/// of "no IRQ, no battery".
pub trait Mapper: Send {
    /// Read a byte from PRG address space (`$6000-$FFFF`).
    fn read_prg(&self, addr: u16) -> u8;

    /// Write a byte to PRG address space. For most mappers this targets
    /// bank-select registers rather than memory.
    fn write_prg(&mut self, addr: u16, value: u8);

    /// Read a byte from CHR address space (`$0000-$1FFF`).
    fn read_chr(&self, addr: u16) -> u8;

    /// Write a byte to CHR address space. A no-op on boards with CHR-ROM.
    fn write_chr(&mut self, addr: u16, value: u8);

    /// Current nametable mirroring mode.
    fn mirroring(&self) -> Mirroring;

    /// Whether the mapper has an IRQ asserted against the CPU.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Acknowledge and clear a pending IRQ.
    fn irq_acknowledge(&mut self) {}

    /// iNES mapper number, for diagnostics and save-state validation.
    fn mapper_number(&self) -> u16;

    /// Human-readable mapper name.
    fn mapper_name(&self) -> &'static str;

    /// Whether the cartridge has battery-backed PRG-RAM.
    fn has_battery(&self) -> bool {
        false
    }

    /// Battery-backed RAM contents, if present, for persistence.
    fn battery_ram(&self) -> Option<&[u8]> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirroring_defaults_to_horizontal() {
        assert_eq!(Mirroring::default(), Mirroring::Horizontal);
    }
}
