//! Nametable RAM and palette RAM.
//!
//! The PPU owns 2 KiB of internal RAM for nametables (mirrored across a
//! 4 KiB address window) and 32 bytes of palette RAM. Pattern-table reads
//! and writes (`$0000-$1FFF`) are intrinsic to the cartridge, not this
//! struct; callers route those through [`crate::PpuBus`] instead.
//!
//! ```text
//! $0000-$0FFF: Pattern table 0 (cartridge CHR ROM/RAM, not here)
//! $1000-$1FFF: Pattern table 1 (cartridge CHR ROM/RAM, not here)
//! $2000-$23FF: Nametable 0
//! $2400-$27FF: Nametable 1
//! $2800-$2BFF: Nametable 2
//! $2C00-$2FFF: Nametable 3
//! $3000-$3EFF: Mirror of $2000-$2EFF
//! $3F00-$3F1F: Palette RAM (32 bytes)
//! $3F20-$3FFF: Mirror of $3F00-$3F1F
//! ```
//!
//! Nametable mirroring modes:
//! - **Horizontal**: A A B B (vertical-scrolling games)
//! - **Vertical**: A B A B (horizontal-scrolling games)
//! - **Single-screen**: A A A A or B B B B
//! - **Four-screen**: A B C D (cartridge supplies the extra RAM)
//!
//! This type is intentionally independent of any cartridge-side mirroring
//! enum: `nesc-ppu` has no dependency on `nesc-mappers`, so the console
//! that wires them together converts between the two.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nametable mirroring mode, as wired by the cartridge board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mirroring {
    /// Horizontal mirroring (vertical arrangement).
    #[default]
    Horizontal,
    /// Vertical mirroring (horizontal arrangement).
    Vertical,
    /// Single-screen mirroring, lower bank.
    SingleScreenLower,
    /// Single-screen mirroring, upper bank.
    SingleScreenUpper,
    /// Four distinct nametables, backed by cartridge RAM.
    FourScreen,
}

/// Nametable and palette RAM, plus the mirroring logic between them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vram {
    nametables: Vec<u8>,
    palette: Vec<u8>,
    mirroring: Mirroring,
    four_screen_ram: Option<Vec<u8>>,
}

impl Vram {
    /// Allocate VRAM wired for the given mirroring mode.
    #[must_use]
    pub fn new(mirroring: Mirroring) -> Self {
        Self {
            nametables: vec![0; 2048],
            palette: vec![0; 32],
            mirroring,
            four_screen_ram: matches!(mirroring, Mirroring::FourScreen).then(|| vec![0; 4096]),
        }
    }

    /// Change the mirroring mode, e.g. after swapping cartridges.
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
        if matches!(mirroring, Mirroring::FourScreen) && self.four_screen_ram.is_none() {
            self.four_screen_ram = Some(vec![0; 4096]);
        }
    }

    /// The current mirroring mode.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// Read a byte from the nametable/palette address space
    /// (`$2000-$3FFF`). Pattern-table addresses fall through to a warning
    /// and zero, since they should never reach this far.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;

        match addr {
            0x0000..=0x1FFF => {
                log::warn!("VRAM read from pattern table ${addr:04X}, expected mapper access");
                0
            }
            0x2000..=0x2FFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr);
                self.nametables[mirrored_addr]
            }
            0x3000..=0x3EFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr - 0x1000);
                self.nametables[mirrored_addr]
            }
            0x3F00..=0x3FFF => {
                let palette_addr = self.mirror_palette_addr(addr);
                self.palette[palette_addr]
            }
            _ => unreachable!(),
        }
    }

    /// Write a byte to the nametable/palette address space (`$2000-$3FFF`).
    pub fn write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;

        match addr {
            0x0000..=0x1FFF => {
                log::warn!("VRAM write to pattern table ${addr:04X}, expected mapper access");
            }
            0x2000..=0x2FFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr);
                self.nametables[mirrored_addr] = value;
            }
            0x3000..=0x3EFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr - 0x1000);
                self.nametables[mirrored_addr] = value;
            }
            0x3F00..=0x3FFF => {
                let palette_addr = self.mirror_palette_addr(addr);
                self.palette[palette_addr] = value;
            }
            _ => unreachable!(),
        }
    }

    fn mirror_nametable_addr(&self, addr: u16) -> usize {
        let addr = addr & 0x0FFF;
        let nametable = (addr / 0x0400) as usize;
        let offset = (addr % 0x0400) as usize;

        match self.mirroring {
            Mirroring::Horizontal => usize::from(nametable >= 2) * 0x0400 + offset,
            Mirroring::Vertical => (nametable % 2) * 0x0400 + offset,
            Mirroring::SingleScreenLower => offset,
            Mirroring::SingleScreenUpper => 0x0400 + offset,
            Mirroring::FourScreen => nametable * 0x0400 + offset,
        }
    }

    /// Palette RAM mirroring: masked to 32 bytes, with `$10/$14/$18/$1C`
    /// (and their 32-byte-period repeats) aliased down to `$00/$04/$08/$0C`.
    fn mirror_palette_addr(&self, addr: u16) -> usize {
        let mut addr = (addr & 0x1F) as usize;
        if addr >= 0x10 && addr % 4 == 0 {
            addr -= 0x10;
        }
        addr
    }

    /// Read a palette entry by its 5-bit index, applying the same mirroring
    /// as [`Vram::read`]; used by the renderer to resolve final pixel
    /// colors without going through the full address decode.
    #[inline]
    #[must_use]
    pub fn read_palette(&self, addr: u8) -> u8 {
        let addr = self.mirror_palette_addr(0x3F00 | u16::from(addr));
        self.palette[addr]
    }

    /// Clear nametable, palette, and four-screen RAM to power-up state.
    pub fn reset(&mut self) {
        self.nametables.fill(0);
        self.palette.fill(0);
        if let Some(ram) = &mut self.four_screen_ram {
            ram.fill(0);
        }
    }
}

impl Default for Vram {
    fn default() -> Self {
        Self::new(Mirroring::Horizontal)
    }
}
