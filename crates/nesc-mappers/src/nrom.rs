//! Mapper 0: NROM.
//!
//! No bank switching. 16KB PRG-ROM is mirrored across the full `$8000-$FFFF`
//! window; 32KB PRG-ROM fills it directly. CHR is a fixed 8KB ROM or RAM
//! bank with no banking registers.

use crate::{Mapper, Mirroring, Rom};

/// NROM mapper (mapper number 0).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Nrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    has_chr_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    /// Build an NROM mapper from a parsed ROM.
    ///
    /// # Panics
    ///
    /// Panics if PRG-ROM is not 16KB or 32KB, or CHR-ROM (when present) is
    /// not exactly 8KB.
    #[must_use]
    pub fn new(rom: &Rom) -> Self {
        assert!(
            rom.prg_rom.len() == 16384 || rom.prg_rom.len() == 32768,
            "NROM requires 16KB or 32KB PRG-ROM, got {} bytes",
            rom.prg_rom.len()
        );

        let has_chr_ram = rom.chr_rom.is_empty();
        let chr = if has_chr_ram {
            vec![0; 8192]
        } else {
            assert_eq!(
                rom.chr_rom.len(),
                8192,
                "NROM requires 8KB CHR-ROM, got {} bytes",
                rom.chr_rom.len()
            );
            rom.chr_rom.clone()
        };

        Self {
            prg_rom: rom.prg_rom.clone(),
            chr,
            has_chr_ram,
            mirroring: rom.header.mirroring,
        }
    }
}

impl Mapper for Nrom {
    fn read_prg(&self, addr: u16) -> u8 {
        let offset = (addr - 0x8000) as usize;
        let masked = if self.prg_rom.len() == 16384 {
            offset & 0x3FFF
        } else {
            offset
        };
        self.prg_rom[masked]
    }

    fn write_prg(&mut self, _addr: u16, _value: u8) {}

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr[addr as usize]
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        if self.has_chr_ram {
            self.chr[addr as usize] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn mapper_number(&self) -> u16 {
        0
    }

    fn mapper_name(&self) -> &'static str {
        "NROM"
    }
}
