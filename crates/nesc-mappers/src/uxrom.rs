//! Mapper 2: UxROM.
//!
//! `$8000-$BFFF` is a PRG-ROM bank switched by writing the bank number to
//! any address in `$8000-$FFFF`. `$C000-$FFFF` is fixed to the last 16KB
//! bank. CHR is always 8KB of RAM with no banking.

use crate::{Mapper, Mirroring, Rom};

const PRG_BANK_SIZE: usize = 16384;

/// UxROM mapper (mapper number 2).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Uxrom {
    prg_rom: Vec<u8>,
    chr_ram: Vec<u8>,
    mirroring: Mirroring,
    bank_select: u8,
    bank_count: u8,
}

impl Uxrom {
    /// Build a UxROM mapper from a parsed ROM.
    ///
    /// # Panics
    ///
    /// Panics if PRG-ROM size is not a multiple of 16KB.
    #[must_use]
    pub fn new(rom: &Rom) -> Self {
        assert!(
            rom.prg_rom.len() % PRG_BANK_SIZE == 0 && !rom.prg_rom.is_empty(),
            "UxROM requires PRG-ROM size to be a multiple of 16KB, got {} bytes",
            rom.prg_rom.len()
        );
        let bank_count = (rom.prg_rom.len() / PRG_BANK_SIZE) as u8;

        Self {
            prg_rom: rom.prg_rom.clone(),
            chr_ram: vec![0; 8192],
            mirroring: rom.header.mirroring,
            bank_select: 0,
            bank_count,
        }
    }

    fn bank_offset(&self, bank: u8) -> usize {
        (bank as usize % self.bank_count as usize) * PRG_BANK_SIZE
    }
}

impl Mapper for Uxrom {
    fn read_prg(&self, addr: u16) -> u8 {
        if addr < 0xC000 {
            let offset = self.bank_offset(self.bank_select) + (addr - 0x8000) as usize;
            self.prg_rom[offset]
        } else {
            let offset = self.bank_offset(self.bank_count - 1) + (addr - 0xC000) as usize;
            self.prg_rom[offset]
        }
    }

    fn write_prg(&mut self, _addr: u16, value: u8) {
        self.bank_select = value;
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr_ram[addr as usize]
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        self.chr_ram[addr as usize] = value;
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn mapper_number(&self) -> u16 {
        2
    }

    fn mapper_name(&self) -> &'static str {
        "UxROM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RomHeader;

    fn rom(bank_count: usize) -> Rom {
        let mut prg_rom = vec![0u8; bank_count * PRG_BANK_SIZE];
        for (bank, chunk) in prg_rom.chunks_mut(PRG_BANK_SIZE).enumerate() {
            chunk[0] = bank as u8;
        }
        Rom {
            header: RomHeader {
                prg_rom_size: prg_rom.len(),
                chr_rom_size: 0,
                mapper_number: 2,
                mirroring: Mirroring::Vertical,
                has_battery: false,
                has_trainer: false,
                nes2_format: false,
                prg_ram_size: 0,
            },
            trainer: None,
            prg_rom,
            chr_rom: Vec::new(),
        }
    }

    #[test]
    fn last_bank_is_fixed() {
        let r = rom(4);
        let m = Uxrom::new(&r);
        assert_eq!(m.read_prg(0xC000), 3);
    }

    #[test]
    fn bank_select_switches_low_window() {
        let r = rom(4);
        let mut m = Uxrom::new(&r);
        assert_eq!(m.read_prg(0x8000), 0);
        m.write_prg(0x8000, 2);
        assert_eq!(m.read_prg(0x8000), 2);
        assert_eq!(m.read_prg(0xC000), 3);
    }

    #[test]
    fn chr_is_always_ram() {
        let r = rom(2);
        let mut m = Uxrom::new(&r);
        m.write_chr(0x10, 0x7E);
        assert_eq!(m.read_chr(0x10), 0x7E);
    }
}
