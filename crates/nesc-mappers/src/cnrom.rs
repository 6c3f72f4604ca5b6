//! Mapper 3: CNROM.
//!
//! PRG-ROM is fixed, identical to NROM (16KB mirrored or 32KB direct). CHR
//! is switched in 8KB banks by writing the bank number to any address in
//! `$8000-$FFFF`.

use crate::{Mapper, Mirroring, Rom};

const CHR_BANK_SIZE: usize = 8192;

/// CNROM mapper (mapper number 3).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Cnrom {
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    mirroring: Mirroring,
    bank_select: u8,
    bank_count: u8,
}

impl Cnrom {
    /// Build a CNROM mapper from a parsed ROM.
    ///
    /// # Panics
    ///
    /// Panics if PRG-ROM is not 16KB or 32KB, or CHR-ROM size is not a
    /// multiple of 8KB.
    #[must_use]
    pub fn new(rom: &Rom) -> Self {
        assert!(
            rom.prg_rom.len() == 16384 || rom.prg_rom.len() == 32768,
            "CNROM requires 16KB or 32KB PRG-ROM, got {} bytes",
            rom.prg_rom.len()
        );
        assert!(
            !rom.chr_rom.is_empty() && rom.chr_rom.len() % CHR_BANK_SIZE == 0,
            "CNROM requires CHR-ROM size to be a multiple of 8KB, got {} bytes",
            rom.chr_rom.len()
        );
        let bank_count = (rom.chr_rom.len() / CHR_BANK_SIZE) as u8;

        Self {
            prg_rom: rom.prg_rom.clone(),
            chr_rom: rom.chr_rom.clone(),
            mirroring: rom.header.mirroring,
            bank_select: 0,
            bank_count,
        }
    }
}

impl Mapper for Cnrom {
    fn read_prg(&self, addr: u16) -> u8 {
        let offset = (addr - 0x8000) as usize;
        let masked = if self.prg_rom.len() == 16384 {
            offset & 0x3FFF
        } else {
            offset
        };
        self.prg_rom[masked]
    }

    fn write_prg(&mut self, _addr: u16, value: u8) {
        self.bank_select = value;
    }

    fn read_chr(&self, addr: u16) -> u8 {
        let bank = self.bank_select as usize % self.bank_count as usize;
        self.chr_rom[bank * CHR_BANK_SIZE + addr as usize]
    }

    fn write_chr(&mut self, _addr: u16, _value: u8) {}

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn mapper_number(&self) -> u16 {
        3
    }

    fn mapper_name(&self) -> &'static str {
        "CNROM"
    }
}
