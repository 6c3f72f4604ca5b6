//! Cartridge mapper implementations.
//!
//! Parses iNES ROM images and builds the [`Mapper`] trait object matching
//! the header's mapper number.
//!
//! # Supported mappers
//!
//! | Mapper | Name  | Notes                              |
//! |--------|-------|-------------------------------------|
//! | 0      | NROM  | no banking                          |
//! | 2      | UxROM | switchable PRG, CHR-RAM              |
//! | 3      | CNROM | fixed PRG, switchable CHR-ROM        |
//!
//! ```no_run
//! use nesc_mappers::{Rom, create_mapper};
//!
//! let data = std::fs::read("game.nes").expect("failed to read ROM");
//! let rom = Rom::load(&data).expect("failed to parse ROM");
//! let mapper = create_mapper(&rom).expect("unsupported mapper");
//! let _ = mapper.read_prg(0x8000);
//! ```

mod cnrom;
pub mod mapper;
mod nrom;
pub mod rom;
mod uxrom;

pub use cnrom::Cnrom;
pub use mapper::{Mapper, Mirroring};
pub use nrom::Nrom;
pub use rom::{Rom, RomError, RomHeader};
pub use uxrom::Uxrom;

/// Build a mapper instance for the ROM's header-declared mapper number.
///
/// # Errors
///
/// Returns [`RomError::UnsupportedMapper`] if no implementation exists for
/// the mapper number in the header.
pub fn create_mapper(rom: &Rom) -> Result<Box<dyn Mapper>, RomError> {
    match rom.header.mapper_number {
        0 => Ok(Box::new(Nrom::new(rom))),
        2 => Ok(Box::new(Uxrom::new(rom))),
        3 => Ok(Box::new(Cnrom::new(rom))),
        n => {
            log::warn!("unsupported mapper number {n}, no implementation registered");
            Err(RomError::UnsupportedMapper(n))
        }
    }
}

/// List of mapper numbers this crate can instantiate.
#[must_use]
pub fn supported_mappers() -> &'static [u16] {
    &[0, 2, 3]
}

/// Whether `mapper` names a supported mapper number.
#[must_use]
pub fn is_mapper_supported(mapper: u16) -> bool {
    supported_mappers().contains(&mapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rom(mapper: u16) -> Rom {
        Rom {
            header: RomHeader {
                prg_rom_size: 32768,
                chr_rom_size: 8192,
                mapper_number: mapper,
                mirroring: Mirroring::Vertical,
                has_battery: false,
                has_trainer: false,
                nes2_format: false,
                prg_ram_size: 0,
            },
            trainer: None,
            prg_rom: vec![0; 32768],
            chr_rom: vec![0; 8192],
        }
    }

    #[test]
    fn creates_nrom() {
        let rom = test_rom(0);
        let mapper = create_mapper(&rom).unwrap();
        assert_eq!(mapper.mapper_number(), 0);
        assert_eq!(mapper.mapper_name(), "NROM");
    }

    #[test]
    fn rejects_unsupported_mapper() {
        let rom = test_rom(100);
        assert!(matches!(
            create_mapper(&rom),
            Err(RomError::UnsupportedMapper(100))
        ));
    }

    #[test]
    fn supported_mappers_lists_all_three() {
        assert!(is_mapper_supported(0));
        assert!(is_mapper_supported(2));
        assert!(is_mapper_supported(3));
        assert!(!is_mapper_supported(1));
    }
}
