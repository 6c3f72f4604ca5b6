//! NES-class 2C02 PPU emulation: dot-accurate timing, the background and
//! sprite pixel pipelines, VRAM/palette memory, and the CPU-visible
//! `$2000-$2007` register file.
//!
//! This crate has no dependency on a cartridge/mapper crate: pattern-table
//! (CHR) access is routed through the [`PpuBus`] trait, which whatever
//! owns the mapper implements.
//!
//! # Example
//!
//! ```
//! use nesc_ppu::{Mirroring, Ppu, PpuBus};
//!
//! struct Chr(Vec<u8>);
//!
//! impl PpuBus for Chr {
//!     fn read(&mut self, addr: u16) -> u8 {
//!         self.0[addr as usize]
//!     }
//!     fn write(&mut self, addr: u16, value: u8) {
//!         self.0[addr as usize] = value;
//!     }
//! }
//!
//! let mut ppu = Ppu::new(Mirroring::Horizontal);
//! let mut bus = Chr(vec![0; 0x2000]);
//!
//! ppu.write_register(0x2000, 0x80, &mut bus); // enable NMI
//! ppu.write_register(0x2001, 0x1E, &mut bus); // enable rendering
//!
//! if let Some((_r, _g, _b)) = ppu.tick(&mut bus) {
//!     // a pixel was just emitted
//! }
//! ```
//!
//! # Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` on save-state-relevant types.
//! - `std` (default): no behavioral effect today; reserved for parity with
//!   the rest of the workspace's feature conventions.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod background;
mod loopy;
mod oam;
mod palette;
mod ppu;
mod registers;
mod sprites;
mod timing;
mod vram;

pub use oam::{SecondaryOam, Sprite, SpriteAttributes};
pub use palette::{NES_PALETTE, to_rgb as palette_to_rgb};
pub use ppu::{FRAME_HEIGHT, FRAME_WIDTH, Ppu, PpuBus};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use vram::{Mirroring, Vram};
