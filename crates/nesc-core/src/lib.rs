//! NES emulation core: integrates the CPU, PPU, APU, and mapper crates
//! behind a single [`System`] facade.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          System                             │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │                      NesBus                          │   │
//! │  │  ┌─────┐  ┌─────┐  ┌─────┐  ┌────────┐  ┌────────┐ │   │
//! │  │  │ RAM │  │ PPU │  │ APU │  │ Mapper │  │Controllers│ │   │
//! │  │  │ 2KB │  │     │  │     │  │        │  │          │ │   │
//! │  │  └─────┘  └─────┘  └─────┘  └────────┘  └────────┘ │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! │                          ▲                                  │
//! │                          │                                  │
//! │                     ┌────┴────┐                             │
//! │                     │   CPU   │                             │
//! │                     │  6502   │                             │
//! │                     └─────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use nesc_core::System;
//! use nesc_core::controller::{Controller, Button};
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut system = System::new();
//! system.load_cartridge(&rom_data).expect("failed to load cartridge");
//!
//! let mut pad = Controller::new();
//! pad.press(Button::Start);
//! system.connect_controller(0, pad);
//!
//! loop {
//!     system.step_frame();
//! }
//! ```
//!
//! # Features
//!
//! - `std` (default): enable standard library support across the whole
//!   workspace.
//! - `serde`: enable serialization, including [`save_state::SaveState`].

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod bus;
pub mod controller;
pub mod save_state;
pub mod sink;
mod system;

pub use bus::NesBus;
pub use controller::{Button, Controller};
#[cfg(feature = "serde")]
pub use save_state::SaveState;
pub use sink::{AudioSink, FrameSink};
pub use system::{ConsoleError, System, timing};

pub use nesc_apu::Apu;
pub use nesc_cpu::Cpu;
pub use nesc_mappers::{Mapper, Mirroring, Rom, RomError, RomHeader, create_mapper};
pub use nesc_ppu::{NES_PALETTE, Ppu, palette_to_rgb};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NES screen dimensions.
pub mod screen {
    /// Screen width in pixels.
    pub const WIDTH: u32 = 256;
    /// Screen height in pixels.
    pub const HEIGHT: u32 = 240;
    /// Total pixels per frame.
    pub const PIXELS: u32 = WIDTH * HEIGHT;
}
