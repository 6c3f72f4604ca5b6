//! Object Attribute Memory: primary 256-byte sprite table, secondary
//! per-scanline table, and the sprite record they're built from.
//!
//! ```text
//! Byte 0: Y position (top of sprite, minus 1)
//! Byte 1: Tile index
//! Byte 2: Attributes
//!   76543210
//!   |||   ||
//!   |||   ++- Palette (4 to 7) of sprite
//!   |||
//!   ||+------ Priority (0: in front of background; 1: behind background)
//!   |+------- Flip horizontally
//!   +-------- Flip vertically
//! Byte 3: X position (left edge of sprite)
//! ```
//!
//! The CPU can write OAM one byte at a time via `$2004`, or copy all 256
//! bytes at once via the `$4014` OAM DMA trigger; [`Oam::dma_write`] models
//! the latter.

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// Sprite attribute byte (byte 2 of a 4-byte OAM entry).
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpriteAttributes: u8 {
        /// Palette index bit 0 (selects among sprite palettes 4-7).
        const PALETTE_0 = 0b0000_0001;
        /// Palette index bit 1.
        const PALETTE_1 = 0b0000_0010;
        /// Priority: clear draws in front of the background, set behind it.
        const PRIORITY = 0b0010_0000;
        /// Flip the sprite horizontally.
        const FLIP_HORIZONTAL = 0b0100_0000;
        /// Flip the sprite vertically.
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    /// Sprite palette index, 4-7.
    #[inline]
    #[must_use]
    pub fn palette(self) -> u8 {
        (self.bits() & 0x03) + 4
    }

    /// Whether the sprite draws behind the background.
    #[inline]
    #[must_use]
    pub fn behind_background(self) -> bool {
        self.contains(Self::PRIORITY)
    }

    /// Whether the sprite is flipped horizontally.
    #[inline]
    #[must_use]
    pub fn flip_horizontal(self) -> bool {
        self.contains(Self::FLIP_HORIZONTAL)
    }

    /// Whether the sprite is flipped vertically.
    #[inline]
    #[must_use]
    pub fn flip_vertical(self) -> bool {
        self.contains(Self::FLIP_VERTICAL)
    }
}

/// One 4-byte OAM entry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    /// Y position (top of sprite, minus 1).
    pub y: u8,
    /// Tile index into the sprite pattern table.
    pub tile_index: u8,
    /// Attribute byte.
    pub attributes: SpriteAttributes,
    /// X position of the sprite's left edge.
    pub x: u8,
}

impl Sprite {
    /// Parse a sprite from its raw 4-byte OAM encoding.
    #[inline]
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 4]) -> Self {
        Self {
            y: bytes[0],
            tile_index: bytes[1],
            attributes: SpriteAttributes::from_bits_truncate(bytes[2]),
            x: bytes[3],
        }
    }

    /// Encode the sprite back to its raw 4-byte OAM form.
    #[inline]
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.y, self.tile_index, self.attributes.bits(), self.x]
    }

    /// Whether this sprite's row range covers `scanline`.
    ///
    /// `y` stores the sprite's top edge minus one, so the actual top
    /// scanline is `y + 1`.
    #[inline]
    #[must_use]
    pub fn is_on_scanline(&self, scanline: u16, sprite_height: u8) -> bool {
        let top = u16::from(self.y).wrapping_add(1);
        let height = u16::from(sprite_height);
        scanline >= top && scanline < top.wrapping_add(height) && top < 240
    }
}

/// Primary OAM: 64 sprites, 256 bytes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Oam {
    data: Vec<u8>,
    addr: u8,
}

impl Oam {
    /// Create a new, zeroed OAM table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0; 256],
            addr: 0,
        }
    }

    /// Read the byte at the current OAMADDR.
    ///
    /// Bits 2-4 of the attribute byte (offset `% 4 == 2`) don't physically
    /// exist in OAM and always read back as zero.
    #[must_use]
    pub fn read(&self) -> u8 {
        let value = self.data[self.addr as usize];
        if self.addr % 4 == 2 {
            value & 0xE3
        } else {
            value
        }
    }

    /// Write a byte at the current OAMADDR and auto-increment it.
    pub fn write(&mut self, value: u8) {
        self.data[self.addr as usize] = value;
        self.addr = self.addr.wrapping_add(1);
    }

    /// The current OAMADDR.
    #[inline]
    #[must_use]
    pub fn get_addr(&self) -> u8 {
        self.addr
    }

    /// Set OAMADDR directly.
    #[inline]
    pub fn set_addr(&mut self, addr: u8) {
        self.addr = addr;
    }

    /// OAM DMA: copy 256 bytes starting at the current OAMADDR, wrapping
    /// around the 256-byte table.
    pub fn dma_write(&mut self, data: &[u8; 256]) {
        let start = self.addr as usize;

        if start == 0 {
            self.data.copy_from_slice(data);
        } else {
            let first_len = 256 - start;
            self.data[start..].copy_from_slice(&data[..first_len]);
            self.data[..start].copy_from_slice(&data[first_len..]);
        }
    }

    /// The sprite at table index (0-63).
    #[inline]
    #[must_use]
    pub fn get_sprite(&self, index: u8) -> Sprite {
        let offset = (index as usize) * 4;
        let bytes = [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ];
        Sprite::from_bytes(&bytes)
    }

    /// Overwrite the sprite at table index (0-63).
    #[inline]
    pub fn set_sprite(&mut self, index: u8, sprite: &Sprite) {
        let offset = (index as usize) * 4;
        self.data[offset..offset + 4].copy_from_slice(&sprite.to_bytes());
    }

    /// Raw 256-byte backing storage, for sprite evaluation.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reset to power-up state: all `$FF`, OAMADDR 0.
    pub fn reset(&mut self) {
        self.data.fill(0xFF);
        self.addr = 0;
    }

    /// Fill with `$FF` without resetting OAMADDR.
    pub fn clear(&mut self) {
        self.data.fill(0xFF);
    }
}

impl Default for Oam {
    fn default() -> Self {
        Self::new()
    }
}

/// Secondary OAM: up to 8 sprites selected for the next scanline.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SecondaryOam {
    data: Vec<u8>,
    count: u8,
}

impl SecondaryOam {
    /// Create a new secondary OAM, filled with `$FF`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; 32],
            count: 0,
        }
    }

    /// Clear for a new scanline's evaluation pass.
    pub fn clear(&mut self) {
        self.data.fill(0xFF);
        self.count = 0;
    }

    /// Append a sprite's raw bytes. Returns false once 8 sprites are
    /// already present, signalling a sprite-overflow condition.
    pub fn add_sprite(&mut self, sprite_data: &[u8; 4]) -> bool {
        if self.count >= 8 {
            return false;
        }

        let offset = (self.count as usize) * 4;
        self.data[offset..offset + 4].copy_from_slice(sprite_data);
        self.count += 1;
        true
    }

    /// The sprite at secondary-OAM index, if evaluation placed one there.
    #[inline]
    #[must_use]
    pub fn get_sprite(&self, index: u8) -> Option<Sprite> {
        if index >= self.count {
            return None;
        }

        let offset = (index as usize) * 4;
        let bytes = [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ];
        Some(Sprite::from_bytes(&bytes))
    }

    /// Number of sprites placed for the upcoming scanline (0-8).
    #[inline]
    #[must_use]
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Whether all 8 slots are filled.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count >= 8
    }
}

impl Default for SecondaryOam {
    fn default() -> Self {
        Self::new()
    }
}
