//! The PPU: register decode, the per-dot state machine, and pixel
//! compositing.
//!
//! ```text
//! $2000: PPUCTRL   $2001: PPUMASK   $2002: PPUSTATUS
//! $2003: OAMADDR   $2004: OAMDATA
//! $2005: PPUSCROLL $2006: PPUADDR   $2007: PPUDATA
//! ```
//!
//! [`Ppu`] has no dependency on `nesc-core`: CHR/pattern-table access
//! (`$0000-$1FFF`) is routed through the [`PpuBus`] trait rather than
//! owned directly, so the console wires a cartridge mapper in without
//! this crate knowing mappers exist.

use crate::background::Background;
use crate::loopy::Loopy;
use crate::oam::{Oam, SecondaryOam};
use crate::palette;
use crate::registers::{PpuCtrl, PpuMask, PpuStatus};
use crate::sprites::{SpriteEvaluator, SpriteRenderer};
use crate::timing::Timing;
use crate::vram::{Mirroring, Vram};

/// Visible frame width in pixels.
pub const FRAME_WIDTH: usize = 256;
/// Visible frame height in pixels.
pub const FRAME_HEIGHT: usize = 240;

/// CHR/pattern-table access, supplied by whatever owns the cartridge
/// mapper. Addresses are always in `$0000-$1FFF`.
pub trait PpuBus {
    /// Read a byte of CHR ROM/RAM at `addr`.
    fn read(&mut self, addr: u16) -> u8;
    /// Write a byte of CHR RAM at `addr` (a no-op over CHR ROM).
    fn write(&mut self, addr: u16, value: u8);
}

/// The Ricoh 2C02-class PPU core.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ppu {
    ctrl: PpuCtrl,
    mask: PpuMask,
    status: PpuStatus,
    loopy: Loopy,

    vram: Vram,
    oam: Oam,

    background: Background,
    sprite_renderer: SpriteRenderer,
    sprite_evaluator: SpriteEvaluator,
    secondary_oam: SecondaryOam,

    timing: Timing,

    vram_read_buffer: u8,
    open_bus_latch: u8,
    decay_counter: u32,
    nmi_pending: bool,
}

impl Ppu {
    /// Open bus decays after roughly one second (~5.37M dots at the PPU's
    /// NTSC clock).
    const OPEN_BUS_DECAY_DOTS: u32 = 5_300_000;

    /// Create a new PPU wired for the given nametable mirroring.
    #[must_use]
    pub fn new(mirroring: Mirroring) -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            loopy: Loopy::new(),
            vram: Vram::new(mirroring),
            oam: Oam::new(),
            background: Background::new(),
            sprite_renderer: SpriteRenderer::new(),
            sprite_evaluator: SpriteEvaluator::new(),
            secondary_oam: SecondaryOam::new(),
            timing: Timing::new(),
            vram_read_buffer: 0,
            open_bus_latch: 0,
            decay_counter: 0,
            nmi_pending: false,
        }
    }

    #[inline]
    fn refresh_open_bus(&mut self) {
        self.decay_counter = Self::OPEN_BUS_DECAY_DOTS;
    }

    /// Whether `$2005`/`$2006` writes right now would land mid-scanline
    /// during active rendering, the pattern split-screen effects rely on.
    #[inline]
    fn is_visible_rendering_position(&self) -> bool {
        self.mask.rendering_enabled() && self.timing.is_visible_scanline() && self.timing.dot() > 0
    }

    /// Read a CPU-visible PPU register (`$2000-$2007`, mirrored every 8
    /// bytes through `$3FFF`).
    pub fn read_register(&mut self, addr: u16, bus: &mut impl PpuBus) -> u8 {
        match addr & 0x07 {
            0 | 1 | 3 | 5 | 6 => self.open_bus_latch,

            2 => {
                let status = self.status.bits();

                if self.timing.scanline() == 241 && self.timing.dot() == 1 {
                    self.nmi_pending = false;
                }

                self.status.clear_vblank();
                self.loopy.read_ppustatus();

                let result = (status & 0xE0) | (self.open_bus_latch & 0x1F);
                self.open_bus_latch = result;
                result
            }

            4 => {
                self.refresh_open_bus();
                let data = self.oam.read();
                self.open_bus_latch = data;
                data
            }

            7 => {
                self.refresh_open_bus();

                let addr = self.loopy.vram_addr();
                let data = if (addr & 0x3FFF) < 0x2000 {
                    bus.read(addr & 0x3FFF)
                } else {
                    self.vram.read(addr)
                };

                let result = if addr >= 0x3F00 {
                    let pal_data = (data & 0x3F) | (self.open_bus_latch & 0xC0);
                    self.vram_read_buffer = self.vram.read(addr - 0x1000);
                    pal_data
                } else {
                    let buffered = self.vram_read_buffer;
                    self.vram_read_buffer = data;
                    buffered
                };

                self.loopy.increment_vram(self.ctrl.vram_increment());
                self.open_bus_latch = result;
                result
            }

            _ => unreachable!(),
        }
    }

    /// Write a CPU-visible PPU register (`$2000-$2007`, mirrored every 8
    /// bytes through `$3FFF`).
    pub fn write_register(&mut self, addr: u16, value: u8, bus: &mut impl PpuBus) {
        self.open_bus_latch = value;
        self.refresh_open_bus();

        match addr & 0x07 {
            0 => {
                self.ctrl = PpuCtrl::from_bits_truncate(value);
                self.loopy.write_ppuctrl(value);

                if self.ctrl.nmi_enabled() && self.status.in_vblank() {
                    self.nmi_pending = true;
                }
            }

            1 => self.mask = PpuMask::from_bits_truncate(value),

            2 => {}

            3 => self.oam.set_addr(value),

            4 => self.oam.write(value),

            5 => {
                if self.is_visible_rendering_position() {
                    self.loopy.record_mid_scanline_write();
                }
                self.loopy.write_ppuscroll(value);
            }

            6 => {
                if self.is_visible_rendering_position() {
                    self.loopy.record_mid_scanline_write();
                }
                self.loopy.write_ppuaddr(value);
            }

            7 => {
                let addr = self.loopy.vram_addr();

                if (addr & 0x3FFF) < 0x2000 {
                    bus.write(addr & 0x3FFF, value);
                } else {
                    self.vram.write(addr, value);
                }

                self.loopy.increment_vram(self.ctrl.vram_increment());
            }

            _ => unreachable!(),
        }
    }

    /// Copy 256 bytes from CPU memory into OAM, as triggered by a write
    /// to `$4014`.
    pub fn oam_dma(&mut self, data: &[u8; 256]) {
        self.oam.dma_write(data);
    }

    /// Advance the PPU by one dot.
    ///
    /// Returns `Some((r, g, b))` on the dot that emits a visible pixel,
    /// `None` otherwise. Whether this tick asserted NMI is queried
    /// separately via [`Ppu::take_nmi`], matching how the console samples
    /// the CPU's other interrupt lines once per tick.
    #[allow(clippy::too_many_lines)]
    pub fn tick(&mut self, bus: &mut impl PpuBus) -> Option<(u8, u8, u8)> {
        if self.decay_counter > 0 {
            self.decay_counter -= 1;
            if self.decay_counter == 0 {
                self.open_bus_latch = 0;
            }
        }

        let rendering_enabled = self.mask.rendering_enabled();
        self.timing.tick(rendering_enabled);

        let scanline = self.timing.scanline();
        let dot = self.timing.dot();

        if self.timing.is_vblank_set_dot() {
            self.status.set_vblank();
            if self.ctrl.nmi_enabled() {
                self.nmi_pending = true;
            }
        }

        if self.timing.is_vblank_clear_dot() {
            self.status.clear_vblank();
            self.status.clear_sprite_flags();
            self.nmi_pending = false;
            self.loopy.start_frame();
        }

        let mut emitted_pixel = None;

        if rendering_enabled && self.timing.is_rendering_scanline() {
            if self.timing.is_visible_dot() || self.timing.is_prefetch_dot() {
                self.background.shift_registers();
                self.run_background_fetch(dot, bus);

                if dot == 256 {
                    self.loopy.increment_y();
                }
            }

            if self.timing.is_visible_dot() {
                self.sprite_renderer.tick();
            }

            if self.timing.is_hori_copy_dot() {
                self.loopy.copy_horizontal();
            }

            if self.timing.is_vert_copy_range() {
                self.loopy.copy_vertical();
            }

            if self.timing.is_visible_scanline() {
                if self.timing.is_sprite_eval_start() {
                    self.sprite_evaluator.start_evaluation();
                    self.secondary_oam.clear();
                }

                if self.timing.is_sprite_eval_range() {
                    self.sprite_evaluator.evaluate_step(
                        self.oam.data(),
                        scanline + 1,
                        self.ctrl.sprite_height(),
                        &mut self.secondary_oam,
                    );
                }
            }

            if self.timing.is_sprite_fetch_start() {
                let sprite_zero_in_range = self.sprite_evaluator.sprite_zero_in_range();
                self.sprite_renderer
                    .load_sprites(&self.secondary_oam, sprite_zero_in_range);
            }

            if self.timing.is_sprite_fetch_range() {
                self.run_sprite_fetch(scanline, dot, bus);
            }

            if self.timing.is_visible_scanline() && self.timing.is_visible_dot() {
                let x = (dot - 1) as usize;
                emitted_pixel = Some(self.compose_pixel(x));
            }
        }

        emitted_pixel
    }

    /// Whether an NMI is pending, clearing the latch in the same step.
    #[inline]
    pub fn take_nmi(&mut self) -> bool {
        let nmi = self.nmi_pending;
        self.nmi_pending = false;
        nmi
    }

    fn run_background_fetch(&mut self, dot: u16, bus: &mut impl PpuBus) {
        match dot % 8 {
            1 => {
                let tile_index = self.vram.read(self.loopy.nametable_addr());
                self.background.set_nametable_byte(tile_index);
            }
            3 => {
                let attr_byte = self.vram.read(self.loopy.attribute_addr());
                self.background.set_attribute_byte(
                    attr_byte,
                    self.loopy.coarse_x(),
                    self.loopy.coarse_y(),
                );
            }
            5 => {
                let bg_base = self.ctrl.bg_table_addr();
                let tile_index = self.background.nametable_byte();
                let pattern_addr = self.loopy.pattern_addr(tile_index, bg_base);
                self.background.set_pattern_low(bus.read(pattern_addr));
            }
            7 => {
                let bg_base = self.ctrl.bg_table_addr();
                let tile_index = self.background.nametable_byte();
                let pattern_addr = self.loopy.pattern_addr(tile_index, bg_base) + 8;
                self.background.set_pattern_high(bus.read(pattern_addr));
            }
            0 => {
                self.background.load_shift_registers();
                self.loopy.increment_x();
            }
            _ => {}
        }
    }

    fn run_sprite_fetch(&mut self, scanline: u16, dot: u16, bus: &mut impl PpuBus) {
        let fetch_cycle = dot - 257;
        let sprite_index = fetch_cycle / 8;
        let fetch_step = fetch_cycle % 8;

        if fetch_step != 7 {
            return;
        }

        let Some(sprite) = self.secondary_oam.get_sprite(sprite_index as u8) else {
            return;
        };

        let sprite_base = self.ctrl.sprite_table_addr();
        let next_scanline = scanline + 1;
        let sprite_y = next_scanline.saturating_sub(u16::from(sprite.y)).min(7);

        let row = if sprite.attributes.flip_vertical() {
            7 - sprite_y
        } else {
            sprite_y
        };

        let pattern_addr_low = sprite_base + u16::from(sprite.tile_index) * 16 + row;
        let mut pattern_low = bus.read(pattern_addr_low);
        let mut pattern_high = bus.read(pattern_addr_low + 8);

        if sprite.attributes.flip_horizontal() {
            pattern_low = pattern_low.reverse_bits();
            pattern_high = pattern_high.reverse_bits();
        }

        self.sprite_renderer
            .load_sprite_pattern(sprite_index as u8, pattern_low, pattern_high);
    }

    fn compose_pixel(&mut self, x: usize) -> (u8, u8, u8) {
        let (mut bg_pixel, mut bg_palette) = (0, 0);
        if self.mask.show_background() && (x >= 8 || self.mask.show_bg_left()) {
            let fine_x = self.loopy.fine_x();
            (bg_pixel, bg_palette) = self.background.get_pixel(fine_x);
        }

        let (mut sprite_pixel, mut sprite_palette, mut sprite_priority, mut sprite_zero) =
            (0, 0, false, false);
        if self.mask.show_sprites() && (x >= 8 || self.mask.show_sprites_left()) {
            if let Some((pixel, palette_idx, priority, is_sprite_zero)) =
                self.sprite_renderer.get_pixel()
            {
                sprite_pixel = pixel;
                sprite_palette = palette_idx;
                sprite_priority = priority;
                sprite_zero = is_sprite_zero;
            }
        }

        if sprite_zero && bg_pixel != 0 && sprite_pixel != 0 {
            self.status.set_sprite_zero_hit();
        }

        let (final_pixel, final_palette) = if bg_pixel == 0 && sprite_pixel == 0 {
            (0, 0)
        } else if bg_pixel == 0 {
            (sprite_pixel, sprite_palette)
        } else if sprite_pixel == 0 {
            (bg_pixel, bg_palette)
        } else if sprite_priority {
            (bg_pixel, bg_palette)
        } else {
            (sprite_pixel, sprite_palette)
        };

        let palette_addr = (final_palette << 2) | final_pixel;
        let color_index = self.vram.read_palette(palette_addr);
        palette::to_rgb(color_index)
    }

    /// Change nametable mirroring, e.g. after swapping cartridges.
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.vram.set_mirroring(mirroring);
    }

    /// Reset to power-up state.
    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.status = PpuStatus::empty();
        self.loopy = Loopy::new();
        self.vram.reset();
        self.oam.reset();
        self.background.reset();
        self.sprite_renderer.reset();
        self.timing.reset();
        self.vram_read_buffer = 0;
        self.open_bus_latch = 0;
        self.decay_counter = 0;
        self.nmi_pending = false;
    }

    /// Current scanline (0-261).
    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.timing.scanline()
    }

    /// Current dot within the scanline (0-340).
    #[must_use]
    pub fn dot(&self) -> u16 {
        self.timing.dot()
    }

    /// Current VRAM address (the `v` loopy register).
    #[must_use]
    pub fn vram_addr(&self) -> u16 {
        self.loopy.vram_addr()
    }

    /// Temporary VRAM address (the `t` loopy register).
    #[must_use]
    pub fn temp_vram_addr(&self) -> u16 {
        self.loopy.temp_vram_addr()
    }

    /// Fine X scroll (0-7).
    #[must_use]
    pub fn fine_x(&self) -> u8 {
        self.loopy.fine_x()
    }

    /// Coarse X scroll (tile column, 0-31).
    #[must_use]
    pub fn coarse_x(&self) -> u8 {
        self.loopy.coarse_x()
    }

    /// Coarse Y scroll (tile row, 0-31).
    #[must_use]
    pub fn coarse_y(&self) -> u8 {
        self.loopy.coarse_y()
    }

    /// Fine Y scroll (pixel row within a tile, 0-7).
    #[must_use]
    pub fn fine_y(&self) -> u8 {
        self.loopy.fine_y()
    }

    /// Whether a `$2005`/`$2006` write landed mid-scanline this frame; games
    /// like Super Mario Bros. 3 use this for a split-screen status bar.
    #[must_use]
    pub fn mid_scanline_write_detected(&self) -> bool {
        self.loopy.mid_scanline_write_detected()
    }

    /// The VRAM address just before the last recorded mid-scanline write.
    #[must_use]
    pub fn last_v_before_update(&self) -> u16 {
        self.loopy.last_v_before_update()
    }
}
