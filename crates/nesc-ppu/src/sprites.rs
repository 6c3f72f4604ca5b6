//! Sprite rendering and evaluation.
//!
//! The PPU can track 64 sprites but only display 8 per scanline.
//! Evaluation (dots 65-256) scans primary OAM for sprites that intersect
//! the *next* scanline and copies up to 8 of them into secondary OAM;
//! rendering (dots 257-320 onward) fetches their pattern data and shifts
//! it out alongside the background.
//!
//! ```text
//! 1. Clear secondary OAM                         (dots 1-64)
//! 2. Scan primary OAM for sprites in range        (dots 65-256)
//! 3. Copy up to 8 matches into secondary OAM
//! 4. Set sprite overflow if a 9th match is found
//! 5. Note whether sprite 0 landed in secondary OAM
//! ```

use crate::oam::{SecondaryOam, Sprite, SpriteAttributes};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Holds the 8 sprites selected for the current scanline and shifts out
/// their pixels one dot at a time.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpriteRenderer {
    sprites: Vec<Option<Sprite>>,
    pattern_shift_low: [u8; 8],
    pattern_shift_high: [u8; 8],
    attributes: [SpriteAttributes; 8],
    x_counters: [u8; 8],
    sprite_count: u8,
    sprite_zero_on_scanline: bool,
}

impl SpriteRenderer {
    /// Create a new, empty sprite renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sprites: vec![None; 8],
            pattern_shift_low: [0; 8],
            pattern_shift_high: [0; 8],
            attributes: [SpriteAttributes::empty(); 8],
            x_counters: [0; 8],
            sprite_count: 0,
            sprite_zero_on_scanline: false,
        }
    }

    /// Load the sprites selected by evaluation for the upcoming scanline.
    pub fn load_sprites(&mut self, secondary_oam: &SecondaryOam, sprite_zero_in_range: bool) {
        self.sprite_count = secondary_oam.count();
        self.sprite_zero_on_scanline = sprite_zero_in_range;

        for i in 0..8 {
            if let Some(sprite) = secondary_oam.get_sprite(i) {
                self.sprites[i as usize] = Some(sprite);
                self.attributes[i as usize] = sprite.attributes;
                self.x_counters[i as usize] = sprite.x;
            } else {
                self.sprites[i as usize] = None;
            }
        }
    }

    /// Latch a sprite's fetched pattern bitplanes. The caller applies
    /// horizontal flip (bit-reversal) and vertical flip (row selection)
    /// before calling this, since vertical flip changes which CHR row
    /// gets fetched in the first place.
    ///
    /// Called during the sprite fetch window (dots 257-320).
    pub fn load_sprite_pattern(&mut self, sprite_index: u8, pattern_low: u8, pattern_high: u8) {
        let index = sprite_index as usize;
        if index >= self.sprites.len() {
            return;
        }

        self.pattern_shift_low[index] = pattern_low;
        self.pattern_shift_high[index] = pattern_high;
    }

    /// Advance every sprite by one dot: counters above zero tick down
    /// towards activation, active sprites shift their pattern left.
    ///
    /// Called every dot during visible scanlines.
    pub fn tick(&mut self) {
        for i in 0..8 {
            if self.x_counters[i] == 0 {
                self.pattern_shift_low[i] <<= 1;
                self.pattern_shift_high[i] <<= 1;
            } else {
                self.x_counters[i] -= 1;
            }
        }
    }

    /// The highest-priority opaque sprite pixel at the current dot, if
    /// any: `(pixel, palette, behind_background, is_sprite_zero)`.
    #[must_use]
    pub fn get_pixel(&self) -> Option<(u8, u8, bool, bool)> {
        for i in 0..self.sprite_count as usize {
            if self.x_counters[i] != 0 {
                continue;
            }

            let pattern_low_bit = u8::from(self.pattern_shift_low[i] & 0x80 != 0);
            let pattern_high_bit = u8::from(self.pattern_shift_high[i] & 0x80 != 0);
            let pixel = pattern_low_bit | (pattern_high_bit << 1);

            if pixel == 0 {
                continue;
            }

            let palette = self.attributes[i].palette();
            let priority = self.attributes[i].behind_background();
            let is_sprite_zero = i == 0 && self.sprite_zero_on_scanline;

            return Some((pixel, palette, priority, is_sprite_zero));
        }

        None
    }

    /// Whether sprite 0 landed in secondary OAM for this scanline.
    #[inline]
    #[must_use]
    pub fn sprite_zero_on_scanline(&self) -> bool {
        self.sprite_zero_on_scanline
    }

    /// Reset to power-up state.
    pub fn reset(&mut self) {
        self.sprites.fill(None);
        self.pattern_shift_low.fill(0);
        self.pattern_shift_high.fill(0);
        self.attributes.fill(SpriteAttributes::empty());
        self.x_counters.fill(0);
        self.sprite_count = 0;
        self.sprite_zero_on_scanline = false;
    }

    /// Clear the scanline's active sprites without a full reset.
    pub fn clear_scanline(&mut self) {
        self.sprites.fill(None);
        self.pattern_shift_low.fill(0);
        self.pattern_shift_high.fill(0);
        self.x_counters.fill(0);
        self.sprite_count = 0;
        self.sprite_zero_on_scanline = false;
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum EvalPhase {
    /// Scanning primary OAM for sprites in range.
    Scanning,
    /// Secondary OAM is full; still scanning to detect overflow.
    OverflowCheck,
    /// Evaluation for this scanline is complete.
    Done,
}

/// Scans primary OAM, dot by dot, to fill secondary OAM for the next
/// scanline and detect sprite overflow / sprite-zero-in-range.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpriteEvaluator {
    current_sprite: u8,
    current_byte: u8,
    phase: EvalPhase,
    overflow: bool,
    sprite_zero_in_range: bool,
}

impl SpriteEvaluator {
    /// Create a new evaluator, ready to start evaluation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_sprite: 0,
            current_byte: 0,
            phase: EvalPhase::Scanning,
            overflow: false,
            sprite_zero_in_range: false,
        }
    }

    /// Reset evaluation state for the next scanline.
    pub fn start_evaluation(&mut self) {
        self.current_sprite = 0;
        self.current_byte = 0;
        self.phase = EvalPhase::Scanning;
        self.overflow = false;
        self.sprite_zero_in_range = false;
    }

    /// Perform one sprite's worth of evaluation work. Returns `true` while
    /// evaluation is still in progress, `false` once it's done.
    pub fn evaluate_step(
        &mut self,
        oam_data: &[u8],
        scanline: u16,
        sprite_height: u8,
        secondary_oam: &mut SecondaryOam,
    ) -> bool {
        match self.phase {
            EvalPhase::Scanning => {
                if self.current_sprite >= 64 {
                    self.phase = EvalPhase::Done;
                    return false;
                }

                let sprite_index = self.current_sprite as usize;
                let y = oam_data[sprite_index * 4];

                // OAM stores Y minus one; a sprite whose actual top falls
                // at or past scanline 240 never appears on a visible line.
                let sprite_top = u16::from(y).wrapping_add(1);
                let height = u16::from(sprite_height);

                if sprite_top >= 240 {
                    self.current_sprite += 1;
                    return true;
                }

                if scanline >= sprite_top && scanline < sprite_top.wrapping_add(height) {
                    let sprite_data = [
                        oam_data[sprite_index * 4],
                        oam_data[sprite_index * 4 + 1],
                        oam_data[sprite_index * 4 + 2],
                        oam_data[sprite_index * 4 + 3],
                    ];

                    if secondary_oam.add_sprite(&sprite_data) {
                        if self.current_sprite == 0 {
                            self.sprite_zero_in_range = true;
                        }
                    } else {
                        self.phase = EvalPhase::OverflowCheck;
                        self.overflow = true;
                    }
                }

                self.current_sprite += 1;
                true
            }

            EvalPhase::OverflowCheck => {
                if self.current_sprite >= 64 {
                    self.phase = EvalPhase::Done;
                }
                self.current_sprite += 1;
                true
            }

            EvalPhase::Done => false,
        }
    }

    /// Whether more than 8 sprites matched the current scanline.
    #[inline]
    #[must_use]
    pub fn overflow(&self) -> bool {
        self.overflow
    }

    /// Whether sprite 0 was among the sprites selected this scanline.
    #[inline]
    #[must_use]
    pub fn sprite_zero_in_range(&self) -> bool {
        self.sprite_zero_in_range
    }
}

impl Default for SpriteEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_sprites_copies_secondary_oam_into_counters() {
        let mut renderer = SpriteRenderer::new();
        let mut secondary_oam = SecondaryOam::new();

        let sprite_data = [50, 0x42, 0x01, 100];
        secondary_oam.add_sprite(&sprite_data);

        renderer.load_sprites(&secondary_oam, true);

        assert_eq!(renderer.sprite_count, 1);
        assert!(renderer.sprite_zero_on_scanline);
        assert_eq!(renderer.x_counters[0], 100);
    }

    #[test]
    fn tick_counts_down_then_shifts_once_active() {
        let mut renderer = SpriteRenderer::new();

        renderer.x_counters[0] = 2;
        renderer.pattern_shift_low[0] = 0b1010_1010;

        renderer.tick();
        assert_eq!(renderer.x_counters[0], 1);
        assert_eq!(renderer.pattern_shift_low[0], 0b1010_1010);

        renderer.tick();
        assert_eq!(renderer.x_counters[0], 0);

        renderer.tick();
        assert_eq!(renderer.pattern_shift_low[0], 0b0101_0100);
    }

    #[test]
    fn load_sprite_pattern_latches_bytes_verbatim() {
        let mut renderer = SpriteRenderer::new();

        renderer.load_sprite_pattern(0, 0b1000_0001, 0b0000_1111);

        assert_eq!(renderer.pattern_shift_low[0], 0b1000_0001);
        assert_eq!(renderer.pattern_shift_high[0], 0b0000_1111);
    }

    #[test]
    fn get_pixel_returns_highest_priority_opaque_sprite() {
        let mut renderer = SpriteRenderer::new();

        renderer.sprite_count = 2;
        renderer.x_counters[0] = 0;
        renderer.x_counters[1] = 1;

        renderer.pattern_shift_low[0] = 0b1000_0000;
        renderer.pattern_shift_high[0] = 0b1000_0000;
        renderer.attributes[0] = SpriteAttributes::from_bits_truncate(0x01);
        renderer.sprite_zero_on_scanline = true;

        let (pixel, palette, priority, sprite_zero) = renderer.get_pixel().unwrap();
        assert_eq!(pixel, 0b11);
        assert_eq!(palette, 5);
        assert!(!priority);
        assert!(sprite_zero);
    }

    #[test]
    fn get_pixel_is_none_when_all_sprites_are_transparent() {
        let mut renderer = SpriteRenderer::new();

        renderer.sprite_count = 1;
        renderer.x_counters[0] = 0;
        renderer.pattern_shift_low[0] = 0;
        renderer.pattern_shift_high[0] = 0;

        assert!(renderer.get_pixel().is_none());
    }

    #[test]
    fn evaluator_places_a_matching_sprite_in_secondary_oam() {
        let mut evaluator = SpriteEvaluator::new();
        let mut secondary_oam = SecondaryOam::new();

        let mut oam_data = vec![0xFF; 256];
        oam_data[0] = 50;
        oam_data[1] = 0x42;
        oam_data[2] = 0x00;
        oam_data[3] = 100;

        evaluator.start_evaluation();

        let step = evaluator.evaluate_step(&oam_data, 51, 8, &mut secondary_oam);
        assert!(step);
        assert_eq!(secondary_oam.count(), 1);
        assert!(evaluator.sprite_zero_in_range());
    }

    #[test]
    fn evaluator_skips_sprites_outside_the_scanline() {
        let mut evaluator = SpriteEvaluator::new();
        let mut secondary_oam = SecondaryOam::new();

        let mut oam_data = vec![0xFF; 256];
        oam_data[0] = 50;

        evaluator.start_evaluation();
        evaluator.evaluate_step(&oam_data, 100, 8, &mut secondary_oam);

        assert_eq!(secondary_oam.count(), 0);
        assert!(!evaluator.sprite_zero_in_range());
    }

    #[test]
    fn evaluator_sets_overflow_past_eight_matches() {
        let mut evaluator = SpriteEvaluator::new();
        let mut secondary_oam = SecondaryOam::new();

        let mut oam_data = vec![0xFF; 256];
        for i in 0..10 {
            oam_data[i * 4] = 50;
        }

        evaluator.start_evaluation();

        for _ in 0..10 {
            evaluator.evaluate_step(&oam_data, 51, 8, &mut secondary_oam);
        }

        assert_eq!(secondary_oam.count(), 8);
        assert!(evaluator.overflow());
    }

    #[test]
    fn sprites_parked_at_y_255_never_appear_on_screen() {
        let mut evaluator = SpriteEvaluator::new();
        let mut secondary_oam = SecondaryOam::new();

        let mut oam_data = vec![0xFF; 256];
        oam_data[0] = 255;
        oam_data[1] = 0x42;
        oam_data[2] = 0x00;
        oam_data[3] = 100;

        for scanline in 0..240 {
            evaluator.start_evaluation();
            secondary_oam.clear();

            evaluator.evaluate_step(&oam_data, scanline, 8, &mut secondary_oam);

            assert_eq!(
                secondary_oam.count(),
                0,
                "sprite at Y=255 should not appear on scanline {scanline}"
            );
            assert!(!evaluator.sprite_zero_in_range());
        }
    }

    #[test]
    fn a_sprite_at_y_239_falls_entirely_off_the_visible_area() {
        let mut evaluator = SpriteEvaluator::new();
        let mut secondary_oam = SecondaryOam::new();

        let mut oam_data = vec![0xFF; 256];
        oam_data[0] = 239;

        evaluator.start_evaluation();
        evaluator.evaluate_step(&oam_data, 100, 8, &mut secondary_oam);

        assert_eq!(secondary_oam.count(), 0);
        assert!(!evaluator.sprite_zero_in_range());
    }
}
