//! Dot/scanline state machine.
//!
//! The PPU advances one dot at a time:
//! - 341 dots per scanline (NTSC)
//! - 262 scanlines per frame (NTSC)
//! - 89,341-89,342 dots per frame (odd-frame dot skip)
//!
//! ```text
//! Scanline   Description
//! --------   -----------
//! 0-239      Visible scanlines (rendering)
//! 240        Post-render scanline (idle)
//! 241        VBlank start (dot 1: set VBlank flag, maybe trigger NMI)
//! 242-260    VBlank scanlines (idle)
//! 261        Pre-render scanline (clear VBlank and sprite flags)
//! ```
//!
//! ```text
//! Dot        Action (scanlines 0-239, 261)
//! ---        ------
//! 0          Idle
//! 1-256      Fetch tile data, render pixels
//! 257        Copy horizontal scroll bits from t to v
//! 258-320    Sprite fetching for the next scanline
//! 321-336    Fetch the first two tiles of the next scanline
//! 337-340    Unused nametable fetches
//! ```
//!
//! On odd frames, with rendering enabled, dot 339 of the pre-render
//! scanline is skipped, making that frame one dot shorter than an even one.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dot/scanline/frame counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    /// Current scanline (0-261).
    scanline: u16,
    /// Current dot within the scanline (0-340).
    dot: u16,
    /// Frame counter; only its parity matters for the odd-frame skip.
    frame: u64,
}

impl Timing {
    /// Power-up state: scanline 0, dot 0, frame 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scanline: 0,
            dot: 0,
            frame: 0,
        }
    }

    /// Current scanline (0-261).
    #[inline]
    #[must_use]
    pub const fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current dot within the scanline (0-340).
    #[inline]
    #[must_use]
    pub const fn dot(&self) -> u16 {
        self.dot
    }

    /// Frames completed since power-up/reset.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether the current frame is odd.
    #[inline]
    #[must_use]
    pub const fn is_odd_frame(&self) -> bool {
        self.frame % 2 == 1
    }

    /// Whether the current scanline is a visible one (0-239).
    #[inline]
    #[must_use]
    pub const fn is_visible_scanline(&self) -> bool {
        self.scanline < 240
    }

    /// Whether the current scanline is the pre-render scanline (261).
    #[inline]
    #[must_use]
    pub const fn is_prerender_scanline(&self) -> bool {
        self.scanline == 261
    }

    /// Whether the current scanline is the post-render scanline (240).
    #[inline]
    #[must_use]
    pub const fn is_postrender_scanline(&self) -> bool {
        self.scanline == 240
    }

    /// Whether the current scanline is in the vblank range (241-260).
    #[inline]
    #[must_use]
    pub const fn is_vblank_scanline(&self) -> bool {
        self.scanline >= 241 && self.scanline <= 260
    }

    /// Whether background/sprite fetches happen on this scanline (visible
    /// or pre-render).
    #[inline]
    #[must_use]
    pub const fn is_rendering_scanline(&self) -> bool {
        self.is_visible_scanline() || self.is_prerender_scanline()
    }

    /// Whether the current dot emits a pixel (1-256).
    #[inline]
    #[must_use]
    pub const fn is_visible_dot(&self) -> bool {
        self.dot >= 1 && self.dot <= 256
    }

    /// Whether the current dot prefetches the next scanline's first two
    /// tiles (321-336).
    #[inline]
    #[must_use]
    pub const fn is_prefetch_dot(&self) -> bool {
        self.dot >= 321 && self.dot <= 336
    }

    /// Whether this dot sets the vblank flag (scanline 241, dot 1).
    #[inline]
    #[must_use]
    pub const fn is_vblank_set_dot(&self) -> bool {
        self.scanline == 241 && self.dot == 1
    }

    /// Whether this dot clears vblank and the sprite flags (scanline 261,
    /// dot 1).
    #[inline]
    #[must_use]
    pub const fn is_vblank_clear_dot(&self) -> bool {
        self.scanline == 261 && self.dot == 1
    }

    /// Whether this dot copies horizontal scroll bits from t to v (257).
    #[inline]
    #[must_use]
    pub const fn is_hori_copy_dot(&self) -> bool {
        self.dot == 257
    }

    /// Whether this dot is in the vertical-copy window of the pre-render
    /// scanline (280-304).
    #[inline]
    #[must_use]
    pub const fn is_vert_copy_range(&self) -> bool {
        self.is_prerender_scanline() && self.dot >= 280 && self.dot <= 304
    }

    /// Whether this dot starts sprite evaluation for the next scanline
    /// (65).
    #[inline]
    #[must_use]
    pub const fn is_sprite_eval_start(&self) -> bool {
        self.dot == 65
    }

    /// Whether this dot is within the sprite evaluation window (65-256).
    #[inline]
    #[must_use]
    pub const fn is_sprite_eval_range(&self) -> bool {
        self.dot >= 65 && self.dot <= 256
    }

    /// Whether this dot starts sprite pattern fetching (257).
    #[inline]
    #[must_use]
    pub const fn is_sprite_fetch_start(&self) -> bool {
        self.dot == 257
    }

    /// Whether this dot is within the sprite fetch window (257-320).
    #[inline]
    #[must_use]
    pub const fn is_sprite_fetch_range(&self) -> bool {
        self.dot >= 257 && self.dot <= 320
    }

    /// Advance by one dot. Returns true if this tick wrapped into a new
    /// frame.
    pub fn tick(&mut self, rendering_enabled: bool) -> bool {
        self.dot += 1;

        if self.scanline == 261 && self.dot == 339 && self.is_odd_frame() && rendering_enabled {
            self.dot = 340;
        }

        if self.dot > 340 {
            self.dot = 0;
            self.scanline += 1;

            if self.scanline > 261 {
                self.scanline = 0;
                self.frame = self.frame.wrapping_add(1);
                return true;
            }
        }

        false
    }

    /// Reset to power-up state.
    pub fn reset(&mut self) {
        self.scanline = 0;
        self.dot = 0;
        self.frame = 0;
    }

    /// Force a specific scanline/dot/frame, for tests.
    #[cfg(test)]
    pub fn set_state(&mut self, scanline: u16, dot: u16, frame: u64) {
        self.scanline = scanline;
        self.dot = dot;
        self.frame = frame;
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_the_dot_counter() {
        let mut timing = Timing::new();
        assert_eq!(timing.scanline(), 0);
        assert_eq!(timing.dot(), 0);

        timing.tick(false);
        assert_eq!(timing.dot(), 1);
        assert_eq!(timing.scanline(), 0);
    }

    #[test]
    fn tick_wraps_dot_into_the_next_scanline() {
        let mut timing = Timing::new();
        timing.set_state(0, 340, 0);

        timing.tick(false);
        assert_eq!(timing.scanline(), 1);
        assert_eq!(timing.dot(), 0);
    }

    #[test]
    fn tick_wraps_scanline_into_the_next_frame() {
        let mut timing = Timing::new();
        timing.set_state(261, 340, 0);

        let frame_ended = timing.tick(false);
        assert!(frame_ended);
        assert_eq!(timing.scanline(), 0);
        assert_eq!(timing.dot(), 0);
        assert_eq!(timing.frame(), 1);
    }

    #[test]
    fn odd_frame_skips_dot_339_only_while_rendering() {
        let mut timing = Timing::new();

        timing.set_state(261, 338, 0);
        timing.tick(true);
        assert_eq!(timing.dot(), 339);

        timing.set_state(261, 338, 1);
        timing.tick(true);
        assert_eq!(timing.dot(), 340); // dot 339 skipped

        timing.set_state(261, 338, 1);
        timing.tick(false);
        assert_eq!(timing.dot(), 339); // rendering off, no skip
    }

    #[test]
    fn scanline_type_predicates() {
        let mut timing = Timing::new();

        timing.set_state(100, 0, 0);
        assert!(timing.is_visible_scanline());
        assert!(!timing.is_vblank_scanline());
        assert!(!timing.is_prerender_scanline());
        assert!(timing.is_rendering_scanline());

        timing.set_state(240, 0, 0);
        assert!(!timing.is_visible_scanline());
        assert!(timing.is_postrender_scanline());
        assert!(!timing.is_rendering_scanline());

        timing.set_state(245, 0, 0);
        assert!(timing.is_vblank_scanline());
        assert!(!timing.is_visible_scanline());

        timing.set_state(261, 0, 0);
        assert!(timing.is_prerender_scanline());
        assert!(!timing.is_visible_scanline());
        assert!(timing.is_rendering_scanline());
    }

    #[test]
    fn dot_range_predicates() {
        let mut timing = Timing::new();

        timing.set_state(0, 100, 0);
        assert!(timing.is_visible_dot());

        timing.set_state(0, 0, 0);
        assert!(!timing.is_visible_dot());
        timing.set_state(0, 257, 0);
        assert!(!timing.is_visible_dot());

        timing.set_state(0, 321, 0);
        assert!(timing.is_prefetch_dot());
        timing.set_state(0, 336, 0);
        assert!(timing.is_prefetch_dot());
        timing.set_state(0, 337, 0);
        assert!(!timing.is_prefetch_dot());
    }

    #[test]
    fn vblank_set_and_clear_dots() {
        let mut timing = Timing::new();

        timing.set_state(241, 1, 0);
        assert!(timing.is_vblank_set_dot());

        timing.set_state(261, 1, 0);
        assert!(timing.is_vblank_clear_dot());
    }

    #[test]
    fn scroll_copy_windows() {
        let mut timing = Timing::new();

        timing.set_state(0, 257, 0);
        assert!(timing.is_hori_copy_dot());

        timing.set_state(261, 280, 0);
        assert!(timing.is_vert_copy_range());
        timing.set_state(261, 304, 0);
        assert!(timing.is_vert_copy_range());
        timing.set_state(261, 305, 0);
        assert!(!timing.is_vert_copy_range());
    }

    #[test]
    fn sprite_evaluation_and_fetch_windows() {
        let mut timing = Timing::new();

        timing.set_state(0, 65, 0);
        assert!(timing.is_sprite_eval_start());
        assert!(timing.is_sprite_eval_range());

        timing.set_state(0, 200, 0);
        assert!(timing.is_sprite_eval_range());

        timing.set_state(0, 257, 0);
        assert!(timing.is_sprite_fetch_start());
        assert!(timing.is_sprite_fetch_range());

        timing.set_state(0, 300, 0);
        assert!(timing.is_sprite_fetch_range());
    }

    #[test]
    fn a_full_frame_is_89341_or_89342_dots() {
        let mut timing = Timing::new();

        for _ in 0..(341 * 262 - 1) {
            timing.tick(false);
        }

        assert_eq!(timing.scanline(), 261);
        assert_eq!(timing.dot(), 340);

        let frame_ended = timing.tick(false);
        assert!(frame_ended);
        assert_eq!(timing.scanline(), 0);
        assert_eq!(timing.dot(), 0);
        assert_eq!(timing.frame(), 1);
    }

    #[test]
    fn reset_returns_to_power_up_state() {
        let mut timing = Timing::new();
        timing.set_state(100, 200, 5);

        timing.reset();

        assert_eq!(timing.scanline(), 0);
        assert_eq!(timing.dot(), 0);
        assert_eq!(timing.frame(), 0);
    }
}
