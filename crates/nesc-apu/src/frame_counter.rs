// Frame sequencer: the APU's shared metronome. It fans out quarter-frame
// (envelope/linear counter) and half-frame (length counter/sweep) pulses
// at fixed points in either a 4-step or 5-step cycle, and in 4-step mode
// can also raise a frame IRQ.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrameCounterMode {
    #[default]
    FourStep,
    FiveStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    QuarterFrame,
    HalfFrame,
    Irq,
}

/// Cycle points (NTSC) at which each mode's steps land. Four entries are
/// used for four-step mode; all five for five-step mode.
const FOUR_STEP_CYCLES: [u16; 5] = [7457, 14913, 22371, 29828, 29829];
const FIVE_STEP_CYCLES: [u16; 5] = [7457, 14913, 22371, 29829, 37281];

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameCounter {
    cycle: u16,
    mode: FrameCounterMode,
    irq_inhibit: bool,
    irq_pending: bool,
    /// `$4017` writes don't take effect immediately; this counts down the
    /// 3-4 cycle alignment delay before `pending_mode` becomes live.
    mode_change_delay: u8,
    pending_mode: Option<FrameCounterMode>,
}

impl FrameCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cycle: 0,
            mode: FrameCounterMode::FourStep,
            irq_inhibit: false,
            irq_pending: false,
            mode_change_delay: 0,
            pending_mode: None,
        }
    }

    /// `$4017`: `MI-- ----`, mode select and IRQ inhibit. The new mode is
    /// staged, not applied — see `mode_change_delay`.
    pub fn write(&mut self, value: u8) {
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_pending = false;
        }

        self.pending_mode = Some(if value & 0x80 != 0 {
            FrameCounterMode::FiveStep
        } else {
            FrameCounterMode::FourStep
        });
        self.mode_change_delay = if self.cycle.is_multiple_of(2) { 4 } else { 3 };
    }

    /// One CPU cycle. Returns up to three events landing on this tick —
    /// the 5-step mode's reset point fires both a quarter and a half
    /// frame on the same cycle it takes effect.
    pub fn clock(&mut self) -> [Option<FrameEvent>; 3] {
        let mut events = [None; 3];

        if self.mode_change_delay > 0 {
            self.mode_change_delay -= 1;
            if self.mode_change_delay == 0 {
                if let Some(mode) = self.pending_mode.take() {
                    self.mode = mode;
                    self.cycle = 0;
                    if self.mode == FrameCounterMode::FiveStep {
                        events[0] = Some(FrameEvent::QuarterFrame);
                        events[1] = Some(FrameEvent::HalfFrame);
                        return events;
                    }
                }
            }
        }

        self.cycle += 1;
        match self.mode {
            FrameCounterMode::FourStep => self.step_four(&mut events),
            FrameCounterMode::FiveStep => self.step_five(&mut events),
        }
        events
    }

    fn step_four(&mut self, events: &mut [Option<FrameEvent>; 3]) {
        match self.cycle {
            c if c == FOUR_STEP_CYCLES[0] || c == FOUR_STEP_CYCLES[2] => {
                events[0] = Some(FrameEvent::QuarterFrame);
            }
            c if c == FOUR_STEP_CYCLES[1] => {
                events[0] = Some(FrameEvent::QuarterFrame);
                events[1] = Some(FrameEvent::HalfFrame);
            }
            c if c == FOUR_STEP_CYCLES[3] => {
                self.raise_irq_unless_inhibited(&mut events[0]);
            }
            c if c == FOUR_STEP_CYCLES[4] => {
                events[0] = Some(FrameEvent::QuarterFrame);
                events[1] = Some(FrameEvent::HalfFrame);
                self.raise_irq_unless_inhibited(&mut events[2]);
                self.cycle = 0;
            }
            _ => {}
        }
    }

    fn step_five(&mut self, events: &mut [Option<FrameEvent>; 3]) {
        match self.cycle {
            c if c == FIVE_STEP_CYCLES[0] || c == FIVE_STEP_CYCLES[2] => {
                events[0] = Some(FrameEvent::QuarterFrame);
            }
            c if c == FIVE_STEP_CYCLES[1] => {
                events[0] = Some(FrameEvent::QuarterFrame);
                events[1] = Some(FrameEvent::HalfFrame);
            }
            c if c == FIVE_STEP_CYCLES[3] => {} // step 4 is silent in 5-step mode
            c if c == FIVE_STEP_CYCLES[4] => {
                events[0] = Some(FrameEvent::QuarterFrame);
                events[1] = Some(FrameEvent::HalfFrame);
                self.cycle = 0;
            }
            _ => {}
        }
    }

    fn raise_irq_unless_inhibited(&mut self, slot: &mut Option<FrameEvent>) {
        if !self.irq_inhibit {
            self.irq_pending = true;
            *slot = Some(FrameEvent::Irq);
        }
    }

    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Cleared on an `$4015` read.
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    #[must_use]
    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    #[must_use]
    pub fn mode(&self) -> FrameCounterMode {
        self.mode
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}
