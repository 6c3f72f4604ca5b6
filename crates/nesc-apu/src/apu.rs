// The 2A03 APU: five voices feeding a pair of non-linear mixer tables,
// clocked once per CPU cycle with the pulse/noise/DMC timers ticking at
// half that rate and the triangle's ticking at the full rate.

use crate::{
    dmc::{Dmc, System},
    frame_counter::{FrameCounter, FrameEvent},
    noise::Noise,
    pulse::Pulse,
    sweep::PulseChannel,
    triangle::Triangle,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `pulse_out = 95.52 / (8128 / (pulse1 + pulse2) + 100)`, precomputed
/// over the full 0-30 input range so mixing is a table lookup.
#[allow(clippy::cast_precision_loss)]
const PULSE_MIX: [f32; 31] = {
    let mut table = [0.0f32; 31];
    let mut i = 0;
    while i < 31 {
        table[i] = if i == 0 {
            0.0
        } else {
            95.52 / (8128.0 / (i as f32) + 100.0)
        };
        i += 1;
    }
    table
};

/// `tnd_out = 163.67 / (24329 / (3*triangle + 2*noise + dmc) + 100)`.
#[allow(clippy::cast_precision_loss)]
const TND_MIX: [f32; 203] = {
    let mut table = [0.0f32; 203];
    let mut i = 0;
    while i < 203 {
        table[i] = if i == 0 {
            0.0
        } else {
            163.67 / (24329.0 / (i as f32) + 100.0)
        };
        i += 1;
    }
    table
};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(dead_code)] // last_output reserved for a future high-pass filter stage
pub struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame_counter: FrameCounter,
    cycle: u64,
    last_output: f32,
}

impl Apu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::new(PulseChannel::One),
            pulse2: Pulse::new(PulseChannel::Two),
            triangle: Triangle::new(),
            noise: Noise::new(),
            dmc: Dmc::new(System::NTSC),
            frame_counter: FrameCounter::new(),
            cycle: 0,
            last_output: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// `$4015` read: returns the status byte and clears the frame-counter
    /// IRQ flag as a side effect.
    #[must_use]
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_counter.clear_irq();
        status
    }

    /// Same byte as [`Apu::read_status`] without the IRQ-clearing side
    /// effect, for debug views that shouldn't perturb emulation state.
    #[must_use]
    pub fn peek_status(&self) -> u8 {
        let mut status = 0u8;
        status |= u8::from(self.pulse1.active());
        status |= u8::from(self.pulse2.active()) << 1;
        status |= u8::from(self.triangle.is_active()) << 2;
        status |= u8::from(self.noise.length_counter_active()) << 3;
        status |= u8::from(self.dmc.active()) << 4;
        status |= u8::from(self.frame_counter.irq_pending()) << 6;
        status |= u8::from(self.dmc.irq_pending()) << 7;
        status
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000 => self.pulse1.write_ctrl(value),
            0x4001 => self.pulse1.write_sweep(value),
            0x4002 => self.pulse1.write_timer_lo(value),
            0x4003 => self.pulse1.write_timer_hi(value),

            0x4004 => self.pulse2.write_ctrl(value),
            0x4005 => self.pulse2.write_sweep(value),
            0x4006 => self.pulse2.write_timer_lo(value),
            0x4007 => self.pulse2.write_timer_hi(value),

            0x4008 => self.triangle.write_register(0, value),
            0x400A => self.triangle.write_register(2, value),
            0x400B => self.triangle.write_register(3, value),

            0x400C => self.noise.write_register(0, value),
            0x400E => self.noise.write_register(2, value),
            0x400F => self.noise.write_register(3, value),

            0x4010 => self.dmc.write_ctrl(value),
            0x4011 => self.dmc.write_direct_load(value),
            0x4012 => self.dmc.write_sample_address(value),
            0x4013 => self.dmc.write_sample_length(value),

            0x4015 => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
            }

            0x4017 => self.frame_counter.write(value),

            _ => log::trace!("write to unmapped APU register ${addr:04X} = ${value:02X}"),
        }
    }

    /// One CPU cycle. The triangle's timer runs at the full CPU rate;
    /// everything else ticks on the odd half of each pair of cycles.
    pub fn clock(&mut self) {
        self.triangle.clock_timer();
        if self.cycle % 2 == 1 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
            self.dmc.clock_timer();
        }

        for event in self.frame_counter.clock().into_iter().flatten() {
            match event {
                FrameEvent::QuarterFrame => {
                    self.pulse1.clock_envelope();
                    self.pulse2.clock_envelope();
                    self.triangle.clock_linear_counter();
                    self.noise.clock_envelope();
                }
                FrameEvent::HalfFrame => {
                    self.pulse1.clock_length();
                    self.pulse2.clock_length();
                    self.pulse1.clock_sweep();
                    self.pulse2.clock_sweep();
                    self.triangle.clock_length_counter();
                    self.noise.clock_length_counter();
                }
                FrameEvent::Irq => {} // surfaced via irq_pending(), not here
            }
        }

        self.cycle = self.cycle.wrapping_add(1);
    }

    /// Mixed sample in `0.0..=1.0`, via the two non-linear lookup tables
    /// real hardware's mixer circuit approximates.
    #[must_use]
    pub fn output(&self) -> f32 {
        let pulse1 = u16::from(self.pulse1.output());
        let pulse2 = u16::from(self.pulse2.output());
        let triangle = u16::from(self.triangle.output());
        let noise = u16::from(self.noise.output());
        let dmc = u16::from(self.dmc.output());

        let pulse_out = PULSE_MIX[(pulse1 + pulse2) as usize];
        let tnd_index = (3 * triangle + 2 * noise + dmc).min(202);
        let tnd_out = TND_MIX[tnd_index as usize];

        pulse_out + tnd_out
    }

    /// Whether the DMC channel needs its next sample byte fetched and
    /// handed back via [`Apu::dmc_fill_sample`]. The APU has no memory
    /// access of its own; the bus services this on the cartridge's behalf.
    #[must_use]
    pub fn dmc_needs_sample(&self) -> bool {
        self.dmc.needs_sample()
    }

    #[must_use]
    pub fn dmc_sample_addr(&self) -> u16 {
        self.dmc.sample_addr()
    }

    pub fn dmc_fill_sample(&mut self, sample: u8) {
        self.dmc.fill_sample_buffer(sample);
    }

    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_pending()
    }

    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    #[must_use]
    pub fn dmc_output(&self) -> u8 {
        self.dmc.output()
    }

    #[must_use]
    pub fn dmc_bytes_remaining(&self) -> u16 {
        self.dmc.bytes_remaining()
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_apu_is_silent_and_at_cycle_zero() {
        let apu = Apu::new();
        assert_eq!(apu.cycle(), 0);
        assert!(!apu.irq_pending());
    }

    #[test]
    fn status_is_zero_before_anything_is_enabled() {
        let mut apu = Apu::new();
        assert_eq!(apu.read_status(), 0);
    }

    #[test]
    fn enabling_and_loading_every_channel_lights_up_the_status_bits() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x1F);
        apu.write(0x4003, 0xF8);
        apu.write(0x4007, 0xF8);
        apu.write(0x400B, 0xF8);
        apu.write(0x400F, 0xF8);
        apu.write(0x4013, 0x10);
        apu.dmc.set_enabled(true); // $4015 bit 4 doesn't arm playback by itself

        let status = apu.read_status();
        assert_ne!(status & 0x0F, 0, "pulse/triangle/noise should be active");
    }

    #[test]
    fn clock_advances_the_cycle_counter() {
        let mut apu = Apu::new();
        apu.clock();
        apu.clock();
        assert_eq!(apu.cycle(), 2);
    }

    #[test]
    fn mixed_output_stays_within_unit_range() {
        let apu = Apu::new();
        let output = apu.output();
        assert!((0.0..=1.0).contains(&output));
    }

    #[test]
    fn mix_tables_start_at_zero_and_approach_but_never_reach_one() {
        assert_eq!(PULSE_MIX[0], 0.0);
        assert!((0.0..1.0).contains(&PULSE_MIX[30]));
        assert_eq!(TND_MIX[0], 0.0);
        assert!((0.0..1.0).contains(&TND_MIX[202]));
    }

    #[test]
    fn reset_restores_a_fresh_apu() {
        let mut apu = Apu::new();
        apu.clock();
        apu.clock();
        apu.reset();
        assert_eq!(apu.cycle(), 0);
    }
}
