//! The top-level [`System`] facade: wires the CPU, PPU, APU, and cartridge
//! together and drives them one master clock tick at a time.

use nesc_cpu::{Cpu, Interrupt};
use nesc_mappers::{RomError, create_mapper};
use thiserror::Error;

use crate::bus::NesBus;
use crate::controller::Controller;
use crate::sink::{AudioSink, FrameSink};

/// NTSC timing constants.
pub mod timing {
    /// Master clock rate, Hz (6x the CPU rate, matching the PPU dot clock
    /// divided by 2).
    pub const MASTER_CLOCK_NTSC: u32 = 21_477_272;
    /// Master ticks per PPU dot.
    pub const MASTER_TICKS_PER_PPU_DOT: u32 = 4;
    /// Master ticks per CPU cycle.
    pub const MASTER_TICKS_PER_CPU_CYCLE: u32 = 12;
    /// Master ticks in one NTSC frame: 341 dots x 262 scanlines, 4 master
    /// ticks per dot, minus the one skipped dot on odd pre-render frames
    /// folded into the PPU's own timing model.
    pub const MASTER_TICKS_PER_FRAME: u32 = 89_342;
}

/// Errors surfaced by [`System::load_cartridge`].
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The ROM image failed to parse or names an unsupported mapper.
    #[error(transparent)]
    Rom(#[from] RomError),
    /// An operation that requires a cartridge was attempted with none
    /// loaded.
    #[error("no cartridge loaded")]
    NoCartridge,
}

/// The assembled NES system: CPU, PPU, APU, cartridge slot, and the two
/// controller ports, scheduled one master tick at a time.
///
/// `System` owns every component outright and hands out peer references
/// (a [`nesc_ppu::PpuBus`] adapter borrowing the mapper, a bus borrowing
/// everything) only for the duration of a single tick — there is no
/// shared ownership and no global state, so distinct `System` instances
/// never interfere with each other.
pub struct System {
    cpu: Cpu,
    bus: NesBus,
    master_tick: u32,
    display: Option<Box<dyn FrameSink>>,
    audio: Option<Box<dyn AudioSink>>,
    cartridge_loaded: bool,
}

impl System {
    /// Build a system with no cartridge loaded and no sinks connected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: NesBus::new(),
            master_tick: 0,
            display: None,
            audio: None,
            cartridge_loaded: false,
        }
    }

    /// Parse `rom_bytes` as an iNES/NES 2.0 image, build its mapper, and
    /// load it. Resets the CPU so it fetches from the cartridge's reset
    /// vector. Replaces any cartridge already loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Rom`] if the image fails to parse or names
    /// an unsupported mapper. The system keeps whatever cartridge (if any)
    /// was loaded before the call.
    pub fn load_cartridge(&mut self, rom_bytes: &[u8]) -> Result<(), ConsoleError> {
        let rom = nesc_mappers::Rom::load(rom_bytes)?;
        let mapper = create_mapper(&rom)?;
        self.bus.load_cartridge(mapper);
        self.cartridge_loaded = true;
        self.reset();
        Ok(())
    }

    /// Remove the loaded cartridge. Bus reads over `$4020-$FFFF` return 0
    /// until another is loaded; the host is responsible for surfacing
    /// this to the user.
    pub fn release_cartridge(&mut self) {
        self.bus.release_cartridge();
        self.cartridge_loaded = false;
    }

    /// Whether a cartridge is currently loaded.
    #[must_use]
    pub fn has_cartridge(&self) -> bool {
        self.cartridge_loaded
    }

    /// Power-on/reset: resets the CPU (fetching PC from the reset vector),
    /// PPU, APU, and controllers. The cartridge stays loaded.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.master_tick = 0;
    }

    /// Connect (or replace) the display sink that receives pixels as the
    /// PPU emits them.
    pub fn connect_display(&mut self, sink: Box<dyn FrameSink>) {
        self.display = Some(sink);
    }

    /// Connect (or replace) the audio sink that receives mixed samples.
    pub fn connect_audio(&mut self, sink: Box<dyn AudioSink>) {
        self.audio = Some(sink);
    }

    /// Plug a controller into port 0 or 1.
    ///
    /// # Panics
    ///
    /// Panics if `port` is not 0 or 1.
    pub fn connect_controller(&mut self, port: u8, controller: Controller) {
        match port {
            0 => self.bus.controller1 = controller,
            1 => self.bus.controller2 = controller,
            _ => panic!("controller port must be 0 or 1, got {port}"),
        }
    }

    /// Advance the system by one master clock tick.
    ///
    /// The PPU ticks on every call; the CPU and APU tick together every
    /// third call (matching the NES's 1:3 CPU:PPU clock ratio). After the
    /// CPU advances, the PPU's latched NMI request is sampled and
    /// delivered; after the APU advances, a pending frame-sequencer IRQ is
    /// delivered.
    pub fn clock(&mut self) {
        if let Some((x, y, rgb)) = self.bus.tick_ppu() {
            if let Some(display) = self.display.as_deref_mut() {
                display.set_pixel(x, y, rgb);
            }
        }

        self.master_tick += 1;
        if self.master_tick % 3 != 0 {
            return;
        }

        if self.bus.oam_dma_pending() {
            self.bus.execute_oam_dma();
        }

        if self.bus.oam_stall_active() {
            self.bus.decrement_oam_stall();
        } else if self.bus.dmc_stall_active() {
            self.bus.decrement_dmc_stall();
        } else {
            let cycles = self.cpu.step(&mut self.bus);
            self.bus.add_cpu_cycles(cycles);
        }

        if self.bus.take_nmi() {
            self.cpu.request_interrupt(Interrupt::Nmi);
        }

        if let Some(sample) = self.bus.tick_apu() {
            if let Some(audio) = self.audio.as_deref_mut() {
                audio.queue_sample(sample);
            }
        }
        if self.bus.irq_pending() {
            self.cpu.request_interrupt(Interrupt::Irq);
            self.bus.acknowledge_mapper_irq();
        }
    }

    /// Run exactly one full NTSC frame (89,342 master ticks), regardless
    /// of internal state. Calls the display sink's `render` once the
    /// frame is complete.
    pub fn step_frame(&mut self) {
        for _ in 0..timing::MASTER_TICKS_PER_FRAME {
            self.clock();
        }
        if let Some(display) = self.display.as_deref_mut() {
            display.render();
        }
        if let Some(audio) = self.audio.as_deref_mut() {
            audio.play();
        }
    }

    /// The CPU, for inspection/debugging.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The PPU, for inspection/debugging.
    #[must_use]
    pub fn ppu(&self) -> &nesc_ppu::Ppu {
        &self.bus.ppu
    }

    /// The APU, for inspection/debugging.
    #[must_use]
    pub fn apu(&self) -> &nesc_apu::Apu {
        &self.bus.apu
    }

    /// Read a byte from the system bus without side effects.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Total master ticks elapsed since the last reset.
    #[must_use]
    pub fn master_tick(&self) -> u32 {
        self.master_tick
    }

    /// Mapper number of the loaded cartridge, if any.
    #[must_use]
    pub fn mapper_number(&self) -> Option<u16> {
        self.bus.mapper.as_deref().map(nesc_mappers::Mapper::mapper_number)
    }

    /// Mapper name of the loaded cartridge, if any.
    #[must_use]
    pub fn mapper_name(&self) -> Option<&'static str> {
        self.bus.mapper.as_deref().map(nesc_mappers::Mapper::mapper_name)
    }

    /// Snapshot everything but the cartridge into a [`SaveState`](crate::SaveState).
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn save_state(&self) -> crate::SaveState {
        crate::SaveState {
            cpu: self.cpu.clone(),
            ppu: self.bus.ppu.clone(),
            apu: self.bus.apu.clone(),
            ram: *self.bus.ram(),
            controller1: self.bus.controller1.clone(),
            controller2: self.bus.controller2.clone(),
            master_tick: self.master_tick,
        }
    }

    /// Restore a previously captured [`SaveState`](crate::SaveState). The
    /// cartridge already loaded (if any) is left untouched.
    #[cfg(feature = "serde")]
    pub fn restore_state(&mut self, state: crate::SaveState) {
        self.cpu = state.cpu;
        self.bus.ppu = state.ppu;
        self.bus.apu = state.apu;
        *self.bus.ram_mut() = state.ram;
        self.bus.controller1 = state.controller1;
        self.bus.controller2 = state.controller2;
        self.master_tick = state.master_tick;
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Button;

    fn minimal_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 16 + 16384 + 8192];
        rom[0..4].copy_from_slice(b"NES\x1A");
        rom[4] = 1; // 16KB PRG-ROM
        rom[5] = 1; // 8KB CHR-ROM
        let prg_start = 16;
        // Reset vector at 0xFFFC -> last two bytes of the 16KB bank,
        // pointing at address 0x8000.
        rom[prg_start + 16384 - 4] = 0x00;
        rom[prg_start + 16384 - 3] = 0x80;
        rom
    }

    #[test]
    fn loading_a_cartridge_resets_the_cpu_to_the_reset_vector() {
        let mut system = System::new();
        system.load_cartridge(&minimal_rom()).unwrap();
        assert_eq!(system.cpu().pc(), 0x8000);
        assert!(system.has_cartridge());
    }

    #[test]
    fn releasing_the_cartridge_clears_has_cartridge() {
        let mut system = System::new();
        system.load_cartridge(&minimal_rom()).unwrap();
        system.release_cartridge();
        assert!(!system.has_cartridge());
        assert_eq!(system.peek_memory(0x8000), 0);
    }

    #[test]
    fn loading_garbage_bytes_fails_without_crashing() {
        let mut system = System::new();
        let err = system.load_cartridge(&[0u8; 4]);
        assert!(err.is_err());
    }

    #[test]
    fn step_frame_advances_by_exactly_one_frame_worth_of_master_ticks() {
        let mut system = System::new();
        system.load_cartridge(&minimal_rom()).unwrap();
        system.step_frame();
        assert_eq!(system.master_tick(), timing::MASTER_TICKS_PER_FRAME);
    }

    #[test]
    fn connecting_a_controller_is_visible_on_the_next_read() {
        let mut system = System::new();
        system.load_cartridge(&minimal_rom()).unwrap();
        let mut controller = Controller::new();
        controller.press(Button::A);
        system.connect_controller(0, controller);
        assert_eq!(system.bus.controller1.buttons(), 0b0000_0001);
    }
}
