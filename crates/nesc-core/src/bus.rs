//! The NES system bus: the CPU-visible `$0000-$FFFF` address decoder that
//! wires RAM, the PPU register window, the APU/IO page, and the cartridge
//! together.
//!
//! [`NesBus`] implements [`nesc_cpu::Bus`] and borrows its peers (PPU, APU,
//! mapper, controllers) for the duration of each call rather than owning
//! any logic of its own — the "peer references, not ownership" design: the
//! bus is wiring, [`System`](crate::System) is the owner.

use nesc_apu::Apu;
use nesc_cpu::Bus;
use nesc_mappers::{Mapper, Mirroring as CartMirroring};
use nesc_ppu::{Mirroring as PpuMirroring, Ppu, PpuBus};

use crate::controller::Controller;

fn bridge_mirroring(mirroring: CartMirroring) -> PpuMirroring {
    match mirroring {
        CartMirroring::Horizontal => PpuMirroring::Horizontal,
        CartMirroring::Vertical => PpuMirroring::Vertical,
        CartMirroring::SingleScreenLower => PpuMirroring::SingleScreenLower,
        CartMirroring::SingleScreenUpper => PpuMirroring::SingleScreenUpper,
        // Four-screen nametables need mapper-provided extra CIRAM this bus
        // doesn't model yet; fall back to vertical rather than panic.
        CartMirroring::FourScreen => PpuMirroring::Vertical,
    }
}

/// Adapts the mapper's CHR storage into the [`PpuBus`] the PPU drives for
/// pattern-table access; the PPU keeps its own nametable and palette RAM,
/// so this only ever sees addresses in `$0000-$1FFF`.
///
/// Built fresh for each PPU register access (and each dot during a tick):
/// it borrows `mapper` rather than owning it, so it never outlives the
/// call that constructs it.
struct PpuMemory<'a> {
    mapper: &'a mut dyn Mapper,
}

impl PpuBus for PpuMemory<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        self.mapper.read_chr(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.mapper.write_chr(addr, value);
    }
}

/// The fully wired NES system bus.
pub struct NesBus {
    ram: [u8; 0x0800],
    /// Picture processing unit.
    pub ppu: Ppu,
    /// Audio processing unit.
    pub apu: Apu,
    /// Cartridge mapper, if one is loaded.
    pub mapper: Option<Box<dyn Mapper>>,
    /// Controller plugged into port 0.
    pub controller1: Controller,
    /// Controller plugged into port 1.
    pub controller2: Controller,
    cpu_cycles: u64,
    dmc_stall_cycles: u8,
    oam_stall_cycles: u16,
    last_bus_value: u8,
    oam_dma: Option<u8>,
}

impl NesBus {
    /// Build a bus with no cartridge loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: [0; 0x0800],
            ppu: Ppu::new(PpuMirroring::Horizontal),
            apu: Apu::new(),
            mapper: None,
            controller1: Controller::new(),
            controller2: Controller::new(),
            cpu_cycles: 0,
            dmc_stall_cycles: 0,
            oam_stall_cycles: 0,
            last_bus_value: 0,
            oam_dma: None,
        }
    }

    /// Replace the loaded cartridge, re-deriving the PPU's mirroring mode
    /// from the new mapper.
    pub fn load_cartridge(&mut self, mapper: Box<dyn Mapper>) {
        log::debug!(
            "loaded cartridge: mapper {} ({})",
            mapper.mapper_number(),
            mapper.mapper_name(),
        );
        self.ppu.set_mirroring(bridge_mirroring(mapper.mirroring()));
        self.mapper = Some(mapper);
    }

    /// Remove the loaded cartridge; PRG/CHR reads return `0` until another
    /// is loaded.
    pub fn release_cartridge(&mut self) {
        self.mapper = None;
    }

    /// Reset RAM and every peer to power-up state; the cartridge itself is
    /// left loaded.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.ppu.reset();
        self.apu.reset();
        self.controller1.reset();
        self.controller2.reset();
        self.cpu_cycles = 0;
        self.dmc_stall_cycles = 0;
        self.oam_stall_cycles = 0;
        self.last_bus_value = 0;
        self.oam_dma = None;
    }

    fn with_ppu_memory<R>(&mut self, f: impl FnOnce(&mut Ppu, &mut PpuMemory<'_>) -> R) -> R {
        let Some(mapper) = self.mapper.as_deref_mut() else {
            // No cartridge: CHR reads settle on 0.
            let mut blank = NoCartridge;
            return f(&mut self.ppu, &mut PpuMemory { mapper: &mut blank });
        };
        let mut mem = PpuMemory { mapper };
        f(&mut self.ppu, &mut mem)
    }

    /// Advance the PPU by one dot and, if it just emitted a pixel, return
    /// its screen coordinate and resolved color.
    pub fn tick_ppu(&mut self) -> Option<(u8, u8, (u8, u8, u8))> {
        let scanline = self.ppu.scanline();
        let dot = self.ppu.dot();
        let rgb = self.with_ppu_memory(|ppu, mem| ppu.tick(mem));
        rgb.map(|color| ((dot - 1) as u8, scanline as u8, color))
    }

    /// Take and clear the PPU's latched NMI request.
    pub fn take_nmi(&mut self) -> bool {
        self.ppu.take_nmi()
    }

    /// Advance the APU by one CPU cycle, servicing any pending DMC sample
    /// fetch against the cartridge. Returns a mixed sample when one is
    /// ready.
    pub fn tick_apu(&mut self) -> Option<f32> {
        self.apu.clock();
        if self.apu.dmc_needs_sample() {
            let addr = self.apu.dmc_sample_addr();
            let sample = self.read_prg(addr);
            self.apu.dmc_fill_sample(sample);
            self.dmc_stall_cycles = 4;
        }
        Some(self.apu.output())
    }

    fn read_prg(&self, addr: u16) -> u8 {
        self.mapper.as_deref().map_or(0, |m| m.read_prg(addr))
    }

    /// Whether an OAM DMA transfer is queued, waiting for its triggering
    /// CPU cycle.
    #[must_use]
    pub fn oam_dma_pending(&self) -> bool {
        self.oam_dma.is_some()
    }

    /// Copy the pending OAM DMA page into OAM immediately and arm the CPU
    /// stall counter for the 513 (514 on an odd CPU cycle) cycles real
    /// hardware takes to shift the bytes across.
    pub fn execute_oam_dma(&mut self) {
        let Some(page) = self.oam_dma.take() else {
            return;
        };
        let base = u16::from(page) << 8;
        let mut data = [0u8; 256];
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = self.cpu_peek(base.wrapping_add(i as u16));
        }
        self.ppu.oam_dma(&data);
        self.oam_stall_cycles = if self.cpu_cycles % 2 == 1 { 514 } else { 513 };
    }

    /// Whether an OAM DMA transfer is currently stalling the CPU.
    #[must_use]
    pub fn oam_stall_active(&self) -> bool {
        self.oam_stall_cycles > 0
    }

    /// Consume one cycle of OAM DMA stall.
    pub fn decrement_oam_stall(&mut self) {
        self.oam_stall_cycles = self.oam_stall_cycles.saturating_sub(1);
    }

    fn cpu_peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            _ => self.read_prg(addr),
        }
    }

    /// Current CPU cycle counter, used for OAM DMA parity and APU timing.
    #[must_use]
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    /// Advance the CPU cycle counter by `cycles`.
    pub fn add_cpu_cycles(&mut self, cycles: u8) {
        self.cpu_cycles += u64::from(cycles);
    }

    /// Whether a DMC sample fetch is currently stalling the CPU.
    #[must_use]
    pub fn dmc_stall_active(&self) -> bool {
        self.dmc_stall_cycles > 0
    }

    /// Consume one cycle of DMC stall.
    pub fn decrement_dmc_stall(&mut self) {
        self.dmc_stall_cycles = self.dmc_stall_cycles.saturating_sub(1);
    }

    /// Whether the mapper or the APU's frame sequencer has an IRQ
    /// asserted against the CPU.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.apu.irq_pending() || self.mapper.as_deref().is_some_and(Mapper::irq_pending)
    }

    /// Acknowledge a pending mapper IRQ.
    pub fn acknowledge_mapper_irq(&mut self) {
        if let Some(mapper) = self.mapper.as_deref_mut() {
            mapper.irq_acknowledge();
        }
    }

    fn read_controller(&mut self, port: u8) -> u8 {
        if port == 0 {
            self.controller1.read()
        } else {
            self.controller2.read()
        }
    }

    fn write_controller_strobe(&mut self, value: u8) {
        self.controller1.write_strobe(value);
        self.controller2.write_strobe(value);
    }

    /// The 2KB internal work RAM, for save states.
    #[must_use]
    pub fn ram(&self) -> &[u8; 0x0800] {
        &self.ram
    }

    /// Mutable access to the internal work RAM, for restoring save states.
    pub fn ram_mut(&mut self) -> &mut [u8; 0x0800] {
        &mut self.ram
    }

    /// Read a byte without side effects, for debugging/disassembly.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.last_bus_value,
            0x4015 => self.apu.peek_status(),
            0x4000..=0x401F => self.last_bus_value,
            0x4020..=0xFFFF => self.read_prg(addr),
        }
    }
}

impl Default for NesBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A mapper stand-in used while no cartridge is loaded; every access
/// resolves to `0`, matching `spec.md`'s "no cartridge" behavior.
struct NoCartridge;

impl Mapper for NoCartridge {
    fn read_prg(&self, _addr: u16) -> u8 {
        0
    }
    fn write_prg(&mut self, _addr: u16, _value: u8) {}
    fn read_chr(&self, _addr: u16) -> u8 {
        0
    }
    fn write_chr(&mut self, _addr: u16, _value: u8) {}
    fn mirroring(&self) -> CartMirroring {
        CartMirroring::Horizontal
    }
    fn mapper_number(&self) -> u16 {
        u16::MAX
    }
    fn mapper_name(&self) -> &'static str {
        "none"
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => {
                let reg = 0x2000 + (addr & 7);
                self.with_ppu_memory(|ppu, mem| ppu.read_register(reg, mem))
            }
            0x4000..=0x4017 => match addr {
                0x4015 => self.apu.read_status(),
                0x4016 => self.read_controller(0),
                0x4017 => self.read_controller(1),
                _ => self.last_bus_value,
            },
            0x4018..=0x401F => self.last_bus_value,
            0x4020..=0xFFFF => self.read_prg(addr),
        };
        self.last_bus_value = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.last_bus_value = value;
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => {
                let reg = 0x2000 + (addr & 7);
                self.with_ppu_memory(|ppu, mem| ppu.write_register(reg, value, mem));
            }
            0x4000..=0x4017 => match addr {
                0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, value),
                0x4014 => self.oam_dma = Some(value),
                0x4016 => self.write_controller_strobe(value),
                _ => {}
            },
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => {
                if let Some(mapper) = self.mapper.as_deref_mut() {
                    mapper.write_prg(addr, value);
                }
            }
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        NesBus::peek(self, addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesc_mappers::{Nrom, Rom, RomHeader};

    fn test_bus() -> NesBus {
        let rom = Rom {
            header: RomHeader {
                prg_rom_size: 32768,
                chr_rom_size: 8192,
                mapper_number: 0,
                mirroring: CartMirroring::Vertical,
                has_battery: false,
                has_trainer: false,
                nes2_format: false,
                prg_ram_size: 0,
            },
            trainer: None,
            prg_rom: vec![0; 32768],
            chr_rom: vec![0; 8192],
        };
        let mut bus = NesBus::new();
        bus.load_cartridge(Box::new(Nrom::new(&rom)));
        bus
    }

    #[test]
    fn ram_is_mirrored_four_times_across_0x0000_0x1fff() {
        let mut bus = test_bus();
        Bus::write(&mut bus, 0x0000, 0x42);
        assert_eq!(Bus::read(&mut bus, 0x0800), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1000), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1800), 0x42);

        Bus::write(&mut bus, 0x1234, 0xAB);
        assert_eq!(Bus::read(&mut bus, 0x0234), 0xAB);
    }

    #[test]
    fn controller_strobe_latches_and_shifts_out_in_order() {
        let mut bus = test_bus();
        bus.controller1.set_state(0b1010_0101);

        Bus::write(&mut bus, 0x4016, 1);
        Bus::write(&mut bus, 0x4016, 0);

        let bits: Vec<u8> = (0..8).map(|_| Bus::read(&mut bus, 0x4016) & 1).collect();
        assert_eq!(bits, [1, 0, 1, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn oam_dma_copies_256_bytes_and_reports_its_cycle_cost() {
        let mut bus = test_bus();
        for i in 0..256u16 {
            Bus::write(&mut bus, 0x0200 + i, i as u8);
        }
        Bus::write(&mut bus, 0x4014, 0x02);
        assert!(bus.oam_dma_pending());

        bus.execute_oam_dma();
        assert!(!bus.oam_dma_pending());
        assert!(bus.oam_stall_active());
    }

    #[test]
    fn reading_updates_the_open_bus_latch() {
        let mut bus = test_bus();
        Bus::write(&mut bus, 0x0000, 0xAB);
        let _ = Bus::read(&mut bus, 0x0000);
        assert_eq!(bus.peek(0x2000), 0xAB);
    }

    #[test]
    fn reset_zeroes_ram_and_the_cpu_cycle_counter() {
        let mut bus = test_bus();
        bus.add_cpu_cycles(100);
        Bus::write(&mut bus, 0x0000, 0x11);

        bus.reset();

        assert_eq!(Bus::read(&mut bus, 0x0000), 0);
        assert_eq!(bus.cpu_cycles(), 0);
    }

    #[test]
    fn no_cartridge_reads_resolve_to_zero() {
        let mut bus = NesBus::new();
        assert_eq!(Bus::read(&mut bus, 0x8000), 0);
    }
}
