//! The 6502 core: registers, reset/interrupt handling, and the main
//! fetch-decode-execute loop.
//!
//! [`Cpu::step`] always executes exactly one instruction and returns the
//! number of master-bus cycles it consumed (including any taken-branch or
//! page-crossing penalty). This is coarser than a true per-bus-cycle state
//! machine, but the [`Bus`] still observes every real memory access
//! (including the dummy reads and the read-modify-write's throwaway
//! write) in hardware order, which is what register side effects on the
//! PPU/APU/mapper actually depend on.

use crate::addressing::{AddrMode, ADDR_MODE_TABLE};
use crate::opcodes::{cycles_for, Mnemonic, MNEMONIC_TABLE};
use crate::status::Status;
use crate::{instructions, vectors};

pub use crate::bus::Bus;

/// Which pending interrupt, if any, should be serviced after the current
/// instruction finishes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Non-maskable interrupt; always serviced, ignores the I flag.
    Nmi,
    /// Maskable interrupt; serviced only when the I flag is clear.
    Irq,
}

/// Where an instruction's operand lives once addressing has been
/// resolved. Kept as a tagged pointer rather than a raw address so that
/// accumulator-mode instructions (`ASL A`, `ROL A`, ...) share the same
/// read/write path as their memory-operand counterparts without an
/// out-of-band register aliased as a fake address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandPointer {
    /// Instruction has no addressable operand (implied, or already
    /// consumed as an immediate byte held separately).
    Implied,
    /// Operand is the accumulator register.
    Accumulator,
    /// Operand lives in memory at this address.
    Memory(u16),
}

/// MOS 6502 CPU core.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Cpu {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    pc: u16,
    status: Status,
    cycles: u64,
    pending_interrupt: Option<Interrupt>,
    nmi_edge: bool,
    stall_cycles: u32,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Creates a CPU with power-on register values. Call [`Cpu::reset`]
    /// before stepping to load the reset vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: Status::new(),
            cycles: 0,
            pending_interrupt: None,
            nmi_edge: false,
            stall_cycles: 0,
        }
    }

    /// Loads PC from the reset vector and puts registers in their
    /// power-on/reset state. Takes 7 cycles on real hardware.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.sp = 0xFD;
        self.status.set_flag(Status::I, true);
        self.pc = bus.read_u16(vectors::RESET);
        self.cycles += 7;
    }

    /// Program counter.
    #[must_use]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Stack pointer.
    #[must_use]
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Accumulator.
    #[must_use]
    pub fn a(&self) -> u8 {
        self.a
    }

    /// X index register.
    #[must_use]
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Y index register.
    #[must_use]
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Status register.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Total master cycles executed since construction.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Renders the instruction at `addr` as text for debugging, without
    /// executing it or mutating register state. Returns the disassembled
    /// text and the instruction's length in bytes.
    #[must_use]
    pub fn disassemble(bus: &impl Bus, addr: u16) -> (String, u8) {
        crate::disassembler::disassemble(bus, addr)
    }

    /// Requests that the CPU service an NMI or IRQ before its next
    /// instruction fetch. NMI is edge-triggered: repeated calls before it
    /// is serviced do not queue additional interrupts.
    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::Nmi => self.nmi_edge = true,
            Interrupt::Irq => self.pending_interrupt = Some(Interrupt::Irq),
        }
    }

    /// Stalls the CPU for `cycles` master cycles, as OAM DMA and DMC
    /// sample fetches do. Stalled cycles are consumed by [`Cpu::step`]
    /// before the next instruction is fetched.
    pub fn stall(&mut self, cycles: u32) {
        self.stall_cycles += cycles;
    }

    /// Executes exactly one instruction (or drains pending stall cycles)
    /// and returns the number of cycles it took.
    pub fn step(&mut self, bus: &mut impl Bus) -> u8 {
        if self.stall_cycles > 0 {
            let taken = self.stall_cycles.min(u32::from(u8::MAX));
            self.stall_cycles -= taken;
            self.cycles += u64::from(taken);
            return taken as u8;
        }

        if self.nmi_edge {
            self.nmi_edge = false;
            self.service_interrupt(bus, vectors::NMI, false);
            self.cycles += 7;
            return 7;
        }
        if self.pending_interrupt == Some(Interrupt::Irq) && !self.status.contains(Status::I) {
            self.pending_interrupt = None;
            self.service_interrupt(bus, vectors::IRQ, false);
            self.cycles += 7;
            return 7;
        }

        let opcode_pc = self.pc;
        let opcode = self.fetch_u8(bus);
        let mode = ADDR_MODE_TABLE[opcode as usize];
        let mnemonic = MNEMONIC_TABLE[opcode as usize];
        let base_cycles = cycles_for(mnemonic, mode);

        let (operand, page_crossed) = self.resolve_operand(bus, mode);
        let mut extra_cycles = 0u8;
        if page_crossed && mode.has_page_cross_penalty() {
            extra_cycles += 1;
        }

        extra_cycles += match mnemonic {
            Some(m) => instructions::execute(self, bus, m, mode, operand),
            None => {
                // Unofficial opcode: perform the bus-accurate read the
                // addressing mode implies, then do nothing.
                log::trace!("unofficial opcode ${opcode:02X} at ${opcode_pc:04X}");
                if !matches!(operand, OperandPointer::Implied | OperandPointer::Accumulator) {
                    let _ = self.read_operand(bus, operand);
                }
                0
            }
        };

        let total = base_cycles + extra_cycles;
        self.cycles += u64::from(total);
        total
    }

    /// Pushes PC and status and jumps through `vector`. Callers are
    /// responsible for accounting the 7 cycles this takes; BRK reaches
    /// this via the normal opcode-dispatch cycle count, while NMI/IRQ are
    /// serviced outside instruction dispatch and must add it themselves.
    fn service_interrupt(&mut self, bus: &mut impl Bus, vector: u16, brk: bool) {
        self.push_u16(bus, self.pc);
        self.push_u8(bus, self.status.to_stack_byte(brk));
        self.status.set_flag(Status::I, true);
        self.pc = bus.read_u16(vector);
    }

    fn fetch_u8(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.fetch_u8(bus);
        let hi = self.fetch_u8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Resolves an addressing mode into an [`OperandPointer`] plus whether
    /// indexing crossed a page boundary (only meaningful for the
    /// read-style indexed modes).
    fn resolve_operand(&mut self, bus: &mut impl Bus, mode: AddrMode) -> (OperandPointer, bool) {
        match mode {
            AddrMode::Imp => (OperandPointer::Implied, false),
            AddrMode::Acc => (OperandPointer::Accumulator, false),
            AddrMode::Imm | AddrMode::Rel => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (OperandPointer::Memory(addr), false)
            }
            AddrMode::Zp0 => {
                let addr = u16::from(self.fetch_u8(bus));
                (OperandPointer::Memory(addr), false)
            }
            AddrMode::Zpx => {
                let base = self.fetch_u8(bus);
                let addr = u16::from(base.wrapping_add(self.x));
                (OperandPointer::Memory(addr), false)
            }
            AddrMode::Zpy => {
                let base = self.fetch_u8(bus);
                let addr = u16::from(base.wrapping_add(self.y));
                (OperandPointer::Memory(addr), false)
            }
            AddrMode::Abs => {
                let addr = self.fetch_u16(bus);
                (OperandPointer::Memory(addr), false)
            }
            AddrMode::Abx => self.indexed_absolute(bus, self.x, false),
            AddrMode::AbxW => self.indexed_absolute(bus, self.x, true),
            AddrMode::Aby => self.indexed_absolute(bus, self.y, false),
            AddrMode::AbyW => self.indexed_absolute(bus, self.y, true),
            AddrMode::Ind => {
                let ptr = self.fetch_u16(bus);
                let addr = bus.read_u16_wrap(ptr);
                (OperandPointer::Memory(addr), false)
            }
            AddrMode::Idx => {
                let zp = self.fetch_u8(bus).wrapping_add(self.x);
                let lo = bus.read(u16::from(zp));
                let hi = bus.read(u16::from(zp.wrapping_add(1)));
                (OperandPointer::Memory(u16::from_le_bytes([lo, hi])), false)
            }
            AddrMode::Idy => self.indexed_indirect_y(bus, false),
            AddrMode::IdyW => self.indexed_indirect_y(bus, true),
        }
    }

    fn indexed_absolute(
        &mut self,
        bus: &mut impl Bus,
        index: u8,
        force_dummy_read: bool,
    ) -> (OperandPointer, bool) {
        let base = self.fetch_u16(bus);
        let addr = base.wrapping_add(u16::from(index));
        let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
        if force_dummy_read || page_crossed {
            let dummy_addr = (base & 0xFF00) | (addr & 0x00FF);
            let _ = bus.read(dummy_addr);
        }
        (OperandPointer::Memory(addr), page_crossed)
    }

    fn indexed_indirect_y(
        &mut self,
        bus: &mut impl Bus,
        force_dummy_read: bool,
    ) -> (OperandPointer, bool) {
        let zp = self.fetch_u8(bus);
        let lo = bus.read(u16::from(zp));
        let hi = bus.read(u16::from(zp.wrapping_add(1)));
        let base = u16::from_le_bytes([lo, hi]);
        let addr = base.wrapping_add(u16::from(self.y));
        let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
        if force_dummy_read || page_crossed {
            let dummy_addr = (base & 0xFF00) | (addr & 0x00FF);
            let _ = bus.read(dummy_addr);
        }
        (OperandPointer::Memory(addr), page_crossed)
    }

    fn read_operand(&mut self, bus: &mut impl Bus, operand: OperandPointer) -> u8 {
        match operand {
            OperandPointer::Implied => 0,
            OperandPointer::Accumulator => self.a,
            OperandPointer::Memory(addr) => bus.read(addr),
        }
    }

    fn write_operand(&mut self, bus: &mut impl Bus, operand: OperandPointer, value: u8) {
        match operand {
            OperandPointer::Implied => {}
            OperandPointer::Accumulator => self.a = value,
            OperandPointer::Memory(addr) => bus.write(addr, value),
        }
    }

    fn push_u8(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        self.push_u8(bus, (value >> 8) as u8);
        self.push_u8(bus, value as u8);
    }

    fn pop_u8(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | u16::from(self.sp))
    }

    fn pop_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.pop_u8(bus);
        let hi = self.pop_u8(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn reg_a(&mut self) -> &mut u8 {
        &mut self.a
    }

    pub(crate) fn reg_x(&mut self) -> &mut u8 {
        &mut self.x
    }

    pub(crate) fn reg_y(&mut self) -> &mut u8 {
        &mut self.y
    }

    pub(crate) fn reg_sp(&mut self) -> &mut u8 {
        &mut self.sp
    }

    pub(crate) fn reg_pc(&mut self) -> &mut u16 {
        &mut self.pc
    }

    pub(crate) fn reg_status(&mut self) -> &mut Status {
        &mut self.status
    }

    pub(crate) fn fetch_operand(&mut self, bus: &mut impl Bus, operand: OperandPointer) -> u8 {
        self.read_operand(bus, operand)
    }

    pub(crate) fn store_operand(&mut self, bus: &mut impl Bus, operand: OperandPointer, value: u8) {
        self.write_operand(bus, operand, value);
    }

    pub(crate) fn push_byte(&mut self, bus: &mut impl Bus, value: u8) {
        self.push_u8(bus, value);
    }

    pub(crate) fn push_word(&mut self, bus: &mut impl Bus, value: u16) {
        self.push_u16(bus, value);
    }

    pub(crate) fn pop_byte(&mut self, bus: &mut impl Bus) -> u8 {
        self.pop_u8(bus)
    }

    pub(crate) fn pop_word(&mut self, bus: &mut impl Bus) -> u16 {
        self.pop_u16(bus)
    }

    pub(crate) fn service_brk(&mut self, bus: &mut impl Bus) {
        // BRK's return address is PC+1 even though it has no operand byte;
        // the skipped byte is a padding byte convention used by IRQ handlers.
        self.pc = self.pc.wrapping_add(1);
        self.service_interrupt(bus, vectors::IRQ, true);
    }
}
