//! Static disassembly: renders the instruction at an address as text
//! without touching CPU register state, using only what's in memory.
//!
//! Unlike a trace logger, this never resolves an indexed or indirect
//! operand to its effective address — `X`/`Y` aren't available here, and
//! the page-wrap bug in indirect addressing is a read-time behavior, not
//! a disassembly-time one, so `($nnnn)` is rendered as written regardless
//! of whether the bug would apply when executed.

use std::fmt::Write as _;

use crate::addressing::{ADDR_MODE_TABLE, AddrMode};
use crate::bus::Bus;
use crate::opcodes::MNEMONIC_TABLE;

fn mnemonic_text(mnemonic: Option<crate::opcodes::Mnemonic>) -> &'static str {
    use crate::opcodes::Mnemonic::*;
    match mnemonic {
        None => "NOP",
        Some(m) => match m {
            Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC", Bcs => "BCS",
            Beq => "BEQ", Bit => "BIT", Bmi => "BMI", Bne => "BNE", Bpl => "BPL",
            Brk => "BRK", Bvc => "BVC", Bvs => "BVS", Clc => "CLC", Cld => "CLD",
            Cli => "CLI", Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR", Inc => "INC",
            Inx => "INX", Iny => "INY", Jmp => "JMP", Jsr => "JSR", Lda => "LDA",
            Ldx => "LDX", Ldy => "LDY", Lsr => "LSR", Nop => "NOP", Ora => "ORA",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
            Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC", Sec => "SEC",
            Sed => "SED", Sei => "SEI", Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Tay => "TAY", Tsx => "TSX", Txa => "TXA", Txs => "TXS",
            Tya => "TYA",
        },
    }
}

/// Render the instruction at `addr` as text, reading through `bus` without
/// side effects (`Bus::peek`). Returns the text and the instruction's
/// total length in bytes (opcode plus operand).
#[must_use]
pub fn disassemble(bus: &impl Bus, addr: u16) -> (String, u8) {
    let opcode = bus.peek(addr);
    let mode = ADDR_MODE_TABLE[opcode as usize];
    let mnemonic = mnemonic_text(MNEMONIC_TABLE[opcode as usize]);
    let len = 1 + mode.operand_size();

    let mut text = String::new();
    let _ = write!(text, "{mnemonic}");

    match mode {
        AddrMode::Imp => {}
        AddrMode::Acc => {
            let _ = write!(text, " A");
        }
        AddrMode::Imm => {
            let value = bus.peek(addr.wrapping_add(1));
            let _ = write!(text, " #${value:02X}");
        }
        AddrMode::Zp0 => {
            let zp = bus.peek(addr.wrapping_add(1));
            let _ = write!(text, " ${zp:02X}");
        }
        AddrMode::Zpx => {
            let zp = bus.peek(addr.wrapping_add(1));
            let _ = write!(text, " ${zp:02X},X");
        }
        AddrMode::Zpy => {
            let zp = bus.peek(addr.wrapping_add(1));
            let _ = write!(text, " ${zp:02X},Y");
        }
        AddrMode::Rel => {
            let offset = bus.peek(addr.wrapping_add(1)) as i8;
            let target = addr.wrapping_add(2).wrapping_add(offset as u16);
            let _ = write!(text, " ${target:04X}");
        }
        AddrMode::Abs => {
            let target = operand_u16(bus, addr);
            let _ = write!(text, " ${target:04X}");
        }
        AddrMode::Abx | AddrMode::AbxW => {
            let target = operand_u16(bus, addr);
            let _ = write!(text, " ${target:04X},X");
        }
        AddrMode::Aby | AddrMode::AbyW => {
            let target = operand_u16(bus, addr);
            let _ = write!(text, " ${target:04X},Y");
        }
        AddrMode::Ind => {
            let target = operand_u16(bus, addr);
            let _ = write!(text, " (${target:04X})");
        }
        AddrMode::Idx => {
            let zp = bus.peek(addr.wrapping_add(1));
            let _ = write!(text, " (${zp:02X},X)");
        }
        AddrMode::Idy | AddrMode::IdyW => {
            let zp = bus.peek(addr.wrapping_add(1));
            let _ = write!(text, " (${zp:02X}),Y");
        }
    }

    (text, len)
}

fn operand_u16(bus: &impl Bus, addr: u16) -> u16 {
    let lo = bus.peek(addr.wrapping_add(1));
    let hi = bus.peek(addr.wrapping_add(2));
    u16::from_le_bytes([lo, hi])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestBus {
        mem: [u8; 0x10000],
    }

    impl TestBus {
        fn new() -> Self {
            Self { mem: [0; 0x10000] }
        }
    }

    impl Bus for TestBus {
        fn read(&mut self, addr: u16) -> u8 {
            self.mem[addr as usize]
        }
        fn write(&mut self, addr: u16, value: u8) {
            self.mem[addr as usize] = value;
        }
        fn peek(&self, addr: u16) -> u8 {
            self.mem[addr as usize]
        }
    }

    #[test]
    fn disassembles_immediate_lda() {
        let mut bus = TestBus::new();
        bus.mem[0xC000] = 0xA9;
        bus.mem[0xC001] = 0x42;

        let (text, len) = disassemble(&bus, 0xC000);
        assert_eq!(text, "LDA #$42");
        assert_eq!(len, 2);
    }

    #[test]
    fn disassembles_absolute_jmp() {
        let mut bus = TestBus::new();
        bus.mem[0xC000] = 0x4C;
        bus.mem[0xC001] = 0xF5;
        bus.mem[0xC002] = 0xC5;

        let (text, len) = disassemble(&bus, 0xC000);
        assert_eq!(text, "JMP $C5F5");
        assert_eq!(len, 3);
    }

    #[test]
    fn disassembles_indirect_jmp_without_resolving_the_page_wrap_bug() {
        let mut bus = TestBus::new();
        bus.mem[0x1000] = 0x6C;
        bus.mem[0x1001] = 0xFF;
        bus.mem[0x1002] = 0x02;

        let (text, _) = disassemble(&bus, 0x1000);
        assert_eq!(text, "JMP ($02FF)");
    }

    #[test]
    fn disassembles_implied_and_accumulator_modes() {
        let mut bus = TestBus::new();
        bus.mem[0x8000] = 0xEA; // NOP, implied
        bus.mem[0x8001] = 0x4A; // LSR A, accumulator

        let (nop, nop_len) = disassemble(&bus, 0x8000);
        assert_eq!(nop, "NOP");
        assert_eq!(nop_len, 1);

        let (lsr, lsr_len) = disassemble(&bus, 0x8001);
        assert_eq!(lsr, "LSR A");
        assert_eq!(lsr_len, 1);
    }
}
