//! Execution bodies for the 151 official 6502 instructions.
//!
//! Each function receives the already-resolved [`OperandPointer`] and
//! returns any cycles beyond the opcode's base timing that the
//! instruction itself adds (only branches do; read-modify-write and
//! indexing penalties are accounted for by the caller).

use crate::addressing::AddrMode;
use crate::cpu::{Bus, Cpu, OperandPointer};
use crate::opcodes::Mnemonic;
use crate::status::Status;

/// Dispatches and executes one official instruction.
pub(crate) fn execute(
    cpu: &mut Cpu,
    bus: &mut impl Bus,
    mnemonic: Mnemonic,
    mode: AddrMode,
    operand: OperandPointer,
) -> u8 {
    use Mnemonic::{
        Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp,
        Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha,
        Php, Pla, Plp, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa,
        Txs, Tya,
    };

    match mnemonic {
        Lda => {
            let v = cpu.fetch_operand(bus, operand);
            *cpu.reg_a() = v;
            set_zn(cpu, v);
            0
        }
        Ldx => {
            let v = cpu.fetch_operand(bus, operand);
            *cpu.reg_x() = v;
            set_zn(cpu, v);
            0
        }
        Ldy => {
            let v = cpu.fetch_operand(bus, operand);
            *cpu.reg_y() = v;
            set_zn(cpu, v);
            0
        }
        Sta => {
            let v = *cpu.reg_a();
            cpu.store_operand(bus, operand, v);
            0
        }
        Stx => {
            let v = *cpu.reg_x();
            cpu.store_operand(bus, operand, v);
            0
        }
        Sty => {
            let v = *cpu.reg_y();
            cpu.store_operand(bus, operand, v);
            0
        }
        Tax => {
            let v = *cpu.reg_a();
            *cpu.reg_x() = v;
            set_zn(cpu, v);
            0
        }
        Tay => {
            let v = *cpu.reg_a();
            *cpu.reg_y() = v;
            set_zn(cpu, v);
            0
        }
        Txa => {
            let v = *cpu.reg_x();
            *cpu.reg_a() = v;
            set_zn(cpu, v);
            0
        }
        Tya => {
            let v = *cpu.reg_y();
            *cpu.reg_a() = v;
            set_zn(cpu, v);
            0
        }
        Tsx => {
            let v = *cpu.reg_sp();
            *cpu.reg_x() = v;
            set_zn(cpu, v);
            0
        }
        Txs => {
            let v = *cpu.reg_x();
            *cpu.reg_sp() = v;
            0
        }
        Pha => {
            let v = *cpu.reg_a();
            cpu.push_byte(bus, v);
            0
        }
        Php => {
            let v = cpu.reg_status().to_stack_byte(true);
            cpu.push_byte(bus, v);
            0
        }
        Pla => {
            let v = cpu.pop_byte(bus);
            *cpu.reg_a() = v;
            set_zn(cpu, v);
            0
        }
        Plp => {
            let v = cpu.pop_byte(bus);
            *cpu.reg_status() = Status::from_stack_byte(v);
            0
        }
        And => {
            let v = cpu.fetch_operand(bus, operand) & *cpu.reg_a();
            *cpu.reg_a() = v;
            set_zn(cpu, v);
            0
        }
        Ora => {
            let v = cpu.fetch_operand(bus, operand) | *cpu.reg_a();
            *cpu.reg_a() = v;
            set_zn(cpu, v);
            0
        }
        Eor => {
            let v = cpu.fetch_operand(bus, operand) ^ *cpu.reg_a();
            *cpu.reg_a() = v;
            set_zn(cpu, v);
            0
        }
        Bit => {
            let v = cpu.fetch_operand(bus, operand);
            let a = *cpu.reg_a();
            let status = cpu.reg_status();
            status.set_flag(Status::Z, (v & a) == 0);
            status.set_flag(Status::V, v & 0x40 != 0);
            status.set_flag(Status::N, v & 0x80 != 0);
            0
        }
        Adc => {
            let v = cpu.fetch_operand(bus, operand);
            add_with_carry(cpu, v);
            0
        }
        Sbc => {
            let v = cpu.fetch_operand(bus, operand);
            add_with_carry(cpu, !v);
            0
        }
        Cmp => {
            let v = cpu.fetch_operand(bus, operand);
            let a = *cpu.reg_a();
            compare(cpu, a, v);
            0
        }
        Cpx => {
            let v = cpu.fetch_operand(bus, operand);
            let x = *cpu.reg_x();
            compare(cpu, x, v);
            0
        }
        Cpy => {
            let v = cpu.fetch_operand(bus, operand);
            let y = *cpu.reg_y();
            compare(cpu, y, v);
            0
        }
        Inc => {
            let v = cpu.fetch_operand(bus, operand).wrapping_add(1);
            cpu.store_operand(bus, operand, v);
            set_zn(cpu, v);
            0
        }
        Dec => {
            let v = cpu.fetch_operand(bus, operand).wrapping_sub(1);
            cpu.store_operand(bus, operand, v);
            set_zn(cpu, v);
            0
        }
        Inx => {
            let v = cpu.reg_x().wrapping_add(1);
            *cpu.reg_x() = v;
            set_zn(cpu, v);
            0
        }
        Iny => {
            let v = cpu.reg_y().wrapping_add(1);
            *cpu.reg_y() = v;
            set_zn(cpu, v);
            0
        }
        Dex => {
            let v = cpu.reg_x().wrapping_sub(1);
            *cpu.reg_x() = v;
            set_zn(cpu, v);
            0
        }
        Dey => {
            let v = cpu.reg_y().wrapping_sub(1);
            *cpu.reg_y() = v;
            set_zn(cpu, v);
            0
        }
        Asl => {
            let v = cpu.fetch_operand(bus, operand);
            let result = v << 1;
            cpu.reg_status().set_flag(Status::C, v & 0x80 != 0);
            cpu.store_operand(bus, operand, result);
            set_zn(cpu, result);
            0
        }
        Lsr => {
            let v = cpu.fetch_operand(bus, operand);
            let result = v >> 1;
            cpu.reg_status().set_flag(Status::C, v & 0x01 != 0);
            cpu.store_operand(bus, operand, result);
            set_zn(cpu, result);
            0
        }
        Rol => {
            let v = cpu.fetch_operand(bus, operand);
            let carry_in = u8::from(cpu.status().contains(Status::C));
            let result = (v << 1) | carry_in;
            cpu.reg_status().set_flag(Status::C, v & 0x80 != 0);
            cpu.store_operand(bus, operand, result);
            set_zn(cpu, result);
            0
        }
        Ror => {
            let v = cpu.fetch_operand(bus, operand);
            let carry_in = u8::from(cpu.status().contains(Status::C));
            let result = (v >> 1) | (carry_in << 7);
            cpu.reg_status().set_flag(Status::C, v & 0x01 != 0);
            cpu.store_operand(bus, operand, result);
            set_zn(cpu, result);
            0
        }
        Clc => {
            cpu.reg_status().set_flag(Status::C, false);
            0
        }
        Sec => {
            cpu.reg_status().set_flag(Status::C, true);
            0
        }
        Cli => {
            cpu.reg_status().set_flag(Status::I, false);
            0
        }
        Sei => {
            cpu.reg_status().set_flag(Status::I, true);
            0
        }
        Cld => {
            cpu.reg_status().set_flag(Status::D, false);
            0
        }
        Sed => {
            cpu.reg_status().set_flag(Status::D, true);
            0
        }
        Clv => {
            cpu.reg_status().set_flag(Status::V, false);
            0
        }
        Nop => 0,
        Jmp => {
            if let OperandPointer::Memory(addr) = operand {
                *cpu.reg_pc() = addr;
            }
            0
        }
        Jsr => {
            if let OperandPointer::Memory(addr) = operand {
                let return_addr = cpu.pc().wrapping_sub(1);
                cpu.push_word(bus, return_addr);
                *cpu.reg_pc() = addr;
            }
            0
        }
        Rts => {
            let addr = cpu.pop_word(bus);
            *cpu.reg_pc() = addr.wrapping_add(1);
            0
        }
        Brk => {
            cpu.service_brk(bus);
            0
        }
        Rti => {
            let status_byte = cpu.pop_byte(bus);
            *cpu.reg_status() = Status::from_stack_byte(status_byte);
            let addr = cpu.pop_word(bus);
            *cpu.reg_pc() = addr;
            0
        }
        Bcc => branch(cpu, bus, operand, !cpu.status().contains(Status::C)),
        Bcs => branch(cpu, bus, operand, cpu.status().contains(Status::C)),
        Beq => branch(cpu, bus, operand, cpu.status().contains(Status::Z)),
        Bne => branch(cpu, bus, operand, !cpu.status().contains(Status::Z)),
        Bmi => branch(cpu, bus, operand, cpu.status().contains(Status::N)),
        Bpl => branch(cpu, bus, operand, !cpu.status().contains(Status::N)),
        Bvs => branch(cpu, bus, operand, cpu.status().contains(Status::V)),
        Bvc => branch(cpu, bus, operand, !cpu.status().contains(Status::V)),
    }
}

fn set_zn(cpu: &mut Cpu, value: u8) {
    cpu.reg_status().set_zn(value);
}

fn add_with_carry(cpu: &mut Cpu, operand: u8) {
    let a = *cpu.reg_a();
    let carry_in = u16::from(cpu.status().contains(Status::C));
    let sum = u16::from(a) + u16::from(operand) + carry_in;
    let result = sum as u8;

    let status = cpu.reg_status();
    status.set_flag(Status::C, sum > 0xFF);
    status.set_flag(
        Status::V,
        (!(a ^ operand) & (a ^ result) & 0x80) != 0,
    );
    *cpu.reg_a() = result;
    set_zn(cpu, result);
}

fn compare(cpu: &mut Cpu, register: u8, operand: u8) {
    let result = register.wrapping_sub(operand);
    let status = cpu.reg_status();
    status.set_flag(Status::C, register >= operand);
    status.set_zn(result);
}

/// Branch instructions resolve their operand to the address of the
/// relative-offset byte itself, consistent with every other addressing
/// mode resolving to a memory operand; the signed displacement still has
/// to be read from that address.
fn branch(cpu: &mut Cpu, bus: &mut impl Bus, operand: OperandPointer, condition: bool) -> u8 {
    if !condition {
        return 0;
    }

    let offset = cpu.fetch_operand(bus, operand) as i8;
    let pc = cpu.pc();
    let target = pc.wrapping_add_signed(i16::from(offset));
    let page_crossed = (pc & 0xFF00) != (target & 0xFF00);
    *cpu.reg_pc() = target;

    if page_crossed {
        2
    } else {
        1
    }
}
