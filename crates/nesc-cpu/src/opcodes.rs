//! Official 6502 mnemonics, the opcode-to-mnemonic table, and instruction
//! timing.
//!
//! Every opcode byte resolves to an [`AddrMode`] (see [`crate::addressing`])
//! and, for the 151 official opcodes, a [`Mnemonic`]. The remaining 105
//! opcode bytes are unofficial; this CPU executes them as a bus-accurate
//! read/write of their addressed operand followed by a no-op, rather than
//! modeling each unofficial instruction's distinct side effects.

use crate::addressing::AddrMode;

/// Official 6502 instruction mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

use Mnemonic::{
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp, Cpx,
    Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla,
    Plp, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
};

/// Mnemonic for each of the 256 opcode bytes; `None` marks an unofficial
/// opcode.
#[rustfmt::skip]
pub static MNEMONIC_TABLE: [Option<Mnemonic>; 256] = [
    /* 0x00 */ Some(Brk), Some(Ora), None, None, None, Some(Ora), Some(Asl), None,
    /* 0x08 */ Some(Php), Some(Ora), Some(Asl), None, None, Some(Ora), Some(Asl), None,
    /* 0x10 */ Some(Bpl), Some(Ora), None, None, None, Some(Ora), Some(Asl), None,
    /* 0x18 */ Some(Clc), Some(Ora), None, None, None, Some(Ora), Some(Asl), None,
    /* 0x20 */ Some(Jsr), Some(And), None, None, Some(Bit), Some(And), Some(Rol), None,
    /* 0x28 */ Some(Plp), Some(And), Some(Rol), None, Some(Bit), Some(And), Some(Rol), None,
    /* 0x30 */ Some(Bmi), Some(And), None, None, None, Some(And), Some(Rol), None,
    /* 0x38 */ Some(Sec), Some(And), None, None, None, Some(And), Some(Rol), None,
    /* 0x40 */ Some(Rti), Some(Eor), None, None, None, Some(Eor), Some(Lsr), None,
    /* 0x48 */ Some(Pha), Some(Eor), Some(Lsr), None, Some(Jmp), Some(Eor), Some(Lsr), None,
    /* 0x50 */ Some(Bvc), Some(Eor), None, None, None, Some(Eor), Some(Lsr), None,
    /* 0x58 */ Some(Cli), Some(Eor), None, None, None, Some(Eor), Some(Lsr), None,
    /* 0x60 */ Some(Rts), Some(Adc), None, None, None, Some(Adc), Some(Ror), None,
    /* 0x68 */ Some(Pla), Some(Adc), Some(Ror), None, Some(Jmp), Some(Adc), Some(Ror), None,
    /* 0x70 */ Some(Bvs), Some(Adc), None, None, None, Some(Adc), Some(Ror), None,
    /* 0x78 */ Some(Sei), Some(Adc), None, None, None, Some(Adc), Some(Ror), None,
    /* 0x80 */ None, Some(Sta), None, None, Some(Sty), Some(Sta), Some(Stx), None,
    /* 0x88 */ Some(Dey), None, Some(Txa), None, Some(Sty), Some(Sta), Some(Stx), None,
    /* 0x90 */ Some(Bcc), Some(Sta), None, None, Some(Sty), Some(Sta), Some(Stx), None,
    /* 0x98 */ Some(Tya), Some(Sta), Some(Txs), None, None, Some(Sta), None, None,
    /* 0xA0 */ Some(Ldy), Some(Lda), Some(Ldx), None, Some(Ldy), Some(Lda), Some(Ldx), None,
    /* 0xA8 */ Some(Tay), Some(Lda), Some(Tax), None, Some(Ldy), Some(Lda), Some(Ldx), None,
    /* 0xB0 */ Some(Bcs), Some(Lda), None, None, Some(Ldy), Some(Lda), Some(Ldx), None,
    /* 0xB8 */ Some(Clv), Some(Lda), Some(Tsx), None, Some(Ldy), Some(Lda), Some(Ldx), None,
    /* 0xC0 */ Some(Cpy), Some(Cmp), None, None, Some(Cpy), Some(Cmp), Some(Dec), None,
    /* 0xC8 */ Some(Iny), Some(Cmp), Some(Dex), None, Some(Cpy), Some(Cmp), Some(Dec), None,
    /* 0xD0 */ Some(Bne), Some(Cmp), None, None, None, Some(Cmp), Some(Dec), None,
    /* 0xD8 */ Some(Cld), Some(Cmp), None, None, None, Some(Cmp), Some(Dec), None,
    /* 0xE0 */ Some(Cpx), Some(Sbc), None, None, Some(Cpx), Some(Sbc), Some(Inc), None,
    /* 0xE8 */ Some(Inx), Some(Sbc), Some(Nop), None, Some(Cpx), Some(Sbc), Some(Inc), None,
    /* 0xF0 */ Some(Beq), Some(Sbc), None, None, None, Some(Sbc), Some(Inc), None,
    /* 0xF8 */ Some(Sed), Some(Sbc), None, None, None, Some(Sbc), Some(Inc), None,
];

const fn is_register_op(m: Mnemonic) -> bool {
    matches!(
        m,
        Clc | Cld | Cli | Clv | Sec | Sed | Sei | Dex | Dey | Inx | Iny | Tax | Tay | Tsx | Txa
            | Txs | Tya | Nop
    )
}

const fn is_read_modify_write(m: Mnemonic) -> bool {
    matches!(m, Asl | Lsr | Rol | Ror | Inc | Dec)
}

/// Total instruction cycle count for an opcode with the given addressing
/// mode, not counting the dynamic extra cycle for a taken branch or a
/// branch that crosses a page, and not counting DMA/interrupt stalls.
#[must_use]
pub const fn cycles_for(mnemonic: Option<Mnemonic>, mode: AddrMode) -> u8 {
    if matches!(mode, AddrMode::Acc) {
        return 2;
    }
    match mnemonic {
        Some(Jsr | Rts | Rti) => 6,
        Some(Brk) => 7,
        Some(Pha | Php) => 3,
        Some(Pla | Plp) => 4,
        Some(Jmp) => {
            if matches!(mode, AddrMode::Ind) {
                5
            } else {
                3
            }
        }
        Some(m) if is_register_op(m) => 2,
        Some(m) if is_read_modify_write(m) => 1 + mode.base_cycles() + 2,
        _ => 1 + mode.base_cycles(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::ADDR_MODE_TABLE;

    #[test]
    fn lda_immediate_is_two_cycles() {
        assert_eq!(MNEMONIC_TABLE[0xA9], Some(Lda));
        assert_eq!(cycles_for(Some(Lda), ADDR_MODE_TABLE[0xA9]), 2);
    }

    #[test]
    fn inc_absolute_x_is_seven_cycles() {
        assert_eq!(MNEMONIC_TABLE[0xFE], Some(Inc));
        assert_eq!(cycles_for(Some(Inc), ADDR_MODE_TABLE[0xFE]), 7);
    }

    #[test]
    fn jmp_absolute_skips_the_final_read() {
        assert_eq!(cycles_for(Some(Jmp), AddrMode::Abs), 3);
        assert_eq!(cycles_for(Some(Jmp), AddrMode::Ind), 5);
    }

    #[test]
    fn brk_takes_seven_cycles() {
        assert_eq!(MNEMONIC_TABLE[0x00], Some(Brk));
        assert_eq!(cycles_for(Some(Brk), AddrMode::Imp), 7);
    }

    #[test]
    fn unofficial_opcode_still_has_a_cycle_count() {
        assert_eq!(MNEMONIC_TABLE[0x02], None);
        assert!(cycles_for(None, ADDR_MODE_TABLE[0x02]) > 0);
    }
}
