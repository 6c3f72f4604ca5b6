//! 6502 addressing modes and the per-opcode addressing mode table.

/// Addressing mode used to resolve an instruction's operand.
///
/// The `*W` variants (`AbxW`, `AbyW`, `IdyW`) are identical to their plain
/// counterparts except that they always perform the dummy read at the
/// unindexed address before the indexed one, matching the bus behavior of
/// every write and read-modify-write instruction that uses indexed
/// addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// No operand; the instruction itself is the whole of the work.
    Imp,
    /// Operand is the accumulator register.
    Acc,
    /// 8-bit constant embedded in the instruction.
    Imm,
    /// 8-bit zero-page address.
    Zp0,
    /// Zero-page address plus X, wrapping within the zero page.
    Zpx,
    /// Zero-page address plus Y, wrapping within the zero page.
    Zpy,
    /// Signed 8-bit branch displacement.
    Rel,
    /// Full 16-bit address.
    Abs,
    /// 16-bit address plus X; page-crossing adds a cycle on reads.
    Abx,
    /// 16-bit address plus Y; page-crossing adds a cycle on reads.
    Aby,
    /// `(addr)`, used only by JMP; the page-wrap bug applies.
    Ind,
    /// `(zp,X)`.
    Idx,
    /// `(zp),Y`; page-crossing adds a cycle on reads.
    Idy,
    /// `Abs,X` with an unconditional dummy read (writes, read-modify-write).
    AbxW,
    /// `Abs,Y` with an unconditional dummy read (writes, read-modify-write).
    AbyW,
    /// `(zp),Y` with an unconditional dummy read (writes, read-modify-write).
    IdyW,
}

impl AddrMode {
    /// Operand length in bytes, not counting the opcode byte.
    #[must_use]
    pub const fn operand_size(self) -> u8 {
        match self {
            Self::Imp | Self::Acc => 0,
            Self::Imm
            | Self::Zp0
            | Self::Zpx
            | Self::Zpy
            | Self::Rel
            | Self::Idx
            | Self::Idy
            | Self::IdyW => 1,
            Self::Abs | Self::Abx | Self::Aby | Self::Ind | Self::AbxW | Self::AbyW => 2,
        }
    }

    /// Cycles spent resolving the operand, not counting the opcode fetch.
    /// Combined with an instruction-class adjustment this yields the total
    /// instruction cycle count; see [`crate::opcodes::cycles_for`].
    #[must_use]
    pub const fn base_cycles(self) -> u8 {
        match self {
            Self::Imp | Self::Acc => 0,
            Self::Imm => 1,
            Self::Zp0 => 2,
            Self::Zpx | Self::Zpy => 3,
            Self::Rel => 1,
            Self::Abs => 3,
            Self::Abx | Self::Aby => 3,
            Self::AbxW | Self::AbyW => 4,
            Self::Ind => 4,
            Self::Idx => 5,
            Self::Idy => 4,
            Self::IdyW => 5,
        }
    }

    /// Whether a page crossing while indexing this mode costs an extra
    /// cycle. Only true for the read-style indexed modes; the `*W`
    /// variants already pay that cycle unconditionally.
    #[must_use]
    pub const fn has_page_cross_penalty(self) -> bool {
        matches!(self, Self::Abx | Self::Aby | Self::Idy)
    }
}

/// Addressing mode for each of the 256 opcode bytes.
#[rustfmt::skip]
pub static ADDR_MODE_TABLE: [AddrMode; 256] = [
    //       0          1          2          3          4          5          6          7          8          9          A          B          C          D          E          F
    /* 0 */ AddrMode::Imp, AddrMode::Idx, AddrMode::Imp, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Acc, AddrMode::Imm, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* 1 */ AddrMode::Rel, AddrMode::Idy, AddrMode::Imp, AddrMode::IdyW,AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Imp, AddrMode::Aby, AddrMode::Imp, AddrMode::AbyW,AddrMode::Abx, AddrMode::Abx, AddrMode::AbxW,AddrMode::AbxW,
    /* 2 */ AddrMode::Abs, AddrMode::Idx, AddrMode::Imp, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Acc, AddrMode::Imm, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* 3 */ AddrMode::Rel, AddrMode::Idy, AddrMode::Imp, AddrMode::IdyW,AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Imp, AddrMode::Aby, AddrMode::Imp, AddrMode::AbyW,AddrMode::Abx, AddrMode::Abx, AddrMode::AbxW,AddrMode::AbxW,
    /* 4 */ AddrMode::Imp, AddrMode::Idx, AddrMode::Imp, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Acc, AddrMode::Imm, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* 5 */ AddrMode::Rel, AddrMode::Idy, AddrMode::Imp, AddrMode::IdyW,AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Imp, AddrMode::Aby, AddrMode::Imp, AddrMode::AbyW,AddrMode::Abx, AddrMode::Abx, AddrMode::AbxW,AddrMode::AbxW,
    /* 6 */ AddrMode::Imp, AddrMode::Idx, AddrMode::Imp, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Acc, AddrMode::Imm, AddrMode::Ind, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* 7 */ AddrMode::Rel, AddrMode::Idy, AddrMode::Imp, AddrMode::IdyW,AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Imp, AddrMode::Aby, AddrMode::Imp, AddrMode::AbyW,AddrMode::Abx, AddrMode::Abx, AddrMode::AbxW,AddrMode::AbxW,
    /* 8 */ AddrMode::Imm, AddrMode::Idx, AddrMode::Imm, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Imp, AddrMode::Imm, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* 9 */ AddrMode::Rel, AddrMode::IdyW,AddrMode::Imp, AddrMode::IdyW,AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpy, AddrMode::Zpy, AddrMode::Imp, AddrMode::AbyW,AddrMode::Imp, AddrMode::AbyW,AddrMode::AbxW,AddrMode::AbxW,AddrMode::AbyW,AddrMode::AbyW,
    /* A */ AddrMode::Imm, AddrMode::Idx, AddrMode::Imm, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Imp, AddrMode::Imm, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* B */ AddrMode::Rel, AddrMode::Idy, AddrMode::Imp, AddrMode::Idy, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpy, AddrMode::Zpy, AddrMode::Imp, AddrMode::Aby, AddrMode::Imp, AddrMode::Aby, AddrMode::Abx, AddrMode::Abx, AddrMode::Aby, AddrMode::Aby,
    /* C */ AddrMode::Imm, AddrMode::Idx, AddrMode::Imm, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Imp, AddrMode::Imm, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* D */ AddrMode::Rel, AddrMode::Idy, AddrMode::Imp, AddrMode::IdyW,AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Imp, AddrMode::Aby, AddrMode::Imp, AddrMode::AbyW,AddrMode::Abx, AddrMode::Abx, AddrMode::AbxW,AddrMode::AbxW,
    /* E */ AddrMode::Imm, AddrMode::Idx, AddrMode::Imm, AddrMode::Idx, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Zp0, AddrMode::Imp, AddrMode::Imm, AddrMode::Imp, AddrMode::Imm, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs, AddrMode::Abs,
    /* F */ AddrMode::Rel, AddrMode::Idy, AddrMode::Imp, AddrMode::IdyW,AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Zpx, AddrMode::Imp, AddrMode::Aby, AddrMode::Imp, AddrMode::AbyW,AddrMode::Abx, AddrMode::Abx, AddrMode::AbxW,AddrMode::AbxW,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_sizes_match_mode() {
        assert_eq!(AddrMode::Imp.operand_size(), 0);
        assert_eq!(AddrMode::Imm.operand_size(), 1);
        assert_eq!(AddrMode::Abs.operand_size(), 2);
    }

    #[test]
    fn table_matches_known_opcodes() {
        assert_eq!(ADDR_MODE_TABLE[0xA9], AddrMode::Imm); // LDA #
        assert_eq!(ADDR_MODE_TABLE[0xAD], AddrMode::Abs); // LDA abs
        assert_eq!(ADDR_MODE_TABLE[0x6C], AddrMode::Ind); // JMP (abs)
        assert_eq!(ADDR_MODE_TABLE[0x9D], AddrMode::AbxW); // STA abs,X
    }

    #[test]
    fn page_cross_only_on_read_variants() {
        assert!(AddrMode::Abx.has_page_cross_penalty());
        assert!(!AddrMode::AbxW.has_page_cross_penalty());
    }
}
