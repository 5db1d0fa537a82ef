//! Instruction decoder.
//!
//! Every instruction is two bytes, stored most-significant-byte first. The
//! high nibble selects the family; the remaining fields are fixed slices of
//! the word:
//!
//! - `nnn` — low 12 bits (address)
//! - `n`   — low 4 bits (nibble, e.g. sprite height)
//! - `x`   — bits 8-11 (first register)
//! - `y`   — bits 4-7 (second register)
//! - `kk`  — low 8 bits (immediate byte)
//!
//! Decoding is total: every one of the 65536 bit patterns decodes to
//! something. Patterns with no documented meaning become [`Instruction::Sys`]
//! (family 0) or [`Instruction::Unknown`], both of which execute as plain
//! no-ops.

/// A raw 16-bit opcode with field accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// High nibble, selecting the instruction family.
    #[must_use]
    pub const fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// Low 12 bits: address operand.
    #[must_use]
    pub const fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// Low 4 bits: nibble operand.
    #[must_use]
    pub const fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// Bits 8-11: first register operand.
    #[must_use]
    pub const fn x(self) -> u8 {
        ((self.0 >> 8) & 0x0F) as u8
    }

    /// Bits 4-7: second register operand.
    #[must_use]
    pub const fn y(self) -> u8 {
        ((self.0 >> 4) & 0x0F) as u8
    }

    /// Low 8 bits: immediate byte operand.
    #[must_use]
    pub const fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }
}

/// A decoded instruction.
///
/// One variant per documented form; families 0x0, 0x8, 0xE and 0xF carry a
/// sub-discriminant in the low nibble or byte, resolved here so execution
/// dispatches on a closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0nnn` — machine code routine. Deliberately unimplemented; no-op.
    Sys(u16),
    /// `00E0` — clear the display.
    Cls,
    /// `00EE` — return from subroutine.
    Ret,
    /// `1nnn` — jump.
    Jp(u16),
    /// `2nnn` — call subroutine.
    Call(u16),
    /// `3xkk` — skip next if `Vx == kk`.
    SeImm { x: u8, kk: u8 },
    /// `4xkk` — skip next if `Vx != kk`.
    SneImm { x: u8, kk: u8 },
    /// `5xy0` — skip next if `Vx == Vy`.
    SeReg { x: u8, y: u8 },
    /// `6xkk` — `Vx = kk`.
    LdImm { x: u8, kk: u8 },
    /// `7xkk` — `Vx += kk`, wrapping, VF untouched.
    AddImm { x: u8, kk: u8 },
    /// `8xy0` — `Vx = Vy`.
    LdReg { x: u8, y: u8 },
    /// `8xy1` — `Vx |= Vy`.
    Or { x: u8, y: u8 },
    /// `8xy2` — `Vx &= Vy`.
    And { x: u8, y: u8 },
    /// `8xy3` — `Vx ^= Vy`.
    Xor { x: u8, y: u8 },
    /// `8xy4` — `Vx += Vy`, VF = carry.
    AddReg { x: u8, y: u8 },
    /// `8xy5` — `Vx -= Vy`, VF = no borrow.
    Sub { x: u8, y: u8 },
    /// `8xy6` — shift right one, VF = bit shifted out.
    Shr { x: u8, y: u8 },
    /// `8xy7` — `Vx = Vy - Vx`, VF = no borrow.
    Subn { x: u8, y: u8 },
    /// `8xyE` — shift left one, VF = bit shifted out.
    Shl { x: u8, y: u8 },
    /// `9xy0` — skip next if `Vx != Vy`.
    SneReg { x: u8, y: u8 },
    /// `Annn` — `I = nnn`.
    LdIndex(u16),
    /// `Bnnn` — jump to `nnn + V0`.
    JpV0(u16),
    /// `Cxkk` — `Vx = random byte & kk`.
    Rnd { x: u8, kk: u8 },
    /// `Dxyn` — XOR-blit an n-row sprite from `I` at `(Vx, Vy)`, VF = collision.
    Drw { x: u8, y: u8, n: u8 },
    /// `Ex9E` — skip next if key `Vx` is pressed.
    Skp { x: u8 },
    /// `ExA1` — skip next if key `Vx` is not pressed.
    Sknp { x: u8 },
    /// `Fx07` — `Vx = delay timer`.
    LdFromDelay { x: u8 },
    /// `Fx0A` — poll until a key is pressed, then `Vx = key`.
    WaitKey { x: u8 },
    /// `Fx15` — `delay timer = Vx`.
    LdDelay { x: u8 },
    /// `Fx18` — `sound timer = Vx`.
    LdSound { x: u8 },
    /// `Fx1E` — `I += Vx`, VF = overflow past 0xFFF.
    AddIndex { x: u8 },
    /// `Fx29` — `I` = address of the built-in sprite for digit `Vx`.
    LdFont { x: u8 },
    /// `Fx33` — store three decimal digits of `Vx` at `I`, `I+1`, `I+2`.
    LdBcd { x: u8 },
    /// `Fx55` — store `V0..=Vx` at `I`.
    StoreRegs { x: u8 },
    /// `Fx65` — load `V0..=Vx` from `I`.
    LoadRegs { x: u8 },
    /// Any bit pattern with no documented meaning. Executes as a no-op.
    Unknown(u16),
}

impl Instruction {
    /// Decode an opcode. Total over all bit patterns; never fails.
    #[must_use]
    pub fn decode(op: Opcode) -> Self {
        let (x, y) = (op.x(), op.y());
        match op.family() {
            0x0 => match op.0 {
                0x00E0 => Self::Cls,
                0x00EE => Self::Ret,
                _ => Self::Sys(op.nnn()),
            },
            0x1 => Self::Jp(op.nnn()),
            0x2 => Self::Call(op.nnn()),
            0x3 => Self::SeImm { x, kk: op.kk() },
            0x4 => Self::SneImm { x, kk: op.kk() },
            0x5 if op.n() == 0 => Self::SeReg { x, y },
            0x6 => Self::LdImm { x, kk: op.kk() },
            0x7 => Self::AddImm { x, kk: op.kk() },
            0x8 => match op.n() {
                0x0 => Self::LdReg { x, y },
                0x1 => Self::Or { x, y },
                0x2 => Self::And { x, y },
                0x3 => Self::Xor { x, y },
                0x4 => Self::AddReg { x, y },
                0x5 => Self::Sub { x, y },
                0x6 => Self::Shr { x, y },
                0x7 => Self::Subn { x, y },
                0xE => Self::Shl { x, y },
                _ => Self::Unknown(op.0),
            },
            0x9 if op.n() == 0 => Self::SneReg { x, y },
            0xA => Self::LdIndex(op.nnn()),
            0xB => Self::JpV0(op.nnn()),
            0xC => Self::Rnd { x, kk: op.kk() },
            0xD => Self::Drw { x, y, n: op.n() },
            0xE => match op.kk() {
                0x9E => Self::Skp { x },
                0xA1 => Self::Sknp { x },
                _ => Self::Unknown(op.0),
            },
            0xF => match op.kk() {
                0x07 => Self::LdFromDelay { x },
                0x0A => Self::WaitKey { x },
                0x15 => Self::LdDelay { x },
                0x18 => Self::LdSound { x },
                0x1E => Self::AddIndex { x },
                0x29 => Self::LdFont { x },
                0x33 => Self::LdBcd { x },
                0x55 => Self::StoreRegs { x },
                0x65 => Self::LoadRegs { x },
                _ => Self::Unknown(op.0),
            },
            _ => Self::Unknown(op.0),
        }
    }
}
