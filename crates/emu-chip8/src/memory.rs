//! Flat 4 KiB memory with the interpreter area and built-in font.
//!
//! # Memory map
//!
//! - `0x000-0x1FF` — interpreter area. Programs must not rely on its
//!   contents; the built-in hex digit font lives at `0x050-0x09F`.
//! - `0x200-0xFFF` — program space. ROM bytes are copied here at load.
//!
//! Addresses are 12 bits wide; all accesses mask to `0xFFF`, so reads and
//! writes past the top of memory wrap within the flat space rather than
//! indexing out of bounds.

use std::fmt;

/// Total memory size in bytes.
pub const RAM_SIZE: usize = 4096;

/// Address where programs are loaded and execution begins.
pub const PROGRAM_BASE: u16 = 0x200;

/// Base address of the built-in hex digit sprites.
pub const FONT_BASE: u16 = 0x050;

/// Largest ROM that fits in the program space.
pub const MAX_ROM_LEN: usize = RAM_SIZE - PROGRAM_BASE as usize;

/// Height of each built-in digit sprite in bytes.
pub const FONT_HEIGHT: u16 = 5;

/// The sixteen 5-byte hex digit sprites, `0`-`F`.
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// ROM load failure. Load errors leave the machine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// The ROM does not fit in the program space.
    RomTooLarge { len: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RomTooLarge { len } => {
                write!(f, "ROM is {len} bytes (at most {MAX_ROM_LEN} fit at {PROGRAM_BASE:#05X})")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Flat addressable memory.
pub struct Memory {
    bytes: [u8; RAM_SIZE],
}

impl Memory {
    /// Zeroed memory with the font installed.
    #[must_use]
    pub fn new() -> Self {
        let mut memory = Self {
            bytes: [0; RAM_SIZE],
        };
        memory.install_font();
        memory
    }

    /// Re-zero everything and reinstall the font, in place.
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        self.install_font();
    }

    fn install_font(&mut self) {
        let base = FONT_BASE as usize;
        self.bytes[base..base + FONT.len()].copy_from_slice(&FONT);
    }

    /// Validate a ROM's size and copy it into the program space.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_LEN {
            return Err(LoadError::RomTooLarge { len: rom.len() });
        }
        let base = PROGRAM_BASE as usize;
        self.bytes[base..base + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Read a byte. The address is masked into the 12-bit space.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[(addr & 0xFFF) as usize]
    }

    /// Write a byte. The address is masked into the 12-bit space.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & 0xFFF) as usize] = value;
    }

    /// Read a 16-bit opcode, big-endian: high byte at `addr`.
    #[must_use]
    pub fn opcode_at(&self, addr: u16) -> u16 {
        u16::from(self.read(addr)) << 8 | u16::from(self.read(addr.wrapping_add(1)))
    }

    /// Address of the built-in sprite for a hex digit.
    #[must_use]
    pub fn font_addr(digit: u8) -> u16 {
        FONT_BASE + u16::from(digit & 0x0F) * FONT_HEIGHT
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
