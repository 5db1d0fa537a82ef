//! The 16-key hex keypad.
//!
//! Keys are the nibble values `0x0-0xF`. The input collaborator sets and
//! clears key states between scheduler passes; the execution unit reads
//! them. How host keys map onto these nibbles is entirely the frontend's
//! concern.

/// State of the 16 keys.
#[derive(Debug, Clone, Default)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key down. Only the low nibble of `key` selects a key.
    pub fn press(&mut self, key: u8) {
        self.keys[(key & 0x0F) as usize] = true;
    }

    /// Mark a key up.
    pub fn release(&mut self, key: u8) {
        self.keys[(key & 0x0F) as usize] = false;
    }

    #[must_use]
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0x0F) as usize]
    }

    /// Lowest-numbered key currently down, if any. This is how the
    /// wait-for-key instruction resolves "any key".
    #[must_use]
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&down| down).map(|k| k as u8)
    }

    /// Release every key.
    pub fn release_all(&mut self) {
        self.keys = [false; 16];
    }
}
