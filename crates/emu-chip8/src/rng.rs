//! Entropy source for the `Cxkk` random instruction.
//!
//! This is the machine's only nondeterminism, so it sits behind a seam:
//! production runs draw from the operating system, tests inject a seeded or
//! scripted source and stay reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of random bytes for the execution unit.
pub trait Entropy {
    fn next_byte(&mut self) -> u8;
}

/// Production source, backed by the thread-local OS-seeded generator.
#[derive(Debug, Default)]
pub struct ThreadEntropy;

impl Entropy for ThreadEntropy {
    fn next_byte(&mut self) -> u8 {
        rand::random()
    }
}

/// Seeded PRNG source: reproducible runs from a numeric seed.
pub struct SeededEntropy {
    rng: StdRng,
}

impl SeededEntropy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Entropy for SeededEntropy {
    fn next_byte(&mut self) -> u8 {
        self.rng.random()
    }
}

/// Fixed byte sequence, cycling. For tests that need exact values.
#[derive(Debug, Clone)]
pub struct ScriptedEntropy {
    bytes: Vec<u8>,
    next: usize,
}

impl ScriptedEntropy {
    /// # Panics
    ///
    /// Panics if `bytes` is empty.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        assert!(!bytes.is_empty(), "scripted entropy needs at least one byte");
        Self {
            bytes: bytes.to_vec(),
            next: 0,
        }
    }
}

impl Entropy for ScriptedEntropy {
    fn next_byte(&mut self) -> u8 {
        let byte = self.bytes[self.next];
        self.next = (self.next + 1) % self.bytes.len();
        byte
    }
}
