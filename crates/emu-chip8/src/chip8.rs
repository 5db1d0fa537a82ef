//! The machine aggregate.
//!
//! One `Chip8` value owns the whole machine state: memory, register file,
//! index register, program counter, call stack, timers, framebuffer and
//! keypad. Nothing outside the machine mutates any of it; the frontend
//! feeds key events in through methods and reads the framebuffer snapshot
//! out. Multiple independent instances are cheap and deterministic.

use std::fmt;

use emu_core::{Observable, Tickable, Value};

use crate::config::{Chip8Config, Quirks};
use crate::display::FrameBuffer;
use crate::keypad::Keypad;
use crate::memory::{LoadError, MAX_ROM_LEN, Memory, PROGRAM_BASE};
use crate::rng::{Entropy, ThreadEntropy};

/// Call stack capacity.
///
/// Historical interpreters allowed 12-16 nested calls. The depth here is
/// explicit and overflow is a reported [`Fault`], never silent wraparound.
pub const STACK_DEPTH: usize = 16;

/// A recoverable execution fault.
///
/// Faults are reported from [`Chip8::step`] and the faulting instruction
/// degrades to a no-op (the program counter has already advanced past it),
/// so a buggy ROM limps on instead of killing the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `2nnn` with the stack already full.
    StackOverflow { pc: u16 },
    /// `00EE` with nothing on the stack.
    StackUnderflow { pc: u16 },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackOverflow { pc } => write!(f, "stack overflow on CALL at {pc:#05X}"),
            Self::StackUnderflow { pc } => write!(f, "stack underflow on RET at {pc:#05X}"),
        }
    }
}

impl std::error::Error for Fault {}

/// The CHIP-8 machine.
pub struct Chip8 {
    pub(crate) memory: Memory,
    /// General-purpose registers V0-VF. VF doubles as the flag output of
    /// arithmetic, shift and draw instructions.
    pub(crate) v: [u8; 16],
    /// Index register.
    pub(crate) i: u16,
    /// Program counter.
    pub(crate) pc: u16,
    pub(crate) stack: [u16; STACK_DEPTH],
    /// Number of live stack entries.
    pub(crate) sp: usize,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) keypad: Keypad,
    pub(crate) quirks: Quirks,
    pub(crate) entropy: Box<dyn Entropy>,
    cpu_hz: u32,
    /// Last-loaded ROM, retained so `reset()` can restore it without
    /// touching storage.
    rom: Vec<u8>,
    /// Instructions executed since the last load/reset.
    step_count: u64,
    /// Faults reported since the last load/reset.
    fault_count: u64,
}

impl Chip8 {
    /// Create a machine with OS-backed entropy.
    #[must_use]
    pub fn new(config: &Chip8Config) -> Self {
        Self::with_entropy(config, Box::new(ThreadEntropy))
    }

    /// Create a machine drawing random bytes from `entropy`.
    #[must_use]
    pub fn with_entropy(config: &Chip8Config, entropy: Box<dyn Entropy>) -> Self {
        Self {
            memory: Memory::new(),
            v: [0; 16],
            i: 0,
            pc: PROGRAM_BASE,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: FrameBuffer::new(),
            keypad: Keypad::new(),
            quirks: config.quirks,
            entropy,
            cpu_hz: config.cpu_hz,
            rom: Vec::new(),
            step_count: 0,
            fault_count: 0,
        }
    }

    /// Replace the entropy source (e.g. with a seeded one).
    pub fn set_entropy(&mut self, entropy: Box<dyn Entropy>) {
        self.entropy = entropy;
    }

    /// Load a ROM: copy it to 0x200, retain it for [`reset`](Self::reset),
    /// and start fresh. An oversized ROM is rejected with the machine
    /// unchanged.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_LEN {
            return Err(LoadError::RomTooLarge { len: rom.len() });
        }
        self.rom.clear();
        self.rom.extend_from_slice(rom);
        self.restart();
        Ok(())
    }

    /// Restart the machine in place: memory re-zeroed, font reinstalled,
    /// the retained ROM copied back in, every register and timer cleared,
    /// PC at 0x200. No reallocation; equivalent to the state immediately
    /// after the original `load_rom`.
    pub fn reset(&mut self) {
        self.restart();
    }

    fn restart(&mut self) {
        self.memory.reset();
        // Length was validated when the ROM was first loaded.
        let _ = self.memory.load_program(&self.rom);
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_BASE;
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.framebuffer.clear();
        self.keypad.release_all();
        self.step_count = 0;
        self.fault_count = 0;
    }

    /// One fetch-decode-execute cycle.
    ///
    /// Returns a fault if the instruction hit a recoverable error; the
    /// machine keeps running either way.
    pub fn step(&mut self) -> Option<Fault> {
        let op_addr = self.pc;
        let opcode = self.memory.opcode_at(op_addr);
        // PC moves past the instruction at fetch. Handlers that jump, skip
        // or re-poll adjust it from there.
        self.pc = self.pc.wrapping_add(2) & 0xFFF;
        self.step_count += 1;
        let fault = self.execute(opcode, op_addr);
        if fault.is_some() {
            self.fault_count += 1;
        }
        fault
    }

    /// One 60 Hz timer tick: decrement both timers, floor at zero.
    ///
    /// This is the only way timers decrease; only `Fx15`/`Fx18` set them.
    pub fn timer_tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Read-only framebuffer snapshot for the renderer.
    #[must_use]
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// True while the sound timer is running. The audio collaborator's
    /// whole contract: beep iff this is true.
    #[must_use]
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// Mark a keypad key down (key = 0x0-0xF).
    pub fn press_key(&mut self, key: u8) {
        self.keypad.press(key);
    }

    /// Mark a keypad key up.
    pub fn release_key(&mut self, key: u8) {
        self.keypad.release(key);
    }

    #[must_use]
    pub fn is_key_pressed(&self, key: u8) -> bool {
        self.keypad.is_pressed(key)
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    #[must_use]
    pub fn index(&self) -> u16 {
        self.i
    }

    #[must_use]
    pub fn register(&self, x: u8) -> u8 {
        self.v[(x & 0x0F) as usize]
    }

    #[must_use]
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    #[must_use]
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    /// Configured instruction rate, for the scheduler.
    #[must_use]
    pub fn cpu_hz(&self) -> u32 {
        self.cpu_hz
    }

    #[must_use]
    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    #[must_use]
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    /// Peek a memory byte (inspection only).
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }
}

impl Tickable for Chip8 {
    /// One tick is one instruction. Faults are counted on the machine;
    /// callers that need them individually use [`Chip8::step`].
    fn tick(&mut self) {
        let _ = self.step();
    }
}

const QUERY_PATHS: &[&str] = &[
    "pc",
    "i",
    "dt",
    "st",
    "sound",
    "stack.depth",
    "steps",
    "faults",
    "v0",
    "v1",
    "v2",
    "v3",
    "v4",
    "v5",
    "v6",
    "v7",
    "v8",
    "v9",
    "va",
    "vb",
    "vc",
    "vd",
    "ve",
    "vf",
];

impl Observable for Chip8 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.pc.into()),
            "i" => Some(self.i.into()),
            "dt" => Some(self.delay_timer.into()),
            "st" => Some(self.sound_timer.into()),
            "sound" => Some(self.sound_active().into()),
            "stack.depth" => Some((self.sp as u64).into()),
            "steps" => Some(self.step_count.into()),
            "faults" => Some(self.fault_count.into()),
            _ => {
                let rest = path.strip_prefix('v')?;
                let reg = u8::from_str_radix(rest, 16).ok()?;
                if rest.len() == 1 && reg < 16 {
                    Some(self.v[reg as usize].into())
                } else {
                    None
                }
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
