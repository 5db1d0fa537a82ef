//! CHIP-8 virtual machine.
//!
//! The CHIP-8 is a 1970s interpreted instruction set: 4 KiB of flat memory,
//! sixteen 8-bit registers, a 16-bit index register, a bounded call stack,
//! two 60 Hz countdown timers, a 64×32 monochrome framebuffer and a 16-key
//! hex keypad. Programs load at 0x200; the interpreter area below holds the
//! built-in hex digit font.
//!
//! Three independently-clocked activities share one control loop: CPU steps
//! at a configurable rate (700 Hz by default), timer decay at a fixed 60 Hz,
//! and frame presentation at 60 Hz. The [`Scheduler`] multiplexes them with
//! a fixed-timestep accumulator so the CPU rate never drifts with the
//! display refresh.
//!
//! Historically ambiguous behaviours (sprite clip vs wrap, shift operand,
//! index auto-increment on bulk transfers) are explicit [`Quirks`] flags
//! rather than silent defaults.

mod chip8;
mod config;
mod decode;
mod display;
mod exec;
mod keypad;
mod memory;
mod rng;
mod scheduler;

#[cfg(feature = "native")]
pub mod capture;
#[cfg(feature = "native")]
pub mod keyboard_map;

pub use chip8::{Chip8, Fault, STACK_DEPTH};
pub use config::{Chip8Config, DEFAULT_CPU_HZ, Quirks};
pub use decode::{Instruction, Opcode};
pub use display::{BlitMode, FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use keypad::Keypad;
pub use memory::{FONT_BASE, LoadError, MAX_ROM_LEN, Memory, PROGRAM_BASE};
pub use rng::{Entropy, ScriptedEntropy, SeededEntropy, ThreadEntropy};
pub use scheduler::{Pass, Scheduler};
