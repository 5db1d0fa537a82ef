//! Core traits and types for machine emulation.
//!
//! An emulated machine advances in discrete ticks. Wall-clock time only
//! enters through [`FixedStep`], which converts elapsed time into a tick
//! count at a fixed rate; everything downstream of that conversion is
//! deterministic.

mod clock;
mod observable;
mod tickable;
mod ticks;

pub use clock::FixedStep;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
