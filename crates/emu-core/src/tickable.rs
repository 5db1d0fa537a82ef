//! Trait for components that can be advanced by clock ticks.

use crate::Ticks;

/// A component that can be advanced by clock ticks.
///
/// Every component that does work over time implements this trait. A tick
/// is the component's own unit of progress; rate conversion between
/// differently-clocked components happens outside, in the scheduler.
pub trait Tickable {
    /// Advance the component by one tick.
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
