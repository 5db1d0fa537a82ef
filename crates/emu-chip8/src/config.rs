//! Machine configuration and quirk flags.

/// Default CPU rate in instructions per second.
pub const DEFAULT_CPU_HZ: u32 = 700;

/// Historically ambiguous behaviours, each an explicit flag.
///
/// Real implementations of the instruction set disagreed on these points
/// and ROM corpora exist that depend on either choice, so none of them is
/// hard-coded. The defaults are the behaviours most modern ROMs expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// `Dxyn`: sprite pixels past the right/bottom edge wrap to the other
    /// side instead of being clipped. Default: clip.
    pub sprite_wrap: bool,
    /// `8xy6`/`8xyE`: the shifted operand is Vy (copied into Vx) instead of
    /// Vx in place. Default: shift Vx.
    pub shift_source_vy: bool,
    /// `Fx55`/`Fx65`: I ends up at `I + x + 1` after a bulk transfer.
    /// Default: I unchanged.
    pub index_increment: bool,
}

/// Configuration for creating a machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chip8Config {
    /// Target instruction rate. Timer and frame rates are fixed at 60 Hz
    /// regardless of this value.
    pub cpu_hz: u32,
    pub quirks: Quirks,
}

impl Default for Chip8Config {
    fn default() -> Self {
        Self {
            cpu_hz: DEFAULT_CPU_HZ,
            quirks: Quirks::default(),
        }
    }
}
