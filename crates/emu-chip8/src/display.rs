//! Monochrome 64×32 framebuffer with XOR sprite blitting.
//!
//! Sprites are 1-15 rows of one byte each, bit 7 leftmost. Drawing XORs the
//! sprite into the grid; a collision is any pixel where sprite and buffer
//! were both on. The start coordinate always wraps into the grid; whether
//! pixels past the right/bottom edge clip or wrap is a quirk, selected per
//! blit by [`BlitMode`].

/// Framebuffer width in pixels.
pub const SCREEN_WIDTH: usize = 64;

/// Framebuffer height in pixels.
pub const SCREEN_HEIGHT: usize = 32;

/// Edge behaviour for sprite rows/columns that leave the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlitMode {
    /// Pixels past the right/bottom edge are dropped. The default; most
    /// ROMs expect it.
    #[default]
    Clip,
    /// Pixels past the edge re-enter on the opposite side. Some ROMs
    /// depend on this variant.
    Wrap,
}

/// The 64×32 1-bit pixel grid, row-major.
pub struct FrameBuffer {
    pixels: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl FrameBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// State of one pixel. Coordinates wrap into the grid.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(y % SCREEN_HEIGHT) * SCREEN_WIDTH + (x % SCREEN_WIDTH)]
    }

    /// Read-only snapshot for the renderer, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// XOR-blit a sprite. Returns true if any on-pixel was erased.
    ///
    /// The start coordinate wraps into the grid first; `mode` decides what
    /// happens to rows and columns that then run off the edge.
    pub fn blit(&mut self, x0: usize, y0: usize, rows: &[u8], mode: BlitMode) -> bool {
        let x0 = x0 % SCREEN_WIDTH;
        let y0 = y0 % SCREEN_HEIGHT;
        let mut collided = false;

        for (row, &byte) in rows.iter().enumerate() {
            let y = y0 + row;
            let y = match mode {
                BlitMode::Clip if y >= SCREEN_HEIGHT => break,
                BlitMode::Clip => y,
                BlitMode::Wrap => y % SCREEN_HEIGHT,
            };
            for bit in 0..8 {
                if byte & (0x80 >> bit) == 0 {
                    continue;
                }
                let x = x0 + bit;
                let x = match mode {
                    BlitMode::Clip if x >= SCREEN_WIDTH => continue,
                    BlitMode::Clip => x,
                    BlitMode::Wrap => x % SCREEN_WIDTH,
                };
                let cell = &mut self.pixels[y * SCREEN_WIDTH + x];
                if *cell {
                    collided = true;
                }
                *cell = !*cell;
            }
        }
        collided
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
