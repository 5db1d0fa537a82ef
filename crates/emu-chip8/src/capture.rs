//! Headless capture: PNG screenshots of the framebuffer.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::chip8::Chip8;
use crate::display::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// White-on-black pixel values.
const ON: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const OFF: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// Save the current framebuffer as a PNG file, scaled up by an integer
/// factor so the 64×32 grid is comfortably viewable.
pub fn save_screenshot(machine: &Chip8, path: &Path, scale: u32) -> Result<(), Box<dyn Error>> {
    let scale = scale.max(1) as usize;
    let width = SCREEN_WIDTH * scale;
    let height = SCREEN_HEIGHT * scale;

    let file = fs::File::create(path)?;
    let w = BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let pixels = machine.framebuffer().pixels();
    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let on = pixels[(y / scale) * SCREEN_WIDTH + x / scale];
            rgba.extend_from_slice(if on { &ON } else { &OFF });
        }
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}
