//! Host keyboard → hex keypad mapping.
//!
//! The conventional layout puts the 4×4 pad under the left hand:
//!
//! ```text
//!   pad            host
//!  1 2 3 C        1 2 3 4
//!  4 5 6 D        Q W E R
//!  7 8 9 E        A S D F
//!  A 0 B F        Z X C V
//! ```

use winit::keyboard::KeyCode;

/// Map a host key to a keypad nibble. Returns `None` for unmapped keys.
#[must_use]
pub fn map_keycode(key: KeyCode) -> Option<u8> {
    match key {
        KeyCode::Digit1 => Some(0x1),
        KeyCode::Digit2 => Some(0x2),
        KeyCode::Digit3 => Some(0x3),
        KeyCode::Digit4 => Some(0xC),
        KeyCode::KeyQ => Some(0x4),
        KeyCode::KeyW => Some(0x5),
        KeyCode::KeyE => Some(0x6),
        KeyCode::KeyR => Some(0xD),
        KeyCode::KeyA => Some(0x7),
        KeyCode::KeyS => Some(0x8),
        KeyCode::KeyD => Some(0x9),
        KeyCode::KeyF => Some(0xE),
        KeyCode::KeyZ => Some(0xA),
        KeyCode::KeyX => Some(0x0),
        KeyCode::KeyC => Some(0xB),
        KeyCode::KeyV => Some(0xF),
        _ => None,
    }
}
