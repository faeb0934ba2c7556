// SSD1305 command bytes
//
// Opcodes are sent with D/C low. Multi-byte commands are followed by their
// parameters, also in command mode.

/// Turn the panel off (sleep)
pub const DISPLAY_OFF: u8 = 0xAE;
/// Turn the panel on
pub const DISPLAY_ON: u8 = 0xAF;
/// Set contrast for bank 0, followed by the level
pub const SET_CONTRAST: u8 = 0x81;
/// Normal polarity (lit bit = lit pixel)
pub const NORMAL_DISPLAY: u8 = 0xA6;
/// Inverted polarity
pub const INVERT_DISPLAY: u8 = 0xA7;
/// Set column address window, followed by start and end column
pub const SET_COLUMN_ADDRESS: u8 = 0x21;
/// Set page address window, followed by start and end page
pub const SET_PAGE_ADDRESS: u8 = 0x22;

/// Power-on configuration sequence
///
/// Sent once after reset, before controller RAM is cleared and the panel
/// is switched on.
pub const INIT_SEQUENCE: [u8; 31] = [
    DISPLAY_OFF,
    0xD5, // display clock divide ratio
    0xA0,
    0xA8, // multiplex ratio
    0x3F,
    0xD3, // display offset
    0x00,
    0x40, // display start line 0
    0xAD, // master configuration
    0x8E,
    0xD8, // area color mode
    0x05,
    0xA1, // segment remap
    0xC8, // COM scan direction: remapped
    0xDA, // COM pins hardware configuration
    0x12,
    0x91, // lookup table
    0x3F,
    0x3F,
    0x3F,
    0x3F,
    SET_CONTRAST,
    0x8F,
    0xD9, // pre-charge period
    0xD2,
    0xDB, // VCOMH deselect level
    0x34,
    0xA4, // resume to RAM content
    NORMAL_DISPLAY,
    0x20, // memory addressing mode
    0x00, // horizontal
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_sequence_starts_with_display_off() {
        assert_eq!(INIT_SEQUENCE[0], DISPLAY_OFF);
        assert!(!INIT_SEQUENCE.contains(&DISPLAY_ON));
    }

    #[test]
    fn test_init_sequence_selects_horizontal_addressing() {
        let pos = INIT_SEQUENCE.iter().position(|&b| b == 0x20).unwrap();
        assert_eq!(INIT_SEQUENCE[pos + 1], 0x00);
    }
}
