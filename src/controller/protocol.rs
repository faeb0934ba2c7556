// Flush protocol - Byte layout of a frame buffer transfer
//
// The controller's RAM is wider than the visible panel and is preceded by a
// color data block this driver does not use. A flush therefore streams:
//
// ```text
// [preamble: 532 × 0x00]
// [page 0: 128 bytes][padding: 4 × 0xFF]
// [page 1: 128 bytes][padding: 4 × 0xFF]
// [page 2: 128 bytes][padding: 4 × 0xFF]
// [page 3: 128 bytes]                      <- final byte framed Last
// ```
//
// In horizontal addressing mode the controller's RAM pointer wraps at the end
// of its address window, so a flush only lands in place when it is exactly
// one window long. A flush cut short by a bus error leaves the pointer
// mid-window; the driver then re-sends the window (0x21/0x22) before the
// next frame.

use crate::bus::Framing;
use crate::display::{FrameBuffer, Geometry};
use serde::{Deserialize, Serialize};

/// Errors produced when a layout does not fit the controller RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// A flush would not cover controller RAM exactly once
    LengthMismatch {
        transfer_len: usize,
        controller_ram_bytes: usize,
    },

    /// Controller RAM is not a whole number of padded page rows
    PartialRow {
        controller_ram_bytes: usize,
        row_bytes: usize,
    },

    /// The address window does not fit the one-byte column/page commands
    WindowTooLarge { columns: usize, pages: usize },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::LengthMismatch {
                transfer_len,
                controller_ram_bytes,
            } => write!(
                f,
                "Flush of {} bytes does not match {} bytes of controller RAM",
                transfer_len, controller_ram_bytes
            ),
            LayoutError::PartialRow {
                controller_ram_bytes,
                row_bytes,
            } => write!(
                f,
                "Controller RAM of {} bytes is not a multiple of the {}-byte row",
                controller_ram_bytes, row_bytes
            ),
            LayoutError::WindowTooLarge { columns, pages } => write!(
                f,
                "Address window of {} columns x {} pages is too large",
                columns, pages
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Controller RAM window a flush covers, as sent with 0x21/0x22
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWindow {
    /// Last column address (first is 0)
    pub last_column: u8,

    /// Last page address (first is 0)
    pub last_page: u8,
}

/// Controller memory layout around the visible frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushLayout {
    /// Ignored color data bytes sent (as zero) before the pixels
    pub preamble_bytes: usize,

    /// Off-screen columns between consecutive pages
    pub padding_bytes: usize,

    /// Value written to the off-screen columns (0xFF = blank on this panel)
    pub padding_fill: u8,

    /// Size of controller RAM, cleared once at startup
    pub controller_ram_bytes: usize,
}

impl Default for FlushLayout {
    fn default() -> Self {
        FlushLayout {
            preamble_bytes: 532,
            padding_bytes: 4,
            padding_fill: 0xFF,
            controller_ram_bytes: 1056,
        }
    }
}

impl FlushLayout {
    /// Total number of bytes a flush of `geometry` transfers
    ///
    /// # Example
    /// ```
    /// use ssd1305::{FlushLayout, Geometry};
    /// let len = FlushLayout::default().transfer_len(&Geometry::SSD1305_128X32);
    /// assert_eq!(len, 532 + 512 + 3 * 4);
    /// ```
    pub fn transfer_len(&self, geometry: &Geometry) -> usize {
        self.preamble_bytes
            + geometry.storage_len()
            + self.padding_bytes * geometry.pages().saturating_sub(1)
    }

    /// Check that a flush of `geometry` rewrites controller RAM exactly once
    ///
    /// # Returns
    /// The RAM address window the flush covers: one column per visible
    /// column plus padding, and as many pages as controller RAM holds.
    ///
    /// # Example
    /// ```
    /// use ssd1305::{FlushLayout, Geometry};
    /// let window = FlushLayout::default()
    ///     .address_window(&Geometry::SSD1305_128X32)
    ///     .unwrap();
    /// assert_eq!((window.last_column, window.last_page), (131, 7));
    /// ```
    pub fn address_window(&self, geometry: &Geometry) -> Result<AddressWindow, LayoutError> {
        let transfer_len = self.transfer_len(geometry);
        if transfer_len != self.controller_ram_bytes {
            return Err(LayoutError::LengthMismatch {
                transfer_len,
                controller_ram_bytes: self.controller_ram_bytes,
            });
        }

        let row_bytes = geometry.width() + self.padding_bytes;
        if self.controller_ram_bytes % row_bytes != 0 {
            return Err(LayoutError::PartialRow {
                controller_ram_bytes: self.controller_ram_bytes,
                row_bytes,
            });
        }

        let pages = self.controller_ram_bytes / row_bytes;
        match (u8::try_from(row_bytes - 1), u8::try_from(pages - 1)) {
            (Ok(last_column), Ok(last_page)) => Ok(AddressWindow {
                last_column,
                last_page,
            }),
            _ => Err(LayoutError::WindowTooLarge {
                columns: row_bytes,
                pages,
            }),
        }
    }
}

/// Iterator over the `(byte, framing)` pairs of a single flush
///
/// Every byte is framed `Continue` except the final frame buffer byte,
/// which is framed `Last`.
#[derive(Debug, Clone)]
pub struct FlushStream<'a> {
    storage: &'a [u8],
    width: usize,
    layout: FlushLayout,
    preamble_left: usize,
    padding_left: usize,
    index: usize,
}

impl<'a> FlushStream<'a> {
    /// Start a flush of `fb` using `layout`
    pub fn new(fb: &'a FrameBuffer, layout: FlushLayout) -> Self {
        FlushStream {
            storage: fb.as_slice(),
            width: fb.geometry().width(),
            layout,
            preamble_left: layout.preamble_bytes,
            padding_left: 0,
            index: 0,
        }
    }
}

impl Iterator for FlushStream<'_> {
    type Item = (u8, Framing);

    fn next(&mut self) -> Option<Self::Item> {
        if self.preamble_left > 0 {
            self.preamble_left -= 1;
            return Some((0x00, Framing::Continue));
        }

        if self.padding_left > 0 {
            self.padding_left -= 1;
            return Some((self.layout.padding_fill, Framing::Continue));
        }

        let byte = *self.storage.get(self.index)?;
        self.index += 1;

        if self.index == self.storage.len() {
            return Some((byte, Framing::Last));
        }

        // End of a page row: pad out to the controller's RAM width
        if self.index % self.width == 0 {
            self.padding_left = self.layout.padding_bytes;
        }

        Some((byte, Framing::Continue))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.storage.len();
        let pixels_left = len - self.index;
        let boundaries_left = if pixels_left == 0 {
            0
        } else {
            (len - 1) / self.width - self.index / self.width
        };
        let remaining = self.preamble_left
            + self.padding_left
            + pixels_left
            + boundaries_left * self.layout.padding_bytes;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FlushStream<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(fb: &FrameBuffer, layout: FlushLayout) -> Vec<(u8, Framing)> {
        FlushStream::new(fb, layout).collect()
    }

    #[test]
    fn test_default_stream_length() {
        let fb = FrameBuffer::default();
        let stream = FlushStream::new(&fb, FlushLayout::default());
        assert_eq!(stream.len(), 1056);
        assert_eq!(stream.count(), 1056);
    }

    #[test]
    fn test_stream_layout() {
        let mut fb = FrameBuffer::default();
        for y in 0..32 {
            fb.set_pixel(0, y, true);
            fb.set_pixel(127, y, true);
        }

        let bytes = collect(&fb, FlushLayout::default());

        assert!(bytes[..532].iter().all(|&b| b == (0x00, Framing::Continue)));

        for page in 0..4 {
            let start = 532 + page * 132;
            assert_eq!(bytes[start].0, 0xFF, "page {} first column", page);
            assert_eq!(bytes[start + 127].0, 0xFF, "page {} last column", page);
            assert!(bytes[start + 1..start + 127].iter().all(|b| b.0 == 0x00));
            if page < 3 {
                assert!(bytes[start + 128..start + 132]
                    .iter()
                    .all(|&b| b == (0xFF, Framing::Continue)));
            }
        }
    }

    #[test]
    fn test_only_final_byte_is_last() {
        let fb = FrameBuffer::default();
        let bytes = collect(&fb, FlushLayout::default());

        let lasts: Vec<usize> = bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.1 == Framing::Last)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(lasts, vec![bytes.len() - 1]);
        assert_eq!(bytes.last(), Some(&(0x00, Framing::Last)));
    }

    #[test]
    fn test_no_padding_after_last_page() {
        let mut fb = FrameBuffer::default();
        fb.set_pixel(127, 31, true);
        let bytes = collect(&fb, FlushLayout::default());
        assert_eq!(bytes.last(), Some(&(0x80, Framing::Last)));
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let fb = FrameBuffer::default();
        let mut stream = FlushStream::new(&fb, FlushLayout::default());
        let mut expected = 1056;
        while stream.next().is_some() {
            expected -= 1;
            assert_eq!(stream.len(), expected);
        }
        assert_eq!(stream.len(), 0);
    }

    #[test]
    fn test_default_address_window() {
        let window = FlushLayout::default()
            .address_window(&Geometry::default())
            .unwrap();
        assert_eq!(window.last_column, 131);
        assert_eq!(window.last_page, 7);
    }

    #[test]
    fn test_address_window_rejects_short_flush() {
        let layout = FlushLayout {
            padding_bytes: 0,
            ..FlushLayout::default()
        };
        assert_eq!(
            layout.address_window(&Geometry::default()),
            Err(LayoutError::LengthMismatch {
                transfer_len: 1044,
                controller_ram_bytes: 1056
            })
        );
    }

    #[test]
    fn test_address_window_rejects_partial_row() {
        // 100 + 2 * 96 + 36 = 328, not a multiple of the 132-byte row
        let layout = FlushLayout {
            preamble_bytes: 100,
            padding_bytes: 36,
            padding_fill: 0xFF,
            controller_ram_bytes: 328,
        };
        assert_eq!(
            layout.address_window(&Geometry::new(96, 16).unwrap()),
            Err(LayoutError::PartialRow {
                controller_ram_bytes: 328,
                row_bytes: 132
            })
        );
    }

    #[test]
    fn test_address_window_rejects_wide_rows() {
        let layout = FlushLayout {
            preamble_bytes: 0,
            padding_bytes: 0,
            padding_fill: 0xFF,
            controller_ram_bytes: 300 * 2,
        };
        assert!(matches!(
            layout.address_window(&Geometry::new(300, 16).unwrap()),
            Err(LayoutError::WindowTooLarge { columns: 300, .. })
        ));
    }

    #[test]
    fn test_custom_layout() {
        let layout = FlushLayout {
            preamble_bytes: 0,
            padding_bytes: 2,
            padding_fill: 0xAA,
            controller_ram_bytes: 0,
        };
        let mut fb = FrameBuffer::new(Geometry::new(3, 16).unwrap());
        fb.set_pixel(1, 0, true);
        fb.set_pixel(2, 15, true);

        let bytes: Vec<u8> = FlushStream::new(&fb, layout).map(|(b, _)| b).collect();
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0xAA, 0xAA, 0x00, 0x00, 0x80]);
        assert_eq!(layout.transfer_len(fb.geometry()), 8);
    }
}
