// Frame Buffer - Packed monochrome pixel storage
//
// Pixels are stored in the controller's native page layout: byte index
// `x + width * (y / 8)`, bit `y % 8` (bit 0 is the top row of the page).
// Flushing streams the bytes in storage order, so this layout must not change.

use super::geometry::Geometry;

/// Map a pixel to its storage byte and bit
///
/// # Arguments
/// * `geometry` - Panel geometry
/// * `x` - Column (0..width)
/// * `y` - Row (0..height)
///
/// # Returns
/// `(byte_index, bit_index)` within the framebuffer storage
///
/// Coordinates must already be in range; `FrameBuffer::set_pixel` performs
/// the bounds check.
#[inline]
pub fn pixel_address(geometry: &Geometry, x: usize, y: usize) -> (usize, u8) {
    let page = y / geometry.page_height();
    let bit = (y % geometry.page_height()) as u8;
    (x + geometry.width() * page, bit)
}

/// Frame buffer for a page-addressed monochrome display
///
/// Storage is allocated once from the geometry and never resized.
pub struct FrameBuffer {
    geometry: Geometry,

    /// Packed pixel bytes, `geometry.storage_len()` long
    storage: Box<[u8]>,

    /// Set whenever the contents may differ from what the controller shows
    dirty: bool,
}

impl FrameBuffer {
    /// Create a zeroed, clean frame buffer
    ///
    /// # Example
    /// ```
    /// use ssd1305::{FrameBuffer, Geometry};
    /// let fb = FrameBuffer::new(Geometry::SSD1305_128X32);
    /// assert_eq!(fb.as_slice().len(), 512);
    /// assert!(!fb.is_dirty());
    /// ```
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            storage: vec![0u8; geometry.storage_len()].into_boxed_slice(),
            dirty: false,
        }
    }

    /// Panel geometry this buffer was built for
    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Set or clear a single pixel
    ///
    /// Only the addressed bit changes; the other seven rows sharing the
    /// byte are preserved. Coordinates outside the panel are ignored.
    /// Does not mark the buffer dirty, drawing operations do that.
    ///
    /// # Arguments
    /// * `x` - Column
    /// * `y` - Row
    /// * `on` - `true` to light the pixel, `false` to clear it
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if !self.geometry.contains(x, y) {
            return;
        }

        let (index, bit) = pixel_address(&self.geometry, x as usize, y as usize);
        let mask = 1u8 << bit;
        if on {
            self.storage[index] |= mask;
        } else {
            self.storage[index] &= !mask;
        }
    }

    /// Read a single pixel
    ///
    /// # Returns
    /// `true` if lit, `false` if clear or outside the panel
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        if !self.geometry.contains(x, y) {
            return false;
        }

        let (index, bit) = pixel_address(&self.geometry, x as usize, y as usize);
        self.storage[index] & (1 << bit) != 0
    }

    /// Zero every pixel and mark the buffer dirty
    pub fn clear(&mut self) {
        self.storage.fill(0);
        self.dirty = true;
    }

    /// Whether the buffer has changed since the last flush
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the buffer as needing a flush
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Flag the buffer as in sync with the controller
    #[inline]
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Raw packed bytes in storage (wire) order
    pub fn as_slice(&self) -> &[u8] {
        &self.storage
    }

    /// Replace the contents with previously captured bytes
    ///
    /// # Returns
    /// `false` (and no change) if the length does not match the geometry
    pub fn load_from_slice(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() != self.storage.len() {
            return false;
        }
        self.storage.copy_from_slice(bytes);
        self.dirty = true;
        true
    }

    /// Number of lit pixels
    pub fn lit_pixels(&self) -> usize {
        self.storage.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Expand to one byte per pixel in row-major order
    ///
    /// Lit pixels become 0xFF and clear pixels 0x00, ready for 8-bit
    /// grayscale image encoders.
    pub fn to_luma(&self) -> Vec<u8> {
        let (width, height) = (self.geometry.width(), self.geometry.height());
        let mut luma = Vec::with_capacity(width * height);

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                luma.push(if self.get_pixel(x, y) { 0xFF } else { 0x00 });
            }
        }

        luma
    }

    /// Render a text preview, `#` for lit pixels and `.` for clear ones
    pub fn to_ascii(&self) -> String {
        let (width, height) = (self.geometry.width(), self.geometry.height());
        let mut out = String::with_capacity((width + 1) * height);

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                out.push(if self.get_pixel(x, y) { '#' } else { '.' });
            }
            out.push('\n');
        }

        out
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(Geometry::default())
    }
}
