// Screenshot functionality
//
// Renders the frame buffer as an 8-bit grayscale PNG.

use crate::display::FrameBuffer;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save a screenshot of the frame buffer
///
/// The file is named `screenshot_<timestamp>.png` inside `dir`, which is
/// created if needed.
///
/// # Returns
///
/// Path of the written file
///
/// # Example
///
/// ```no_run
/// use ssd1305::capture::save_screenshot;
/// use ssd1305::FrameBuffer;
///
/// let fb = FrameBuffer::default();
/// let path = save_screenshot(&fb, "screenshots").expect("Failed to save screenshot");
/// println!("Screenshot saved to: {}", path.display());
/// ```
pub fn save_screenshot<P: AsRef<Path>>(
    fb: &FrameBuffer,
    dir: P,
) -> Result<PathBuf, ScreenshotError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S%.3f");
    let file_path = dir.join(format!("screenshot_{}.png", timestamp));

    write_png(fb, &file_path)?;
    Ok(file_path)
}

/// Encode the frame buffer as a PNG at `path`
pub fn write_png(fb: &FrameBuffer, path: &Path) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let geometry = fb.geometry();
    let mut encoder = png::Encoder::new(w, geometry.width() as u32, geometry.height() as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&fb.to_luma())?;

    Ok(())
}
