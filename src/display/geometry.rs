// Geometry - Visible panel dimensions and page packing
//
// The SSD1305 stores eight vertically stacked pixels per byte. A run of
// `width` bytes forms one page, and `height / 8` pages cover the panel.

use serde::{Deserialize, Serialize};

/// Pixels packed into a single storage byte
pub const PAGE_HEIGHT: usize = 8;

/// Errors produced when validating a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// Width or height is zero
    Empty { width: usize, height: usize },

    /// Page height other than the controller's 8 rows per byte
    UnsupportedPageHeight(usize),

    /// Height is not a whole number of pages
    PartialPage { height: usize, page_height: usize },
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Empty { width, height } => {
                write!(f, "Empty geometry: {}x{}", width, height)
            }
            GeometryError::UnsupportedPageHeight(page_height) => {
                write!(
                    f,
                    "Unsupported page height {} (expected {})",
                    page_height, PAGE_HEIGHT
                )
            }
            GeometryError::PartialPage {
                height,
                page_height,
            } => write!(
                f,
                "Height {} is not a multiple of the page height {}",
                height, page_height
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Display geometry
///
/// Immutable description of the visible panel. Passed to every component
/// that needs to know the framebuffer layout, so several controllers with
/// different panels can coexist without global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry", into = "RawGeometry")]
pub struct Geometry {
    width: usize,
    height: usize,
    page_height: usize,
}

/// Unvalidated mirror of `Geometry` used for (de)serialization
#[derive(Serialize, Deserialize)]
struct RawGeometry {
    width: usize,
    height: usize,
    page_height: usize,
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = GeometryError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        Geometry::with_page_height(raw.width, raw.height, raw.page_height)
    }
}

impl From<Geometry> for RawGeometry {
    fn from(geometry: Geometry) -> Self {
        RawGeometry {
            width: geometry.width,
            height: geometry.height,
            page_height: geometry.page_height,
        }
    }
}

impl Geometry {
    /// 128×32 panel driven by an SSD1305
    pub const SSD1305_128X32: Geometry = Geometry {
        width: 128,
        height: 32,
        page_height: PAGE_HEIGHT,
    };

    /// Create a geometry with the standard 8-row page
    ///
    /// # Arguments
    /// * `width` - Visible width in pixels
    /// * `height` - Visible height in pixels (multiple of 8)
    ///
    /// # Example
    /// ```
    /// use ssd1305::Geometry;
    /// let geometry = Geometry::new(128, 32).unwrap();
    /// assert_eq!(geometry.storage_len(), 512);
    /// ```
    pub fn new(width: usize, height: usize) -> Result<Self, GeometryError> {
        Self::with_page_height(width, height, PAGE_HEIGHT)
    }

    /// Create a geometry with an explicit page height
    ///
    /// Only the controller's native 8-row page is accepted; the parameter
    /// exists so configuration files can state it explicitly.
    pub fn with_page_height(
        width: usize,
        height: usize,
        page_height: usize,
    ) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::Empty { width, height });
        }
        if page_height != PAGE_HEIGHT {
            return Err(GeometryError::UnsupportedPageHeight(page_height));
        }
        if height % page_height != 0 {
            return Err(GeometryError::PartialPage {
                height,
                page_height,
            });
        }

        Ok(Geometry {
            width,
            height,
            page_height,
        })
    }

    /// Visible width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Visible height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows packed per storage byte
    #[inline]
    pub fn page_height(&self) -> usize {
        self.page_height
    }

    /// Number of pages (byte rows) in the framebuffer
    #[inline]
    pub fn pages(&self) -> usize {
        self.height / self.page_height
    }

    /// Framebuffer length in bytes
    #[inline]
    pub fn storage_len(&self) -> usize {
        self.width * self.pages()
    }

    /// Check whether signed coordinates fall on the panel
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::SSD1305_128X32
    }
}
