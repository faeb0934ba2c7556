// Display module - In-memory picture for a page-addressed monochrome panel
//
// This module provides:
// - Panel geometry (width, height, 8-row pages)
// - Packed frame buffer with pixel addressing and a dirty flag
// - Line and circle rasterization into the frame buffer

pub mod framebuffer;
pub mod geometry;
pub mod raster;

pub use framebuffer::{pixel_address, FrameBuffer};
pub use geometry::{Geometry, GeometryError, PAGE_HEIGHT};
pub use raster::{draw_circle, draw_line};
