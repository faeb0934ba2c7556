// SSD1305 Driver Library
// Frame buffer, rasterizer and bus protocol for SSD1305 monochrome OLED panels

// Public modules
pub mod bus;
pub mod capture;
pub mod config;
pub mod controller;
pub mod debug;
pub mod display;
pub mod sim;

// Re-export main types for convenience
pub use bus::{BusConfig, BusError, BusMode, DeviceId, Framing, Transport};
pub use config::DisplayConfig;
pub use controller::{
    AddressWindow, DisplayError, FlushLayout, FlushStream, LayoutError, Ssd1305,
};
pub use debug::{LogLevel, Logger, TraceEntry};
pub use display::{
    draw_circle, draw_line, pixel_address, FrameBuffer, Geometry, GeometryError, PAGE_HEIGHT,
};
