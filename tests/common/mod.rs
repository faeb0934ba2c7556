// Common test utilities for driver integration tests
//
// Builds simulated controllers and reads pixels back out of recorded flushes.

#![allow(dead_code)]

use ssd1305::sim::{RecordingTransport, SimDelay, SimPin};
use ssd1305::{BusMode, DisplayConfig, FlushLayout, FrameBuffer, Geometry, Ssd1305};
use std::collections::BTreeSet;

/// Driver wired to the in-memory bus
pub type SimDisplay = Ssd1305<RecordingTransport, SimPin, SimPin>;

/// Bring up a simulated controller with the given configuration
pub fn sim_display(config: &DisplayConfig) -> SimDisplay {
    let dc = SimPin::new();
    let transport = RecordingTransport::new().with_dc_probe(dc.probe());
    Ssd1305::new(transport, dc, SimPin::new(), &mut SimDelay::new(), config)
        .expect("simulated controller should initialize")
}

/// Bring up a simulated 128×32 controller and drop the init traffic
pub fn fresh_display() -> SimDisplay {
    let mut display = sim_display(&DisplayConfig::default());
    display.transport_mut().clear();
    display
}

/// Collect the lit pixels of a frame buffer
pub fn lit_pixels(fb: &FrameBuffer) -> BTreeSet<(i32, i32)> {
    let g = *fb.geometry();
    let mut set = BTreeSet::new();
    for y in 0..g.height() as i32 {
        for x in 0..g.width() as i32 {
            if fb.get_pixel(x, y) {
                set.insert((x, y));
            }
        }
    }
    set
}

/// Rebuild the visible frame buffer bytes from a recorded data-mode flush
///
/// Strips the preamble and the off-screen padding between pages.
pub fn decode_flush(data: &[u8], geometry: &Geometry, layout: &FlushLayout) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(geometry.storage_len());
    let mut rest = &data[layout.preamble_bytes..];

    for page in 0..geometry.pages() {
        let (row, tail) = rest.split_at(geometry.width());
        pixels.extend_from_slice(row);
        rest = tail;
        if page + 1 < geometry.pages() {
            rest = &rest[layout.padding_bytes..];
        }
    }

    assert!(rest.is_empty(), "trailing bytes after last page");
    pixels
}

/// Data-mode bytes recorded by a display's transport
pub fn data_bytes(display: &SimDisplay) -> Vec<u8> {
    display.transport().bytes(BusMode::Data)
}
