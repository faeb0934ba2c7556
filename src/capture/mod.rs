// Capture module - Exporting the frame buffer
//
// - PNG screenshots of the current picture
// - JSON snapshots that can be restored into a frame buffer

pub mod screenshot;
pub mod snapshot;

pub use screenshot::{save_screenshot, write_png, ScreenshotError};
pub use snapshot::{FrameSnapshot, SnapshotError};
