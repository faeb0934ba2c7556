// Frame snapshots
//
// Persists the frame buffer contents as versioned JSON so a scene can be
// restored later and flushed again.

use crate::display::{FrameBuffer, Geometry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Current snapshot format version
const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur during snapshot operations
#[derive(Debug)]
pub enum SnapshotError {
    /// I/O error
    Io(io::Error),

    /// Serialization/deserialization error
    Serialization(serde_json::Error),

    /// Snapshot format version mismatch
    VersionMismatch { expected: u32, found: u32 },

    /// Snapshot was taken from a panel with a different geometry
    GeometryMismatch { expected: Geometry, found: Geometry },

    /// Stored byte count doesn't match the stored geometry
    Corrupt { expected: usize, found: usize },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "I/O error: {}", e),
            SnapshotError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SnapshotError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SnapshotError::GeometryMismatch { expected, found } => write!(
                f,
                "Geometry mismatch: expected {}x{}, found {}x{}",
                expected.width(),
                expected.height(),
                found.width(),
                found.height()
            ),
            SnapshotError::Corrupt { expected, found } => {
                write!(f, "Corrupt snapshot: {} bytes, expected {}", found, expected)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Serialization(e)
    }
}

/// Saved frame buffer contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Version number for compatibility checking
    version: u32,

    /// Timestamp when the snapshot was taken
    timestamp: String,

    /// Panel the bytes were captured from
    geometry: Geometry,

    /// Packed storage bytes in wire order
    storage: Vec<u8>,
}

impl FrameSnapshot {
    /// Capture the current contents of a frame buffer
    pub fn capture(fb: &FrameBuffer) -> Self {
        FrameSnapshot {
            version: SNAPSHOT_VERSION,
            timestamp: chrono::Local::now().to_rfc3339(),
            geometry: *fb.geometry(),
            storage: fb.as_slice().to_vec(),
        }
    }

    /// Geometry the snapshot was taken with
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Capture time (RFC 3339)
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Copy the snapshot back into a frame buffer
    ///
    /// The frame buffer is marked dirty so the next flush shows it.
    pub fn restore(&self, fb: &mut FrameBuffer) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }

        if self.geometry != *fb.geometry() {
            return Err(SnapshotError::GeometryMismatch {
                expected: *fb.geometry(),
                found: self.geometry,
            });
        }

        if !fb.load_from_slice(&self.storage) {
            return Err(SnapshotError::Corrupt {
                expected: self.geometry.storage_len(),
                found: self.storage.len(),
            });
        }

        Ok(())
    }

    /// Write the snapshot as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot written by `save_to_file`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path)?;
        let snapshot: FrameSnapshot = serde_json::from_str(&json)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::draw_circle;

    #[test]
    fn test_capture_and_restore() {
        let mut fb = FrameBuffer::default();
        draw_circle(&mut fb, 64, 16, 12);
        let snapshot = FrameSnapshot::capture(&fb);

        let mut restored = FrameBuffer::default();
        snapshot.restore(&mut restored).unwrap();
        assert_eq!(restored.as_slice(), fb.as_slice());
        assert!(restored.is_dirty());
    }

    #[test]
    fn test_geometry_mismatch() {
        let fb = FrameBuffer::new(Geometry::new(64, 16).unwrap());
        let snapshot = FrameSnapshot::capture(&fb);

        let mut other = FrameBuffer::default();
        let err = snapshot.restore(&mut other).unwrap_err();
        assert!(matches!(err, SnapshotError::GeometryMismatch { .. }));
        assert!(!other.is_dirty());
    }

    #[test]
    fn test_version_mismatch() {
        let mut snapshot = FrameSnapshot::capture(&FrameBuffer::default());
        snapshot.version = 7;
        let err = snapshot.restore(&mut FrameBuffer::default()).unwrap_err();
        assert_eq!(err.to_string(), "Version mismatch: expected 1, found 7");
    }

    #[test]
    fn test_corrupt_storage() {
        let mut snapshot = FrameSnapshot::capture(&FrameBuffer::default());
        snapshot.storage.truncate(100);
        let err = snapshot.restore(&mut FrameBuffer::default()).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Corrupt {
                expected: 512,
                found: 100
            }
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("ssd1305_snap_{}.json", std::process::id()));

        let mut fb = FrameBuffer::default();
        fb.set_pixel(5, 5, true);
        let snapshot = FrameSnapshot::capture(&fb);
        snapshot.save_to_file(&path).unwrap();

        let loaded = FrameSnapshot::load_from_file(&path).unwrap();
        assert_eq!(loaded, snapshot);

        let _ = fs::remove_file(&path);
    }
}
