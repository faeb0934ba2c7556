// Debug module - Diagnostics for the display driver
//
// Provides the trace logger used by the controller: leveled messages plus
// optional per-byte bus tracing, kept in memory and optionally written to a
// file. Tracing is off by default and costs a single branch per byte.

pub mod logger;

pub use logger::{LogLevel, Logger, TraceEntry};
