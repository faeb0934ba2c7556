// Logger - Trace logging for controller activity
//
// Provides:
// - Bus transfer tracing (every byte with its D/C mode and framing)
// - Leveled driver messages
// - Log output to file or memory

use crate::bus::{BusMode, Framing};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warning,
    /// Info, warnings, and errors
    Info,
    /// Debug information
    Debug,
    /// Verbose trace logging (includes bus transfers)
    Trace,
}

/// Trace entry
///
/// Represents a single trace log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEntry {
    /// One byte sent over the bus
    Transfer {
        mode: BusMode,
        byte: u8,
        framing: Framing,
    },
    /// Custom message
    Message(LogLevel, String),
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEntry::Transfer {
                mode,
                byte,
                framing,
            } => {
                let end = match framing {
                    Framing::Continue => "",
                    Framing::Last => " LAST",
                };
                write!(f, "BUS {} {:02X}{}", mode, byte, end)
            }
            TraceEntry::Message(level, msg) => write!(f, "[{:?}] {}", level, msg),
        }
    }
}

/// Logger
///
/// Handles trace logging for the display controller.
/// Can log to memory buffer or file.
pub struct Logger {
    /// Current log level
    log_level: LogLevel,

    /// Enable per-byte bus tracing
    bus_trace: bool,

    /// In-memory trace buffer, oldest entry first
    trace_buffer: VecDeque<TraceEntry>,

    /// Maximum number of entries in trace buffer (0 = unlimited)
    max_buffer_size: usize,

    /// Output file
    output_file: Option<File>,
}

impl Logger {
    /// Create a new logger
    ///
    /// # Returns
    ///
    /// A new logger instance with logging disabled
    pub fn new() -> Self {
        Logger {
            log_level: LogLevel::None,
            bus_trace: false,
            trace_buffer: VecDeque::new(),
            max_buffer_size: 10000,
            output_file: None,
        }
    }

    /// Set the log level
    ///
    /// # Arguments
    ///
    /// * `level` - The log level to set
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    /// Get the current log level
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Check whether messages at `level` would be recorded
    ///
    /// Lets callers skip building expensive messages.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && level <= self.log_level
    }

    /// Enable bus transfer tracing
    pub fn enable_bus_trace(&mut self) {
        self.bus_trace = true;
    }

    /// Disable bus transfer tracing
    pub fn disable_bus_trace(&mut self) {
        self.bus_trace = false;
    }

    /// Check if bus transfer tracing is active
    ///
    /// # Returns
    ///
    /// `true` if bus tracing is enabled and the level is `Trace`
    pub fn is_bus_trace_enabled(&self) -> bool {
        self.bus_trace && self.log_level >= LogLevel::Trace
    }

    /// Set maximum trace buffer size
    ///
    /// When the buffer exceeds this size, old entries are removed.
    /// Set to 0 for unlimited size.
    ///
    /// # Arguments
    ///
    /// * `size` - Maximum number of entries (0 = unlimited)
    pub fn set_max_buffer_size(&mut self, size: usize) {
        self.max_buffer_size = size;

        if size > 0 && self.trace_buffer.len() > size {
            let excess = self.trace_buffer.len() - size;
            self.trace_buffer.drain(..excess);
        }
    }

    /// Open a log file for output
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the log file
    pub fn open_log_file<P: AsRef<Path>>(&mut self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        self.output_file = Some(file);
        Ok(())
    }

    /// Close the log file
    pub fn close_log_file(&mut self) {
        self.output_file = None;
    }

    /// Log a bus transfer
    ///
    /// # Arguments
    ///
    /// * `mode` - D/C mode the byte was sent in
    /// * `byte` - The transferred value
    /// * `framing` - Continuation or end of transfer
    pub fn log_transfer(&mut self, mode: BusMode, byte: u8, framing: Framing) {
        if !self.is_bus_trace_enabled() {
            return;
        }

        self.add_entry(TraceEntry::Transfer {
            mode,
            byte,
            framing,
        });
    }

    /// Log a message
    ///
    /// # Arguments
    ///
    /// * `level` - The log level for this message
    /// * `message` - The message to log
    pub fn log_message(&mut self, level: LogLevel, message: String) {
        if !self.is_enabled(level) {
            return;
        }

        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        if let Some(ref mut file) = self.output_file {
            let _ = writeln!(file, "{} [{:?}] {}", timestamp, level, message);
        }

        self.push(TraceEntry::Message(level, message));
    }

    /// Add an entry to the trace buffer and optionally write to file
    fn add_entry(&mut self, entry: TraceEntry) {
        if let Some(ref mut file) = self.output_file {
            let _ = writeln!(file, "{}", entry);
        }

        self.push(entry);
    }

    fn push(&mut self, entry: TraceEntry) {
        self.trace_buffer.push_back(entry);

        if self.max_buffer_size > 0 && self.trace_buffer.len() > self.max_buffer_size {
            self.trace_buffer.pop_front();
        }
    }

    /// Get the trace buffer
    pub fn trace_buffer(&self) -> &VecDeque<TraceEntry> {
        &self.trace_buffer
    }

    /// Clear the trace buffer
    pub fn clear_buffer(&mut self) {
        self.trace_buffer.clear();
    }

    /// Get the last N trace entries
    ///
    /// # Arguments
    ///
    /// * `count` - Number of entries to retrieve
    pub fn last_entries(&self, count: usize) -> impl Iterator<Item = &TraceEntry> {
        let start = self.trace_buffer.len().saturating_sub(count);
        self.trace_buffer.range(start..)
    }

    /// Format the last N entries as a string, one per line
    pub fn format_last_entries(&self, count: usize) -> String {
        let mut output = String::new();

        for entry in self.last_entries(count) {
            output.push_str(&format!("{}\n", entry));
        }

        output
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
