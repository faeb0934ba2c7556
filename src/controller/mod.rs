// Controller module - SSD1305 display driver
//
// Owns the frame buffer, brings the controller up, forwards drawing calls to
// the rasterizer and streams dirty frames over the bus.
//
// Data flow:
//
// ```text
// draw_line / draw_circle / set_pixel
//     -> rasterizer -> FrameBuffer (dirty = true)
// flush
//     -> [address window, after an interrupted flush]
//     -> FlushStream (preamble, pages, padding) -> Transport
// ```

pub mod commands;
pub mod protocol;

pub use protocol::{AddressWindow, FlushLayout, FlushStream, LayoutError};

use crate::bus::{BusError, BusMode, DeviceId, Framing, Transport};
use crate::config::DisplayConfig;
use crate::debug::{LogLevel, Logger};
use crate::display::{self, FrameBuffer, Geometry};
use commands::{
    DISPLAY_OFF, DISPLAY_ON, INIT_SEQUENCE, INVERT_DISPLAY, NORMAL_DISPLAY, SET_COLUMN_ADDRESS,
    SET_CONTRAST, SET_PAGE_ADDRESS,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, OutputPin};

/// Errors that can occur while driving the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// The bus rejected a transfer
    Bus(BusError),

    /// The D/C or reset line could not be driven
    Pin(ErrorKind),

    /// The flush layout does not match the geometry
    Layout(LayoutError),
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayError::Bus(e) => write!(f, "Bus error: {}", e),
            DisplayError::Pin(kind) => write!(f, "Pin error: {}", kind),
            DisplayError::Layout(e) => write!(f, "Invalid layout: {}", e),
        }
    }
}

impl std::error::Error for DisplayError {}

impl From<BusError> for DisplayError {
    fn from(e: BusError) -> Self {
        DisplayError::Bus(e)
    }
}

impl From<LayoutError> for DisplayError {
    fn from(e: LayoutError) -> Self {
        DisplayError::Layout(e)
    }
}

fn pin_error<E: embedded_hal::digital::Error>(e: E) -> DisplayError {
    DisplayError::Pin(e.kind())
}

/// SSD1305 display driver
///
/// Exclusively owns the bus handle, both control lines and the frame
/// buffer. All calls block until the bus has latched every byte.
pub struct Ssd1305<T, DC, RST> {
    transport: T,

    /// Data/command select (low = command)
    dc: DC,

    /// Reset line (active low)
    rst: RST,

    device: DeviceId,

    /// Current level of the D/C line
    mode: BusMode,

    layout: FlushLayout,

    /// Controller RAM window one flush rewrites
    window: AddressWindow,

    /// Set when a flush was cut short and the RAM pointer is out of place
    resync: bool,

    framebuffer: FrameBuffer,
    logger: Logger,
}

impl<T, DC, RST> Ssd1305<T, DC, RST>
where
    T: Transport,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Bring up the controller and return a driver with a blank frame buffer
    ///
    /// Initializes the bus, pulses reset, sends the configuration sequence,
    /// zeroes the whole controller RAM and switches the panel on.
    ///
    /// # Arguments
    /// * `transport` - Bus the controller is attached to
    /// * `dc` - Data/command select line
    /// * `rst` - Reset line
    /// * `delay` - Used for the reset pulse
    /// * `config` - Geometry, memory layout, bus and timing settings
    ///
    /// # Example
    /// ```
    /// use ssd1305::sim::{RecordingTransport, SimDelay, SimPin};
    /// use ssd1305::{DisplayConfig, Ssd1305};
    ///
    /// let dc = SimPin::new();
    /// let transport = RecordingTransport::new().with_dc_probe(dc.probe());
    /// let mut display = Ssd1305::new(
    ///     transport,
    ///     dc,
    ///     SimPin::new(),
    ///     &mut SimDelay::new(),
    ///     &DisplayConfig::default(),
    /// )
    /// .unwrap();
    ///
    /// display.draw_line(0, 0, 127, 31);
    /// assert_eq!(display.flush().unwrap(), 1056);
    /// assert_eq!(display.flush().unwrap(), 0);
    /// ```
    pub fn new<D: DelayNs>(
        transport: T,
        dc: DC,
        rst: RST,
        delay: &mut D,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        let window = config.validate()?;

        let mut logger = Logger::new();
        logger.set_log_level(config.logging.level);
        if config.logging.bus_trace {
            logger.enable_bus_trace();
        }

        let mut display = Ssd1305 {
            transport,
            dc,
            rst,
            device: config.bus.device,
            mode: BusMode::Command,
            layout: config.layout,
            window,
            resync: false,
            framebuffer: FrameBuffer::new(config.geometry),
            logger,
        };

        display.init(config, delay)?;
        Ok(display)
    }

    fn init<D: DelayNs>(&mut self, config: &DisplayConfig, delay: &mut D) -> Result<(), DisplayError> {
        self.transport.init(&config.bus)?;

        self.rst.set_low().map_err(pin_error)?;
        delay.delay_ms(config.timing.reset_pulse_ms);
        self.rst.set_high().map_err(pin_error)?;

        self.set_mode(BusMode::Command)?;
        self.write(&INIT_SEQUENCE, Framing::Continue)?;

        // Clear everything the controller holds, including off-screen columns
        self.set_mode(BusMode::Data)?;
        for _ in 0..self.layout.controller_ram_bytes {
            self.send(0x00, Framing::Continue)?;
        }

        self.set_mode(BusMode::Command)?;
        self.send(DISPLAY_ON, Framing::Last)?;

        let geometry = *self.framebuffer.geometry();
        self.logger.log_message(
            LogLevel::Info,
            format!(
                "SSD1305 initialized: {}x{} on device {}, {} RAM bytes cleared",
                geometry.width(),
                geometry.height(),
                self.device.0,
                self.layout.controller_ram_bytes
            ),
        );

        Ok(())
    }

    /// Drive the D/C line
    fn set_mode(&mut self, mode: BusMode) -> Result<(), DisplayError> {
        match mode {
            BusMode::Command => self.dc.set_low().map_err(pin_error)?,
            BusMode::Data => self.dc.set_high().map_err(pin_error)?,
        }
        self.mode = mode;
        Ok(())
    }

    /// Send one byte in the current mode
    fn send(&mut self, byte: u8, framing: Framing) -> Result<(), DisplayError> {
        self.transport.transfer(self.device, byte, framing)?;
        self.logger.log_transfer(self.mode, byte, framing);
        Ok(())
    }

    /// Send a run of bytes in the current mode, the final one framed `last`
    fn write(&mut self, bytes: &[u8], last: Framing) -> Result<(), DisplayError> {
        self.transport.write_all(self.device, bytes, last)?;

        if self.logger.is_bus_trace_enabled() {
            for (i, &byte) in bytes.iter().enumerate() {
                let framing = if i + 1 == bytes.len() {
                    last
                } else {
                    Framing::Continue
                };
                self.logger.log_transfer(self.mode, byte, framing);
            }
        }
        Ok(())
    }

    /// Send a complete command (opcode plus parameters) as one transfer
    fn command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.set_mode(BusMode::Command)?;
        self.write(bytes, Framing::Last)
    }

    /// Point the controller back at the start of its RAM window
    ///
    /// Also closes a transfer left open by an interrupted flush.
    ///
    /// # Returns
    /// Number of command bytes sent
    fn anchor(&mut self) -> Result<usize, DisplayError> {
        let window = [
            SET_COLUMN_ADDRESS,
            0,
            self.window.last_column,
            SET_PAGE_ADDRESS,
            0,
            self.window.last_page,
        ];
        self.command(&window)?;
        self.resync = false;

        self.logger.log_message(
            LogLevel::Warning,
            "RAM pointer re-anchored after interrupted flush".to_string(),
        );
        Ok(window.len())
    }

    /// Set or clear a pixel and mark the frame buffer dirty
    ///
    /// Coordinates outside the panel are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        self.framebuffer.set_pixel(x, y, on);
        self.framebuffer.mark_dirty();
    }

    /// Draw a line between two points, endpoints inclusive
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        display::draw_line(&mut self.framebuffer, x1, y1, x2, y2);
    }

    /// Draw a circle outline
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        display::draw_circle(&mut self.framebuffer, cx, cy, radius);
    }

    /// Blank the frame buffer
    ///
    /// The panel keeps its contents until the next `flush`.
    pub fn clear(&mut self) {
        self.framebuffer.clear();
        self.logger
            .log_message(LogLevel::Debug, "Frame buffer cleared".to_string());
    }

    /// Push the frame buffer to the controller if it changed
    ///
    /// # Returns
    /// Number of bytes transferred; 0 when the frame buffer was clean.
    /// On a bus or pin error the buffer stays dirty, and the next flush
    /// first re-sends the RAM address window so the retried frame lands
    /// in place.
    pub fn flush(&mut self) -> Result<usize, DisplayError> {
        if !self.framebuffer.is_dirty() {
            return Ok(0);
        }

        let anchored = if self.resync { self.anchor()? } else { 0 };

        let streamed = match self.stream_frame() {
            Ok(streamed) => streamed,
            Err(e) => {
                self.resync = true;
                self.logger
                    .log_message(LogLevel::Error, format!("Flush interrupted: {}", e));
                return Err(e);
            }
        };

        self.framebuffer.mark_clean();
        if self.logger.is_enabled(LogLevel::Debug) {
            self.logger.log_message(
                LogLevel::Debug,
                format!(
                    "Flushed {} bytes ({} pixels lit)",
                    streamed,
                    self.framebuffer.lit_pixels()
                ),
            );
        }

        Ok(anchored + streamed)
    }

    /// Stream the whole frame in data mode
    fn stream_frame(&mut self) -> Result<usize, DisplayError> {
        self.set_mode(BusMode::Data)?;

        let mut sent = 0;
        for (byte, framing) in FlushStream::new(&self.framebuffer, self.layout) {
            self.transport.transfer(self.device, byte, framing)?;
            self.logger.log_transfer(self.mode, byte, framing);
            sent += 1;
        }
        Ok(sent)
    }

    /// Switch the panel on
    pub fn display_on(&mut self) -> Result<(), DisplayError> {
        self.command(&[DISPLAY_ON])
    }

    /// Switch the panel off; controller RAM is retained
    pub fn display_off(&mut self) -> Result<(), DisplayError> {
        self.command(&[DISPLAY_OFF])
    }

    /// Set the bank 0 contrast level
    pub fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        self.command(&[SET_CONTRAST, level])
    }

    /// Invert (or restore) the panel polarity
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.command(&[if inverted { INVERT_DISPLAY } else { NORMAL_DISPLAY }])
    }

    /// Whether drawing has happened since the last flush
    pub fn is_dirty(&self) -> bool {
        self.framebuffer.is_dirty()
    }

    /// Panel geometry
    pub fn geometry(&self) -> &Geometry {
        self.framebuffer.geometry()
    }

    /// Read-only view of the frame buffer
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Direct frame buffer access
    ///
    /// Changes made through `FrameBuffer::set_pixel` do not mark the buffer
    /// dirty; call `FrameBuffer::mark_dirty` before flushing.
    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    /// Controller log
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Mutable controller log (to change level or attach a file)
    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }

    /// Borrow the transport (e.g. to inspect a recording)
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable transport access
    ///
    /// Bytes sent directly through the transport bypass the D/C handling
    /// and the logger.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the bus and control lines
    pub fn release(self) -> (T, DC, RST) {
        (self.transport, self.dc, self.rst)
    }
}
