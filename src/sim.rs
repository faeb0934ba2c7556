// Simulator - Host-side stand-ins for the bus, control lines and delay
//
// Lets the driver run without hardware: every byte is recorded together with
// the D/C level at the moment it was sent, pins remember their level, and the
// delay just adds up the time it was asked to wait.

use crate::bus::{BusConfig, BusError, BusMode, DeviceId, Framing, Transport};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

/// Shared state of a simulated output line
#[derive(Debug, Default)]
struct PinState {
    high: Cell<bool>,
    writes: Cell<usize>,
}

/// Simulated push-pull output pin, starts low
#[derive(Debug, Clone, Default)]
pub struct SimPin {
    state: Rc<PinState>,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only handle observing this pin
    pub fn probe(&self) -> PinProbe {
        PinProbe {
            state: Rc::clone(&self.state),
        }
    }

    fn drive(&mut self, high: bool) {
        self.state.high.set(high);
        self.state.writes.set(self.state.writes.get() + 1);
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// Observer for a `SimPin`
#[derive(Debug, Clone)]
pub struct PinProbe {
    state: Rc<PinState>,
}

impl PinProbe {
    /// Current level of the pin
    pub fn is_high(&self) -> bool {
        self.state.high.get()
    }

    /// Number of times the pin has been driven
    pub fn writes(&self) -> usize {
        self.state.writes.get()
    }
}

/// Delay that only accounts for the time requested
#[derive(Debug, Default)]
pub struct SimDelay {
    elapsed_ns: u64,
}

impl SimDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated wait in nanoseconds
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

/// One recorded bus transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusTransfer {
    pub device: DeviceId,

    /// D/C level at the time of the transfer; `Command` when no probe is attached
    pub mode: BusMode,

    pub byte: u8,
    pub framing: Framing,
}

/// Transport that records every byte instead of sending it
#[derive(Debug, Default)]
pub struct RecordingTransport {
    config: Option<BusConfig>,
    dc_probe: Option<PinProbe>,
    transfers: Vec<BusTransfer>,

    /// Successful transfers left before the stored error is returned
    fail_after: Option<(usize, BusError)>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag each recorded byte with the level of the given D/C line
    pub fn with_dc_probe(mut self, probe: PinProbe) -> Self {
        self.dc_probe = Some(probe);
        self
    }

    /// Settings passed to `init`, if it has been called
    pub fn config(&self) -> Option<&BusConfig> {
        self.config.as_ref()
    }

    /// Everything sent so far
    pub fn transfers(&self) -> &[BusTransfer] {
        &self.transfers
    }

    /// Bytes sent with the given D/C mode, in order
    pub fn bytes(&self, mode: BusMode) -> Vec<u8> {
        self.transfers
            .iter()
            .filter(|t| t.mode == mode)
            .map(|t| t.byte)
            .collect()
    }

    /// Number of completed logical transfers (bytes framed `Last`)
    pub fn completed_transfers(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| t.framing == Framing::Last)
            .count()
    }

    /// Forget the recording
    pub fn clear(&mut self) {
        self.transfers.clear();
    }

    /// Make the bus fail with `error` after `count` more bytes
    pub fn fail_after(&mut self, count: usize, error: BusError) {
        self.fail_after = Some((count, error));
    }
}

impl Transport for RecordingTransport {
    fn init(&mut self, config: &BusConfig) -> Result<(), BusError> {
        self.config = Some(*config);
        Ok(())
    }

    fn transfer(&mut self, device: DeviceId, byte: u8, framing: Framing) -> Result<(), BusError> {
        if self.config.is_none() {
            return Err(BusError::NotInitialized);
        }

        if let Some((remaining, error)) = self.fail_after.as_mut() {
            if *remaining == 0 {
                return Err(error.clone());
            }
            *remaining -= 1;
        }

        let mode = match &self.dc_probe {
            Some(probe) if probe.is_high() => BusMode::Data,
            _ => BusMode::Command,
        };

        self.transfers.push(BusTransfer {
            device,
            mode,
            byte,
            framing,
        });
        Ok(())
    }
}
