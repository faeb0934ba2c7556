// Bus module - Byte transport between the driver and the controller
//
// The controller is fed one byte at a time over a serial bus. Every byte
// carries a framing bit telling the bus whether the logical transfer
// continues (chip select stays asserted) or ends with this byte. Whether a
// byte is a command or pixel data is chosen by the D/C line, which the
// controller driver toggles before a batch of transfers.
//
// ```text
// D/C low  : command bytes  (init table, display on/off, contrast, ...)
// D/C high : data bytes     (controller RAM contents)
// ```

use serde::{Deserialize, Serialize};

/// Framing of a single byte within a logical transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// More bytes follow in this transfer
    Continue,

    /// This byte ends the transfer
    Last,
}

/// Interpretation of bytes selected by the D/C line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusMode {
    /// D/C low: bytes are controller commands
    Command,

    /// D/C high: bytes are written to display RAM
    Data,
}

impl std::fmt::Display for BusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusMode::Command => write!(f, "CMD"),
            BusMode::Data => write!(f, "DAT"),
        }
    }
}

/// Bus device (chip select) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u8);

/// Bus settings applied once at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Chip select line the controller is wired to
    pub device: DeviceId,

    /// Bus clock divider (core clock / divider = bus clock)
    pub clock_divider: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            device: DeviceId(0),
            clock_divider: 42,
        }
    }
}

/// Bus errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Transfer attempted before `Transport::init`
    NotInitialized,

    /// Transfer did not complete in time
    Timeout,

    /// Transmit FIFO overrun
    Overrun,

    /// Device-specific failure
    Device(String),
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusError::NotInitialized => write!(f, "Bus not initialized"),
            BusError::Timeout => write!(f, "Bus transfer timed out"),
            BusError::Overrun => write!(f, "Bus FIFO overrun"),
            BusError::Device(msg) => write!(f, "Bus device error: {}", msg),
        }
    }
}

impl std::error::Error for BusError {}

/// Trait for byte-oriented transports that can drive the controller
///
/// Implementations block until the byte has been latched by the bus.
///
/// # Examples
///
/// A hardware SPI master implements this directly; the `sim` module provides
/// an in-memory recorder for host-side use.
pub trait Transport {
    /// Bring up the bus for the given device
    ///
    /// # Arguments
    /// * `config` - Chip select and clock settings
    fn init(&mut self, config: &BusConfig) -> Result<(), BusError>;

    /// Transfer a single byte
    ///
    /// # Arguments
    /// * `device` - Chip select of the target
    /// * `byte` - Value to send
    /// * `framing` - Whether the transfer continues after this byte
    fn transfer(&mut self, device: DeviceId, byte: u8, framing: Framing) -> Result<(), BusError>;

    /// Transfer a run of bytes
    ///
    /// Every byte but the final one is sent with `Framing::Continue`; the
    /// final byte uses `last`. An empty slice sends nothing.
    fn write_all(&mut self, device: DeviceId, bytes: &[u8], last: Framing) -> Result<(), BusError> {
        if let Some((&tail, head)) = bytes.split_last() {
            for &byte in head {
                self.transfer(device, byte, Framing::Continue)?;
            }
            self.transfer(device, tail, last)?;
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn init(&mut self, config: &BusConfig) -> Result<(), BusError> {
        (**self).init(config)
    }

    fn transfer(&mut self, device: DeviceId, byte: u8, framing: Framing) -> Result<(), BusError> {
        (**self).transfer(device, byte, framing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct VecTransport {
        config: Option<BusConfig>,
        sent: Vec<(DeviceId, u8, Framing)>,
    }

    impl Transport for VecTransport {
        fn init(&mut self, config: &BusConfig) -> Result<(), BusError> {
            self.config = Some(*config);
            Ok(())
        }

        fn transfer(&mut self, device: DeviceId, byte: u8, framing: Framing) -> Result<(), BusError> {
            if self.config.is_none() {
                return Err(BusError::NotInitialized);
            }
            self.sent.push((device, byte, framing));
            Ok(())
        }
    }

    #[test]
    fn test_write_all_framing() {
        let mut bus = VecTransport::default();
        bus.init(&BusConfig::default()).unwrap();
        bus.write_all(DeviceId(0), &[1, 2, 3], Framing::Last).unwrap();

        assert_eq!(
            bus.sent,
            vec![
                (DeviceId(0), 1, Framing::Continue),
                (DeviceId(0), 2, Framing::Continue),
                (DeviceId(0), 3, Framing::Last),
            ]
        );
    }

    #[test]
    fn test_write_all_empty() {
        let mut bus = VecTransport::default();
        bus.init(&BusConfig::default()).unwrap();
        bus.write_all(DeviceId(0), &[], Framing::Last).unwrap();
        assert!(bus.sent.is_empty());
    }

    #[test]
    fn test_errors_propagate() {
        let mut bus = VecTransport::default();
        let result = bus.write_all(DeviceId(1), &[0xAE], Framing::Last);
        assert_eq!(result, Err(BusError::NotInitialized));
    }

    #[test]
    fn test_mutable_reference_is_transport() {
        fn display_on<T: Transport>(mut bus: T) -> Result<(), BusError> {
            bus.init(&BusConfig::default())?;
            bus.transfer(DeviceId(0), 0xAF, Framing::Last)
        }

        let mut bus = VecTransport::default();
        display_on(&mut bus).unwrap();
        assert_eq!(bus.sent, vec![(DeviceId(0), 0xAF, Framing::Last)]);
    }

    #[test]
    fn test_bus_error_display() {
        assert_eq!(BusError::Timeout.to_string(), "Bus transfer timed out");
        assert_eq!(
            BusError::Device("nack".to_string()).to_string(),
            "Bus device error: nack"
        );
    }

    #[test]
    fn test_default_bus_config() {
        let config = BusConfig::default();
        assert_eq!(config.device, DeviceId(0));
        assert_eq!(config.clock_divider, 42);
    }
}
