//! Transport trait, serial settings and error types.

use core::fmt;
use core::future::Future;

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// UART/communication I/O error.
    Io,
    /// UART framing error.
    Framing,
    /// Receive FIFO overrun.
    Overrun,
    /// The port could not be opened with the requested settings.
    Unsupported,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Framing => write!(f, "framing error"),
            Self::Overrun => write!(f, "receive overrun"),
            Self::Unsupported => write!(f, "unsupported serial settings"),
        }
    }
}

/// Parity setting of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Settings the transport is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
    /// Reads return only once the whole buffer is filled.
    pub full_reads: bool,
    /// Echo received bytes back to the sender.
    pub echo: bool,
}

impl SerialSettings {
    /// Binary 115200 8N1, full blocking reads, echo off.
    pub const LINK: Self = Self {
        baud_rate: 115_200,
        data_bits: 8,
        parity: Parity::None,
        stop_bits: 1,
        full_reads: true,
        echo: false,
    };
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self::LINK
    }
}

/// Half-duplex byte channel to the Bluetooth module.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Transport {
    /// Write all bytes to the line.
    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), TransportError>>;

    /// Read exactly `buf.len()` bytes, waiting as long as needed.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<(), TransportError>>;

    /// Check whether the transmitter is still shifting bytes out.
    fn is_busy(&self) -> bool;

    /// Take one byte if one is already waiting in the receive buffer.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    fn take_pending(&mut self) -> impl Future<Output = Result<Option<u8>, TransportError>>;
}

/// A not-yet-opened port that becomes a [`Transport`].
pub trait OpenTransport {
    type Transport: Transport;

    /// Open the port with the given settings.
    fn open(self, settings: &SerialSettings) -> Result<Self::Transport, TransportError>;
}
