//! Command-mode text protocol of the Bluetooth serial module.
//!
//! The module accepts ASCII commands while in command mode. The transmitter
//! only ever sends three of them:
//!
//! | Command | Bytes | Reply |
//! |---------|-------|-------|
//! | Enter command mode | `$$$` | 4 bytes containing `CMD` |
//! | Connect to peer | `C,<MAC>\r` | 16 bytes |
//! | Leave command mode | `---\r\n` | 1 byte |
//!
//! Replies are judged by literal byte matching only.

use core::fmt;

/// Escape sequence that switches the module into command mode.
pub const ENTER_COMMAND_MODE: &[u8] = b"$$$";

/// Reply length read after [`ENTER_COMMAND_MODE`].
pub const ENTER_REPLY_LEN: usize = 4;

/// Marker a command-mode reply must contain.
pub const COMMAND_MODE_ACK: &[u8] = b"CMD";

/// Sequence that returns the module to data mode.
pub const EXIT_COMMAND_MODE: &[u8] = b"---\r\n";

/// Reply length read after [`EXIT_COMMAND_MODE`].
pub const EXIT_REPLY_LEN: usize = 1;

/// Reply length read after the connect command.
pub const CONNECT_REPLY_LEN: usize = 16;

/// Number of hex digits in a peer address.
pub const ADDRESS_DIGITS: usize = 12;

/// Size of the connect command: `C,` + address + `\r`.
pub const CONNECT_COMMAND_LEN: usize = ADDRESS_DIGITS + 3;

/// Error type for reply validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Command-mode reply did not contain `CMD`.
    MissingCommandAck,
    /// Connect reply did not match the configured success check.
    ConnectRejected,
    /// Requested reply does not fit the reply buffer.
    ReplyTooLong,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommandAck => write!(f, "module did not enter command mode"),
            Self::ConnectRejected => write!(f, "connect reply rejected"),
            Self::ReplyTooLong => write!(f, "reply longer than buffer"),
        }
    }
}

/// Error type for peer address parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Address is not exactly 12 characters.
    Length,
    /// Character at the given index is not a hex digit.
    Digit(usize),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "address must be {} hex digits", ADDRESS_DIGITS),
            Self::Digit(i) => write!(f, "invalid hex digit at index {}", i),
        }
    }
}

/// Hardware address of the copter's Bluetooth module, stored as uppercase
/// ASCII hex digits exactly as they go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress([u8; ADDRESS_DIGITS]);

impl PeerAddress {
    /// Parse a 12 digit hex address. Lowercase digits are upper-cased.
    ///
    /// Usable in `const` context so addresses can be baked into firmware.
    pub const fn parse(s: &str) -> Result<Self, AddressError> {
        let bytes = s.as_bytes();
        if bytes.len() != ADDRESS_DIGITS {
            return Err(AddressError::Length);
        }

        let mut digits = [0u8; ADDRESS_DIGITS];
        let mut i = 0;
        while i < ADDRESS_DIGITS {
            digits[i] = match bytes[i] {
                b'0'..=b'9' | b'A'..=b'F' => bytes[i],
                b'a'..=b'f' => bytes[i] - (b'a' - b'A'),
                _ => return Err(AddressError::Digit(i)),
            };
            i += 1;
        }
        Ok(Self(digits))
    }

    /// The address digits as sent on the wire.
    #[inline]
    #[must_use]
    pub const fn digits(&self) -> &[u8; ADDRESS_DIGITS] {
        &self.0
    }
}

/// Build the `C,<MAC>\r` connect command for a peer.
#[must_use]
pub fn connect_command(peer: &PeerAddress) -> [u8; CONNECT_COMMAND_LEN] {
    let mut cmd = [0u8; CONNECT_COMMAND_LEN];
    cmd[0] = b'C';
    cmd[1] = b',';
    cmd[2..2 + ADDRESS_DIGITS].copy_from_slice(peer.digits());
    cmd[CONNECT_COMMAND_LEN - 1] = b'\r';
    cmd
}

/// Literal substring search over raw bytes.
#[must_use]
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Check the reply to [`ENTER_COMMAND_MODE`].
///
/// # Errors
///
/// Returns [`ProtocolError::MissingCommandAck`] if the reply lacks `CMD`.
pub fn check_command_mode_reply(reply: &[u8]) -> Result<(), ProtocolError> {
    if contains(reply, COMMAND_MODE_ACK) {
        Ok(())
    } else {
        Err(ProtocolError::MissingCommandAck)
    }
}

/// How the reply to the connect command is judged.
///
/// Neither rule has been confirmed against the module's documentation; both
/// are kept so the one matching the deployed module can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectCheck {
    /// Reply must contain the given bytes anywhere.
    Contains(&'static [u8]),
    /// Reply must hold `marker` at `offset`.
    MarkerAt { offset: usize, marker: u8 },
}

impl ConnectCheck {
    /// `'C'` at offset 10 of the 16-byte reply.
    pub const DEFAULT: Self = Self::MarkerAt {
        offset: 10,
        marker: b'C',
    };

    /// Validate a connect reply.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ConnectRejected`] if the rule does not match.
    pub fn verify(&self, reply: &[u8]) -> Result<(), ProtocolError> {
        let accepted = match *self {
            Self::Contains(needle) => contains(reply, needle),
            Self::MarkerAt { offset, marker } => reply.get(offset) == Some(&marker),
        };
        if accepted {
            Ok(())
        } else {
            Err(ProtocolError::ConnectRejected)
        }
    }
}

impl Default for ConnectCheck {
    fn default() -> Self {
        Self::DEFAULT
    }
}
