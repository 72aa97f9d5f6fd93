//! Wire formats spoken by the transmitter.
//!
//! This crate provides everything needed to talk to the copter through the
//! Bluetooth serial module:
//!
//! - **Control frames**: the fixed 16-byte MSP v1 `MSP_SET_RAW_RC` frame
//!   - [`ControlInput`] - Stick and arm state for one frame
//!   - [`ControlFrame`] - The encoded frame
//!   - [`encode()`] - Turn a [`ControlInput`] into a [`ControlFrame`]
//!
//! - **Checksums**: the MSP v1 XOR checksum
//!   - [`xor_checksum()`] - One-shot checksum
//!   - [`XorDigest`] - Incremental checksum
//!
//! - **Command mode**: the AT-style text commands of the Bluetooth module
//!   - [`PeerAddress`] - 12 hex digit MAC of the copter's module
//!   - [`connect_command()`] - Build the `C,<MAC>\r` command
//!   - [`ConnectCheck`] - How a connect reply is judged
//!
//! # Frame Format
//!
//! ```text
//! $ M < | len | cmd | pitch | roll | throttle | azimuth | arm | checksum
//! 24 4D 3C  0A   C8   lo hi   lo hi   lo hi      lo hi    lo hi   xor
//! ```
//!
//! All 16-bit fields are little-endian. The checksum is the XOR of every byte
//! from `len` through the high byte of `arm`.
//!
//! # Examples
//!
//! ```
//! use msp_proto::{encode, ControlInput, FRAME_LEN};
//!
//! let frame = encode(&ControlInput::new(1500, 1500, 1000, false));
//! assert_eq!(frame.as_bytes().len(), FRAME_LEN);
//! assert_eq!(&frame.as_bytes()[..3], b"$M<");
//! ```
//!
//! ```
//! use msp_proto::{connect_command, PeerAddress};
//!
//! let peer = PeerAddress::parse("0006668CB2AC").unwrap();
//! assert_eq!(&connect_command(&peer), b"C,0006668CB2AC\r");
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
pub mod command;
pub mod frame;

pub use checksum::{xor_checksum, XorDigest};
pub use command::{
    check_command_mode_reply, connect_command, contains, AddressError, ConnectCheck, PeerAddress,
    ProtocolError, COMMAND_MODE_ACK, CONNECT_COMMAND_LEN, CONNECT_REPLY_LEN, ENTER_COMMAND_MODE,
    ENTER_REPLY_LEN, EXIT_COMMAND_MODE, EXIT_REPLY_LEN,
};
pub use frame::{
    encode, ControlFrame, ControlInput, ARM_ARMED, ARM_DISARMED, AZIMUTH_CENTER, CHANNEL_MAX,
    CHANNEL_MIN, FRAME_LEN, MSP_SET_RAW_RC, PAYLOAD_LEN, PREAMBLE,
};
