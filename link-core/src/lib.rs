//! Platform-agnostic control link between the transmitter and the copter.
//!
//! This crate holds everything above the pins and the UART peripheral. It
//! can be used both on the RP2040 and on host for testing.
//!
//! # Overview
//!
//! - [`transport`]: Serial transport traits ([`Transport`], [`OpenTransport`])
//! - [`lines`]: GPIO line traits ([`FlowControl`], [`StatusLines`], [`ModuleControl`])
//! - [`session`]: Flow-controlled link session ([`LinkSession`])
//! - [`handshake`]: Command-mode handshake that takes a session to `Ready`
//! - [`bringup`]: Reset sequence of the Bluetooth module ([`bring_up`])
//! - [`sampler`]: Joystick and button sampling ([`Sampler`], [`StickInputs`])
//! - [`uplink`]: Forwards sampled inputs to the link ([`ControlUplink`])
//! - [`ready`]: Readiness flag shared with other tasks ([`ReadySignal`])
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> AwaitingCommandMode -> AwaitingConnect -> AwaitingLinkUp -> Draining -> Ready
//!   \______________________________________________________________________/
//!                                  any fatal error -> Failed
//! ```
//!
//! `Failed` is terminal. Once `Ready`, send errors are per frame and the
//! session stays `Ready`.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt logging and formatting (for embedded use)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod bringup;
pub mod config;
pub mod error;
pub mod handshake;
pub mod lines;
mod poll;
pub mod ready;
pub mod sampler;
pub mod session;
pub mod transport;
pub mod uplink;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use bringup::bring_up;
pub use config::{LinkConfig, PollBudget, SamplerConfig, DEFAULT_PEER, MODULE_BOOT_BUDGET};
pub use error::{LinkError, WaitPoint};
pub use lines::{FlowControl, LinkUpPolarity, ModuleControl, StatusLines};
pub use ready::ReadySignal;
pub use sampler::{AxisCalibration, RawAxes, Sampler, StickInputs};
pub use session::{LinkSession, Reply, SessionState, MAX_REPLY_LEN};
pub use transport::{OpenTransport, Parity, SerialSettings, Transport, TransportError};
pub use uplink::{ControlSink, ControlSource, ControlUplink, SourceError, UplinkError};

pub use msp_proto::{encode, ConnectCheck, ControlFrame, ControlInput, PeerAddress, ProtocolError};
