//! Link and sampler configuration.

use crate::lines::LinkUpPolarity;
use msp_proto::{ConnectCheck, PeerAddress, CHANNEL_MAX, CHANNEL_MIN};

/// Upper bound on a polling loop.
///
/// The condition is checked once immediately; between later checks the
/// caller waits `interval_us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollBudget {
    pub max_attempts: u32,
    pub interval_us: u32,
}

impl PollBudget {
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, interval_us: u32) -> Self {
        Self {
            max_attempts,
            interval_us,
        }
    }

    /// Longest time the loop can wait before giving up.
    #[inline]
    #[must_use]
    pub const fn timeout_us(&self) -> u64 {
        self.max_attempts as u64 * self.interval_us as u64
    }
}

/// Copter module baked into the firmware.
pub const DEFAULT_PEER: PeerAddress = match PeerAddress::parse("0006668CB2AC") {
    Ok(peer) => peer,
    Err(_) => panic!("invalid default peer address"),
};

/// Configuration of the link session and its handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Address passed to the connect command.
    pub peer: PeerAddress,
    /// Settle time after each command/response exchange.
    pub settle_delay_ms: u32,
    /// Pause before the first command after the port is opened.
    pub post_open_delay_ms: u32,
    /// Pause between draining the receive buffer and raising readiness.
    pub pre_ready_delay_ms: u32,
    /// Waits on RTS and the transmitter busy flag.
    pub flow_budget: PollBudget,
    /// Wait for the status lines to report the link.
    pub link_up_budget: PollBudget,
    /// Maximum number of stale bytes discarded after leaving command mode.
    pub drain_budget: PollBudget,
    pub connect_check: ConnectCheck,
    pub link_up: LinkUpPolarity,
}

impl LinkConfig {
    pub const DEFAULT: Self = Self {
        peer: DEFAULT_PEER,
        settle_delay_ms: 5,
        post_open_delay_ms: 10,
        pre_ready_delay_ms: 100,
        // 100 ms
        flow_budget: PollBudget::new(10_000, 10),
        // 30 s
        link_up_budget: PollBudget::new(3_000, 10_000),
        drain_budget: PollBudget::new(256, 0),
        connect_check: ConnectCheck::DEFAULT,
        link_up: LinkUpPolarity::ALowBHigh,
    };

    /// Use a different peer address.
    #[must_use]
    pub const fn with_peer(mut self, peer: PeerAddress) -> Self {
        self.peer = peer;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Joystick sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerConfig {
    /// Time between two control frames.
    pub period_ms: u32,
    /// Throttle change per button press.
    pub throttle_step: u16,
    /// Raw ADC counts per channel unit.
    pub axis_divisor: i32,
    pub channel_min: u16,
    pub channel_max: u16,
}

impl SamplerConfig {
    pub const DEFAULT: Self = Self {
        period_ms: 50,
        throttle_step: 25,
        axis_divisor: 4,
        channel_min: CHANNEL_MIN,
        channel_max: CHANNEL_MAX,
    };
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Budget for the module to leave its boot state during bring-up (5 s).
pub const MODULE_BOOT_BUDGET: PollBudget = PollBudget::new(500, 10_000);
