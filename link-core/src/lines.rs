//! Digital lines around the Bluetooth module: flow control, link status and
//! module control.

/// Hardware flow-control lines on dedicated GPIOs.
pub trait FlowControl {
    /// Read the peer's request-to-send line. `true` means the peer is driving
    /// the line and the host must not transmit.
    fn read_rts(&mut self) -> bool;

    /// Drive the host clear-to-send line.
    fn set_cts(&mut self, asserted: bool);
}

/// The module's two connection status outputs.
pub trait StatusLines {
    fn read_status_a(&mut self) -> bool;
    fn read_status_b(&mut self) -> bool;
}

/// Which combination of status lines means "link established".
///
/// The module's documentation was never checked for this, and the two
/// readings below both appear in field firmware. Validate against real
/// hardware before relying on either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkUpPolarity {
    /// Status A low and status B high.
    #[default]
    ALowBHigh,
    /// Both status lines high.
    BothHigh,
}

impl LinkUpPolarity {
    /// Check a sampled pair of status lines.
    #[inline]
    #[must_use]
    pub const fn is_link_up(self, a: bool, b: bool) -> bool {
        match self {
            Self::ALowBHigh => !a && b,
            Self::BothHigh => a && b,
        }
    }
}

/// Power and mode pins of the module, used only during bring-up.
pub trait ModuleControl {
    /// Hold the module in reset (`true`) or release it (`false`).
    fn set_reset(&mut self, asserted: bool);

    /// Drive the module's software button input.
    fn set_soft_button(&mut self, pressed: bool);

    /// Drive the module's wake-up input.
    fn set_wake(&mut self, awake: bool);
}
