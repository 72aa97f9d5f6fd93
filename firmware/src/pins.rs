//! GPIO implementations of the module's control and status lines.

use embassy_rp::gpio::{Input, Level, Output};
use link_core::{FlowControl, ModuleControl, StatusLines};

/// CTS driven by the host, RTS read from the peer.
pub struct GpioFlowControl<'d> {
    cts: Output<'d>,
    rts: Input<'d>,
}

impl<'d> GpioFlowControl<'d> {
    #[must_use]
    pub fn new(cts: Output<'d>, rts: Input<'d>) -> Self {
        Self { cts, rts }
    }
}

impl FlowControl for GpioFlowControl<'_> {
    fn read_rts(&mut self) -> bool {
        self.rts.is_high()
    }

    fn set_cts(&mut self, asserted: bool) {
        self.cts.set_level(Level::from(asserted));
    }
}

pub struct GpioStatusLines<'d> {
    a: Input<'d>,
    b: Input<'d>,
}

impl<'d> GpioStatusLines<'d> {
    #[must_use]
    pub fn new(a: Input<'d>, b: Input<'d>) -> Self {
        Self { a, b }
    }
}

impl StatusLines for GpioStatusLines<'_> {
    fn read_status_a(&mut self) -> bool {
        self.a.is_high()
    }

    fn read_status_b(&mut self) -> bool {
        self.b.is_high()
    }
}

/// Reset (active low), software button and wake lines of the module.
pub struct GpioModuleControl<'d> {
    reset_n: Output<'d>,
    soft_button: Output<'d>,
    wake: Output<'d>,
}

impl<'d> GpioModuleControl<'d> {
    #[must_use]
    pub fn new(reset_n: Output<'d>, soft_button: Output<'d>, wake: Output<'d>) -> Self {
        Self {
            reset_n,
            soft_button,
            wake,
        }
    }
}

impl ModuleControl for GpioModuleControl<'_> {
    fn set_reset(&mut self, asserted: bool) {
        self.reset_n.set_level(Level::from(!asserted));
    }

    fn set_soft_button(&mut self, pressed: bool) {
        self.soft_button.set_level(Level::from(pressed));
    }

    fn set_wake(&mut self, awake: bool) {
        self.wake.set_level(Level::from(awake));
    }
}
