//! Quadcopter transmitter for RP2040.
//!
//! Reads a two-axis joystick and three buttons and sends `MSP_SET_RAW_RC`
//! frames to the copter through a Bluetooth serial module.
//!
//! # Hardware Configuration
//!
//! | Function        | GPIO | Description |
//! |-----------------|------|-------------|
//! | UART1 TX        | 8    | To module RX |
//! | UART1 RX        | 9    | From module TX |
//! | CTS             | 10   | Host clear-to-send (output) |
//! | RTS             | 11   | Peer request-to-send (input) |
//! | STATUS A        | 12   | Module connection status |
//! | STATUS B        | 13   | Module connection status |
//! | RST_N           | 14   | Module reset, active low |
//! | SW_BTN          | 15   | Module software button |
//! | WAKE            | 16   | Module wake-up |
//! | ARM             | 18   | Arm toggle button, active low |
//! | THROTTLE UP     | 19   | Button, active low |
//! | THROTTLE DOWN   | 20   | Button, active low |
//! | ROLL            | 26   | ADC0 |
//! | PITCH           | 27   | ADC1 |
//! | LED             | 25   | On-board LED, lit once the link is ready |
//!
//! # Architecture
//!
//! - **Link Task**: brings up the module, runs the handshake, then forwards
//!   control inputs through a [`ControlUplink`](link_core::ControlUplink)
//! - **Sampler Task**: calibrates the joystick and samples it every 50 ms
//!   once the link is ready
//! - **Buttons Task**: reacts to button edges and updates arm and throttle
//!
//! The sampler hands inputs to the link task through an Embassy
//! [`Signal`](embassy_sync::signal::Signal): the latest input wins.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART1;

pub mod joystick;
pub mod pins;
pub mod uart_link;

pub use joystick::{Joystick, LatestInput};
pub use pins::{GpioFlowControl, GpioModuleControl, GpioStatusLines};
pub use uart_link::{Uart1Port, UartTransport};

bind_interrupts!(pub struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
});
