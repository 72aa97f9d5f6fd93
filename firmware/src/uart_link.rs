//! UART1 transport to the Bluetooth module.

use crate::Irqs;
use embassy_rp::peripherals::{DMA_CH0, DMA_CH1, PIN_8, PIN_9, UART1};
use embassy_rp::uart::{
    Async, Config as UartConfig, DataBits, Error as UartError, Parity as UartParity, StopBits,
    Uart, UartRx, UartTx,
};
use embassy_rp::Peri;
use embassy_time::{with_timeout, Duration};
use link_core::{OpenTransport, Parity, SerialSettings, Transport, TransportError};

/// A quiet line for this long means nothing is left in the receive FIFO.
/// One byte at 115200 baud takes under 100 µs.
const PENDING_BYTE_TIMEOUT: Duration = Duration::from_millis(1);

fn uart_error(e: UartError) -> TransportError {
    match e {
        UartError::Overrun => TransportError::Overrun,
        UartError::Framing | UartError::Parity | UartError::Break => TransportError::Framing,
        #[allow(unreachable_patterns)]
        _ => TransportError::Io,
    }
}

fn uart_config(settings: &SerialSettings) -> Result<UartConfig, TransportError> {
    // Async reads always fill the whole buffer and the peripheral never echoes.
    if !settings.full_reads || settings.echo {
        return Err(TransportError::Unsupported);
    }

    let mut config = UartConfig::default();
    config.baudrate = settings.baud_rate;
    config.data_bits = match settings.data_bits {
        5 => DataBits::DataBits5,
        6 => DataBits::DataBits6,
        7 => DataBits::DataBits7,
        8 => DataBits::DataBits8,
        _ => return Err(TransportError::Unsupported),
    };
    config.stop_bits = match settings.stop_bits {
        1 => StopBits::STOP1,
        2 => StopBits::STOP2,
        _ => return Err(TransportError::Unsupported),
    };
    config.parity = match settings.parity {
        Parity::None => UartParity::ParityNone,
        Parity::Even => UartParity::ParityEven,
        Parity::Odd => UartParity::ParityOdd,
    };
    Ok(config)
}

/// UART1 peripherals reserved for the link, not yet configured.
pub struct Uart1Port {
    uart: Peri<'static, UART1>,
    tx: Peri<'static, PIN_8>,
    rx: Peri<'static, PIN_9>,
    tx_dma: Peri<'static, DMA_CH0>,
    rx_dma: Peri<'static, DMA_CH1>,
}

impl Uart1Port {
    #[must_use]
    pub fn new(
        uart: Peri<'static, UART1>,
        tx: Peri<'static, PIN_8>,
        rx: Peri<'static, PIN_9>,
        tx_dma: Peri<'static, DMA_CH0>,
        rx_dma: Peri<'static, DMA_CH1>,
    ) -> Self {
        Self {
            uart,
            tx,
            rx,
            tx_dma,
            rx_dma,
        }
    }
}

impl OpenTransport for Uart1Port {
    type Transport = UartTransport<'static>;

    fn open(self, settings: &SerialSettings) -> Result<Self::Transport, TransportError> {
        let config = uart_config(settings)?;
        let uart = Uart::new(
            self.uart,
            self.tx,
            self.rx,
            Irqs,
            self.tx_dma,
            self.rx_dma,
            config,
        );
        let (tx, rx) = uart.split();
        Ok(UartTransport::new(tx, rx))
    }
}

/// Async UART halves driven by a [`LinkSession`](link_core::LinkSession).
pub struct UartTransport<'d> {
    tx: UartTx<'d, Async>,
    rx: UartRx<'d, Async>,
}

impl<'d> UartTransport<'d> {
    #[must_use]
    pub fn new(tx: UartTx<'d, Async>, rx: UartRx<'d, Async>) -> Self {
        Self { tx, rx }
    }
}

impl Transport for UartTransport<'_> {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.tx.write(bytes).await.map_err(uart_error)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.rx.read(buf).await.map_err(uart_error)
    }

    fn is_busy(&self) -> bool {
        self.tx.busy()
    }

    async fn take_pending(&mut self) -> Result<Option<u8>, TransportError> {
        let mut byte = [0u8; 1];
        match with_timeout(PENDING_BYTE_TIMEOUT, self.rx.read(&mut byte)).await {
            Ok(Ok(())) => Ok(Some(byte[0])),
            Ok(Err(e)) => Err(uart_error(e)),
            Err(_) => Ok(None),
        }
    }
}
