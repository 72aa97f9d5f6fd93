//! ControlUplink: forwards control inputs from a source to the link.

use crate::error::LinkError;
use crate::lines::{FlowControl, StatusLines};
use crate::session::{LinkSession, SessionState};
use crate::transport::Transport;
use core::future::Future;
use embedded_hal_async::delay::DelayNs;
use msp_proto::ControlInput;

/// Error type for control sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// Reading the joystick failed.
    Io,
    /// The producer is gone.
    Disconnected,
}

/// Async trait for producers of control inputs.
pub trait ControlSource {
    /// Wait for the next control input.
    fn next_input(&mut self) -> impl Future<Output = Result<ControlInput, SourceError>>;
}

/// Async trait for consumers of control inputs.
pub trait ControlSink {
    /// Send one control input.
    fn send(&mut self, input: &ControlInput) -> impl Future<Output = Result<(), LinkError>>;

    /// Check if the sink accepts inputs.
    fn is_ready(&self) -> bool;
}

impl<T, F, S, D> ControlSink for LinkSession<'_, T, F, S, D>
where
    T: Transport,
    F: FlowControl,
    S: StatusLines,
    D: DelayNs,
{
    async fn send(&mut self, input: &ControlInput) -> Result<(), LinkError> {
        self.send_input(input).await
    }

    fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }
}

/// Error type for uplink operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UplinkError {
    /// Error from the control source.
    Source(SourceError),
    /// Error from the link.
    Link(LinkError),
}

/// Forwards every control input from `source` to `sink`.
///
/// # Error Handling
///
/// Errors are per input. A failed frame is dropped and never retried; the
/// next input supersedes it. Inputs arriving while the sink is not ready are
/// dropped as well.
pub struct ControlUplink<I, O> {
    source: I,
    sink: O,
}

impl<I: ControlSource, O: ControlSink> ControlUplink<I, O> {
    /// Create a new uplink from a source and a sink.
    pub fn new(source: I, sink: O) -> Self {
        Self { source, sink }
    }

    /// Run the uplink, forwarding inputs indefinitely.
    ///
    /// This method never returns under normal operation.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.process_one().await {
                warn!("Control frame dropped: {:?}", e);
            }
        }
    }

    /// Forward a single input.
    ///
    /// Returns the result of the operation for testing purposes.
    pub async fn process_one(&mut self) -> Result<(), UplinkError> {
        let input = self
            .source
            .next_input()
            .await
            .map_err(UplinkError::Source)?;

        if !self.sink.is_ready() {
            return Err(UplinkError::Link(LinkError::NotReady));
        }

        self.sink.send(&input).await.map_err(UplinkError::Link)
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &O {
        &self.sink
    }

    /// Decompose the uplink into its source and sink.
    pub fn into_parts(self) -> (I, O) {
        (self.source, self.sink)
    }
}
