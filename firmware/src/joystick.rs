//! Analog joystick on the ADC and the hand-off of sampled inputs to the
//! link task.

use embassy_rp::adc::{Adc, Async, Channel};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use link_core::{ControlSource, RawAxes, SourceError};
use msp_proto::ControlInput;

/// Two-axis joystick on ADC channels.
pub struct Joystick<'d> {
    adc: Adc<'d, Async>,
    roll: Channel<'d>,
    pitch: Channel<'d>,
}

impl<'d> Joystick<'d> {
    #[must_use]
    pub fn new(adc: Adc<'d, Async>, roll: Channel<'d>, pitch: Channel<'d>) -> Self {
        Self { adc, roll, pitch }
    }

    /// Take one conversion of each axis.
    pub async fn read(&mut self) -> Result<RawAxes, SourceError> {
        let roll = self
            .adc
            .read(&mut self.roll)
            .await
            .map_err(|_| SourceError::Io)?;
        let pitch = self
            .adc
            .read(&mut self.pitch)
            .await
            .map_err(|_| SourceError::Io)?;
        Ok(RawAxes { roll, pitch })
    }
}

/// Control source backed by a signal: waits for the most recent input.
///
/// Inputs signalled while the link task is busy sending overwrite each other,
/// so a slow link never works through a backlog of stale frames.
pub struct LatestInput<'a> {
    signal: &'a Signal<CriticalSectionRawMutex, ControlInput>,
}

impl<'a> LatestInput<'a> {
    #[must_use]
    pub fn new(signal: &'a Signal<CriticalSectionRawMutex, ControlInput>) -> Self {
        Self { signal }
    }
}

impl ControlSource for LatestInput<'_> {
    async fn next_input(&mut self) -> Result<ControlInput, SourceError> {
        Ok(self.signal.wait().await)
    }
}
