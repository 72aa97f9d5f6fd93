//! Joystick sampling: button state shared with edge handlers, and scaling of
//! raw ADC readings into channel values.

use crate::config::SamplerConfig;
use msp_proto::ControlInput;
use portable_atomic::{AtomicBool, AtomicU16, Ordering};

/// Arm and throttle state driven by button edges.
///
/// Each handler is a single producer; updates are atomic read-modify-write
/// so a press is never lost against a concurrent read from the sampler.
#[derive(Debug)]
pub struct StickInputs {
    armed: AtomicBool,
    throttle: AtomicU16,
    step: u16,
    min: u16,
    max: u16,
}

impl StickInputs {
    /// Disarmed, throttle at the configured minimum.
    #[must_use]
    pub const fn new(config: &SamplerConfig) -> Self {
        Self {
            armed: AtomicBool::new(false),
            throttle: AtomicU16::new(config.channel_min),
            step: config.throttle_step,
            min: config.channel_min,
            max: config.channel_max,
        }
    }

    /// Flip the arm state. Returns the new state.
    pub fn toggle_arm(&self) -> bool {
        !self.armed.fetch_xor(true, Ordering::AcqRel)
    }

    /// Raise the throttle one step, saturating at the maximum.
    pub fn throttle_up(&self) -> u16 {
        self.update_throttle(|t| t.saturating_add(self.step).min(self.max))
    }

    /// Lower the throttle one step, saturating at the minimum.
    pub fn throttle_down(&self) -> u16 {
        self.update_throttle(|t| t.saturating_sub(self.step).max(self.min))
    }

    /// Drop the throttle back to the minimum.
    pub fn reset_throttle(&self) {
        self.throttle.store(self.min, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    #[inline]
    #[must_use]
    pub fn throttle(&self) -> u16 {
        self.throttle.load(Ordering::Acquire)
    }

    fn update_throttle(&self, f: impl Fn(u16) -> u16) -> u16 {
        let previous = self
            .throttle
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| Some(f(t)))
            .unwrap_or_else(|t| t);
        f(previous)
    }
}

/// Maps raw ADC counts of one axis onto the channel range.
///
/// Captured with the stick at rest so the rest position lands on the
/// channel midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCalibration {
    offset: i32,
    divisor: i32,
    min: i32,
    max: i32,
}

impl AxisCalibration {
    #[must_use]
    pub fn from_rest(raw_rest: u16, config: &SamplerConfig) -> Self {
        let min = i32::from(config.channel_min);
        let max = i32::from(config.channel_max);
        let divisor = config.axis_divisor.max(1);
        let half_span = (max - min) / 2;
        Self {
            offset: half_span * divisor - i32::from(raw_rest),
            divisor,
            min,
            max,
        }
    }

    /// Scale a raw reading and clamp it to the channel range.
    #[must_use]
    pub fn scale(&self, raw: u16) -> u16 {
        let value = (i32::from(raw) + self.offset) / self.divisor + self.min;
        // Clamped to the u16 channel range above, so the cast is lossless.
        value.clamp(self.min, self.max) as u16
    }
}

/// One pair of raw joystick readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawAxes {
    pub roll: u16,
    pub pitch: u16,
}

/// Turns raw axis readings plus button state into control inputs.
pub struct Sampler<'a> {
    inputs: &'a StickInputs,
    roll: AxisCalibration,
    pitch: AxisCalibration,
}

impl<'a> Sampler<'a> {
    /// Calibrate both axes from a reading taken with the stick at rest.
    ///
    /// The throttle is reset to its minimum, so a fresh sampler never starts
    /// with throttle left over from before.
    #[must_use]
    pub fn calibrate(inputs: &'a StickInputs, rest: RawAxes, config: &SamplerConfig) -> Self {
        inputs.reset_throttle();
        Self {
            inputs,
            roll: AxisCalibration::from_rest(rest.roll, config),
            pitch: AxisCalibration::from_rest(rest.pitch, config),
        }
    }

    /// Build the control input for the current readings.
    #[must_use]
    pub fn sample(&self, raw: RawAxes) -> ControlInput {
        ControlInput::new(
            self.roll.scale(raw.roll),
            self.pitch.scale(raw.pitch),
            self.inputs.throttle(),
            self.inputs.armed(),
        )
    }
}
