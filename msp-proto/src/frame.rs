//! The MSP v1 `MSP_SET_RAW_RC` control frame.
//!
//! Every frame is exactly [`FRAME_LEN`] bytes:
//!
//! | Offset | Bytes | Content |
//! |--------|-------|---------|
//! | 0      | 3     | Preamble `$M<` |
//! | 3      | 1     | Payload length (`0x0A`) |
//! | 4      | 1     | Command (`0xC8`, 200) |
//! | 5      | 2     | Pitch (LE) |
//! | 7      | 2     | Roll (LE) |
//! | 9      | 2     | Throttle (LE) |
//! | 11     | 2     | Azimuth (LE) |
//! | 13     | 2     | Arm channel (LE) |
//! | 15     | 1     | XOR of bytes 3..=14 |

use crate::checksum::XorDigest;

/// Total size of an encoded control frame.
pub const FRAME_LEN: usize = 16;

/// Frame preamble: `$`, `M`, `<` (request direction).
pub const PREAMBLE: [u8; 3] = [0x24, 0x4D, 0x3C];

/// Payload length in bytes (five 16-bit channels).
pub const PAYLOAD_LEN: u8 = 10;

/// MSP command id for setting raw RC channels.
pub const MSP_SET_RAW_RC: u8 = 200;

/// Lowest channel value the copter accepts.
pub const CHANNEL_MIN: u16 = 1000;

/// Highest channel value the copter accepts.
pub const CHANNEL_MAX: u16 = 2000;

/// Azimuth (yaw) channel value. The transmitter has no yaw control.
pub const AZIMUTH_CENTER: u16 = 1500;

/// Arm channel value sent while armed (`D0 07` on the wire).
pub const ARM_ARMED: u16 = 2000;

/// Arm channel value sent while disarmed (`E8 03` on the wire).
pub const ARM_DISARMED: u16 = 1000;

const CHECKSUM_START: usize = 3;
const CHECKSUM_OFFSET: usize = FRAME_LEN - 1;

/// Stick and arm state for a single control frame.
///
/// Channel values are expected in `[CHANNEL_MIN, CHANNEL_MAX]`. The encoder
/// does not clamp; keeping values in range is the producer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlInput {
    pub roll: u16,
    pub pitch: u16,
    pub throttle: u16,
    pub azimuth: u16,
    pub armed: bool,
}

impl ControlInput {
    /// Create an input with the azimuth fixed at [`AZIMUTH_CENTER`].
    #[inline]
    #[must_use]
    pub const fn new(roll: u16, pitch: u16, throttle: u16, armed: bool) -> Self {
        Self {
            roll,
            pitch,
            throttle,
            azimuth: AZIMUTH_CENTER,
            armed,
        }
    }

    /// Override the azimuth channel.
    #[inline]
    #[must_use]
    pub const fn with_azimuth(mut self, azimuth: u16) -> Self {
        self.azimuth = azimuth;
        self
    }

    /// Arm channel value for this input.
    #[inline]
    #[must_use]
    pub const fn arm_channel(&self) -> u16 {
        if self.armed {
            ARM_ARMED
        } else {
            ARM_DISARMED
        }
    }
}

/// An encoded control frame, ready to be written to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlFrame([u8; FRAME_LEN]);

impl ControlFrame {
    /// The raw frame bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Consume the frame and return its bytes.
    #[inline]
    #[must_use]
    pub const fn into_bytes(self) -> [u8; FRAME_LEN] {
        self.0
    }

    /// The trailing checksum byte.
    #[inline]
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.0[CHECKSUM_OFFSET]
    }
}

impl AsRef<[u8]> for ControlFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Small cursor that writes header and channel bytes while folding them into
/// the checksum.
struct FrameWriter {
    buf: [u8; FRAME_LEN],
    pos: usize,
    digest: XorDigest,
}

impl FrameWriter {
    #[inline]
    fn new() -> Self {
        let mut buf = [0u8; FRAME_LEN];
        buf[..PREAMBLE.len()].copy_from_slice(&PREAMBLE);
        Self {
            buf,
            pos: CHECKSUM_START,
            digest: XorDigest::new(),
        }
    }

    #[inline]
    fn write(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.digest.update(byte);
        self.pos += 1;
    }

    #[inline]
    fn write_u16(&mut self, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(lo);
        self.write(hi);
    }

    #[inline]
    fn finalize(mut self) -> ControlFrame {
        debug_assert_eq!(self.pos, CHECKSUM_OFFSET);
        self.buf[CHECKSUM_OFFSET] = self.digest.finalize();
        ControlFrame(self.buf)
    }
}

/// Encode a control input into its wire frame.
///
/// Pure and total: the same input always yields the same bytes.
#[must_use]
pub fn encode(input: &ControlInput) -> ControlFrame {
    let mut w = FrameWriter::new();
    w.write(PAYLOAD_LEN);
    w.write(MSP_SET_RAW_RC);
    w.write_u16(input.pitch);
    w.write_u16(input.roll);
    w.write_u16(input.throttle);
    w.write_u16(input.azimuth);
    w.write_u16(input.arm_channel());
    w.finalize()
}
