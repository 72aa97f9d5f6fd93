//! Link error type.

use crate::session::SessionState;
use crate::transport::TransportError;
use core::fmt;
use msp_proto::ProtocolError;

/// Where a bounded wait gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPoint {
    /// Peer kept RTS asserted.
    PeerRts,
    /// Transmitter never went idle.
    TransmitComplete,
    /// Status lines never reported the link.
    LinkUp,
    /// Receive buffer kept producing bytes.
    Drain,
    /// Module never left its boot state.
    ModuleBoot,
}

/// Error type for link operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Error from the transport's read or write primitive.
    Transport(TransportError),
    /// Unexpected reply during the handshake.
    Protocol(ProtocolError),
    /// A bounded wait ran out.
    Timeout(WaitPoint),
    /// Control frames are only accepted once the session is ready.
    NotReady,
    /// Operation not allowed in the current state.
    InvalidState(SessionState),
    /// The session failed earlier and stays unusable until restart.
    Failed,
}

impl LinkError {
    /// Check whether a steady-state caller may simply try again with the
    /// next frame.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(WaitPoint::PeerRts | WaitPoint::TransmitComplete)
        )
    }
}

impl From<TransportError> for LinkError {
    fn from(err: TransportError) -> Self {
        LinkError::Transport(err)
    }
}

impl From<ProtocolError> for LinkError {
    fn from(err: ProtocolError) -> Self {
        LinkError::Protocol(err)
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {}", e),
            Self::Protocol(e) => write!(f, "protocol: {}", e),
            Self::Timeout(point) => write!(f, "timed out waiting for {:?}", point),
            Self::NotReady => write!(f, "link not ready"),
            Self::InvalidState(state) => write!(f, "not allowed in state {:?}", state),
            Self::Failed => write!(f, "link failed"),
        }
    }
}
