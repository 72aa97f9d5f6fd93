//! Readiness signal shared between the link task and the sampler.

use portable_atomic::{AtomicBool, Ordering};

/// One-way flag raised once the handshake has finished.
///
/// Only the link session sets it; producers poll [`ReadySignal::is_ready`]
/// before handing over control inputs. There is no way to lower it again.
#[derive(Debug, Default)]
pub struct ReadySignal {
    ready: AtomicBool,
}

impl ReadySignal {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn set(&self) {
        self.ready.store(true, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
