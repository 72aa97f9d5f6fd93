//! Connection handshake with the Bluetooth module.
//!
//! ```text
//! Idle -> AwaitingCommandMode   "$$$"       reply must contain "CMD"
//!      -> AwaitingConnect       "C,<MAC>\r" reply checked by ConnectCheck
//!      -> AwaitingLinkUp        status lines polled until the link is up
//!      -> Draining              "---\r\n"   then stale bytes discarded
//!      -> Ready                 readiness signal raised
//! ```
//!
//! Any error moves the session to `Failed`. There is no retry and no
//! reconnect.

use crate::error::{LinkError, WaitPoint};
use crate::lines::{FlowControl, StatusLines};
use crate::poll::poll_until;
use crate::session::{LinkSession, SessionState};
use crate::transport::Transport;
use embedded_hal_async::delay::DelayNs;
use msp_proto::{
    check_command_mode_reply, connect_command, CONNECT_REPLY_LEN, ENTER_COMMAND_MODE,
    ENTER_REPLY_LEN, EXIT_COMMAND_MODE, EXIT_REPLY_LEN,
};

impl<T, F, S, D> LinkSession<'_, T, F, S, D>
where
    T: Transport,
    F: FlowControl,
    S: StatusLines,
    D: DelayNs,
{
    /// Run the handshake from `Idle` to `Ready`.
    ///
    /// On success the readiness signal is raised. On failure the session is
    /// left in [`SessionState::Failed`] and the signal stays low forever.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidState`] if the session is not `Idle`,
    /// otherwise the error that stopped the handshake.
    pub async fn handshake(&mut self) -> Result<(), LinkError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Failed => return Err(LinkError::Failed),
            state => return Err(LinkError::InvalidState(state)),
        }

        match self.run_handshake().await {
            Ok(()) => {
                self.transition(SessionState::Ready);
                self.ready.set();
                info!("Link ready");
                Ok(())
            }
            Err(e) => {
                error!("Handshake failed in {:?}: {:?}", self.state, e);
                self.transition(SessionState::Failed);
                Err(e)
            }
        }
    }

    async fn run_handshake(&mut self) -> Result<(), LinkError> {
        self.transition(SessionState::AwaitingCommandMode);
        self.delay.delay_ms(self.config.post_open_delay_ms).await;
        self.enter_command_mode().await?;

        self.transition(SessionState::AwaitingConnect);
        self.connect().await?;

        self.transition(SessionState::AwaitingLinkUp);
        self.await_link_up().await?;

        self.transition(SessionState::Draining);
        self.exchange(EXIT_COMMAND_MODE, EXIT_REPLY_LEN).await?;
        let discarded = self.drain().await?;
        if discarded > 0 {
            debug!("Discarded {} stale bytes", discarded);
        }

        self.delay.delay_ms(self.config.pre_ready_delay_ms).await;
        Ok(())
    }

    async fn enter_command_mode(&mut self) -> Result<(), LinkError> {
        let reply = self.exchange(ENTER_COMMAND_MODE, ENTER_REPLY_LEN).await?;
        check_command_mode_reply(&reply)?;
        info!("Module in command mode");
        Ok(())
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        let cmd = connect_command(&self.config.peer);
        let reply = self.exchange(&cmd, CONNECT_REPLY_LEN).await?;
        if let Err(e) = self.config.connect_check.verify(&reply) {
            warn!("Unexpected connect reply: {=[u8]:a}", &reply[..]);
            return Err(e.into());
        }
        Ok(())
    }

    async fn await_link_up(&mut self) -> Result<(), LinkError> {
        let polarity = self.config.link_up;
        poll_until(
            &mut self.delay,
            self.config.link_up_budget,
            WaitPoint::LinkUp,
            || {
                let a = self.status.read_status_a();
                let b = self.status.read_status_b();
                polarity.is_link_up(a, b)
            },
        )
        .await?;
        info!("Connected");
        Ok(())
    }

    /// Discard bytes that piled up in the receive buffer while waiting for
    /// the link. Returns how many were dropped.
    async fn drain(&mut self) -> Result<usize, LinkError> {
        let budget = self.config.drain_budget;
        let mut discarded = 0;

        for _ in 0..=budget.max_attempts {
            if self.transport.take_pending().await?.is_none() {
                return Ok(discarded);
            }
            discarded += 1;
            if budget.interval_us > 0 {
                self.delay.delay_us(budget.interval_us).await;
            }
        }
        Err(LinkError::Timeout(WaitPoint::Drain))
    }
}
