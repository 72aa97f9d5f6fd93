//! LinkSession: owns the transport and flow-control lines.
//!
//! Every byte that reaches the module goes through [`LinkSession::send_raw`],
//! which enforces the flow-control ordering:
//!
//! 1. assert CTS
//! 2. wait until the peer releases RTS
//! 3. write the bytes
//! 4. wait until the transmitter is idle
//! 5. release CTS
//!
//! CTS is released on every path once it has been asserted, including
//! failures in steps 2–4.

use crate::config::LinkConfig;
use crate::error::{LinkError, WaitPoint};
use crate::lines::{FlowControl, StatusLines};
use crate::poll::poll_until;
use crate::ready::ReadySignal;
use crate::transport::{OpenTransport, SerialSettings, Transport};
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;
use msp_proto::{encode, ControlInput, ProtocolError};

/// Largest reply a command exchange can read.
pub const MAX_REPLY_LEN: usize = 32;

/// Reply bytes of a single command exchange.
pub type Reply = Vec<u8, MAX_REPLY_LEN>;

/// Lifecycle of a link session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Transport open, handshake not started.
    Idle,
    AwaitingCommandMode,
    AwaitingConnect,
    AwaitingLinkUp,
    Draining,
    /// Control frames may be sent.
    Ready,
    /// Terminal. Only a restart leaves this state.
    Failed,
}

/// A control link to the copter over one Bluetooth serial module.
pub struct LinkSession<'r, T, F, S, D> {
    pub(crate) transport: T,
    pub(crate) flow: F,
    pub(crate) status: S,
    pub(crate) delay: D,
    pub(crate) config: LinkConfig,
    pub(crate) ready: &'r ReadySignal,
    pub(crate) state: SessionState,
}

impl<'r, T, F, S, D> LinkSession<'r, T, F, S, D>
where
    T: Transport,
    F: FlowControl,
    S: StatusLines,
    D: DelayNs,
{
    /// Create a session around an already opened transport.
    ///
    /// CTS is driven low so the peer is not held off before the first send.
    pub fn new(
        transport: T,
        mut flow: F,
        status: S,
        delay: D,
        config: LinkConfig,
        ready: &'r ReadySignal,
    ) -> Self {
        flow.set_cts(false);
        Self {
            transport,
            flow,
            status,
            delay,
            config,
            ready,
            state: SessionState::Idle,
        }
    }

    /// Open `port` with [`SerialSettings::LINK`] and create a session.
    ///
    /// # Errors
    ///
    /// An open failure is terminal: no session exists and the readiness
    /// signal is never raised.
    pub fn open<P>(
        port: P,
        flow: F,
        status: S,
        delay: D,
        config: LinkConfig,
        ready: &'r ReadySignal,
    ) -> Result<Self, LinkError>
    where
        P: OpenTransport<Transport = T>,
    {
        match port.open(&SerialSettings::LINK) {
            Ok(transport) => {
                info!("Link transport opened");
                Ok(Self::new(transport, flow, status, delay, config, ready))
            }
            Err(e) => {
                error!("Failed to open link transport: {:?}", e);
                Err(LinkError::Transport(e))
            }
        }
    }

    /// Current session state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        debug!("Link state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Write raw bytes under hardware flow control.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Failed`] once the session has failed,
    /// [`LinkError::Timeout`] if RTS or the busy flag never clear, and
    /// [`LinkError::Transport`] if the write itself fails.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if self.state == SessionState::Failed {
            return Err(LinkError::Failed);
        }

        self.flow.set_cts(true);
        let result = self.transmit(bytes).await;
        self.flow.set_cts(false);
        result
    }

    async fn transmit(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let budget = self.config.flow_budget;

        poll_until(&mut self.delay, budget, WaitPoint::PeerRts, || {
            !self.flow.read_rts()
        })
        .await?;

        self.transport.write(bytes).await?;

        poll_until(&mut self.delay, budget, WaitPoint::TransmitComplete, || {
            !self.transport.is_busy()
        })
        .await
    }

    /// Send a command and read a reply of exactly `expected_len` bytes, then
    /// wait the configured settle time.
    ///
    /// # Errors
    ///
    /// Everything [`send_raw`](Self::send_raw) reports, plus
    /// [`LinkError::Transport`] for a failed read and
    /// [`ProtocolError::ReplyTooLong`] if `expected_len` exceeds
    /// [`MAX_REPLY_LEN`].
    pub async fn exchange(&mut self, cmd: &[u8], expected_len: usize) -> Result<Reply, LinkError> {
        let mut reply = Reply::new();
        reply
            .resize(expected_len, 0)
            .map_err(|_| ProtocolError::ReplyTooLong)?;

        self.send_raw(cmd).await?;
        self.transport.read(&mut reply).await?;
        self.delay.delay_ms(self.config.settle_delay_ms).await;

        Ok(reply)
    }

    /// Encode and send one control frame.
    ///
    /// Errors are per frame: the session stays [`SessionState::Ready`] and
    /// the next call is allowed. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotReady`] before the handshake has finished and
    /// [`LinkError::Failed`] after it failed; otherwise see
    /// [`send_raw`](Self::send_raw).
    pub async fn send_controls(
        &mut self,
        roll: u16,
        pitch: u16,
        throttle: u16,
        armed: bool,
    ) -> Result<(), LinkError> {
        self.send_input(&ControlInput::new(roll, pitch, throttle, armed))
            .await
    }

    /// Like [`send_controls`](Self::send_controls), from a prepared input.
    pub async fn send_input(&mut self, input: &ControlInput) -> Result<(), LinkError> {
        match self.state {
            SessionState::Ready => {}
            SessionState::Failed => return Err(LinkError::Failed),
            _ => return Err(LinkError::NotReady),
        }

        let frame = encode(input);
        self.send_raw(frame.as_bytes()).await
    }

    /// Decompose the session into its collaborators.
    pub fn into_parts(self) -> (T, F, S, D) {
        (self.transport, self.flow, self.status, self.delay)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{
        block_on, filtered, new_log, Event, Log, MockDelay, MockFlow, MockPort, MockStatus,
        MockTransport,
    };
    use crate::transport::TransportError;
    use std::sync::{Arc, Mutex};
    use std::vec;
    use std::vec::Vec as StdVec;

    type TestSession<'r> = LinkSession<'r, MockTransport, MockFlow, MockStatus, MockDelay>;

    fn session<'r>(log: &Log, transport: MockTransport, ready: &'r ReadySignal) -> TestSession<'r> {
        LinkSession::new(
            transport,
            MockFlow::new(log.clone()),
            MockStatus::new(log.clone(), &[]),
            MockDelay::new(log.clone()),
            LinkConfig::DEFAULT,
            ready,
        )
    }

    fn line_events(log: &Log) -> StdVec<Event> {
        filtered(log, |e| !matches!(e, Event::Delay(_)))
    }

    #[test]
    fn test_new_releases_cts() {
        let log = new_log();
        let ready = ReadySignal::new();
        let s = session(&log, MockTransport::new(log.clone()), &ready);

        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(*log.lock().unwrap(), vec![Event::SetCts(false)]);
    }

    #[test]
    fn test_send_raw_ordering() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut transport = MockTransport::new(log.clone());
        transport.busy_polls = 2;
        let mut s = session(&log, transport, &ready);
        s.flow.rts_high_polls = 1;
        log.lock().unwrap().clear();

        block_on(s.send_raw(b"abc")).unwrap();

        assert_eq!(
            line_events(&log),
            vec![
                Event::SetCts(true),
                Event::ReadRts(true),
                Event::ReadRts(false),
                Event::Write(b"abc".to_vec()),
                Event::IsBusy(true),
                Event::IsBusy(true),
                Event::IsBusy(false),
                Event::SetCts(false),
            ]
        );
    }

    #[test]
    fn test_send_raw_releases_cts_on_write_error() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut transport = MockTransport::new(log.clone());
        transport.write_results.push_back(Err(TransportError::Io));
        let mut s = session(&log, transport, &ready);
        log.lock().unwrap().clear();

        let result = block_on(s.send_raw(b"x"));

        assert_eq!(result, Err(LinkError::Transport(TransportError::Io)));
        assert_eq!(
            line_events(&log),
            vec![
                Event::SetCts(true),
                Event::ReadRts(false),
                Event::Write(b"x".to_vec()),
                Event::SetCts(false),
            ]
        );
    }

    #[test]
    fn test_send_raw_rts_timeout() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut s = session(&log, MockTransport::new(log.clone()), &ready);
        s.flow.rts_stuck = true;
        s.config.flow_budget = crate::config::PollBudget::new(3, 1);
        log.lock().unwrap().clear();

        let result = block_on(s.send_raw(b"x"));

        assert_eq!(result, Err(LinkError::Timeout(WaitPoint::PeerRts)));
        let events = line_events(&log);
        assert_eq!(events.first(), Some(&Event::SetCts(true)));
        assert_eq!(events.last(), Some(&Event::SetCts(false)));
        assert!(!events.iter().any(|e| matches!(e, Event::Write(_))));
        assert_eq!(
            events.iter().filter(|e| **e == Event::ReadRts(true)).count(),
            3
        );
    }

    #[test]
    fn test_exchange_reads_reply_then_settles() {
        let log = new_log();
        let ready = ReadySignal::new();
        let transport = MockTransport::new(log.clone()).reply(b"CMD\r");
        let mut s = session(&log, transport, &ready);
        log.lock().unwrap().clear();

        let reply = block_on(s.exchange(b"$$$", 4)).unwrap();

        assert_eq!(&reply[..], b"CMD\r");
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Event::SetCts(true),
                Event::ReadRts(false),
                Event::Write(b"$$$".to_vec()),
                Event::IsBusy(false),
                Event::SetCts(false),
                Event::Read(4),
                Event::Delay(5_000_000),
            ]
        );
    }

    #[test]
    fn test_exchange_read_error() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut transport = MockTransport::new(log.clone());
        transport.replies.push_back(Err(TransportError::Framing));
        let mut s = session(&log, transport, &ready);

        let result = block_on(s.exchange(b"$$$", 4));
        assert_eq!(result, Err(LinkError::Transport(TransportError::Framing)));
    }

    #[test]
    fn test_exchange_reply_too_long() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut s = session(&log, MockTransport::new(log.clone()), &ready);
        log.lock().unwrap().clear();

        let result = block_on(s.exchange(b"$$$", MAX_REPLY_LEN + 1));

        assert_eq!(
            result,
            Err(LinkError::Protocol(ProtocolError::ReplyTooLong))
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_controls_requires_ready() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut s = session(&log, MockTransport::new(log.clone()), &ready);
        log.lock().unwrap().clear();

        let result = block_on(s.send_controls(1500, 1500, 1000, false));

        assert_eq!(result, Err(LinkError::NotReady));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_controls_writes_frame() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut s = session(&log, MockTransport::new(log.clone()), &ready);
        s.state = SessionState::Ready;

        block_on(s.send_controls(1500, 1500, 1000, false)).unwrap();

        let writes = filtered(&log, |e| matches!(e, Event::Write(_)));
        let expected = encode(&ControlInput::new(1500, 1500, 1000, false));
        assert_eq!(writes, vec![Event::Write(expected.as_bytes().to_vec())]);
    }

    #[test]
    fn test_write_error_in_ready_is_recoverable() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut transport = MockTransport::new(log.clone());
        transport.write_results.push_back(Err(TransportError::Io));
        let mut s = session(&log, transport, &ready);
        s.state = SessionState::Ready;

        let first = block_on(s.send_controls(1500, 1500, 1000, true));
        assert_eq!(first, Err(LinkError::Transport(TransportError::Io)));
        assert!(first.unwrap_err().is_recoverable());
        assert_eq!(s.state(), SessionState::Ready);

        let second = block_on(s.send_controls(1500, 1500, 1025, true));
        assert_eq!(second, Ok(()));
        assert_eq!(filtered(&log, |e| matches!(e, Event::Write(_))).len(), 2);
    }

    #[test]
    fn test_failed_session_rejects_everything() {
        let log = new_log();
        let ready = ReadySignal::new();
        let mut s = session(&log, MockTransport::new(log.clone()), &ready);
        s.state = SessionState::Failed;
        log.lock().unwrap().clear();

        assert_eq!(block_on(s.send_raw(b"x")), Err(LinkError::Failed));
        assert_eq!(block_on(s.exchange(b"$$$", 4)), Err(LinkError::Failed));
        assert_eq!(
            block_on(s.send_controls(1500, 1500, 1000, false)),
            Err(LinkError::Failed)
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_open_uses_link_settings() {
        let log = new_log();
        let ready = ReadySignal::new();
        let opened_with = Arc::new(Mutex::new(None));
        let port = MockPort {
            transport: Some(MockTransport::new(log.clone())),
            opened_with: opened_with.clone(),
        };

        let s = LinkSession::open(
            port,
            MockFlow::new(log.clone()),
            MockStatus::new(log.clone(), &[]),
            MockDelay::new(log.clone()),
            LinkConfig::DEFAULT,
            &ready,
        )
        .unwrap();

        assert_eq!(s.state(), SessionState::Idle);
        let settings = opened_with.lock().unwrap().unwrap();
        assert_eq!(settings.baud_rate, 115_200);
        assert!(!settings.echo);
        assert!(settings.full_reads);
    }

    #[test]
    fn test_open_failure_is_reported() {
        let log = new_log();
        let ready = ReadySignal::new();
        let port = MockPort {
            transport: None,
            opened_with: Arc::new(Mutex::new(None)),
        };

        let result = LinkSession::open(
            port,
            MockFlow::new(log.clone()),
            MockStatus::new(log.clone(), &[]),
            MockDelay::new(log.clone()),
            LinkConfig::DEFAULT,
            &ready,
        );

        assert!(matches!(
            result,
            Err(LinkError::Transport(TransportError::Unsupported))
        ));
        assert!(!ready.is_ready());
    }
}
