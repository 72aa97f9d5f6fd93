//! Mock collaborators shared by the unit tests.

extern crate std;

use crate::lines::{FlowControl, ModuleControl, StatusLines};
use crate::transport::{OpenTransport, SerialSettings, Transport, TransportError};
use core::cell::Cell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use embedded_hal_async::delay::DelayNs;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::vec::Vec;

/// Everything the mocks observe, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SetCts(bool),
    ReadRts(bool),
    Write(Vec<u8>),
    IsBusy(bool),
    Read(usize),
    TakePending(Option<u8>),
    Status(bool, bool),
    Reset(bool),
    SoftButton(bool),
    Wake(bool),
    Delay(u64),
}

pub type Log = Arc<Mutex<Vec<Event>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Keep only the events matching `keep`.
pub fn filtered(log: &Log, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
    log.lock().unwrap().iter().filter(|e| keep(*e)).cloned().collect()
}

pub struct MockTransport {
    log: Log,
    /// Replies handed out by `read`, in order. Missing replies read as zeros.
    pub replies: VecDeque<Result<Vec<u8>, TransportError>>,
    /// Results of `write`, in order. Missing results are `Ok`.
    pub write_results: VecDeque<Result<(), TransportError>>,
    /// Number of `is_busy` calls that report busy after each write.
    pub busy_polls: u32,
    busy_left: Cell<u32>,
    /// Bytes waiting in the receive buffer.
    pub pending: VecDeque<u8>,
}

impl MockTransport {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            replies: VecDeque::new(),
            write_results: VecDeque::new(),
            busy_polls: 0,
            busy_left: Cell::new(0),
            pending: VecDeque::new(),
        }
    }

    pub fn reply(mut self, bytes: &[u8]) -> Self {
        self.replies.push_back(Ok(bytes.to_vec()));
        self
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), TransportError>> {
        self.log.lock().unwrap().push(Event::Write(bytes.to_vec()));
        self.busy_left.set(self.busy_polls);
        core::future::ready(self.write_results.pop_front().unwrap_or(Ok(())))
    }

    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<(), TransportError>> {
        self.log.lock().unwrap().push(Event::Read(buf.len()));
        let result = match self.replies.pop_front() {
            Some(Ok(bytes)) => {
                buf.fill(0);
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => {
                buf.fill(0);
                Ok(())
            }
        };
        core::future::ready(result)
    }

    fn is_busy(&self) -> bool {
        let left = self.busy_left.get();
        let busy = left > 0;
        if busy {
            self.busy_left.set(left - 1);
        }
        self.log.lock().unwrap().push(Event::IsBusy(busy));
        busy
    }

    fn take_pending(&mut self) -> impl Future<Output = Result<Option<u8>, TransportError>> {
        let byte = self.pending.pop_front();
        self.log.lock().unwrap().push(Event::TakePending(byte));
        core::future::ready(Ok(byte))
    }
}

/// Port that opens into a [`MockTransport`] or fails.
pub struct MockPort {
    pub transport: Option<MockTransport>,
    pub opened_with: Arc<Mutex<Option<SerialSettings>>>,
}

impl OpenTransport for MockPort {
    type Transport = MockTransport;

    fn open(self, settings: &SerialSettings) -> Result<MockTransport, TransportError> {
        *self.opened_with.lock().unwrap() = Some(*settings);
        self.transport.ok_or(TransportError::Unsupported)
    }
}

pub struct MockFlow {
    log: Log,
    /// Number of `read_rts` calls that report the peer as driving.
    pub rts_high_polls: u32,
    /// Never release RTS.
    pub rts_stuck: bool,
}

impl MockFlow {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            rts_high_polls: 0,
            rts_stuck: false,
        }
    }
}

impl FlowControl for MockFlow {
    fn read_rts(&mut self) -> bool {
        let high = self.rts_stuck || self.rts_high_polls > 0;
        if self.rts_high_polls > 0 {
            self.rts_high_polls -= 1;
        }
        self.log.lock().unwrap().push(Event::ReadRts(high));
        high
    }

    fn set_cts(&mut self, asserted: bool) {
        self.log.lock().unwrap().push(Event::SetCts(asserted));
    }
}

/// Status lines that step through `samples`, then hold the last one.
pub struct MockStatus {
    log: Log,
    pub samples: VecDeque<(bool, bool)>,
    current: (bool, bool),
}

impl MockStatus {
    pub fn new(log: Log, samples: &[(bool, bool)]) -> Self {
        Self {
            log,
            samples: samples.iter().copied().collect(),
            current: (false, false),
        }
    }
}

impl StatusLines for MockStatus {
    fn read_status_a(&mut self) -> bool {
        if let Some(next) = self.samples.pop_front() {
            self.current = next;
        }
        self.current.0
    }

    fn read_status_b(&mut self) -> bool {
        self.log
            .lock()
            .unwrap()
            .push(Event::Status(self.current.0, self.current.1));
        self.current.1
    }
}

pub struct MockModule {
    log: Log,
}

impl MockModule {
    pub fn new(log: Log) -> Self {
        Self { log }
    }
}

impl ModuleControl for MockModule {
    fn set_reset(&mut self, asserted: bool) {
        self.log.lock().unwrap().push(Event::Reset(asserted));
    }

    fn set_soft_button(&mut self, pressed: bool) {
        self.log.lock().unwrap().push(Event::SoftButton(pressed));
    }

    fn set_wake(&mut self, awake: bool) {
        self.log.lock().unwrap().push(Event::Wake(awake));
    }
}

/// Delay that returns immediately and records the requested time in ns.
pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: Log) -> Self {
        Self { log }
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.log.lock().unwrap().push(Event::Delay(u64::from(ns)));
    }

    async fn delay_us(&mut self, us: u32) {
        self.log
            .lock()
            .unwrap()
            .push(Event::Delay(u64::from(us) * 1_000));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.log
            .lock()
            .unwrap()
            .push(Event::Delay(u64::from(ms) * 1_000_000));
    }
}

// Helper to run a future to completion (simple blocking executor)
pub fn block_on<F: Future>(mut f: F) -> F::Output {
    fn noop_raw_waker() -> RawWaker {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(core::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: We don't move f after pinning
    let mut f = unsafe { Pin::new_unchecked(&mut f) };

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {
                panic!("Mock future returned Pending unexpectedly");
            }
        }
    }
}
