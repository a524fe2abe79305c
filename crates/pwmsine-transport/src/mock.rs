use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::{DeviceId, Discovery, UsbTransport};

/// One scripted reply to a bulk read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRead {
    /// The device answers with these bytes.
    Data(Vec<u8>),
    /// The read times out with nothing available.
    NoData,
    /// The read fails outright.
    Fail,
}

/// A bulk write recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockWrite {
    pub endpoint: u8,
    pub data: Vec<u8>,
    pub timeout: Duration,
}

#[derive(Debug, Default)]
struct MockState {
    reads: VecDeque<MockRead>,
    writes: Vec<MockWrite>,
    read_calls: usize,
    claimed: Option<u8>,
    closed: bool,
}

/// Scripted transport for tests.
///
/// Reads are served from a queue filled with [`push_response`](Self::push_response)
/// and friends; an empty queue behaves like a device with nothing to say.
/// Clones share state, so a test can keep one handle for inspection while a
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply carrying `bytes`.
    pub fn push_response(&self, bytes: impl Into<Vec<u8>>) -> &Self {
        self.lock().reads.push_back(MockRead::Data(bytes.into()));
        self
    }

    /// Queue `count` empty reads.
    pub fn push_no_data(&self, count: usize) -> &Self {
        let mut state = self.lock();
        for _ in 0..count {
            state.reads.push_back(MockRead::NoData);
        }
        self
    }

    /// Queue a failing read.
    pub fn push_failure(&self) -> &Self {
        self.lock().reads.push_back(MockRead::Fail);
        self
    }

    /// Every write seen so far, oldest first.
    pub fn writes(&self) -> Vec<MockWrite> {
        self.lock().writes.clone()
    }

    /// Number of `bulk_read` calls made.
    pub fn read_calls(&self) -> usize {
        self.lock().read_calls
    }

    /// Scripted reads not yet consumed.
    pub fn pending_reads(&self) -> usize {
        self.lock().reads.len()
    }

    pub fn claimed_interface(&self) -> Option<u8> {
        self.lock().claimed
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UsbTransport for MockTransport {
    fn claim_interface(&mut self, interface: u8) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.claimed = Some(interface);
        Ok(())
    }

    fn bulk_write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.writes.push(MockWrite {
            endpoint,
            data: data.to_vec(),
            timeout,
        });
        Ok(data.len())
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<Option<usize>> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.read_calls += 1;
        match state.reads.pop_front() {
            Some(MockRead::Data(bytes)) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok(Some(len))
            }
            Some(MockRead::NoData) | None => Ok(None),
            Some(MockRead::Fail) => Err(TransportError::Read {
                endpoint,
                source: std::io::Error::from(std::io::ErrorKind::BrokenPipe),
            }),
        }
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.closed = true;
        Ok(())
    }
}

/// Hands out a clone of itself for any ID.
impl Discovery for MockTransport {
    type Transport = MockTransport;

    fn find(&self, _id: DeviceId) -> Result<MockTransport> {
        Ok(self.clone())
    }
}
