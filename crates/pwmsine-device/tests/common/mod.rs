//! An in-memory stand-in for the stimulus generator firmware.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pwmsine_device::{SessionConfig, PRODUCT_ID, VENDOR_ID};
use pwmsine_frame::{command, FRAME_SIZE};
use pwmsine_transport::{DeviceId, Discovery, Result, TransportError, UsbTransport};

pub const TOP: u16 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSine {
    pub amplitude: u16,
    pub phase: u16,
    pub offset: u16,
    pub frequency: u16,
}

#[derive(Debug)]
struct Firmware {
    top: u16,
    running: bool,
    /// Status polls answered `Running` before the device stops on its own.
    polls_until_stop: Option<u32>,
    max_cycle: u16,
    dc_mode: u8,
    dc_values: [u16; 3],
    sine: [RawSine; 3],
    debug: [u16; 6],
    pending: Option<[u8; FRAME_SIZE]>,
    drop_writes: u32,
    corrupt_next_id: bool,
    writes: Vec<Vec<u8>>,
    reads: usize,
    claimed: Option<u8>,
    closed: bool,
}

/// Emulated device. Clones share state, so a test keeps one handle for
/// inspection while the session owns another.
#[derive(Debug, Clone)]
pub struct EmulatedDevice {
    state: Arc<Mutex<Firmware>>,
}

impl EmulatedDevice {
    pub fn new() -> Self {
        Self::with_top(TOP)
    }

    pub fn with_top(top: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(Firmware {
                top,
                running: false,
                polls_until_stop: None,
                max_cycle: 1,
                dc_mode: 0,
                dc_values: [0; 3],
                sine: [RawSine::default(); 3],
                debug: [11, 22, 33, 44, 55, 66],
                pending: None,
                drop_writes: 0,
                corrupt_next_id: false,
                writes: Vec::new(),
                reads: 0,
                claimed: None,
                closed: false,
            })),
        }
    }

    /// After `start`, report `Running` for this many status polls, then stop.
    pub fn stop_after_polls(self, polls: u32) -> Self {
        self.lock().polls_until_stop = Some(polls);
        self
    }

    /// Swallow the next `count` writes without producing a response.
    pub fn drop_writes(&self, count: u32) {
        self.lock().drop_writes = count;
    }

    /// Answer the next command with the wrong id.
    pub fn corrupt_next_id(&self) {
        self.lock().corrupt_next_id = true;
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn raw_sine(&self, channel: usize) -> RawSine {
        self.lock().sine[channel]
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn claimed(&self) -> Option<u8> {
        self.lock().claimed
    }

    fn lock(&self) -> MutexGuard<'_, Firmware> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Firmware {
    fn respond(&mut self, request: &[u8]) -> Option<[u8; FRAME_SIZE]> {
        let id = request[0];
        let arg = |i: usize| request.get(i).copied().unwrap_or(0);
        let word = |i: usize| u16::from_be_bytes([arg(i), arg(i + 1)]);
        let channel = usize::from(arg(1)).min(2);

        let mut out = [0u8; FRAME_SIZE];
        out[0] = id;
        match id {
            command::START => self.running = true,
            command::STOP => self.running = false,
            command::SET_SINE_PARAM => {
                self.sine[channel] = RawSine {
                    amplitude: word(2),
                    phase: word(4),
                    offset: word(6),
                    frequency: word(8),
                };
            }
            command::SET_MAX_CYCLE => self.max_cycle = word(1),
            command::GET_STATUS => {
                if self.running {
                    if let Some(remaining) = self.polls_until_stop.as_mut() {
                        if *remaining == 0 {
                            self.running = false;
                        } else {
                            *remaining -= 1;
                        }
                    }
                }
                out[1] = u8::from(self.running);
            }
            command::GET_SINE_PARAM => {
                let sine = self.sine[channel];
                out[1] = arg(1);
                out[2..4].copy_from_slice(&sine.amplitude.to_be_bytes());
                out[4..6].copy_from_slice(&sine.phase.to_be_bytes());
                out[6..8].copy_from_slice(&sine.offset.to_be_bytes());
                out[8..10].copy_from_slice(&sine.frequency.to_be_bytes());
            }
            command::GET_MAX_CYCLE => out[1..3].copy_from_slice(&self.max_cycle.to_be_bytes()),
            command::GET_TOP => out[1..3].copy_from_slice(&self.top.to_be_bytes()),
            command::DFU_MODE => return None,
            command::DC_MODE_ON => self.dc_mode = 1,
            command::DC_MODE_OFF => self.dc_mode = 0,
            command::SET_DC_VAL => self.dc_values[channel] = word(2),
            command::GET_DC_MODE => out[1] = self.dc_mode,
            command::GET_DC_VAL => {
                out[1] = arg(1);
                out[2..4].copy_from_slice(&self.dc_values[channel].to_be_bytes());
            }
            command::DEBUG => {
                for (i, value) in self.debug.iter().enumerate() {
                    out[1 + 2 * i..3 + 2 * i].copy_from_slice(&value.to_be_bytes());
                }
            }
            _ => {}
        }

        if self.corrupt_next_id {
            self.corrupt_next_id = false;
            out[0] = id.wrapping_add(1);
        }
        Some(out)
    }
}

impl UsbTransport for EmulatedDevice {
    fn claim_interface(&mut self, interface: u8) -> Result<()> {
        self.lock().claimed = Some(interface);
        Ok(())
    }

    fn bulk_write(&mut self, _endpoint: u8, data: &[u8], _timeout: Duration) -> Result<usize> {
        let mut fw = self.lock();
        if fw.closed {
            return Err(TransportError::Closed);
        }
        fw.writes.push(data.to_vec());
        if fw.drop_writes > 0 {
            fw.drop_writes -= 1;
            return Ok(data.len());
        }
        fw.pending = fw.respond(data);
        Ok(data.len())
    }

    fn bulk_read(
        &mut self,
        _endpoint: u8,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<Option<usize>> {
        let mut fw = self.lock();
        if fw.closed {
            return Err(TransportError::Closed);
        }
        fw.reads += 1;
        match fw.pending.take() {
            Some(frame) => {
                buf[..FRAME_SIZE].copy_from_slice(&frame);
                Ok(Some(FRAME_SIZE))
            }
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<()> {
        let mut fw = self.lock();
        if fw.closed {
            return Err(TransportError::Closed);
        }
        fw.closed = true;
        Ok(())
    }
}

impl Discovery for EmulatedDevice {
    type Transport = EmulatedDevice;

    fn find(&self, id: DeviceId) -> Result<EmulatedDevice> {
        if id != DeviceId::new(VENDOR_ID, PRODUCT_ID) {
            return Err(TransportError::NotFound { id });
        }
        Ok(self.clone())
    }
}

/// Fast polling and a small retry bound keep the tests quick.
pub fn test_config() -> SessionConfig {
    SessionConfig {
        max_attempts: 5,
        poll_interval: Duration::from_millis(5),
        ..SessionConfig::default()
    }
}
